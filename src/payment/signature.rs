use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{PaymentResult, WebhookPayload};

type HmacSha256 = Hmac<Sha256>;

/// Verifies that a webhook payload was produced by the payment provider.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, payload: &WebhookPayload) -> bool;
}

/// HMAC-SHA256 over `{order_id}:{status}:{amount}`, base64 encoded, keyed by
/// the secret shared with the provider.
#[derive(Clone)]
pub struct HmacSignatureVerifier {
    secret: Vec<u8>,
}

impl HmacSignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        HmacSignatureVerifier {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Produce the signature the provider would attach to these fields.
    pub fn sign(&self, order_id: &str, status: PaymentResult, amount: f64) -> String {
        match self.mac(order_id, status, amount) {
            Some(mac) => STANDARD.encode(mac.finalize().into_bytes()),
            None => String::new(),
        }
    }

    fn mac(&self, order_id: &str, status: PaymentResult, amount: f64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(canonical_message(order_id, status, amount).as_bytes());
        Some(mac)
    }
}

impl SignatureVerifier for HmacSignatureVerifier {
    fn verify(&self, payload: &WebhookPayload) -> bool {
        let Ok(signature) = STANDARD.decode(payload.signature.as_bytes()) else {
            return false;
        };
        match self.mac(&payload.order_id, payload.status, payload.amount) {
            // Constant-time comparison.
            Some(mac) => mac.verify_slice(&signature).is_ok(),
            None => false,
        }
    }
}

fn canonical_message(order_id: &str, status: PaymentResult, amount: f64) -> String {
    format!("{}:{}:{}", order_id, status.as_str(), amount)
}
