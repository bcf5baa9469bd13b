//! Payment webhook: signature check, idempotent settlement and status codes.

mod support;

use checkout_ledger::checkout::{finalize_order, CartItem};
use checkout_ledger::ledger::{InMemoryLedger, OrderStatus};
use checkout_ledger::payment::{
    HmacSignatureVerifier, PaymentResult, PaymentWebhookProcessor, WebhookOutcome,
};
use serde_json::json;

use support::AbortingLedger;

const SECRET: &str = "whsec_integration";

fn signed_body(order_id: &str, status: PaymentResult, amount: f64) -> Vec<u8> {
    let signature = HmacSignatureVerifier::new(SECRET).sign(order_id, status, amount);
    json!({
        "signature": signature,
        "order_id": order_id,
        "status": status.as_str(),
        "amount": amount,
    })
    .to_string()
    .into_bytes()
}

fn placed_order(ledger: &InMemoryLedger) -> String {
    finalize_order(ledger, "u1", &[CartItem::new("sku1", 2, 9.99)])
        .unwrap()
        .order_id
}

#[test]
fn duplicate_delivery_transitions_once() {
    let ledger = InMemoryLedger::new();
    let order_id = placed_order(&ledger);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));
    let body = signed_body(&order_id, PaymentResult::Success, 19.98);

    let first = processor.process(&body).unwrap();
    assert_eq!(
        first,
        WebhookOutcome::Applied {
            order_id: order_id.clone(),
            status: OrderStatus::Paid
        }
    );
    let second = processor.process(&body).unwrap();
    assert!(matches!(second, WebhookOutcome::AlreadyFinalized { status: OrderStatus::Paid, .. }));

    assert_eq!(processor.handle(&body), 200);
    assert_eq!(ledger.order(&order_id).unwrap().unwrap().status, OrderStatus::Paid);
}

#[test]
fn terminal_status_is_never_overwritten() {
    let ledger = InMemoryLedger::new();
    let order_id = placed_order(&ledger);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));

    assert_eq!(processor.handle(&signed_body(&order_id, PaymentResult::Failed, 19.98)), 200);
    assert_eq!(processor.handle(&signed_body(&order_id, PaymentResult::Success, 19.98)), 200);

    assert_eq!(ledger.order(&order_id).unwrap().unwrap().status, OrderStatus::Failed);
}

#[test]
fn bad_signature_is_rejected_without_state_change() {
    let ledger = InMemoryLedger::new();
    let order_id = placed_order(&ledger);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));

    let forged = HmacSignatureVerifier::new("wrong-secret").sign(&order_id, PaymentResult::Success, 19.98);
    let body = json!({
        "signature": forged,
        "order_id": order_id,
        "status": "SUCCESS",
        "amount": 19.98,
    })
    .to_string();

    assert_eq!(processor.handle(body.as_bytes()), 401);
    assert_eq!(ledger.order(&order_id).unwrap().unwrap().status, OrderStatus::Created);
}

#[test]
fn tampered_amount_fails_signature() {
    let ledger = InMemoryLedger::new();
    let order_id = placed_order(&ledger);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));

    let signature = HmacSignatureVerifier::new(SECRET).sign(&order_id, PaymentResult::Success, 19.98);
    let body = json!({
        "signature": signature,
        "order_id": order_id,
        "status": "SUCCESS",
        "amount": 0.01,
    })
    .to_string();

    assert_eq!(processor.handle(body.as_bytes()), 401);
}

#[test]
fn unknown_order_is_404() {
    let processor =
        PaymentWebhookProcessor::new(InMemoryLedger::new(), HmacSignatureVerifier::new(SECRET));
    assert_eq!(processor.handle(&signed_body("missing", PaymentResult::Success, 1.0)), 404);
}

#[test]
fn malformed_payloads_are_400() {
    let ledger = InMemoryLedger::new();
    let order_id = placed_order(&ledger);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));

    assert_eq!(processor.handle(b"not json"), 400);
    assert_eq!(processor.handle(br#"{"order_id":"x"}"#), 400);

    let unknown_status = json!({
        "signature": "c2ln",
        "order_id": order_id,
        "status": "REFUNDED",
        "amount": 19.98,
    })
    .to_string();
    assert_eq!(processor.handle(unknown_status.as_bytes()), 400);
    assert_eq!(ledger.order(&order_id).unwrap().unwrap().status, OrderStatus::Created);
}

#[test]
fn ledger_failure_is_500_and_retry_succeeds() {
    let ledger = AbortingLedger::new(InMemoryLedger::new());
    let order_id = placed_order(&ledger.inner);
    let processor = PaymentWebhookProcessor::new(ledger.clone(), HmacSignatureVerifier::new(SECRET));
    let body = signed_body(&order_id, PaymentResult::Success, 19.98);

    ledger.fail_commits(true);
    assert_eq!(processor.handle(&body), 500);
    assert_eq!(ledger.inner.order(&order_id).unwrap().unwrap().status, OrderStatus::Created);

    ledger.fail_commits(false);
    assert_eq!(processor.handle(&body), 200);
    assert_eq!(ledger.inner.order(&order_id).unwrap().unwrap().status, OrderStatus::Paid);
}
