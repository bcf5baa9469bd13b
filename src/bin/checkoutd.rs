//! Checkout server.
//!
//! Serves checkout and the payment webhook over HTTP on in-memory stores and
//! runs the outbox relay on a background thread.
//!
//! # Usage
//!
//! ```bash
//! WEBHOOK_SECRET=whsec SEED_STOCK=sku1=10,sku2=3 cargo run --bin checkoutd
//! ```

use std::sync::Arc;

use checkout_ledger::bus::InMemoryQueue;
use checkout_ledger::checkout::{checkout_router, CheckoutCoordinator};
use checkout_ledger::ledger::InMemoryLedger;
use checkout_ledger::lock::InMemoryLeaseLock;
use checkout_ledger::payment::{
    webhook_router, HmacSignatureVerifier, PaymentWebhookProcessor, SimulatedGateway,
};
use checkout_ledger::relay::{OutboxRelay, OutboxRelayThread};
use checkout_ledger::reservation::InMemoryReservationLedger;
use checkout_ledger::{telemetry, Config};

/// Parse `SEED_STOCK` as `item=count` pairs separated by commas.
fn seed_stock(pairs: &str) -> Result<Vec<(String, i64)>, String> {
    pairs.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (item, count) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected item=count, got {:?}", pair))?;
            let count = count
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("bad count for {}: {}", item, e))?;
            Ok((item.trim().to_string(), count))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let config = Config::from_env()?;
    if config.webhook.secret.is_empty() {
        tracing::warn!("WEBHOOK_SECRET is empty; every webhook signature check will use an empty key");
    }

    let stock = seed_stock(&std::env::var("SEED_STOCK").unwrap_or_default())?;
    tracing::info!(items = stock.len(), "seeding stock");
    let reservations = InMemoryReservationLedger::with_stock(stock);

    let ledger = InMemoryLedger::new();
    let queue = InMemoryQueue::new();

    let coordinator = Arc::new(
        CheckoutCoordinator::new(
            InMemoryLeaseLock::new(),
            reservations,
            SimulatedGateway::new(),
            ledger.clone(),
        )
        .with_config(config.checkout.clone()),
    );
    let processor = Arc::new(PaymentWebhookProcessor::new(
        ledger.clone(),
        HmacSignatureVerifier::new(config.webhook.secret.as_bytes()),
    ));

    let relay = OutboxRelay::new(ledger, queue.clone()).with_config(&config.relay);
    let relay_thread = OutboxRelayThread::spawn(relay, config.relay.poll_interval);

    let app = checkout_router(coordinator).merge(webhook_router(processor));
    let listener = tokio::net::TcpListener::bind(&config.webhook.listen_addr).await?;
    tracing::info!(addr = %config.webhook.listen_addr, "checkoutd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("shutting down");
    let stats = relay_thread.stop();
    tracing::info!(
        polls = stats.polls,
        batches = stats.batches_committed,
        events_published = stats.events_published,
        failed_batches = stats.failed_batches,
        relayed_messages = queue.len(),
        "outbox relay stopped"
    );
    Ok(())
}
