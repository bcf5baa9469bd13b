//! Runtime configuration.
//!
//! Defaults are the reference values of the checkout protocol; every field
//! can be overridden from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error raised when an environment override cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub checkout: CheckoutConfig,
    pub relay: RelayConfig,
    pub webhook: WebhookConfig,
}

/// Lease policy for purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Lease time to live; bounds how long a crashed holder blocks the user.
    pub lock_ttl: Duration,
    /// How long a concurrent purchase for the same user waits for the lease.
    /// `None` fails fast with `LockUnavailable`.
    pub lock_wait: Option<Duration>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            lock_ttl: Duration::from_secs(5),
            lock_wait: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub poll_interval: Duration,
    /// Maximum outbox events read per transaction.
    pub batch_size: usize,
    pub topic: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            poll_interval: Duration::from_millis(200),
            batch_size: 10,
            topic: "orders".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Secret shared with the payment provider for HMAC signatures.
    pub secret: String,
    pub listen_addr: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            secret: String::new(),
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// | Variable                 | Field                   |
    /// |--------------------------|-------------------------|
    /// | `CHECKOUT_LOCK_TTL_MS`   | `checkout.lock_ttl`     |
    /// | `CHECKOUT_LOCK_WAIT_MS`  | `checkout.lock_wait` (0 = fail fast) |
    /// | `RELAY_POLL_INTERVAL_MS` | `relay.poll_interval`   |
    /// | `RELAY_BATCH_SIZE`       | `relay.batch_size`      |
    /// | `RELAY_TOPIC`            | `relay.topic`           |
    /// | `WEBHOOK_SECRET`         | `webhook.secret`        |
    /// | `WEBHOOK_LISTEN_ADDR`    | `webhook.listen_addr`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(ttl) = parse_millis(&lookup, "CHECKOUT_LOCK_TTL_MS")? {
            if ttl.is_zero() {
                return Err(ConfigError {
                    var: "CHECKOUT_LOCK_TTL_MS",
                    value: "0".into(),
                    reason: "lease ttl must be positive".into(),
                });
            }
            config.checkout.lock_ttl = ttl;
        }
        if let Some(wait) = parse_millis(&lookup, "CHECKOUT_LOCK_WAIT_MS")? {
            config.checkout.lock_wait = (!wait.is_zero()).then_some(wait);
        }
        if let Some(interval) = parse_millis(&lookup, "RELAY_POLL_INTERVAL_MS")? {
            config.relay.poll_interval = interval;
        }
        if let Some(size) = parse::<usize, _>(&lookup, "RELAY_BATCH_SIZE")? {
            if size == 0 {
                return Err(ConfigError {
                    var: "RELAY_BATCH_SIZE",
                    value: "0".into(),
                    reason: "batch size must be positive".into(),
                });
            }
            config.relay.batch_size = size;
        }
        if let Some(topic) = lookup("RELAY_TOPIC") {
            config.relay.topic = topic;
        }
        if let Some(secret) = lookup("WEBHOOK_SECRET") {
            config.webhook.secret = secret;
        }
        if let Some(addr) = lookup("WEBHOOK_LISTEN_ADDR") {
            config.webhook.listen_addr = addr;
        }

        Ok(config)
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|e| ConfigError {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_millis<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse::<u64, F>(lookup, var)?.map(Duration::from_millis))
}
