//! Alert delivery.
//!
//! The auditor only needs "send this alert"; transports live behind the
//! [`Notifier`] trait and report failure as a [`NotifyError`] value. Two
//! transports ship here: a tracing-only notifier and an HTTP relay that POSTs
//! a signed JSON payload to a mail gateway.

use async_trait::async_trait;
use fleetlog_core::{FleetResult, NotifyError};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the HMAC-SHA256 signature of the request body.
pub const SIGNATURE_HEADER: &str = "X-Fleetlog-Signature";
/// Header carrying the per-delivery UUID.
pub const DELIVERY_ID_HEADER: &str = "X-Fleetlog-Delivery-ID";

// ============================================================================
// TYPES
// ============================================================================

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub recipient: String,
    pub sender: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Best-effort alert transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `alert`. Failures come back as values, never panics.
    async fn send(&self, alert: &AlertMessage) -> Result<(), NotifyError>;

    /// Short transport name for logs.
    fn name(&self) -> &'static str;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Transport selection and relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Mail relay endpoint. `None` selects [`LogNotifier`].
    pub webhook_url: Option<String>,
    /// Shared secret for request signing.
    pub webhook_secret: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_secret: None,
            timeout_secs: 10,
            max_attempts: 3,
            initial_backoff_ms: 1000,
        }
    }
}

impl NotifierConfig {
    /// Create NotifierConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FLEETLOG_ALERT_WEBHOOK_URL`: Mail relay URL (unset = log only)
    /// - `FLEETLOG_ALERT_WEBHOOK_SECRET`: HMAC signing secret (optional)
    /// - `FLEETLOG_ALERT_TIMEOUT_SECS`: Per-request timeout (default: 10)
    /// - `FLEETLOG_ALERT_MAX_ATTEMPTS`: Delivery attempts (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            webhook_url: non_empty("FLEETLOG_ALERT_WEBHOOK_URL"),
            webhook_secret: non_empty("FLEETLOG_ALERT_WEBHOOK_SECRET"),
            timeout_secs: non_empty("FLEETLOG_ALERT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_attempts: non_empty("FLEETLOG_ALERT_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_attempts),
            initial_backoff_ms: defaults.initial_backoff_ms,
        }
    }
}

/// Build the transport selected by `config`.
pub fn build_notifier(config: &NotifierConfig) -> FleetResult<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(_) => Ok(Arc::new(WebhookNotifier::new(config)?)),
        None => {
            tracing::info!("No alert relay configured, mileage alerts will be logged only");
            Ok(Arc::new(LogNotifier))
        }
    }
}

// ============================================================================
// LOG NOTIFIER
// ============================================================================

/// Writes alerts to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %alert.recipient,
            subject = %alert.subject,
            body = %alert.body,
            "Mileage alert"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// ============================================================================
// WEBHOOK NOTIFIER
// ============================================================================

/// JSON body POSTed to the mail relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayPayload {
    pub delivery_id: Uuid,
    pub to: String,
    pub from: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Delivers alerts to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: reqwest::Url,
    secret: Option<String>,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let raw = config
            .webhook_url
            .as_deref()
            .ok_or(NotifyError::NotConfigured)?;
        let url = reqwest::Url::parse(raw).map_err(|e| NotifyError::Payload {
            reason: format!("invalid relay URL {}: {}", raw, e),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Transport {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url,
            secret: config.webhook_secret.clone(),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        })
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

/// Sign `payload` with HMAC-SHA256, hex encoded.
pub fn sign_payload(payload: &[u8], secret: &str) -> Result<String, NotifyError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
        NotifyError::Payload {
            reason: format!("failed to initialize HMAC: {}", e),
        }
    })?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        let delivery_id = Uuid::new_v4();
        let payload = RelayPayload {
            delivery_id,
            to: alert.recipient.clone(),
            from: alert.sender.clone(),
            subject: alert.subject.clone(),
            body: alert.body.clone(),
        };
        let bytes = serde_json::to_vec(&payload).map_err(|e| NotifyError::Payload {
            reason: e.to_string(),
        })?;
        let signature = self
            .secret
            .as_deref()
            .map(|secret| sign_payload(&bytes, secret))
            .transpose()?;

        let mut delay = self.initial_backoff;
        let mut last_error = NotifyError::Transport {
            reason: "no delivery attempted".to_string(),
        };

        for attempt in 1..=self.max_attempts {
            let mut request = self
                .client
                .post(self.url.clone())
                .header("Content-Type", "application/json")
                .header(DELIVERY_ID_HEADER, delivery_id.to_string())
                .header("User-Agent", "Fleetlog-Alert/1.0")
                .body(bytes.clone());
            if let Some(sig) = &signature {
                request = request.header(SIGNATURE_HEADER, format!("sha256={}", sig));
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(
                        delivery_id = %delivery_id,
                        status = %response.status(),
                        "Mileage alert delivered"
                    );
                    return Ok(());
                }
                Ok(response) => {
                    tracing::warn!(
                        delivery_id = %delivery_id,
                        status = %response.status(),
                        attempt = attempt,
                        "Alert relay returned non-2xx status"
                    );
                    last_error = NotifyError::Rejected {
                        status: response.status().as_u16(),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        delivery_id = %delivery_id,
                        error = %e,
                        attempt = attempt,
                        "Alert relay request failed"
                    );
                    last_error = NotifyError::Transport {
                        reason: e.to_string(),
                    };
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(last_error)
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> AlertMessage {
        AlertMessage {
            recipient: "fleet@example.org".to_string(),
            sender: None,
            subject: "[Vehicle Mileage Check] 2022 RAM - Submitted Record #10".to_string(),
            body: "Findings".to_string(),
        }
    }

    #[test]
    fn test_sign_payload_is_stable_hex() {
        let a = sign_payload(b"payload", "secret").unwrap();
        let b = sign_payload(b"payload", "secret").unwrap();
        let c = sign_payload(b"payload", "other").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_default_config_selects_log_notifier() {
        let notifier = build_notifier(&NotifierConfig::default()).unwrap();
        assert_eq!(notifier.name(), "log");
    }

    #[test]
    fn test_webhook_config_selects_webhook_notifier() {
        let config = NotifierConfig {
            webhook_url: Some("http://127.0.0.1:9/relay".to_string()),
            ..NotifierConfig::default()
        };
        let notifier = build_notifier(&config).unwrap();
        assert_eq!(notifier.name(), "webhook");
    }

    #[test]
    fn test_webhook_rejects_bad_url() {
        let config = NotifierConfig {
            webhook_url: Some("not a url".to_string()),
            ..NotifierConfig::default()
        };
        assert!(matches!(
            WebhookNotifier::new(&config),
            Err(NotifyError::Payload { .. })
        ));
    }

    #[test]
    fn test_webhook_requires_url() {
        assert_eq!(
            WebhookNotifier::new(&NotifierConfig::default()).unwrap_err(),
            NotifyError::NotConfigured
        );
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send(&alert()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_relay_returns_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let config = NotifierConfig {
            webhook_url: Some("http://127.0.0.1:9/relay".to_string()),
            max_attempts: 2,
            initial_backoff_ms: 1,
            timeout_secs: 2,
            ..NotifierConfig::default()
        };
        let notifier = WebhookNotifier::new(&config).unwrap();
        let result = notifier.send(&alert()).await;
        assert!(matches!(result, Err(NotifyError::Transport { .. })));
    }
}
