//! Outbound port for webhook HTTP egress.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainResult;

/// Minimal view of a webhook response; the engine only cares about the
/// status code.
#[derive(Debug, Clone, Copy)]
pub struct WebhookResponse {
    pub status: u16,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport for validated webhook URLs. Implementations enforce the
/// bounded request timeout; they do not retry.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, url: &str, payload: &Value) -> DomainResult<WebhookResponse>;
}
