//! Reqwest-backed webhook transport.
//!
//! One shared client built with the configured timeout. Transport and
//! timeout failures map to `DomainError::ExecutionFailed`; non-2xx statuses
//! are returned to the caller, not treated as transport errors. No retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{WebhookResponse, WebhookTransport};

#[derive(Debug, Clone)]
pub struct ReqwestWebhookTransport {
    http: Client,
}

impl ReqwestWebhookTransport {
    pub fn new(timeout: Duration) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::ExecutionFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestWebhookTransport {
    async fn post(&self, url: &str, payload: &Value) -> DomainResult<WebhookResponse> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DomainError::ExecutionFailed(format!("webhook request failed: {e}")))?;

        Ok(WebhookResponse {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn posts_json_and_reports_the_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(json!({"kind": "test"})))
            .with_status(204)
            .create_async()
            .await;

        let transport = ReqwestWebhookTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .post(&format!("{}/hook", server.url()), &json!({"kind": "test"}))
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        assert!(response.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_statuses_are_returned_not_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let transport = ReqwestWebhookTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .post(&format!("{}/hook", server.url()), &json!({}))
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn connection_failures_surface_as_execution_errors() {
        // Nothing listens on this port.
        let transport = ReqwestWebhookTransport::new(Duration::from_millis(500)).unwrap();
        let err = transport
            .post("http://127.0.0.1:1/hook", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExecutionFailed(_)));
    }
}
