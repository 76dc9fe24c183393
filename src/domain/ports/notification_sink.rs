//! Outbound port for in-app notifications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Fan a notification out to the given users. Returns the number of
    /// notifications written.
    async fn notify(
        &self,
        project_id: Uuid,
        user_ids: &[Uuid],
        title: &str,
        body: Option<&str>,
    ) -> DomainResult<usize>;
}
