//! Repository port for execution audit records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::execution::ExecutionRecord;

#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Append one execution record.
    async fn insert(&self, record: &ExecutionRecord) -> DomainResult<()>;

    /// Most recent executions for an automation, newest first.
    async fn list_recent(
        &self,
        automation_id: Uuid,
        limit: usize,
    ) -> DomainResult<Vec<ExecutionRecord>>;
}
