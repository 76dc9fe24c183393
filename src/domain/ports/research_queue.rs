//! Outbound port for asynchronous research jobs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::event::EntityType;

/// Insert payload for a queued research job. Research runs out of band; the
/// engine only enqueues.
#[derive(Debug, Clone)]
pub struct ResearchJob {
    pub project_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub topic: String,
    /// Attribution: the automation that requested the job.
    pub requested_by: String,
}

#[async_trait]
pub trait ResearchQueue: Send + Sync {
    async fn enqueue(&self, job: ResearchJob) -> DomainResult<Uuid>;
}
