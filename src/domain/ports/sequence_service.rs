//! Outbound port for outreach sequence enrollment.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Result of an enrollment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    /// The person already has an active enrollment in this sequence.
    AlreadyActive,
}

#[async_trait]
pub trait SequenceService: Send + Sync {
    /// Whether the sequence belongs to the given project.
    async fn sequence_in_project(&self, sequence_id: Uuid, project_id: Uuid)
        -> DomainResult<bool>;

    /// Whether the project has at least one active outbound-channel
    /// connection.
    async fn has_active_channel(&self, project_id: Uuid) -> DomainResult<bool>;

    /// Enroll a person. Re-enrolling an actively enrolled person reports
    /// `AlreadyActive` without writing a duplicate row.
    async fn enroll(&self, sequence_id: Uuid, person_id: Uuid) -> DomainResult<EnrollOutcome>;
}
