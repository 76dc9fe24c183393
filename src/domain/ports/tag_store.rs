//! Outbound port for entity tagging.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::event::EntityType;

#[async_trait]
pub trait TagStore: Send + Sync {
    /// Whether the tag belongs to the given project.
    async fn tag_in_project(&self, tag_id: Uuid, project_id: Uuid) -> DomainResult<bool>;

    /// Attach a tag to an entity. Idempotent: re-tagging is a no-op.
    async fn upsert(
        &self,
        tag_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> DomainResult<()>;

    /// Detach a tag from an entity. Idempotent: removing an absent tag is a
    /// no-op.
    async fn remove(
        &self,
        tag_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> DomainResult<()>;
}
