//! Repository port for automation definitions and time-trigger snapshots.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::automation::AutomationDefinition;
use crate::domain::models::event::TriggerType;

/// Persistence for automation definitions. The engine only reads; create /
/// update / delete exist for the management surface and for seeding.
#[async_trait]
pub trait AutomationRepository: Send + Sync {
    /// Persist a new definition. Implementations validate before writing.
    async fn create(&self, definition: &AutomationDefinition) -> DomainResult<()>;

    /// Get a definition by id within a project scope.
    async fn get(&self, id: Uuid, project_id: Uuid) -> DomainResult<Option<AutomationDefinition>>;

    /// List all definitions for a project.
    async fn list(&self, project_id: Uuid) -> DomainResult<Vec<AutomationDefinition>>;

    /// List enabled definitions registered for a trigger type, in a stable
    /// order.
    async fn list_enabled_for_trigger(
        &self,
        project_id: Uuid,
        trigger_type: TriggerType,
    ) -> DomainResult<Vec<AutomationDefinition>>;

    /// List enabled time-based definitions across all projects (poller
    /// input).
    async fn list_enabled_time_triggers(&self) -> DomainResult<Vec<AutomationDefinition>>;

    /// Enable or disable a definition. Returns false when not found.
    async fn set_enabled(&self, id: Uuid, project_id: Uuid, enabled: bool) -> DomainResult<bool>;

    /// Delete a definition (cascades executions and snapshots).
    async fn delete(&self, id: Uuid, project_id: Uuid) -> DomainResult<()>;

    /// Entity ids previously matched by a time-based definition.
    async fn load_time_snapshot(&self, automation_id: Uuid) -> DomainResult<HashSet<Uuid>>;

    /// Replace the snapshot with the given set (callers pass the union of
    /// old and new matches).
    async fn save_time_snapshot(
        &self,
        automation_id: Uuid,
        matched: &HashSet<Uuid>,
    ) -> DomainResult<()>;
}
