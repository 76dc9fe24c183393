//! Data-access port for CRM entity rows.
//!
//! Entities are exposed to the engine as semi-structured JSON snapshots so
//! the condition evaluator and action handlers stay independent of table
//! shapes. All reads and writes are project-scoped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::event::{EntityType, JsonMap};

/// A candidate row returned by time-trigger queries: the id plus the full
/// snapshot used as the synthetic event's data.
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: Uuid,
    pub data: JsonMap,
}

/// Insert payload for tasks created by automations.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: String,
    pub assignee_id: Option<Uuid>,
    /// Link back to the triggering entity, when its type supports one.
    pub link: Option<(EntityType, Uuid)>,
}

/// Insert payload for queued email drafts.
#[derive(Debug, Clone)]
pub struct NewEmailDraft {
    pub project_id: Uuid,
    pub template_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
}

/// A resolved email template.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Read one entity row as a JSON snapshot (`custom_fields` parsed into
    /// an object). None when the row does not exist in the project.
    async fn get_entity(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<JsonMap>>;

    /// Write a single column. Callers are responsible for field-policy
    /// checks; implementations reject unsafe identifiers.
    async fn update_field(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
        field: &str,
        value: &Value,
    ) -> DomainResult<()>;

    /// Merge keys into the entity's `custom_fields` JSON object without
    /// overwriting unrelated keys.
    async fn merge_custom_fields(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
        patch: &JsonMap,
    ) -> DomainResult<()>;

    async fn insert_task(&self, task: NewTask) -> DomainResult<Uuid>;

    async fn insert_email_draft(&self, draft: NewEmailDraft) -> DomainResult<Uuid>;

    async fn get_email_template(
        &self,
        template_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<EmailTemplate>>;

    /// Address to queue an email draft for: the entity's own address when it
    /// is a person, otherwise the linked primary contact's.
    async fn resolve_email_recipient(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<String>>;

    async fn is_project_member(&self, user_id: Uuid, project_id: Uuid) -> DomainResult<bool>;

    /// Entities whose last update is older than `days`.
    async fn find_inactive(
        &self,
        project_id: Uuid,
        entity_type: EntityType,
        days: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>>;

    /// Tasks past due and not completed or cancelled.
    async fn find_overdue_tasks(&self, project_id: Uuid, limit: usize)
        -> DomainResult<Vec<EntityRow>>;

    /// Open opportunities whose close date falls within `days_before` days
    /// from now.
    async fn find_closing_opportunities(
        &self,
        project_id: Uuid,
        days_before: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>>;

    /// Entities created within the 24-hour window exactly `days_ago` days
    /// ago (a rolling day-boundary match, not "older than").
    async fn find_created_on_day(
        &self,
        project_id: Uuid,
        entity_type: EntityType,
        days_ago: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>>;
}
