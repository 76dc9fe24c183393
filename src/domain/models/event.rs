//! Event vocabulary: entity types, trigger types, and the event envelope.
//!
//! Events are ephemeral: they are constructed by record-mutation handlers
//! (or synthesized by the time-trigger poller) and handed to the dispatcher,
//! never persisted as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// JSON object alias used for entity snapshots, event metadata, and action
/// result payloads.
pub type JsonMap = Map<String, Value>;

/// The kinds of CRM records automations can react to and act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Organization,
    Person,
    Opportunity,
    Rfp,
    Task,
    Meeting,
    Call,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Person => "person",
            Self::Opportunity => "opportunity",
            Self::Rfp => "rfp",
            Self::Task => "task",
            Self::Meeting => "meeting",
            Self::Call => "call",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "organization" => Some(Self::Organization),
            "person" => Some(Self::Person),
            "opportunity" => Some(Self::Opportunity),
            "rfp" => Some(Self::Rfp),
            "task" => Some(Self::Task),
            "meeting" => Some(Self::Meeting),
            "call" => Some(Self::Call),
            _ => None,
        }
    }

    /// Name of the backing table for this entity type.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Organization => "organizations",
            Self::Person => "people",
            Self::Opportunity => "opportunities",
            Self::Rfp => "rfps",
            Self::Task => "tasks",
            Self::Meeting => "meetings",
            Self::Call => "calls",
        }
    }

    /// Whether a task created by an automation can link back to this entity.
    pub fn has_task_link(&self) -> bool {
        matches!(
            self,
            Self::Person | Self::Organization | Self::Opportunity | Self::Rfp
        )
    }

    /// Whether this entity's table carries a `custom_fields` JSON column.
    pub fn has_custom_fields(&self) -> bool {
        !matches!(self, Self::Task | Self::Call)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed vocabulary of trigger types, used both for event routing and as
/// the persisted `trigger_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerType {
    #[serde(rename = "entity.created")]
    EntityCreated,
    #[serde(rename = "entity.updated")]
    EntityUpdated,
    #[serde(rename = "field.changed")]
    FieldChanged,
    #[serde(rename = "opportunity.stage_changed")]
    StageChanged,
    #[serde(rename = "rfp.status_changed")]
    RfpStatusChanged,
    #[serde(rename = "call.dispositioned")]
    CallDispositioned,
    #[serde(rename = "meeting.held")]
    MeetingHeld,
    #[serde(rename = "sequence.completed")]
    SequenceCompleted,
    #[serde(rename = "sequence.replied")]
    SequenceReplied,
    #[serde(rename = "time.entity_inactive")]
    EntityInactive,
    #[serde(rename = "time.task_overdue")]
    TaskOverdue,
    #[serde(rename = "time.close_date_approaching")]
    CloseDateApproaching,
    #[serde(rename = "time.created_ago")]
    CreatedAgo,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityCreated => "entity.created",
            Self::EntityUpdated => "entity.updated",
            Self::FieldChanged => "field.changed",
            Self::StageChanged => "opportunity.stage_changed",
            Self::RfpStatusChanged => "rfp.status_changed",
            Self::CallDispositioned => "call.dispositioned",
            Self::MeetingHeld => "meeting.held",
            Self::SequenceCompleted => "sequence.completed",
            Self::SequenceReplied => "sequence.replied",
            Self::EntityInactive => "time.entity_inactive",
            Self::TaskOverdue => "time.task_overdue",
            Self::CloseDateApproaching => "time.close_date_approaching",
            Self::CreatedAgo => "time.created_ago",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entity.created" => Some(Self::EntityCreated),
            "entity.updated" => Some(Self::EntityUpdated),
            "field.changed" => Some(Self::FieldChanged),
            "opportunity.stage_changed" => Some(Self::StageChanged),
            "rfp.status_changed" => Some(Self::RfpStatusChanged),
            "call.dispositioned" => Some(Self::CallDispositioned),
            "meeting.held" => Some(Self::MeetingHeld),
            "sequence.completed" => Some(Self::SequenceCompleted),
            "sequence.replied" => Some(Self::SequenceReplied),
            "time.entity_inactive" => Some(Self::EntityInactive),
            "time.task_overdue" => Some(Self::TaskOverdue),
            "time.close_date_approaching" => Some(Self::CloseDateApproaching),
            "time.created_ago" => Some(Self::CreatedAgo),
            _ => None,
        }
    }

    /// Time-based triggers are fired by the poller rather than by record
    /// mutations.
    pub fn is_time_based(&self) -> bool {
        matches!(
            self,
            Self::EntityInactive
                | Self::TaskOverdue
                | Self::CloseDateApproaching
                | Self::CreatedAgo
        )
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event handed to the dispatcher's ingestion entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub project_id: Uuid,
    pub trigger_type: TriggerType,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// Snapshot of the entity at the time of the event.
    pub data: JsonMap,
    /// Prior snapshot, present for change triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<JsonMap>,
    /// Auxiliary context (e.g. the sequence id for sequence triggers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

impl AutomationEvent {
    pub fn new(
        project_id: Uuid,
        trigger_type: TriggerType,
        entity_type: EntityType,
        entity_id: Uuid,
        data: JsonMap,
    ) -> Self {
        Self {
            project_id,
            trigger_type,
            entity_type,
            entity_id,
            data,
            previous_data: None,
            metadata: None,
        }
    }

    pub fn with_previous(mut self, previous: JsonMap) -> Self {
        self.previous_data = Some(previous);
        self
    }

    pub fn with_metadata(mut self, metadata: JsonMap) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Top-level field from the current snapshot.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Top-level field from the prior snapshot.
    pub fn previous_field(&self, name: &str) -> Option<&Value> {
        self.previous_data.as_ref().and_then(|d| d.get(name))
    }

    /// Top-level field from the event metadata.
    pub fn metadata_field(&self, name: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|d| d.get(name))
    }
}
