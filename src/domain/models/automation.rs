//! Automation definitions: triggers, conditions, and actions.
//!
//! Trigger and action configs are tagged unions so that a stored definition
//! carries only the fields its type recognizes. Definitions are validated
//! when saved; the engine reads them back and can assume well-formed input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::{EntityType, JsonMap, TriggerType};

/// Inclusive bounds for day-based time trigger configuration.
pub const TIME_TRIGGER_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=365;

/// What makes a definition eligible to run, plus its type-specific
/// refinement fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger_type")]
pub enum Trigger {
    #[serde(rename = "entity.created")]
    EntityCreated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_type: Option<EntityType>,
    },
    #[serde(rename = "entity.updated")]
    EntityUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_type: Option<EntityType>,
    },
    #[serde(rename = "field.changed")]
    FieldChanged {
        field_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_type: Option<EntityType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_value: Option<String>,
    },
    #[serde(rename = "opportunity.stage_changed")]
    StageChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_stage: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_stage: Option<String>,
    },
    #[serde(rename = "rfp.status_changed")]
    RfpStatusChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_status: Option<String>,
    },
    #[serde(rename = "call.dispositioned")]
    CallDispositioned {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disposition: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
    },
    #[serde(rename = "meeting.held")]
    MeetingHeld {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meeting_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<String>,
    },
    #[serde(rename = "sequence.completed")]
    SequenceCompleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence_id: Option<Uuid>,
    },
    #[serde(rename = "sequence.replied")]
    SequenceReplied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence_id: Option<Uuid>,
    },
    #[serde(rename = "time.entity_inactive")]
    EntityInactive { entity_type: EntityType, days: i64 },
    #[serde(rename = "time.task_overdue")]
    TaskOverdue,
    #[serde(rename = "time.close_date_approaching")]
    CloseDateApproaching { days_before: i64 },
    #[serde(rename = "time.created_ago")]
    CreatedAgo { entity_type: EntityType, days: i64 },
}

impl Trigger {
    /// The closed trigger-type discriminant this config belongs to.
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::EntityCreated { .. } => TriggerType::EntityCreated,
            Self::EntityUpdated { .. } => TriggerType::EntityUpdated,
            Self::FieldChanged { .. } => TriggerType::FieldChanged,
            Self::StageChanged { .. } => TriggerType::StageChanged,
            Self::RfpStatusChanged { .. } => TriggerType::RfpStatusChanged,
            Self::CallDispositioned { .. } => TriggerType::CallDispositioned,
            Self::MeetingHeld { .. } => TriggerType::MeetingHeld,
            Self::SequenceCompleted { .. } => TriggerType::SequenceCompleted,
            Self::SequenceReplied { .. } => TriggerType::SequenceReplied,
            Self::EntityInactive { .. } => TriggerType::EntityInactive,
            Self::TaskOverdue => TriggerType::TaskOverdue,
            Self::CloseDateApproaching { .. } => TriggerType::CloseDateApproaching,
            Self::CreatedAgo { .. } => TriggerType::CreatedAgo,
        }
    }
}

/// Comparison operators available to conditions. Unrecognized operators in
/// stored definitions deserialize to `Unknown`, which always evaluates false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    In,
    NotIn,
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Unknown => "unknown",
        }
    }
}

/// A single boolean predicate over entity data. Conditions within one
/// definition are AND-combined; an empty list means "always true".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot path into the entity snapshot, optionally `custom_fields.<key>`.
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// One side-effecting operation executed as part of a definition's response.
/// Actions execute strictly in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    CreateTask {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assignee_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        due_in_days: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<String>,
    },
    UpdateField {
        field_name: String,
        value: Value,
    },
    ChangeStage {
        stage: String,
    },
    ChangeStatus {
        status: String,
    },
    AssignOwner {
        user_id: Uuid,
    },
    SendNotification {
        #[serde(default)]
        user_ids: Vec<Uuid>,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    SendEmail {
        template_id: Uuid,
    },
    EnrollInSequence {
        sequence_id: Uuid,
    },
    AddTag {
        tag_id: Uuid,
    },
    RemoveTag {
        tag_id: Uuid,
    },
    CreateActivity {
        activity_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    RunAiResearch {
        topic: String,
    },
    FireWebhook {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<JsonMap>,
    },
}

impl Action {
    /// Stable name of this action's type, used in results and audit rows.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTask { .. } => "create_task",
            Self::UpdateField { .. } => "update_field",
            Self::ChangeStage { .. } => "change_stage",
            Self::ChangeStatus { .. } => "change_status",
            Self::AssignOwner { .. } => "assign_owner",
            Self::SendNotification { .. } => "send_notification",
            Self::SendEmail { .. } => "send_email",
            Self::EnrollInSequence { .. } => "enroll_in_sequence",
            Self::AddTag { .. } => "add_tag",
            Self::RemoveTag { .. } => "remove_tag",
            Self::CreateActivity { .. } => "create_activity",
            Self::RunAiResearch { .. } => "run_ai_research",
            Self::FireWebhook { .. } => "fire_webhook",
        }
    }
}

/// A persisted rule: trigger + conditions + ordered action list.
///
/// Definitions are created and edited through the management surface; the
/// engine only reads enabled definitions matching a trigger type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationDefinition {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AutomationDefinition {
    pub fn new(project_id: Uuid, name: impl Into<String>, trigger: Trigger) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: name.into(),
            trigger,
            conditions: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Structural save-time validation. The egress policy for webhook URLs
    /// is enforced separately at the repository boundary and again at fire
    /// time.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "automation name must not be empty".to_string(),
            ));
        }
        if self.actions.is_empty() {
            return Err(DomainError::ValidationFailed(
                "automation must have at least one action".to_string(),
            ));
        }

        match &self.trigger {
            Trigger::FieldChanged { field_name, .. } if field_name.trim().is_empty() => {
                return Err(DomainError::ValidationFailed(
                    "field.changed trigger requires a field_name".to_string(),
                ));
            }
            Trigger::EntityInactive { days, .. } | Trigger::CreatedAgo { days, .. }
                if !TIME_TRIGGER_DAYS_RANGE.contains(days) =>
            {
                return Err(DomainError::ValidationFailed(format!(
                    "time trigger days must be within {}..={}, got {days}",
                    TIME_TRIGGER_DAYS_RANGE.start(),
                    TIME_TRIGGER_DAYS_RANGE.end(),
                )));
            }
            Trigger::CloseDateApproaching { days_before }
                if !TIME_TRIGGER_DAYS_RANGE.contains(days_before) =>
            {
                return Err(DomainError::ValidationFailed(format!(
                    "days_before must be within {}..={}, got {days_before}",
                    TIME_TRIGGER_DAYS_RANGE.start(),
                    TIME_TRIGGER_DAYS_RANGE.end(),
                )));
            }
            _ => {}
        }

        for action in &self.actions {
            match action {
                Action::CreateTask { title, .. } if title.trim().is_empty() => {
                    return Err(DomainError::ValidationFailed(
                        "create_task requires a title".to_string(),
                    ));
                }
                Action::UpdateField { field_name, .. } if field_name.trim().is_empty() => {
                    return Err(DomainError::ValidationFailed(
                        "update_field requires a field_name".to_string(),
                    ));
                }
                Action::SendNotification { user_ids, .. } if user_ids.is_empty() => {
                    return Err(DomainError::ValidationFailed(
                        "send_notification requires at least one recipient".to_string(),
                    ));
                }
                Action::FireWebhook { url, .. } if url.trim().is_empty() => {
                    return Err(DomainError::ValidationFailed(
                        "fire_webhook requires a url".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
