//! Trigger pre-filtering.
//!
//! Decides whether an incoming event plausibly satisfies a definition's
//! trigger config before the condition evaluator runs. Pure, no I/O. A
//! non-match here is a silent skip: no execution record is written.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::models::automation::Trigger;
use crate::domain::models::event::{AutomationEvent, EntityType};

/// Whether the event satisfies the trigger config. Rules are independent
/// and AND-combined; unset optional fields match anything.
pub fn matches(trigger: &Trigger, event: &AutomationEvent) -> bool {
    if trigger.trigger_type() != event.trigger_type {
        return false;
    }

    match trigger {
        Trigger::EntityCreated { entity_type } | Trigger::EntityUpdated { entity_type } => {
            entity_type_matches(*entity_type, event)
        }

        Trigger::FieldChanged {
            field_name,
            entity_type,
            to_value,
        } => {
            if !entity_type_matches(*entity_type, event) {
                return false;
            }
            let current = normalized(event.field(field_name));
            let previous = normalized(event.previous_field(field_name));
            // Null and missing normalize to the same "absent" value, so a
            // null-to-null transition is not a change.
            if current == previous {
                return false;
            }
            match to_value {
                Some(expected) => current.as_deref() == Some(expected.as_str()),
                None => true,
            }
        }

        Trigger::StageChanged {
            from_stage,
            to_stage,
        } => {
            optional_matches(from_stage, event.previous_field("stage"))
                && optional_matches(to_stage, event.field("stage"))
        }

        Trigger::RfpStatusChanged {
            from_status,
            to_status,
        } => {
            optional_matches(from_status, event.previous_field("status"))
                && optional_matches(to_status, event.field("status"))
        }

        Trigger::CallDispositioned {
            disposition,
            direction,
        } => {
            optional_matches(disposition, event.field("disposition"))
                && optional_matches(direction, event.field("direction"))
        }

        Trigger::MeetingHeld {
            meeting_type,
            outcome,
        } => {
            optional_matches(meeting_type, event.field("meeting_type"))
                && optional_matches(outcome, event.field("outcome"))
        }

        Trigger::SequenceCompleted { sequence_id } | Trigger::SequenceReplied { sequence_id } => {
            sequence_matches(*sequence_id, event)
        }

        Trigger::EntityInactive { entity_type, .. } | Trigger::CreatedAgo { entity_type, .. } => {
            event.entity_type == *entity_type
        }
        Trigger::TaskOverdue => event.entity_type == EntityType::Task,
        Trigger::CloseDateApproaching { .. } => event.entity_type == EntityType::Opportunity,
    }
}

fn entity_type_matches(filter: Option<EntityType>, event: &AutomationEvent) -> bool {
    filter.is_none_or(|t| t == event.entity_type)
}

fn optional_matches(expected: &Option<String>, actual: Option<&Value>) -> bool {
    match expected {
        Some(expected) => normalized(actual).as_deref() == Some(expected.as_str()),
        None => true,
    }
}

fn sequence_matches(expected: Option<Uuid>, event: &AutomationEvent) -> bool {
    match expected {
        Some(id) => {
            normalized(event.metadata_field("sequence_id")).as_deref() == Some(&id.to_string())
        }
        None => true,
    }
}

/// String-normalized view of a field value; null and missing are both
/// "absent".
fn normalized(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    }
}
