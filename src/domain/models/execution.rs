//! Execution audit types: per-action results and the persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::automation::AutomationDefinition;
use crate::domain::models::event::{AutomationEvent, EntityType, JsonMap, TriggerType};

/// Outcome of one executed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_type: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonMap>,
}

impl ActionResult {
    pub fn ok(action_type: &str, result: JsonMap) -> Self {
        Self {
            action_type: action_type.to_string(),
            success: true,
            error: None,
            result: if result.is_empty() { None } else { Some(result) },
        }
    }

    pub fn fail(action_type: &str, error: impl Into<String>) -> Self {
        Self {
            action_type: action_type.to_string(),
            success: false,
            error: Some(error.into()),
            result: None,
        }
    }
}

/// Final status of a dispatcher invocation that reached condition
/// evaluation or beyond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    PartialFailure,
    Failed,
    Skipped,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialFailure => "partial_failure",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "partial_failure" => Some(Self::PartialFailure),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Fold a completed action list into an overall status.
    pub fn from_results(results: &[ActionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        if succeeded == results.len() {
            Self::Success
        } else if succeeded > 0 {
            Self::PartialFailure
        } else {
            Self::Failed
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted audit row: exactly one per (automation, event) pair that was
/// not filtered out purely by trigger-config mismatch or cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub automation_id: Uuid,
    pub project_id: Uuid,
    pub trigger_type: TriggerType,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub conditions_met: bool,
    pub action_results: Vec<ActionResult>,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Record for an automation whose conditions did not match.
    pub fn skipped(
        automation: &AutomationDefinition,
        event: &AutomationEvent,
        duration: std::time::Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            automation_id: automation.id,
            project_id: event.project_id,
            trigger_type: event.trigger_type,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            conditions_met: false,
            action_results: Vec::new(),
            status: ExecutionStatus::Skipped,
            error: None,
            duration_ms: duration.as_millis() as i64,
            created_at: Utc::now(),
        }
    }

    /// Record for an automation whose action list ran to completion.
    pub fn completed(
        automation: &AutomationDefinition,
        event: &AutomationEvent,
        action_results: Vec<ActionResult>,
        duration: std::time::Duration,
    ) -> Self {
        let status = ExecutionStatus::from_results(&action_results);
        let error = summarize_errors(&action_results);
        Self {
            id: Uuid::new_v4(),
            automation_id: automation.id,
            project_id: event.project_id,
            trigger_type: event.trigger_type,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            conditions_met: true,
            action_results,
            status,
            error,
            duration_ms: duration.as_millis() as i64,
            created_at: Utc::now(),
        }
    }
}

fn summarize_errors(results: &[ActionResult]) -> Option<String> {
    let failures: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| {
            format!(
                "{}: {}",
                r.action_type,
                r.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect();
    if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn status_folding() {
        let ok = ActionResult::ok("create_task", Map::new());
        let bad = ActionResult::fail("fire_webhook", "HTTP 500");

        assert_eq!(
            ExecutionStatus::from_results(&[ok.clone(), ok.clone()]),
            ExecutionStatus::Success
        );
        assert_eq!(
            ExecutionStatus::from_results(&[ok.clone(), bad.clone()]),
            ExecutionStatus::PartialFailure
        );
        assert_eq!(
            ExecutionStatus::from_results(&[bad.clone()]),
            ExecutionStatus::Failed
        );
        // Vacuously successful: nothing to run, nothing failed.
        assert_eq!(ExecutionStatus::from_results(&[]), ExecutionStatus::Success);
    }

    #[test]
    fn error_summary_joins_failures() {
        let results = vec![
            ActionResult::ok("add_tag", Map::new()),
            ActionResult::fail("fire_webhook", "HTTP 500"),
            ActionResult::fail("send_email", "no recipient"),
        ];
        assert_eq!(
            summarize_errors(&results).as_deref(),
            Some("fire_webhook: HTTP 500; send_email: no recipient")
        );
        assert_eq!(summarize_errors(&[ActionResult::ok("x", Map::new())]), None);
    }
}
