//! Time-trigger polling: converts "nothing happened but time passed" into
//! ordinary automation events.
//!
//! An external scheduler invokes `process_time_triggers` on a fixed
//! interval. Each run queries candidates per time-based definition,
//! deduplicates against the persisted snapshot of previously matched ids,
//! and feeds only newly-qualifying entities into the dispatcher's normal
//! ingestion path.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::automation::{AutomationDefinition, Trigger, TIME_TRIGGER_DAYS_RANGE};
use crate::domain::models::event::{AutomationEvent, EntityType};
use crate::domain::ports::{AutomationRepository, EntityRow, EntityStore};
use crate::services::dispatcher::Dispatcher;

/// Outcome of one poller run.
#[derive(Debug, Default, Serialize)]
pub struct PollSummary {
    /// Time-based definitions examined.
    pub processed: usize,
    /// Newly-matched entities across all definitions.
    pub matched: usize,
    /// Definitions whose candidate query or snapshot handling failed.
    pub errors: usize,
    pub details: Vec<PollDetail>,
}

/// Per-definition outcome within a run.
#[derive(Debug, Serialize)]
pub struct PollDetail {
    pub automation_id: Uuid,
    pub name: String,
    /// Candidates currently satisfying the time predicate.
    pub candidates: usize,
    /// Candidates not present in the snapshot, emitted as events.
    pub new_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Scheduled job that synthesizes events for time-based triggers.
pub struct TimeTriggerPoller {
    automations: Arc<dyn AutomationRepository>,
    entities: Arc<dyn EntityStore>,
    dispatcher: Arc<Dispatcher>,
}

impl TimeTriggerPoller {
    pub fn new(
        automations: Arc<dyn AutomationRepository>,
        entities: Arc<dyn EntityStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            automations,
            entities,
            dispatcher,
        }
    }

    /// Examine every enabled time-based definition, emitting events for
    /// newly-qualifying entities. `limit` bounds candidates per definition.
    pub async fn process_time_triggers(&self, limit: usize) -> PollSummary {
        let definitions = match self.automations.list_enabled_time_triggers().await {
            Ok(definitions) => definitions,
            Err(e) => {
                tracing::error!(error = %e, "failed to load time-based automations");
                return PollSummary {
                    errors: 1,
                    ..PollSummary::default()
                };
            }
        };

        let mut summary = PollSummary::default();
        for definition in definitions {
            summary.processed += 1;
            match self.poll_definition(&definition, limit).await {
                Ok(detail) => {
                    summary.matched += detail.new_matches;
                    summary.details.push(detail);
                }
                Err(e) => {
                    tracing::warn!(
                        automation = %definition.name,
                        error = %e,
                        "time-trigger poll failed"
                    );
                    summary.errors += 1;
                    summary.details.push(PollDetail {
                        automation_id: definition.id,
                        name: definition.name.clone(),
                        candidates: 0,
                        new_matches: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        summary
    }

    async fn poll_definition(
        &self,
        definition: &AutomationDefinition,
        limit: usize,
    ) -> DomainResult<PollDetail> {
        let (entity_type, candidates) = self.candidates(definition, limit).await?;

        let seen = self.automations.load_time_snapshot(definition.id).await?;
        let fresh: Vec<&EntityRow> = candidates
            .iter()
            .filter(|row| !seen.contains(&row.id))
            .collect();

        for row in &fresh {
            let event = AutomationEvent::new(
                definition.project_id,
                definition.trigger.trigger_type(),
                entity_type,
                row.id,
                row.data.clone(),
            );
            // Same sequential path organic events take; awaited so a poll
            // run returns only after its events are fully processed.
            self.dispatcher.process_event(event).await;
        }

        // The snapshot only ever grows: entities that stop matching stay
        // recorded so they cannot re-fire the same definition later.
        if !fresh.is_empty() {
            let mut union = seen;
            union.extend(fresh.iter().map(|row| row.id));
            self.automations
                .save_time_snapshot(definition.id, &union)
                .await?;
        }

        Ok(PollDetail {
            automation_id: definition.id,
            name: definition.name.clone(),
            candidates: candidates.len(),
            new_matches: fresh.len(),
            error: None,
        })
    }

    async fn candidates(
        &self,
        definition: &AutomationDefinition,
        limit: usize,
    ) -> DomainResult<(EntityType, Vec<EntityRow>)> {
        match &definition.trigger {
            Trigger::EntityInactive { entity_type, days } => {
                let days = clamp_days(*days);
                let rows = self
                    .entities
                    .find_inactive(definition.project_id, *entity_type, days, limit)
                    .await?;
                Ok((*entity_type, rows))
            }
            Trigger::TaskOverdue => {
                let rows = self
                    .entities
                    .find_overdue_tasks(definition.project_id, limit)
                    .await?;
                Ok((EntityType::Task, rows))
            }
            Trigger::CloseDateApproaching { days_before } => {
                let days = clamp_days(*days_before);
                let rows = self
                    .entities
                    .find_closing_opportunities(definition.project_id, days, limit)
                    .await?;
                Ok((EntityType::Opportunity, rows))
            }
            Trigger::CreatedAgo { entity_type, days } => {
                let days = clamp_days(*days);
                let rows = self
                    .entities
                    .find_created_on_day(definition.project_id, *entity_type, days, limit)
                    .await?;
                Ok((*entity_type, rows))
            }
            other => Err(DomainError::ExecutionFailed(format!(
                "{} is not a time-based trigger",
                other.trigger_type()
            ))),
        }
    }
}

fn clamp_days(days: i64) -> i64 {
    days.clamp(*TIME_TRIGGER_DAYS_RANGE.start(), *TIME_TRIGGER_DAYS_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_are_clamped_to_the_contract_range() {
        assert_eq!(clamp_days(0), 1);
        assert_eq!(clamp_days(-5), 1);
        assert_eq!(clamp_days(30), 30);
        assert_eq!(clamp_days(10_000), 365);
    }
}
