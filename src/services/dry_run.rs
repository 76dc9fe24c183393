//! Dry-run evaluation: preview whether a definition would fire against a
//! live entity, without executing anything.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::automation::Action;
use crate::domain::models::event::{EntityType, JsonMap};
use crate::domain::ports::{AutomationRepository, EntityStore};
use crate::services::condition_evaluator;

/// Preview result: the action list is returned unexecuted.
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    pub would_trigger: bool,
    pub conditions_met: bool,
    pub actions: Vec<Action>,
    pub entity_data: JsonMap,
}

/// Side-effect-free conditions preview for the management surface. Trigger
/// matching is intentionally skipped: a dry run previews conditions against
/// the current row, it does not simulate an event.
pub struct DryRunEvaluator {
    automations: Arc<dyn AutomationRepository>,
    entities: Arc<dyn EntityStore>,
}

impl DryRunEvaluator {
    pub fn new(automations: Arc<dyn AutomationRepository>, entities: Arc<dyn EntityStore>) -> Self {
        Self {
            automations,
            entities,
        }
    }

    pub async fn dry_run(
        &self,
        automation_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<DryRunReport> {
        let automation = self
            .automations
            .get(automation_id, project_id)
            .await?
            .ok_or(DomainError::AutomationNotFound(automation_id))?;

        let entity_data = self
            .entities
            .get_entity(entity_type, entity_id, project_id)
            .await?
            .ok_or_else(|| DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id: entity_id,
            })?;

        let conditions_met =
            condition_evaluator::evaluate_all(&automation.conditions, &entity_data);

        Ok(DryRunReport {
            would_trigger: automation.enabled && conditions_met,
            conditions_met,
            actions: automation.actions,
            entity_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteAutomationRepository, SqliteEntityStore,
    };
    use crate::domain::models::automation::{
        AutomationDefinition, Condition, ConditionOperator, Trigger,
    };
    use crate::domain::ports::AutomationRepository as _;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn seed(pool: &SqlitePool) -> (Uuid, Uuid) {
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(pool)
            .await
            .unwrap();
        let org_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO organizations (id, project_id, name, industry) VALUES (?, ?, 'Globex', 'fintech')",
        )
        .bind(org_id.to_string())
        .bind(project_id.to_string())
        .execute(pool)
        .await
        .unwrap();
        (project_id, org_id)
    }

    fn evaluator(pool: &SqlitePool) -> DryRunEvaluator {
        DryRunEvaluator::new(
            Arc::new(SqliteAutomationRepository::new(pool.clone())),
            Arc::new(SqliteEntityStore::new(pool.clone())),
        )
    }

    #[tokio::test]
    async fn previews_conditions_without_executing_actions() {
        let pool = create_migrated_test_pool().await.unwrap();
        let (project_id, org_id) = seed(&pool).await;
        let repo = SqliteAutomationRepository::new(pool.clone());

        let definition = AutomationDefinition::new(
            project_id,
            "fintech orgs",
            Trigger::EntityCreated {
                entity_type: Some(EntityType::Organization),
            },
        )
        .with_condition(Condition::new(
            "industry",
            ConditionOperator::Equals,
            json!("fintech"),
        ))
        .with_action(Action::CreateActivity {
            activity_type: "note".to_string(),
            body: None,
        });
        repo.create(&definition).await.unwrap();

        let report = evaluator(&pool)
            .dry_run(definition.id, EntityType::Organization, org_id, project_id)
            .await
            .unwrap();

        assert!(report.would_trigger);
        assert!(report.conditions_met);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.entity_data.get("name"), Some(&json!("Globex")));

        // Nothing executed.
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn disabled_definition_would_not_trigger_even_when_conditions_hold() {
        let pool = create_migrated_test_pool().await.unwrap();
        let (project_id, org_id) = seed(&pool).await;
        let repo = SqliteAutomationRepository::new(pool.clone());

        let definition = AutomationDefinition::new(
            project_id,
            "disabled rule",
            Trigger::EntityCreated { entity_type: None },
        )
        .with_action(Action::CreateActivity {
            activity_type: "note".to_string(),
            body: None,
        })
        .disabled();
        repo.create(&definition).await.unwrap();

        let report = evaluator(&pool)
            .dry_run(definition.id, EntityType::Organization, org_id, project_id)
            .await
            .unwrap();
        assert!(report.conditions_met);
        assert!(!report.would_trigger);
    }

    #[tokio::test]
    async fn missing_automation_or_entity_is_a_not_found_error() {
        let pool = create_migrated_test_pool().await.unwrap();
        let (project_id, org_id) = seed(&pool).await;

        let err = evaluator(&pool)
            .dry_run(Uuid::new_v4(), EntityType::Organization, org_id, project_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AutomationNotFound(_)));

        let repo = SqliteAutomationRepository::new(pool.clone());
        let definition = AutomationDefinition::new(
            project_id,
            "rule",
            Trigger::EntityCreated { entity_type: None },
        )
        .with_action(Action::CreateActivity {
            activity_type: "note".to_string(),
            body: None,
        });
        repo.create(&definition).await.unwrap();

        let err = evaluator(&pool)
            .dry_run(
                definition.id,
                EntityType::Organization,
                Uuid::new_v4(),
                project_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }
}
