//! SQLite implementation of the AutomationRepository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::automation::{Action, AutomationDefinition, Condition, Trigger};
use crate::domain::models::event::TriggerType;
use crate::domain::ports::AutomationRepository;
use crate::services::egress_guard;

#[derive(Clone)]
pub struct SqliteAutomationRepository {
    pool: SqlitePool,
}

impl SqliteAutomationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AutomationRow {
    id: String,
    project_id: String,
    name: String,
    #[allow(dead_code)]
    trigger_type: String,
    trigger_json: String,
    conditions: String,
    actions: String,
    enabled: i32,
    created_at: String,
    updated_at: String,
}

fn row_to_definition(row: AutomationRow) -> DomainResult<AutomationDefinition> {
    let trigger: Trigger = serde_json::from_str(&row.trigger_json)
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;
    let conditions: Vec<Condition> = serde_json::from_str(&row.conditions)
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;
    let actions: Vec<Action> = serde_json::from_str(&row.actions)
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;

    Ok(AutomationDefinition {
        id: parse_uuid(&row.id)?,
        project_id: parse_uuid(&row.project_id)?,
        name: row.name,
        trigger,
        conditions,
        actions,
        enabled: row.enabled != 0,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

/// Save-time validation: structural checks plus the egress policy for every
/// webhook action, so stored definitions cannot smuggle internal targets.
fn validate_definition(definition: &AutomationDefinition) -> DomainResult<()> {
    definition.validate()?;
    for action in &definition.actions {
        if let Action::FireWebhook { url, .. } = action {
            egress_guard::validate_egress_url(url)?;
        }
    }
    Ok(())
}

#[async_trait]
impl AutomationRepository for SqliteAutomationRepository {
    async fn create(&self, definition: &AutomationDefinition) -> DomainResult<()> {
        validate_definition(definition)?;

        let trigger_json = serde_json::to_string(&definition.trigger)?;
        let conditions = serde_json::to_string(&definition.conditions)?;
        let actions = serde_json::to_string(&definition.actions)?;

        sqlx::query(
            r#"INSERT INTO automations
               (id, project_id, name, trigger_type, trigger_json, conditions, actions,
                enabled, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(definition.id.to_string())
        .bind(definition.project_id.to_string())
        .bind(&definition.name)
        .bind(definition.trigger.trigger_type().as_str())
        .bind(&trigger_json)
        .bind(&conditions)
        .bind(&actions)
        .bind(i32::from(definition.enabled))
        .bind(definition.created_at.to_rfc3339())
        .bind(definition.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid, project_id: Uuid) -> DomainResult<Option<AutomationDefinition>> {
        let row: Option<AutomationRow> =
            sqlx::query_as("SELECT * FROM automations WHERE id = ? AND project_id = ?")
                .bind(id.to_string())
                .bind(project_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(row_to_definition).transpose()
    }

    async fn list(&self, project_id: Uuid) -> DomainResult<Vec<AutomationDefinition>> {
        let rows: Vec<AutomationRow> =
            sqlx::query_as("SELECT * FROM automations WHERE project_id = ? ORDER BY name")
                .bind(project_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_definition).collect()
    }

    async fn list_enabled_for_trigger(
        &self,
        project_id: Uuid,
        trigger_type: TriggerType,
    ) -> DomainResult<Vec<AutomationDefinition>> {
        let rows: Vec<AutomationRow> = sqlx::query_as(
            "SELECT * FROM automations
             WHERE project_id = ? AND trigger_type = ? AND enabled = 1
             ORDER BY created_at, id",
        )
        .bind(project_id.to_string())
        .bind(trigger_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_definition).collect()
    }

    async fn list_enabled_time_triggers(&self) -> DomainResult<Vec<AutomationDefinition>> {
        let rows: Vec<AutomationRow> = sqlx::query_as(
            "SELECT * FROM automations
             WHERE trigger_type LIKE 'time.%' AND enabled = 1
             ORDER BY project_id, created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_definition).collect()
    }

    async fn set_enabled(&self, id: Uuid, project_id: Uuid, enabled: bool) -> DomainResult<bool> {
        let result = sqlx::query(
            "UPDATE automations SET enabled = ?, updated_at = datetime('now')
             WHERE id = ? AND project_id = ?",
        )
        .bind(i32::from(enabled))
        .bind(id.to_string())
        .bind(project_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid, project_id: Uuid) -> DomainResult<()> {
        sqlx::query("DELETE FROM automations WHERE id = ? AND project_id = ?")
            .bind(id.to_string())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_time_snapshot(&self, automation_id: Uuid) -> DomainResult<HashSet<Uuid>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT matched_ids FROM automation_time_snapshots WHERE automation_id = ?",
        )
        .bind(automation_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some((raw,)) = row else {
            return Ok(HashSet::new());
        };
        let ids: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        ids.iter().map(|s| parse_uuid(s)).collect()
    }

    async fn save_time_snapshot(
        &self,
        automation_id: Uuid,
        matched: &HashSet<Uuid>,
    ) -> DomainResult<()> {
        let mut ids: Vec<String> = matched.iter().map(Uuid::to_string).collect();
        ids.sort();
        let raw = serde_json::to_string(&ids)?;

        sqlx::query(
            "INSERT INTO automation_time_snapshots (automation_id, matched_ids, updated_at)
             VALUES (?, ?, datetime('now'))
             ON CONFLICT(automation_id)
             DO UPDATE SET matched_ids = excluded.matched_ids, updated_at = datetime('now')",
        )
        .bind(automation_id.to_string())
        .bind(&raw)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::automation::ConditionOperator;
    use crate::domain::models::event::EntityType;
    use serde_json::json;

    async fn seeded_pool() -> (SqlitePool, Uuid) {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        (pool, project_id)
    }

    fn sample_definition(project_id: Uuid) -> AutomationDefinition {
        AutomationDefinition::new(
            project_id,
            "qualify fintech leads",
            Trigger::FieldChanged {
                field_name: "status".to_string(),
                entity_type: Some(EntityType::Opportunity),
                to_value: Some("qualified".to_string()),
            },
        )
        .with_condition(Condition::new(
            "industry",
            ConditionOperator::Equals,
            json!("fintech"),
        ))
        .with_action(Action::AddTag {
            tag_id: Uuid::new_v4(),
        })
        .with_action(Action::FireWebhook {
            url: "https://api.example.com/hook".to_string(),
            payload: None,
        })
    }

    #[tokio::test]
    async fn create_and_read_back_round_trips() {
        let (pool, project_id) = seeded_pool().await;
        let repo = SqliteAutomationRepository::new(pool);

        let definition = sample_definition(project_id);
        repo.create(&definition).await.unwrap();

        let loaded = repo.get(definition.id, project_id).await.unwrap().unwrap();
        assert_eq!(loaded.name, definition.name);
        assert_eq!(loaded.trigger, definition.trigger);
        assert_eq!(loaded.conditions, definition.conditions);
        assert_eq!(loaded.actions, definition.actions);
        assert!(loaded.enabled);

        // Scoped lookup: wrong project sees nothing.
        assert!(repo.get(definition.id, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_webhook_urls_violating_the_egress_policy() {
        let (pool, project_id) = seeded_pool().await;
        let repo = SqliteAutomationRepository::new(pool);

        let definition = AutomationDefinition::new(
            project_id,
            "probe",
            Trigger::EntityCreated { entity_type: None },
        )
        .with_action(Action::FireWebhook {
            url: "http://169.254.169.254/latest/meta-data".to_string(),
            payload: None,
        });
        let err = repo.create(&definition).await.unwrap_err();
        assert!(matches!(err, DomainError::EgressBlocked(_)));
    }

    #[tokio::test]
    async fn trigger_listing_filters_by_type_and_enabled() {
        let (pool, project_id) = seeded_pool().await;
        let repo = SqliteAutomationRepository::new(pool);

        repo.create(&sample_definition(project_id)).await.unwrap();
        repo.create(&sample_definition(project_id).disabled()).await.unwrap();
        repo.create(
            &AutomationDefinition::new(
                project_id,
                "on create",
                Trigger::EntityCreated { entity_type: None },
            )
            .with_action(Action::CreateActivity {
                activity_type: "note".to_string(),
                body: None,
            }),
        )
        .await
        .unwrap();

        let matching = repo
            .list_enabled_for_trigger(project_id, TriggerType::FieldChanged)
            .await
            .unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].name, "qualify fintech leads");
    }

    #[tokio::test]
    async fn time_trigger_listing_spans_projects() {
        let (pool, project_a) = seeded_pool().await;
        let project_b = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Other')")
            .bind(project_b.to_string())
            .execute(&pool)
            .await
            .unwrap();
        let repo = SqliteAutomationRepository::new(pool);

        for project_id in [project_a, project_b] {
            repo.create(
                &AutomationDefinition::new(
                    project_id,
                    "stale orgs",
                    Trigger::EntityInactive {
                        entity_type: EntityType::Organization,
                        days: 30,
                    },
                )
                .with_action(Action::CreateActivity {
                    activity_type: "note".to_string(),
                    body: None,
                }),
            )
            .await
            .unwrap();
        }
        repo.create(&sample_definition(project_a)).await.unwrap();

        let time_triggers = repo.list_enabled_time_triggers().await.unwrap();
        assert_eq!(time_triggers.len(), 2);
    }

    #[tokio::test]
    async fn snapshot_round_trips_and_defaults_empty() {
        let (pool, project_id) = seeded_pool().await;
        let repo = SqliteAutomationRepository::new(pool);
        let definition = sample_definition(project_id);
        repo.create(&definition).await.unwrap();

        assert!(repo.load_time_snapshot(definition.id).await.unwrap().is_empty());

        let matched: HashSet<Uuid> = [Uuid::new_v4(), Uuid::new_v4()].into_iter().collect();
        repo.save_time_snapshot(definition.id, &matched).await.unwrap();
        assert_eq!(repo.load_time_snapshot(definition.id).await.unwrap(), matched);

        // Saving again replaces rather than duplicating.
        let bigger: HashSet<Uuid> = matched.iter().copied().chain([Uuid::new_v4()]).collect();
        repo.save_time_snapshot(definition.id, &bigger).await.unwrap();
        assert_eq!(repo.load_time_snapshot(definition.id).await.unwrap(), bigger);
    }
}
