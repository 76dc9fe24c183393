//! SQLite implementation of the ExecutionRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::{EntityType, TriggerType};
use crate::domain::models::execution::{ActionResult, ExecutionRecord, ExecutionStatus};
use crate::domain::ports::ExecutionRepository;

#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    automation_id: String,
    project_id: String,
    trigger_type: String,
    entity_type: String,
    entity_id: String,
    conditions_met: i32,
    action_results: String,
    status: String,
    error: Option<String>,
    duration_ms: i64,
    created_at: String,
}

fn row_to_record(row: ExecutionRow) -> DomainResult<ExecutionRecord> {
    let trigger_type = TriggerType::from_str(&row.trigger_type).ok_or_else(|| {
        DomainError::SerializationError(format!("unknown trigger type: {}", row.trigger_type))
    })?;
    let entity_type = EntityType::from_str(&row.entity_type).ok_or_else(|| {
        DomainError::SerializationError(format!("unknown entity type: {}", row.entity_type))
    })?;
    let status = ExecutionStatus::from_str(&row.status).ok_or_else(|| {
        DomainError::SerializationError(format!("unknown execution status: {}", row.status))
    })?;
    let action_results: Vec<ActionResult> = serde_json::from_str(&row.action_results)
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;

    Ok(ExecutionRecord {
        id: parse_uuid(&row.id)?,
        automation_id: parse_uuid(&row.automation_id)?,
        project_id: parse_uuid(&row.project_id)?,
        trigger_type,
        entity_type,
        entity_id: parse_uuid(&row.entity_id)?,
        conditions_met: row.conditions_met != 0,
        action_results,
        status,
        error: row.error,
        duration_ms: row.duration_ms,
        created_at: parse_datetime(&row.created_at)?,
    })
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn insert(&self, record: &ExecutionRecord) -> DomainResult<()> {
        let action_results = serde_json::to_string(&record.action_results)?;

        sqlx::query(
            r#"INSERT INTO automation_executions
               (id, automation_id, project_id, trigger_type, entity_type, entity_id,
                conditions_met, action_results, status, error, duration_ms, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.automation_id.to_string())
        .bind(record.project_id.to_string())
        .bind(record.trigger_type.as_str())
        .bind(record.entity_type.as_str())
        .bind(record.entity_id.to_string())
        .bind(i32::from(record.conditions_met))
        .bind(&action_results)
        .bind(record.status.as_str())
        .bind(&record.error)
        .bind(record.duration_ms)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(
        &self,
        automation_id: Uuid,
        limit: usize,
    ) -> DomainResult<Vec<ExecutionRecord>> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            "SELECT * FROM automation_executions
             WHERE automation_id = ?
             ORDER BY created_at DESC
             LIMIT ?",
        )
        .bind(automation_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::automation::{Action, AutomationDefinition, Trigger};
    use crate::domain::models::event::AutomationEvent;
    use crate::domain::ports::AutomationRepository as _;
    use serde_json::Map;
    use std::time::Duration;

    #[tokio::test]
    async fn insert_and_list_round_trips() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let automations =
            crate::adapters::sqlite::SqliteAutomationRepository::new(pool.clone());
        let definition = AutomationDefinition::new(
            project_id,
            "rule",
            Trigger::EntityCreated { entity_type: None },
        )
        .with_action(Action::CreateActivity {
            activity_type: "note".to_string(),
            body: None,
        });
        automations.create(&definition).await.unwrap();

        let event = AutomationEvent::new(
            project_id,
            TriggerType::EntityCreated,
            EntityType::Organization,
            Uuid::new_v4(),
            Map::new(),
        );
        let record = ExecutionRecord::completed(
            &definition,
            &event,
            vec![
                ActionResult::ok("create_activity", Map::new()),
                ActionResult::fail("fire_webhook", "HTTP 500"),
            ],
            Duration::from_millis(12),
        );

        let repo = SqliteExecutionRepository::new(pool);
        repo.insert(&record).await.unwrap();

        let listed = repo.list_recent(definition.id, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        let loaded = &listed[0];
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.status, ExecutionStatus::PartialFailure);
        assert!(loaded.conditions_met);
        assert_eq!(loaded.action_results.len(), 2);
        assert_eq!(loaded.error.as_deref(), Some("fire_webhook: HTTP 500"));
    }
}
