//! SQLite implementation of the ActivitySink.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{ActivitySink, NewActivity};

#[derive(Clone)]
pub struct SqliteActivitySink {
    pool: SqlitePool,
}

impl SqliteActivitySink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for SqliteActivitySink {
    async fn record(&self, activity: NewActivity) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        let metadata = serde_json::to_string(&activity.metadata)?;

        sqlx::query(
            r#"INSERT INTO activities
               (id, project_id, entity_type, entity_id, activity_type, body, metadata)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(activity.project_id.to_string())
        .bind(activity.entity_type.as_str())
        .bind(activity.entity_id.to_string())
        .bind(&activity.activity_type)
        .bind(&activity.body)
        .bind(&metadata)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::event::EntityType;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn record_stores_attribution_metadata() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let sink = SqliteActivitySink::new(pool.clone());
        let mut metadata = serde_json::Map::new();
        metadata.insert("automation_name".to_string(), json!("stale orgs"));

        sink.record(NewActivity {
            project_id,
            entity_type: EntityType::Organization,
            entity_id: Uuid::new_v4(),
            activity_type: "automation_note".to_string(),
            body: Some("went quiet".to_string()),
            metadata,
        })
        .await
        .unwrap();

        let (metadata,): (String,) = sqlx::query_as("SELECT metadata FROM activities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(metadata.contains("stale orgs"));
    }
}
