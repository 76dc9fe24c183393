//! SQLite implementation of the TagStore.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::event::EntityType;
use crate::domain::ports::TagStore;

#[derive(Clone)]
pub struct SqliteTagStore {
    pool: SqlitePool,
}

impl SqliteTagStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagStore for SqliteTagStore {
    async fn tag_in_project(&self, tag_id: Uuid, project_id: Uuid) -> DomainResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM tags WHERE id = ? AND project_id = ?")
                .bind(tag_id.to_string())
                .bind(project_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn upsert(
        &self,
        tag_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO entity_tags (tag_id, entity_type, entity_id) VALUES (?, ?, ?)
             ON CONFLICT(tag_id, entity_type, entity_id) DO NOTHING",
        )
        .bind(tag_id.to_string())
        .bind(entity_type.as_str())
        .bind(entity_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(
        &self,
        tag_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> DomainResult<()> {
        sqlx::query(
            "DELETE FROM entity_tags WHERE tag_id = ? AND entity_type = ? AND entity_id = ?",
        )
        .bind(tag_id.to_string())
        .bind(entity_type.as_str())
        .bind(entity_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
