//! SQLite implementation of the SequenceService.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{EnrollOutcome, SequenceService};

#[derive(Clone)]
pub struct SqliteSequenceService {
    pool: SqlitePool,
}

impl SqliteSequenceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceService for SqliteSequenceService {
    async fn sequence_in_project(
        &self,
        sequence_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM sequences WHERE id = ? AND project_id = ? AND active = 1")
                .bind(sequence_id.to_string())
                .bind(project_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn has_active_channel(&self, project_id: Uuid) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM channel_connections WHERE project_id = ? AND active = 1 LIMIT 1",
        )
        .bind(project_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn enroll(&self, sequence_id: Uuid, person_id: Uuid) -> DomainResult<EnrollOutcome> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM sequence_enrollments
             WHERE sequence_id = ? AND person_id = ? AND status = 'active'",
        )
        .bind(sequence_id.to_string())
        .bind(person_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Ok(EnrollOutcome::AlreadyActive);
        }

        sqlx::query(
            "INSERT INTO sequence_enrollments (id, sequence_id, person_id) VALUES (?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sequence_id.to_string())
        .bind(person_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(EnrollOutcome::Enrolled)
    }
}
