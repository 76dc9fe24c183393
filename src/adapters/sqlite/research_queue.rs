//! SQLite implementation of the ResearchQueue.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{ResearchJob, ResearchQueue};

#[derive(Clone)]
pub struct SqliteResearchQueue {
    pool: SqlitePool,
}

impl SqliteResearchQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResearchQueue for SqliteResearchQueue {
    async fn enqueue(&self, job: ResearchJob) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO research_jobs
               (id, project_id, entity_type, entity_id, topic, requested_by)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(job.project_id.to_string())
        .bind(job.entity_type.as_str())
        .bind(job.entity_id.to_string())
        .bind(&job.topic)
        .bind(&job.requested_by)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::event::EntityType;

    #[tokio::test]
    async fn enqueue_writes_a_queued_job() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let queue = SqliteResearchQueue::new(pool.clone());
        queue
            .enqueue(ResearchJob {
                project_id,
                entity_type: EntityType::Organization,
                entity_id: Uuid::new_v4(),
                topic: "funding history".to_string(),
                requested_by: "research automation".to_string(),
            })
            .await
            .unwrap();

        let (status,): (String,) = sqlx::query_as("SELECT status FROM research_jobs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "queued");
    }
}
