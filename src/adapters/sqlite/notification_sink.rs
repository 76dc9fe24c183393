//! SQLite implementation of the NotificationSink.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::NotificationSink;

#[derive(Clone)]
pub struct SqliteNotificationSink {
    pool: SqlitePool,
}

impl SqliteNotificationSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for SqliteNotificationSink {
    async fn notify(
        &self,
        project_id: Uuid,
        user_ids: &[Uuid],
        title: &str,
        body: Option<&str>,
    ) -> DomainResult<usize> {
        let mut sent = 0;
        for user_id in user_ids {
            sqlx::query(
                "INSERT INTO notifications (id, project_id, user_id, title, body)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(project_id.to_string())
            .bind(user_id.to_string())
            .bind(title)
            .bind(body)
            .execute(&self.pool)
            .await?;
            sent += 1;
        }
        Ok(sent)
    }
}
