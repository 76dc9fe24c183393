//! SQLite implementation of the EntityStore.
//!
//! Entity rows are decoded column-by-column into JSON maps so the engine
//! sees the same semi-structured snapshots regardless of table shape. Table
//! and column names are interpolated only after identifier checks; all
//! values are bound.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo};
use uuid::Uuid;

use crate::adapters::sqlite::parse_uuid;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::{EntityType, JsonMap};
use crate::domain::ports::{EmailTemplate, EntityRow, EntityStore, NewEmailDraft, NewTask};

#[derive(Clone)]
pub struct SqliteEntityStore {
    pool: SqlitePool,
}

impl SqliteEntityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, sql: &str, binds: Vec<String>) -> DomainResult<Vec<EntityRow>> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_entity).collect()
    }
}

/// Decode one row into a JSON snapshot, parsing the `custom_fields` column
/// into an object when present.
fn row_to_json(row: &SqliteRow) -> JsonMap {
    let mut map = JsonMap::new();
    for column in row.columns() {
        let name = column.name();
        let value = match column.type_info().name() {
            "INTEGER" => row
                .try_get::<Option<i64>, _>(name)
                .ok()
                .flatten()
                .map_or(Value::Null, Value::from),
            "REAL" => row
                .try_get::<Option<f64>, _>(name)
                .ok()
                .flatten()
                .map_or(Value::Null, Value::from),
            _ => row
                .try_get::<Option<String>, _>(name)
                .ok()
                .flatten()
                .map_or(Value::Null, Value::from),
        };
        map.insert(name.to_string(), value);
    }

    let parsed_custom_fields = match map.get("custom_fields") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object),
        _ => None,
    };
    if let Some(parsed) = parsed_custom_fields {
        map.insert("custom_fields".to_string(), parsed);
    }

    map
}

fn row_to_entity(row: &SqliteRow) -> DomainResult<EntityRow> {
    let data = row_to_json(row);
    let id = data
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::SerializationError("row has no id column".to_string()))?;
    Ok(EntityRow {
        id: parse_uuid(id)?,
        data,
    })
}

/// Column names reach SQL via format!; only plain snake_case identifiers
/// are accepted.
fn safe_identifier(field: &str) -> DomainResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DomainError::ValidationFailed(format!(
            "invalid field name '{field}'"
        )))
    }
}

/// Bind a JSON value as the closest SQLite type.
fn bind_json<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(i64::from(*b)),
        Value::Number(n) if n.is_i64() || n.is_u64() => query.bind(n.as_i64().unwrap_or_default()),
        Value::Number(n) => query.bind(n.as_f64().unwrap_or_default()),
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn get_entity(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<JsonMap>> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = ? AND project_id = ?",
            entity_type.table()
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(project_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn update_field(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
        field: &str,
        value: &Value,
    ) -> DomainResult<()> {
        safe_identifier(field)?;
        let sql = format!(
            "UPDATE {} SET {field} = ?, updated_at = datetime('now') WHERE id = ? AND project_id = ?",
            entity_type.table()
        );
        let result = bind_json(sqlx::query(&sql), value)
            .bind(id.to_string())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            });
        }
        Ok(())
    }

    async fn merge_custom_fields(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
        patch: &JsonMap,
    ) -> DomainResult<()> {
        if !entity_type.has_custom_fields() {
            return Err(DomainError::ValidationFailed(format!(
                "{entity_type} records have no custom fields"
            )));
        }

        let table = entity_type.table();
        let select = format!("SELECT custom_fields FROM {table} WHERE id = ? AND project_id = ?");
        let row: Option<(String,)> = sqlx::query_as(&select)
            .bind(id.to_string())
            .bind(project_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some((raw,)) = row else {
            return Err(DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            });
        };

        let mut fields: JsonMap = serde_json::from_str(&raw).unwrap_or_default();
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
        let merged = serde_json::to_string(&fields)?;

        let update = format!(
            "UPDATE {table} SET custom_fields = ?, updated_at = datetime('now')
             WHERE id = ? AND project_id = ?"
        );
        sqlx::query(&update)
            .bind(&merged)
            .bind(id.to_string())
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_task(&self, task: NewTask) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        let (person_id, organization_id, opportunity_id, rfp_id) = match task.link {
            Some((EntityType::Person, link)) => (Some(link), None, None, None),
            Some((EntityType::Organization, link)) => (None, Some(link), None, None),
            Some((EntityType::Opportunity, link)) => (None, None, Some(link), None),
            Some((EntityType::Rfp, link)) => (None, None, None, Some(link)),
            _ => (None, None, None, None),
        };

        sqlx::query(
            r#"INSERT INTO tasks
               (id, project_id, title, description, due_date, priority, assignee_id,
                person_id, organization_id, opportunity_id, rfp_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(task.project_id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(&task.priority)
        .bind(task.assignee_id.map(|u| u.to_string()))
        .bind(person_id.map(|u| u.to_string()))
        .bind(organization_id.map(|u| u.to_string()))
        .bind(opportunity_id.map(|u| u.to_string()))
        .bind(rfp_id.map(|u| u.to_string()))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_email_draft(&self, draft: NewEmailDraft) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO email_drafts
               (id, project_id, template_id, recipient, subject, body, entity_type, entity_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(draft.project_id.to_string())
        .bind(draft.template_id.to_string())
        .bind(&draft.recipient)
        .bind(&draft.subject)
        .bind(&draft.body)
        .bind(draft.entity_type.as_str())
        .bind(draft.entity_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_email_template(
        &self,
        template_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<EmailTemplate>> {
        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, name, subject, body FROM email_templates WHERE id = ? AND project_id = ?",
        )
        .bind(template_id.to_string())
        .bind(project_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, name, subject, body)| {
            Ok(EmailTemplate {
                id: parse_uuid(&id)?,
                name,
                subject,
                body,
            })
        })
        .transpose()
    }

    async fn resolve_email_recipient(
        &self,
        entity_type: EntityType,
        id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Option<String>> {
        let sql = match entity_type {
            EntityType::Person => {
                "SELECT email FROM people WHERE id = ? AND project_id = ? AND email IS NOT NULL"
            }
            EntityType::Organization => {
                "SELECT p.email FROM people p
                 WHERE p.organization_id = ? AND p.project_id = ? AND p.email IS NOT NULL
                 ORDER BY p.is_primary DESC, p.created_at ASC LIMIT 1"
            }
            EntityType::Opportunity => {
                "SELECT p.email FROM people p
                 JOIN opportunities o ON p.organization_id = o.organization_id
                 WHERE o.id = ? AND p.project_id = ? AND p.email IS NOT NULL
                 ORDER BY p.is_primary DESC, p.created_at ASC LIMIT 1"
            }
            EntityType::Rfp => {
                "SELECT p.email FROM people p
                 JOIN rfps r ON p.organization_id = r.organization_id
                 WHERE r.id = ? AND p.project_id = ? AND p.email IS NOT NULL
                 ORDER BY p.is_primary DESC, p.created_at ASC LIMIT 1"
            }
            EntityType::Task => {
                "SELECT p.email FROM people p
                 JOIN tasks t ON t.person_id = p.id
                 WHERE t.id = ? AND p.project_id = ? AND p.email IS NOT NULL"
            }
            EntityType::Meeting => {
                "SELECT p.email FROM people p
                 JOIN meetings m ON m.person_id = p.id
                 WHERE m.id = ? AND p.project_id = ? AND p.email IS NOT NULL"
            }
            EntityType::Call => {
                "SELECT p.email FROM people p
                 JOIN calls c ON c.person_id = p.id
                 WHERE c.id = ? AND p.project_id = ? AND p.email IS NOT NULL"
            }
        };

        let row: Option<(String,)> = sqlx::query_as(sql)
            .bind(id.to_string())
            .bind(project_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(email,)| email))
    }

    async fn is_project_member(&self, user_id: Uuid, project_id: Uuid) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM project_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn find_inactive(
        &self,
        project_id: Uuid,
        entity_type: EntityType,
        days: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>> {
        let sql = format!(
            "SELECT * FROM {} WHERE project_id = ? AND updated_at < datetime('now', ?)
             ORDER BY updated_at ASC LIMIT {limit}",
            entity_type.table()
        );
        self.fetch_rows(&sql, vec![project_id.to_string(), format!("-{days} days")])
            .await
    }

    async fn find_overdue_tasks(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>> {
        let sql = format!(
            "SELECT * FROM tasks
             WHERE project_id = ? AND due_date IS NOT NULL AND due_date < datetime('now')
               AND status NOT IN ('completed', 'cancelled')
             ORDER BY due_date ASC LIMIT {limit}"
        );
        self.fetch_rows(&sql, vec![project_id.to_string()]).await
    }

    async fn find_closing_opportunities(
        &self,
        project_id: Uuid,
        days_before: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>> {
        let sql = format!(
            "SELECT * FROM opportunities
             WHERE project_id = ? AND status = 'open' AND close_date IS NOT NULL
               AND close_date >= datetime('now') AND close_date <= datetime('now', ?)
             ORDER BY close_date ASC LIMIT {limit}"
        );
        self.fetch_rows(
            &sql,
            vec![project_id.to_string(), format!("+{days_before} days")],
        )
        .await
    }

    async fn find_created_on_day(
        &self,
        project_id: Uuid,
        entity_type: EntityType,
        days_ago: i64,
        limit: usize,
    ) -> DomainResult<Vec<EntityRow>> {
        // Rolling 24-hour window: created between days_ago+1 and days_ago
        // days before now.
        let sql = format!(
            "SELECT * FROM {} WHERE project_id = ?
               AND created_at >= datetime('now', ?) AND created_at < datetime('now', ?)
             ORDER BY created_at ASC LIMIT {limit}",
            entity_type.table()
        );
        self.fetch_rows(
            &sql,
            vec![
                project_id.to_string(),
                format!("-{} days", days_ago + 1),
                format!("-{days_ago} days"),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
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

    async fn seed_org(pool: &SqlitePool, project_id: Uuid, age_days: i64) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO organizations (id, project_id, name, custom_fields, created_at, updated_at)
             VALUES (?, ?, 'Globex', '{\"score\": 42}',
                     datetime('now', ?), datetime('now', ?))",
        )
        .bind(id.to_string())
        .bind(project_id.to_string())
        .bind(format!("-{age_days} days"))
        .bind(format!("-{age_days} days"))
        .execute(pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn get_entity_returns_a_parsed_snapshot() {
        let (pool, project_id) = seeded_pool().await;
        let org_id = seed_org(&pool, project_id, 0).await;
        let store = SqliteEntityStore::new(pool);

        let entity = store
            .get_entity(EntityType::Organization, org_id, project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entity.get("name"), Some(&json!("Globex")));
        // custom_fields arrives as an object, not a raw string.
        assert_eq!(
            entity.get("custom_fields").and_then(|v| v.get("score")),
            Some(&json!(42))
        );

        // Wrong project scope sees nothing.
        assert!(store
            .get_entity(EntityType::Organization, org_id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_field_rejects_unsafe_identifiers() {
        let (pool, project_id) = seeded_pool().await;
        let org_id = seed_org(&pool, project_id, 0).await;
        let store = SqliteEntityStore::new(pool);

        let err = store
            .update_field(
                EntityType::Organization,
                org_id,
                project_id,
                "name; DROP TABLE organizations",
                &json!("x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn update_field_misses_are_not_found() {
        let (pool, project_id) = seeded_pool().await;
        let store = SqliteEntityStore::new(pool);

        let err = store
            .update_field(
                EntityType::Organization,
                Uuid::new_v4(),
                project_id,
                "name",
                &json!("x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn merge_custom_fields_preserves_existing_keys() {
        let (pool, project_id) = seeded_pool().await;
        let org_id = seed_org(&pool, project_id, 0).await;
        let store = SqliteEntityStore::new(pool.clone());

        let mut patch = JsonMap::new();
        patch.insert("region".to_string(), json!("emea"));
        store
            .merge_custom_fields(EntityType::Organization, org_id, project_id, &patch)
            .await
            .unwrap();

        let entity = store
            .get_entity(EntityType::Organization, org_id, project_id)
            .await
            .unwrap()
            .unwrap();
        let fields = entity.get("custom_fields").unwrap();
        assert_eq!(fields.get("score"), Some(&json!(42)));
        assert_eq!(fields.get("region"), Some(&json!("emea")));
    }

    #[tokio::test]
    async fn custom_fields_are_rejected_on_tables_without_them() {
        let (pool, project_id) = seeded_pool().await;
        let store = SqliteEntityStore::new(pool);

        let err = store
            .merge_custom_fields(EntityType::Call, Uuid::new_v4(), project_id, &JsonMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn find_inactive_honors_the_day_threshold() {
        let (pool, project_id) = seeded_pool().await;
        let stale = seed_org(&pool, project_id, 40).await;
        let _fresh = seed_org(&pool, project_id, 2).await;
        let store = SqliteEntityStore::new(pool);

        let rows = store
            .find_inactive(project_id, EntityType::Organization, 30, 100)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, stale);
    }

    #[tokio::test]
    async fn find_overdue_tasks_skips_finished_work() {
        let (pool, project_id) = seeded_pool().await;
        let overdue = Uuid::new_v4();
        let done = Uuid::new_v4();
        for (id, status) in [(overdue, "open"), (done, "completed")] {
            sqlx::query(
                "INSERT INTO tasks (id, project_id, title, status, due_date)
                 VALUES (?, ?, 'follow up', ?, datetime('now', '-2 days'))",
            )
            .bind(id.to_string())
            .bind(project_id.to_string())
            .bind(status)
            .execute(&pool)
            .await
            .unwrap();
        }
        let store = SqliteEntityStore::new(pool);

        let rows = store.find_overdue_tasks(project_id, 100).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, overdue);
    }

    #[tokio::test]
    async fn find_closing_opportunities_is_bounded_both_ways() {
        let (pool, project_id) = seeded_pool().await;
        let soon = Uuid::new_v4();
        let far = Uuid::new_v4();
        let past = Uuid::new_v4();
        for (id, offset) in [(soon, "+3 days"), (far, "+30 days"), (past, "-1 days")] {
            sqlx::query(
                "INSERT INTO opportunities (id, project_id, name, close_date)
                 VALUES (?, ?, 'Deal', datetime('now', ?))",
            )
            .bind(id.to_string())
            .bind(project_id.to_string())
            .bind(offset)
            .execute(&pool)
            .await
            .unwrap();
        }
        let store = SqliteEntityStore::new(pool);

        let rows = store
            .find_closing_opportunities(project_id, 7, 100)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, soon);
    }

    #[tokio::test]
    async fn find_created_on_day_is_a_window_not_older_than() {
        let (pool, project_id) = seeded_pool().await;
        // Ages in hours so each lands squarely inside (or outside) the
        // 7-day window instead of on its boundary.
        let mut ids = Vec::new();
        for hours in [178, 220, 24] {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO organizations (id, project_id, name, created_at, updated_at)
                 VALUES (?, ?, 'Globex', datetime('now', ?), datetime('now', ?))",
            )
            .bind(id.to_string())
            .bind(project_id.to_string())
            .bind(format!("-{hours} hours"))
            .bind(format!("-{hours} hours"))
            .execute(&pool)
            .await
            .unwrap();
            ids.push(id);
        }
        let on_day = ids[0];
        let store = SqliteEntityStore::new(pool);

        let rows = store
            .find_created_on_day(project_id, EntityType::Organization, 7, 100)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, on_day);
    }

    #[tokio::test]
    async fn email_recipient_prefers_the_primary_contact() {
        let (pool, project_id) = seeded_pool().await;
        let org_id = seed_org(&pool, project_id, 0).await;
        for (email, is_primary, offset) in [
            ("first@globex.com", 0, "-2 days"),
            ("primary@globex.com", 1, "-1 days"),
        ] {
            sqlx::query(
                "INSERT INTO people (id, project_id, organization_id, email, is_primary, created_at)
                 VALUES (?, ?, ?, ?, ?, datetime('now', ?))",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(project_id.to_string())
            .bind(org_id.to_string())
            .bind(email)
            .bind(is_primary)
            .bind(offset)
            .execute(&pool)
            .await
            .unwrap();
        }
        let store = SqliteEntityStore::new(pool);

        let recipient = store
            .resolve_email_recipient(EntityType::Organization, org_id, project_id)
            .await
            .unwrap();
        assert_eq!(recipient.as_deref(), Some("primary@globex.com"));
    }
}
