//! Action execution: one handler per action type.
//!
//! Every handler returns a result rather than throwing; errors are caught
//! here and converted into failed `ActionResult`s so one bad action never
//! aborts the rest of the list or the dispatcher.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::automation::Action;
use crate::domain::models::event::{EntityType, JsonMap};
use crate::domain::models::execution::ActionResult;
use crate::domain::ports::{
    ActivitySink, EnrollOutcome, EntityStore, NewActivity, NewEmailDraft, NewTask,
    NotificationSink, ResearchJob, ResearchQueue, SequenceService, TagStore, WebhookTransport,
};
use crate::services::egress_guard;
use crate::services::field_policy;

/// Per-invocation context carried into every handler for scoping and
/// attribution.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub project_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// The event's entity snapshot.
    pub data: &'a JsonMap,
    pub automation_id: Uuid,
    pub automation_name: &'a str,
}

/// Registry of action handlers over the engine's outbound ports.
pub struct ActionExecutor {
    entities: Arc<dyn EntityStore>,
    notifications: Arc<dyn NotificationSink>,
    tags: Arc<dyn TagStore>,
    activities: Arc<dyn ActivitySink>,
    research: Arc<dyn ResearchQueue>,
    sequences: Arc<dyn SequenceService>,
    webhooks: Arc<dyn WebhookTransport>,
}

impl ActionExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entities: Arc<dyn EntityStore>,
        notifications: Arc<dyn NotificationSink>,
        tags: Arc<dyn TagStore>,
        activities: Arc<dyn ActivitySink>,
        research: Arc<dyn ResearchQueue>,
        sequences: Arc<dyn SequenceService>,
        webhooks: Arc<dyn WebhookTransport>,
    ) -> Self {
        Self {
            entities,
            notifications,
            tags,
            activities,
            research,
            sequences,
            webhooks,
        }
    }

    /// Run one action and fold any error into a failed result.
    pub async fn execute(&self, action: &Action, ctx: &ActionContext<'_>) -> ActionResult {
        match self.dispatch(action, ctx).await {
            Ok(result) => ActionResult::ok(action.kind(), result),
            Err(e) => {
                tracing::warn!(
                    action = action.kind(),
                    automation = %ctx.automation_name,
                    entity = %ctx.entity_id,
                    error = %e,
                    "action failed"
                );
                ActionResult::fail(action.kind(), e.to_string())
            }
        }
    }

    async fn dispatch(&self, action: &Action, ctx: &ActionContext<'_>) -> DomainResult<JsonMap> {
        match action {
            Action::CreateTask {
                title,
                description,
                assignee_id,
                due_in_days,
                priority,
            } => {
                self.create_task(ctx, title, description.as_deref(), *assignee_id, *due_in_days, priority.as_deref())
                    .await
            }
            Action::UpdateField { field_name, value } => {
                self.update_field(ctx, field_name, value).await
            }
            Action::ChangeStage { stage } => self.change_stage(ctx, stage).await,
            Action::ChangeStatus { status } => self.change_status(ctx, status).await,
            Action::AssignOwner { user_id } => self.assign_owner(ctx, *user_id).await,
            Action::SendNotification {
                user_ids,
                title,
                body,
            } => self.send_notification(ctx, user_ids, title, body.as_deref()).await,
            Action::SendEmail { template_id } => self.send_email(ctx, *template_id).await,
            Action::EnrollInSequence { sequence_id } => {
                self.enroll_in_sequence(ctx, *sequence_id).await
            }
            Action::AddTag { tag_id } => self.add_tag(ctx, *tag_id).await,
            Action::RemoveTag { tag_id } => self.remove_tag(ctx, *tag_id).await,
            Action::CreateActivity {
                activity_type,
                body,
            } => self.create_activity(ctx, activity_type, body.as_deref()).await,
            Action::RunAiResearch { topic } => self.run_ai_research(ctx, topic).await,
            Action::FireWebhook { url, payload } => {
                self.fire_webhook(ctx, url, payload.as_ref()).await
            }
        }
    }

    async fn create_task(
        &self,
        ctx: &ActionContext<'_>,
        title: &str,
        description: Option<&str>,
        assignee_id: Option<Uuid>,
        due_in_days: Option<i64>,
        priority: Option<&str>,
    ) -> DomainResult<JsonMap> {
        let due_date = due_in_days
            .and_then(chrono::Duration::try_days)
            .map(|offset| Utc::now() + offset);
        let link = ctx
            .entity_type
            .has_task_link()
            .then_some((ctx.entity_type, ctx.entity_id));

        let task_id = self
            .entities
            .insert_task(NewTask {
                project_id: ctx.project_id,
                title: title.to_string(),
                description: description.map(str::to_string),
                due_date,
                priority: priority.unwrap_or("normal").to_string(),
                assignee_id,
                link,
            })
            .await?;

        Ok(result_map(json!({"task_id": task_id})))
    }

    async fn update_field(
        &self,
        ctx: &ActionContext<'_>,
        field_name: &str,
        value: &Value,
    ) -> DomainResult<JsonMap> {
        if let Some(key) = field_name.strip_prefix(field_policy::CUSTOM_FIELDS_PREFIX) {
            if key.is_empty() {
                return Err(DomainError::ValidationFailed(
                    "custom field key must not be empty".to_string(),
                ));
            }
            let mut patch = JsonMap::new();
            patch.insert(key.to_string(), value.clone());
            self.entities
                .merge_custom_fields(ctx.entity_type, ctx.entity_id, ctx.project_id, &patch)
                .await?;
            return Ok(result_map(json!({"field": field_name, "merged": true})));
        }

        if !field_policy::is_writable(ctx.entity_type, field_name) {
            return Err(DomainError::FieldNotWritable {
                table: ctx.entity_type.table().to_string(),
                field: field_name.to_string(),
            });
        }

        self.entities
            .update_field(ctx.entity_type, ctx.entity_id, ctx.project_id, field_name, value)
            .await?;
        Ok(result_map(json!({"field": field_name})))
    }

    async fn change_stage(&self, ctx: &ActionContext<'_>, stage: &str) -> DomainResult<JsonMap> {
        if ctx.entity_type != EntityType::Opportunity {
            return Err(DomainError::ExecutionFailed(format!(
                "change_stage applies only to opportunities, got {}",
                ctx.entity_type
            )));
        }
        self.entities
            .update_field(
                ctx.entity_type,
                ctx.entity_id,
                ctx.project_id,
                "stage",
                &Value::String(stage.to_string()),
            )
            .await?;
        Ok(result_map(json!({"stage": stage})))
    }

    async fn change_status(&self, ctx: &ActionContext<'_>, status: &str) -> DomainResult<JsonMap> {
        if ctx.entity_type != EntityType::Rfp {
            return Err(DomainError::ExecutionFailed(format!(
                "change_status applies only to RFPs, got {}",
                ctx.entity_type
            )));
        }
        self.entities
            .update_field(
                ctx.entity_type,
                ctx.entity_id,
                ctx.project_id,
                "status",
                &Value::String(status.to_string()),
            )
            .await?;
        Ok(result_map(json!({"status": status})))
    }

    async fn assign_owner(&self, ctx: &ActionContext<'_>, user_id: Uuid) -> DomainResult<JsonMap> {
        if !self
            .entities
            .is_project_member(user_id, ctx.project_id)
            .await?
        {
            return Err(DomainError::NotAuthorized(format!(
                "user {user_id} is not a member of this project"
            )));
        }
        self.entities
            .update_field(
                ctx.entity_type,
                ctx.entity_id,
                ctx.project_id,
                field_policy::owner_field(ctx.entity_type),
                &Value::String(user_id.to_string()),
            )
            .await?;
        Ok(result_map(json!({"owner_id": user_id})))
    }

    async fn send_notification(
        &self,
        ctx: &ActionContext<'_>,
        user_ids: &[Uuid],
        title: &str,
        body: Option<&str>,
    ) -> DomainResult<JsonMap> {
        if user_ids.is_empty() {
            return Err(DomainError::ValidationFailed(
                "send_notification has no recipient configured".to_string(),
            ));
        }
        let sent = self
            .notifications
            .notify(ctx.project_id, user_ids, title, body)
            .await?;
        Ok(result_map(json!({"recipients": sent})))
    }

    /// Does not send directly: resolves the template and recipient and
    /// queues a draft for manual dispatch, keeping live channel credentials
    /// out of the engine's execution path.
    async fn send_email(&self, ctx: &ActionContext<'_>, template_id: Uuid) -> DomainResult<JsonMap> {
        let template = self
            .entities
            .get_email_template(template_id, ctx.project_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotAuthorized(format!(
                    "email template {template_id} does not belong to this project"
                ))
            })?;

        let recipient = self
            .entities
            .resolve_email_recipient(ctx.entity_type, ctx.entity_id, ctx.project_id)
            .await?
            .ok_or_else(|| {
                DomainError::ValidationFailed(format!(
                    "no email recipient for {} {}",
                    ctx.entity_type, ctx.entity_id
                ))
            })?;

        let draft_id = self
            .entities
            .insert_email_draft(NewEmailDraft {
                project_id: ctx.project_id,
                template_id,
                recipient: recipient.clone(),
                subject: template.subject,
                body: template.body,
                entity_type: ctx.entity_type,
                entity_id: ctx.entity_id,
            })
            .await?;

        Ok(result_map(json!({"draft_id": draft_id, "recipient": recipient})))
    }

    async fn enroll_in_sequence(
        &self,
        ctx: &ActionContext<'_>,
        sequence_id: Uuid,
    ) -> DomainResult<JsonMap> {
        if ctx.entity_type != EntityType::Person {
            return Err(DomainError::ExecutionFailed(format!(
                "enroll_in_sequence applies only to people, got {}",
                ctx.entity_type
            )));
        }
        if !self
            .sequences
            .sequence_in_project(sequence_id, ctx.project_id)
            .await?
        {
            return Err(DomainError::NotAuthorized(format!(
                "sequence {sequence_id} does not belong to this project"
            )));
        }
        if !self.sequences.has_active_channel(ctx.project_id).await? {
            return Err(DomainError::ValidationFailed(
                "project has no active outbound channel connection".to_string(),
            ));
        }

        match self.sequences.enroll(sequence_id, ctx.entity_id).await? {
            EnrollOutcome::Enrolled => Ok(result_map(json!({"enrolled": true}))),
            EnrollOutcome::AlreadyActive => {
                Ok(result_map(json!({"enrolled": true, "already_enrolled": true})))
            }
        }
    }

    async fn add_tag(&self, ctx: &ActionContext<'_>, tag_id: Uuid) -> DomainResult<JsonMap> {
        if !self.tags.tag_in_project(tag_id, ctx.project_id).await? {
            return Err(DomainError::NotAuthorized(format!(
                "tag {tag_id} does not belong to this project"
            )));
        }
        self.tags
            .upsert(tag_id, ctx.entity_type, ctx.entity_id)
            .await?;
        Ok(result_map(json!({"tag_id": tag_id})))
    }

    async fn remove_tag(&self, ctx: &ActionContext<'_>, tag_id: Uuid) -> DomainResult<JsonMap> {
        if !self.tags.tag_in_project(tag_id, ctx.project_id).await? {
            return Err(DomainError::NotAuthorized(format!(
                "tag {tag_id} does not belong to this project"
            )));
        }
        self.tags
            .remove(tag_id, ctx.entity_type, ctx.entity_id)
            .await?;
        Ok(result_map(json!({"tag_id": tag_id})))
    }

    async fn create_activity(
        &self,
        ctx: &ActionContext<'_>,
        activity_type: &str,
        body: Option<&str>,
    ) -> DomainResult<JsonMap> {
        let metadata = result_map(json!({
            "automation_id": ctx.automation_id,
            "automation_name": ctx.automation_name,
        }));
        let activity_id = self
            .activities
            .record(NewActivity {
                project_id: ctx.project_id,
                entity_type: ctx.entity_type,
                entity_id: ctx.entity_id,
                activity_type: activity_type.to_string(),
                body: body.map(str::to_string),
                metadata,
            })
            .await?;
        Ok(result_map(json!({"activity_id": activity_id})))
    }

    async fn run_ai_research(&self, ctx: &ActionContext<'_>, topic: &str) -> DomainResult<JsonMap> {
        let job_id = self
            .research
            .enqueue(ResearchJob {
                project_id: ctx.project_id,
                entity_type: ctx.entity_type,
                entity_id: ctx.entity_id,
                topic: topic.to_string(),
                requested_by: ctx.automation_name.to_string(),
            })
            .await?;
        Ok(result_map(json!({"job_id": job_id})))
    }

    async fn fire_webhook(
        &self,
        ctx: &ActionContext<'_>,
        url: &str,
        payload: Option<&JsonMap>,
    ) -> DomainResult<JsonMap> {
        let url = egress_guard::validate_egress_url(url)?;

        // User template first, engine metadata layered on top so it cannot
        // be spoofed.
        let mut body = payload.cloned().unwrap_or_default();
        body.insert(
            "automation".to_string(),
            json!({"id": ctx.automation_id, "name": ctx.automation_name}),
        );
        body.insert(
            "event".to_string(),
            json!({
                "project_id": ctx.project_id,
                "entity_type": ctx.entity_type,
                "entity_id": ctx.entity_id,
            }),
        );
        body.insert("sent_at".to_string(), json!(Utc::now().to_rfc3339()));

        let response = self
            .webhooks
            .post(url.as_str(), &Value::Object(body))
            .await?;
        if !response.is_success() {
            return Err(DomainError::ExecutionFailed(format!(
                "webhook returned HTTP {}",
                response.status
            )));
        }
        Ok(result_map(json!({"status": response.status})))
    }
}

fn result_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = JsonMap::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteActivitySink, SqliteEntityStore, SqliteNotificationSink,
        SqliteResearchQueue, SqliteSequenceService, SqliteTagStore,
    };
    use crate::domain::ports::WebhookResponse;
    use async_trait::async_trait;
    use sqlx::SqlitePool;

    /// Webhook stub that records nothing and answers with a fixed status.
    struct StaticWebhook {
        status: u16,
    }

    #[async_trait]
    impl WebhookTransport for StaticWebhook {
        async fn post(&self, _url: &str, _payload: &Value) -> DomainResult<WebhookResponse> {
            Ok(WebhookResponse { status: self.status })
        }
    }

    async fn seed_project(pool: &SqlitePool) -> Uuid {
        let project_id = Uuid::new_v4();
        sqlx::query("INSERT INTO projects (id, name) VALUES (?, 'Acme CRM')")
            .bind(project_id.to_string())
            .execute(pool)
            .await
            .unwrap();
        project_id
    }

    async fn seed_opportunity(pool: &SqlitePool, project_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO opportunities (id, project_id, name, stage) VALUES (?, ?, 'Big Deal', 'new')",
        )
        .bind(id.to_string())
        .bind(project_id.to_string())
        .execute(pool)
        .await
        .unwrap();
        id
    }

    fn executor(pool: &SqlitePool, webhook_status: u16) -> ActionExecutor {
        ActionExecutor::new(
            Arc::new(SqliteEntityStore::new(pool.clone())),
            Arc::new(SqliteNotificationSink::new(pool.clone())),
            Arc::new(SqliteTagStore::new(pool.clone())),
            Arc::new(SqliteActivitySink::new(pool.clone())),
            Arc::new(SqliteResearchQueue::new(pool.clone())),
            Arc::new(SqliteSequenceService::new(pool.clone())),
            Arc::new(StaticWebhook {
                status: webhook_status,
            }),
        )
    }

    fn ctx<'a>(
        project_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
        data: &'a JsonMap,
    ) -> ActionContext<'a> {
        ActionContext {
            project_id,
            entity_type,
            entity_id,
            data,
            automation_id: Uuid::new_v4(),
            automation_name: "test automation",
        }
    }

    #[tokio::test]
    async fn update_field_enforces_the_allowlist() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let opp_id = seed_opportunity(&pool, project_id).await;
        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Opportunity, opp_id, &data);

        // "status" is protected on opportunities.
        let denied = executor
            .execute(
                &Action::UpdateField {
                    field_name: "status".to_string(),
                    value: json!("won"),
                },
                &ctx,
            )
            .await;
        assert!(!denied.success);
        assert!(denied.error.unwrap().contains("not writable"));

        // "stage" is allowed and actually written.
        let allowed = executor
            .execute(
                &Action::UpdateField {
                    field_name: "stage".to_string(),
                    value: json!("qualified"),
                },
                &ctx,
            )
            .await;
        assert!(allowed.success, "{:?}", allowed.error);

        let (stage,): (String,) =
            sqlx::query_as("SELECT stage FROM opportunities WHERE id = ?")
                .bind(opp_id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stage, "qualified");
    }

    #[tokio::test]
    async fn custom_fields_bypass_the_allowlist_and_merge() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let opp_id = seed_opportunity(&pool, project_id).await;
        sqlx::query("UPDATE opportunities SET custom_fields = '{\"score\": 10}' WHERE id = ?")
            .bind(opp_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Opportunity, opp_id, &data);

        let result = executor
            .execute(
                &Action::UpdateField {
                    field_name: "custom_fields.region".to_string(),
                    value: json!("emea"),
                },
                &ctx,
            )
            .await;
        assert!(result.success, "{:?}", result.error);

        let (raw,): (String,) =
            sqlx::query_as("SELECT custom_fields FROM opportunities WHERE id = ?")
                .bind(opp_id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        let fields: JsonMap = serde_json::from_str(&raw).unwrap();
        assert_eq!(fields.get("region"), Some(&json!("emea")));
        // Pre-existing keys survive the merge.
        assert_eq!(fields.get("score"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn change_stage_is_type_guarded() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Person, Uuid::new_v4(), &data);

        let result = executor
            .execute(
                &Action::ChangeStage {
                    stage: "qualified".to_string(),
                },
                &ctx,
            )
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("only to opportunities"));
    }

    #[tokio::test]
    async fn assign_owner_requires_project_membership() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let opp_id = seed_opportunity(&pool, project_id).await;
        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Opportunity, opp_id, &data);

        let outsider = Uuid::new_v4();
        let result = executor
            .execute(&Action::AssignOwner { user_id: outsider }, &ctx)
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not a member"));

        let member = Uuid::new_v4();
        sqlx::query("INSERT INTO project_members (project_id, user_id) VALUES (?, ?)")
            .bind(project_id.to_string())
            .bind(member.to_string())
            .execute(&pool)
            .await
            .unwrap();
        let result = executor
            .execute(&Action::AssignOwner { user_id: member }, &ctx)
            .await;
        assert!(result.success, "{:?}", result.error);
    }

    #[tokio::test]
    async fn webhook_to_private_address_fails_before_any_call() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        // Transport would report success; the guard must fail first.
        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Organization, Uuid::new_v4(), &data);

        let result = executor
            .execute(
                &Action::FireWebhook {
                    url: "http://10.0.0.5/x".to_string(),
                    payload: None,
                },
                &ctx,
            )
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("egress blocked"));
    }

    #[tokio::test]
    async fn webhook_non_2xx_is_a_failed_result_with_the_status() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let executor = executor(&pool, 503);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Organization, Uuid::new_v4(), &data);

        let result = executor
            .execute(
                &Action::FireWebhook {
                    url: "https://api.example.com/hook".to_string(),
                    payload: None,
                },
                &ctx,
            )
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn enroll_in_sequence_is_idempotent_for_active_enrollments() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let person_id = Uuid::new_v4();
        sqlx::query("INSERT INTO people (id, project_id, first_name, email) VALUES (?, ?, 'Ana', 'ana@example.com')")
            .bind(person_id.to_string())
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        let sequence_id = Uuid::new_v4();
        sqlx::query("INSERT INTO sequences (id, project_id, name) VALUES (?, ?, 'Welcome')")
            .bind(sequence_id.to_string())
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO channel_connections (id, project_id, channel_type) VALUES (?, ?, 'email')")
            .bind(Uuid::new_v4().to_string())
            .bind(project_id.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Person, person_id, &data);
        let action = Action::EnrollInSequence { sequence_id };

        let first = executor.execute(&action, &ctx).await;
        assert!(first.success, "{:?}", first.error);
        assert!(first.result.unwrap().get("already_enrolled").is_none());

        let second = executor.execute(&action, &ctx).await;
        assert!(second.success);
        assert_eq!(
            second.result.unwrap().get("already_enrolled"),
            Some(&json!(true))
        );

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sequence_enrollments WHERE sequence_id = ? AND person_id = ?",
        )
        .bind(sequence_id.to_string())
        .bind(person_id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn tags_outside_the_project_are_rejected() {
        let pool = create_migrated_test_pool().await.unwrap();
        let project_id = seed_project(&pool).await;
        let other_project = seed_project(&pool).await;
        let foreign_tag = Uuid::new_v4();
        sqlx::query("INSERT INTO tags (id, project_id, name) VALUES (?, ?, 'hot')")
            .bind(foreign_tag.to_string())
            .bind(other_project.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let executor = executor(&pool, 200);
        let data = JsonMap::new();
        let ctx = ctx(project_id, EntityType::Organization, Uuid::new_v4(), &data);

        let result = executor
            .execute(&Action::AddTag { tag_id: foreign_tag }, &ctx)
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("does not belong"));
    }
}
