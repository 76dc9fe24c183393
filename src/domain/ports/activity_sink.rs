//! Outbound port for the activity / audit log.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::event::{EntityType, JsonMap};

/// Insert payload for an activity-log row.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub project_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub activity_type: String,
    pub body: Option<String>,
    /// Attribution metadata (automation id and name).
    pub metadata: JsonMap,
}

#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, activity: NewActivity) -> DomainResult<Uuid>;
}
