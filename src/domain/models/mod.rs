pub mod automation;
pub mod config;
pub mod event;
pub mod execution;

pub use automation::{
    Action, AutomationDefinition, Condition, ConditionOperator, Trigger, TIME_TRIGGER_DAYS_RANGE,
};
pub use config::{Config, DatabaseConfig, EngineConfig, LoggingConfig};
pub use event::{AutomationEvent, EntityType, JsonMap, TriggerType};
pub use execution::{ActionResult, ExecutionRecord, ExecutionStatus};
