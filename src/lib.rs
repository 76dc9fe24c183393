//! Dealflow - CRM Automation Rule Engine
//!
//! Dealflow reacts to CRM domain events (entity created/updated, call
//! dispositioned, stage changed, time elapsed, ...) by evaluating stored
//! automation definitions and executing their side-effecting actions.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, error taxonomy, and port traits
//! - **Service Layer** (`services`): trigger matching, condition evaluation,
//!   loop guarding, action execution, dispatching, time-trigger polling, and
//!   dry-run previews
//! - **Adapters** (`adapters`): SQLite repositories, the reqwest webhook
//!   transport, and configuration loading
//! - **CLI Layer** (`cli`): operational commands (migrate, poll, dry-run)
//!
//! # Example
//!
//! ```ignore
//! use dealflow::domain::models::AutomationEvent;
//!
//! // Build the engine (see cli::build_engine), then hand events to the
//! // dispatcher's fire-and-forget entry point:
//! dispatcher.ingest(event);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{ConfigError, ConfigLoader};
pub use domain::models::{
    Action, ActionResult, AutomationDefinition, AutomationEvent, Condition, ConditionOperator,
    Config, EntityType, ExecutionRecord, ExecutionStatus, Trigger, TriggerType,
};
pub use domain::ports::{
    AutomationRepository, EntityStore, ExecutionRepository, NotificationSink, SequenceService,
    TagStore, WebhookTransport,
};
pub use domain::{DomainError, DomainResult};
pub use services::{Dispatcher, DryRunEvaluator, LoopGuard, TimeTriggerPoller};
