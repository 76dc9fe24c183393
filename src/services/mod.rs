pub mod action_executor;
pub mod condition_evaluator;
pub mod dispatcher;
pub mod dry_run;
pub mod egress_guard;
pub mod field_policy;
pub mod loop_guard;
pub mod time_triggers;
pub mod trigger_matcher;

pub use action_executor::{ActionContext, ActionExecutor};
pub use dispatcher::Dispatcher;
pub use dry_run::{DryRunEvaluator, DryRunReport};
pub use loop_guard::{DepthGuard, LoopGuard};
pub use time_triggers::{PollDetail, PollSummary, TimeTriggerPoller};
