//! Engine core: event ingestion, filtering, execution, and audit logging.
//!
//! Ingestion is a queue handoff: `ingest` pushes onto an unbounded channel
//! and returns immediately; a single worker drains the queue, so one
//! event's matching automations run one after another and their actions run
//! strictly in list order. The caller never observes processing failures;
//! outcomes live in the execution log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::mpsc;

use crate::domain::models::automation::AutomationDefinition;
use crate::domain::models::event::AutomationEvent;
use crate::domain::models::execution::ExecutionRecord;
use crate::domain::ports::{AutomationRepository, ExecutionRepository};
use crate::services::action_executor::{ActionContext, ActionExecutor};
use crate::services::condition_evaluator;
use crate::services::loop_guard::LoopGuard;
use crate::services::trigger_matcher;

/// Orchestrates trigger matching, loop guarding, condition evaluation,
/// action execution, and execution logging for every ingested event.
pub struct Dispatcher {
    automations: Arc<dyn AutomationRepository>,
    executions: Arc<dyn ExecutionRepository>,
    executor: Arc<ActionExecutor>,
    guard: Arc<LoopGuard>,
    queue_tx: mpsc::UnboundedSender<AutomationEvent>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<AutomationEvent>>>,
    running: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        automations: Arc<dyn AutomationRepository>,
        executions: Arc<dyn ExecutionRepository>,
        executor: Arc<ActionExecutor>,
        guard: Arc<LoopGuard>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            automations,
            executions,
            executor,
            guard,
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            running: AtomicBool::new(false),
        }
    }

    /// The shared loop-guard state, also consulted by nested dispatches.
    pub fn loop_guard(&self) -> Arc<LoopGuard> {
        Arc::clone(&self.guard)
    }

    /// Fire-and-forget ingestion entry point. Returns immediately; the
    /// worker picks the event up in arrival order.
    pub fn ingest(&self, event: AutomationEvent) {
        if self.queue_tx.send(event).is_err() {
            tracing::warn!("dispatcher queue closed, dropping event");
        }
    }

    /// Start the single worker task draining the ingestion queue. Returns
    /// its `JoinHandle`; abort it (or drop the dispatcher) to stop.
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let receiver = self
            .queue_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut receiver) = receiver else {
            tracing::warn!("dispatcher worker already started");
            return tokio::spawn(async {});
        };

        self.running.store(true, Ordering::SeqCst);
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                dispatcher.process_event(event).await;
                if !dispatcher.running.load(Ordering::SeqCst) {
                    break;
                }
            }
        })
    }

    /// Request the worker to stop after the event it is processing.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Process one event through the full state machine. Public so the
    /// poller and tests can drive the identical path the worker uses.
    pub async fn process_event(&self, event: AutomationEvent) {
        if self.guard.depth_exceeded() {
            tracing::warn!(
                trigger = %event.trigger_type,
                entity = %event.entity_id,
                depth = self.guard.depth(),
                "chain depth limit reached, dropping event"
            );
            return;
        }

        let candidates = match self
            .automations
            .list_enabled_for_trigger(event.project_id, event.trigger_type)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(
                    trigger = %event.trigger_type,
                    error = %e,
                    "failed to load automations for trigger"
                );
                return;
            }
        };

        // Sequential on purpose: automations share the loop-guard state and
        // the audit log benefits from deterministic ordering.
        for automation in &candidates {
            self.run_automation(automation, &event).await;
        }
    }

    async fn run_automation(&self, automation: &AutomationDefinition, event: &AutomationEvent) {
        // Trigger-config mismatch is a silent skip: no record, to keep the
        // audit log free of irrelevant events.
        if !trigger_matcher::matches(&automation.trigger, event) {
            return;
        }

        // Cooldown hits are silent too; they are a defensive mechanism, not
        // a business outcome.
        if self.guard.cooldown_active(automation.id, event.entity_id) {
            tracing::debug!(
                automation = %automation.name,
                entity = %event.entity_id,
                "cooldown active, skipping"
            );
            return;
        }

        let started = Instant::now();
        let conditions_met =
            condition_evaluator::evaluate_all(&automation.conditions, &event.data);
        if !conditions_met {
            self.persist(ExecutionRecord::skipped(automation, event, started.elapsed()))
                .await;
            return;
        }

        // Stamp before the first action runs so a slow action cannot let a
        // concurrent duplicate event past the cooldown check.
        self.guard.stamp(automation.id, event.entity_id);
        let _depth = self.guard.enter();

        tracing::info!(
            automation = %automation.name,
            trigger = %event.trigger_type,
            entity = %event.entity_id,
            actions = automation.actions.len(),
            "executing automation"
        );

        let ctx = ActionContext {
            project_id: event.project_id,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            data: &event.data,
            automation_id: automation.id,
            automation_name: &automation.name,
        };

        let mut results = Vec::with_capacity(automation.actions.len());
        for action in &automation.actions {
            results.push(self.executor.execute(action, &ctx).await);
        }

        self.persist(ExecutionRecord::completed(
            automation,
            event,
            results,
            started.elapsed(),
        ))
        .await;
    }

    async fn persist(&self, record: ExecutionRecord) {
        if let Err(e) = self.executions.insert(&record).await {
            tracing::error!(
                automation = %record.automation_id,
                error = %e,
                "failed to write execution record"
            );
        }
    }
}
