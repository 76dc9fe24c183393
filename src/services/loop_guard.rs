//! Loop and recursion prevention shared across the engine.
//!
//! Two independent mechanisms: a per-(automation, entity) cooldown window
//! and a process-wide chain-depth counter. Both are in-process state; a
//! multi-instance deployment would need externally coordinated equivalents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Once the cooldown map grows past this many entries, stamping sweeps out
/// entries older than twice the cooldown window.
const SWEEP_THRESHOLD: usize = 1024;

/// Shared mutable guard state consumed by the dispatcher.
#[derive(Debug)]
pub struct LoopGuard {
    max_depth: usize,
    cooldown: Duration,
    depth: AtomicUsize,
    last_fired: Mutex<HashMap<(Uuid, Uuid), Instant>>,
}

impl LoopGuard {
    pub fn new(max_depth: usize, cooldown: Duration) -> Self {
        Self {
            max_depth,
            cooldown,
            depth: AtomicUsize::new(0),
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Current nesting level of executing automations.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Whether a new automation execution would exceed the chain limit.
    pub fn depth_exceeded(&self) -> bool {
        self.depth() >= self.max_depth
    }

    /// Mark an automation's action list as executing. The returned guard
    /// decrements on drop, so the counter is restored even on early return.
    pub fn enter(&self) -> DepthGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        DepthGuard { depth: &self.depth }
    }

    /// Whether the automation fired for this entity within the cooldown
    /// window.
    pub fn cooldown_active(&self, automation_id: Uuid, entity_id: Uuid) -> bool {
        if self.cooldown.is_zero() {
            return false;
        }
        self.lock_map()
            .get(&(automation_id, entity_id))
            .is_some_and(|fired| fired.elapsed() < self.cooldown)
    }

    /// Record a firing. Called before actions run so a slow action cannot
    /// let a concurrent duplicate event past the check.
    pub fn stamp(&self, automation_id: Uuid, entity_id: Uuid) {
        let mut map = self.lock_map();
        map.insert((automation_id, entity_id), Instant::now());
        if map.len() > SWEEP_THRESHOLD {
            let horizon = self.cooldown * 2;
            map.retain(|_, fired| fired.elapsed() < horizon);
        }
    }

    /// Number of live cooldown entries.
    pub fn cooldown_entries(&self) -> usize {
        self.lock_map().len()
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<(Uuid, Uuid), Instant>> {
        self.last_fired.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII guard for the chain-depth counter.
#[derive(Debug)]
pub struct DepthGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
