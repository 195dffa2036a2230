//! Cancellable polling scheduler.
//!
//! One [`SyncClient`] instance drives one logical timeline: candidates
//! are resolved once at start, an immediate first cycle runs, then a
//! repeating ticker re-probes at the configured interval. Each cycle
//! runs to completion before the next tick is honored, and a sequence
//! guard discards any stale result so the externally visible state
//! always reflects the most recently started cycle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use statewatch_core::cycle::{AttemptRecord, CycleResult};
use statewatch_core::notify::{Notification, NotificationLog};
use statewatch_core::resolver::{CandidateEndpoint, EnvironmentSignals, resolve};
use statewatch_core::state::PolledState;

use crate::probe::{STATE_PATH, probe_candidates};

// ─── Configuration ───────────────────────────────────────────────

/// Scheduler configuration. Env-var wiring lives in the runtime crate;
/// this struct is explicit values only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Inter-cycle wait.
    pub interval: Duration,
    /// Bound on each single probe attempt.
    pub per_attempt_timeout: Duration,
    /// Path of the state document on every candidate.
    pub state_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            per_attempt_timeout: Duration::from_millis(1500),
            state_path: STATE_PATH.to_string(),
        }
    }
}

// ─── Deliveries & Snapshots ──────────────────────────────────────

/// One watch-channel publication of a completed, applied cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleDelivery {
    pub seq: u64,
    /// True only for the first cycle applied after start-up. Presentation
    /// layers use this to suppress ephemeral display of pre-existing
    /// signals; the core does not enforce it.
    pub first_cycle: bool,
    pub resolved: Option<CandidateEndpoint>,
    pub attempt_count: usize,
    /// Set when this cycle's state derived a brand-new notification.
    pub new_notification: Option<Notification>,
    pub completed_at: DateTime<Utc>,
}

/// Point-in-time copy of the client's externally visible state.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    /// Last known good state; persists across failed cycles.
    pub state: Option<PolledState>,
    pub resolved_endpoint: Option<CandidateEndpoint>,
    /// Diagnostic trail of the most recent cycle.
    pub attempts: Vec<AttemptRecord>,
    /// Ordered notification log, newest first.
    pub notifications: Vec<Notification>,
    /// Signals the resolver was given at start.
    pub signals: EnvironmentSignals,
    /// True until a second cycle has been applied.
    pub is_first_cycle: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

// ─── Shared State ────────────────────────────────────────────────

/// Written only by scheduler-owned control flow; read-only elsewhere.
#[derive(Debug, Default)]
struct Shared {
    latest: Option<CycleResult>,
    /// Last known good state, kept across all-fail cycles.
    last_good_state: Option<PolledState>,
    last_good_endpoint: Option<CandidateEndpoint>,
    notifications: NotificationLog,
    last_applied_seq: u64,
    cycles_applied: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // Single-writer data: a poisoned lock only means a panicked reader,
    // the data itself is still consistent.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Apply a completed cycle to the shared snapshot and publish it.
///
/// Returns `false` (and changes nothing) when the result is stale, i.e.
/// a cycle with a higher sequence number has already been applied.
fn apply_cycle(
    shared: &Mutex<Shared>,
    delivery_tx: &watch::Sender<Option<CycleDelivery>>,
    result: CycleResult,
) -> bool {
    let mut guard = lock(shared);
    if result.seq <= guard.last_applied_seq {
        tracing::debug!(
            seq = result.seq,
            applied = guard.last_applied_seq,
            "discarding stale cycle result"
        );
        return false;
    }
    guard.last_applied_seq = result.seq;
    guard.cycles_applied += 1;
    let first_cycle = guard.cycles_applied == 1;

    let new_notification = match &result.state {
        Some(state) => guard
            .notifications
            .derive_from_state(state, result.completed_at)
            .cloned(),
        None => None,
    };

    if let Some(state) = &result.state {
        guard.last_good_state = Some(state.clone());
        guard.last_good_endpoint = result.resolved.clone();
    }

    let delivery = CycleDelivery {
        seq: result.seq,
        first_cycle,
        resolved: result.resolved.clone(),
        attempt_count: result.attempts.len(),
        new_notification,
        completed_at: result.completed_at,
    };
    guard.latest = Some(result);
    drop(guard);

    // Send fails only when every receiver is gone; the snapshot surface
    // still carries the result in that case.
    let _ = delivery_tx.send(Some(delivery));
    true
}

// ─── Client & Handle ─────────────────────────────────────────────

/// Entry point for the state-sync client.
pub struct SyncClient;

impl SyncClient {
    /// Resolve candidates once, run an immediate first cycle, and arm
    /// the repeating ticker. Returns the handle owning the timeline.
    pub fn start(signals: EnvironmentSignals, config: SyncConfig) -> SyncHandle {
        let candidates = resolve(&signals);
        Self::start_with_candidates(signals, candidates, config)
    }

    /// Start with an explicit candidate list, bypassing resolution.
    /// The list is fixed for the life of the client.
    pub fn start_with_candidates(
        signals: EnvironmentSignals,
        candidates: Vec<CandidateEndpoint>,
        config: SyncConfig,
    ) -> SyncHandle {
        tracing::info!(
            candidates = candidates.len(),
            interval_ms = config.interval.as_millis() as u64,
            "state-sync client starting"
        );

        let http = reqwest::Client::new();
        let shared = Arc::new(Mutex::new(Shared::default()));
        let cancel = CancellationToken::new();
        let (delivery_tx, delivery_rx) = watch::channel(None);
        let (trigger_tx, trigger_rx) = mpsc::channel(1);

        let task = tokio::spawn(run_loop(
            http,
            candidates.clone(),
            config,
            Arc::clone(&shared),
            cancel.clone(),
            trigger_rx,
            delivery_tx,
        ));

        SyncHandle {
            shared,
            signals,
            candidates,
            cancel,
            trigger: trigger_tx,
            delivery_rx,
            task: Some(task),
        }
    }
}

/// Owning handle for a running client. Stopping (or dropping) the handle
/// disarms the ticker and cancels any in-flight attempt; no delivery
/// occurs afterwards.
pub struct SyncHandle {
    shared: Arc<Mutex<Shared>>,
    signals: EnvironmentSignals,
    candidates: Vec<CandidateEndpoint>,
    cancel: CancellationToken,
    trigger: mpsc::Sender<()>,
    delivery_rx: watch::Receiver<Option<CycleDelivery>>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop the scheduler and wait for the polling task to exit. After
    /// this returns, no further delivery can occur.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!("state-sync client stopped");
    }

    /// Request one out-of-cadence cycle. Returns `false` if a manual
    /// trigger is already queued or the scheduler has stopped.
    pub fn poll_now(&self) -> bool {
        self.trigger.try_send(()).is_ok()
    }

    /// Subscribe to cycle deliveries. The receiver observes `None` until
    /// the first cycle is applied.
    pub fn subscribe(&self) -> watch::Receiver<Option<CycleDelivery>> {
        self.delivery_rx.clone()
    }

    /// Candidate list resolved at start, in probe order.
    pub fn candidates(&self) -> &[CandidateEndpoint] {
        &self.candidates
    }

    /// Copy of the externally visible state.
    pub fn snapshot(&self) -> ClientSnapshot {
        let guard = lock(&self.shared);
        ClientSnapshot {
            state: guard.last_good_state.clone(),
            resolved_endpoint: guard.last_good_endpoint.clone(),
            attempts: guard
                .latest
                .as_ref()
                .map(|c| c.attempts.clone())
                .unwrap_or_default(),
            notifications: guard.notifications.entries().to_vec(),
            signals: self.signals.clone(),
            is_first_cycle: guard.cycles_applied <= 1,
            completed_at: guard.latest.as_ref().map(|c| c.completed_at),
        }
    }

    /// Dismiss a notification by id.
    pub fn dismiss_notification(&self, id: &str) -> bool {
        lock(&self.shared).notifications.dismiss(id)
    }

    /// Mark a notification read by id.
    pub fn mark_notification_read(&self, id: &str) -> bool {
        lock(&self.shared).notifications.mark_read(id)
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ─── Poll Loop ───────────────────────────────────────────────────

async fn run_loop(
    http: reqwest::Client,
    candidates: Vec<CandidateEndpoint>,
    config: SyncConfig,
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
    mut trigger_rx: mpsc::Receiver<()>,
    delivery_tx: watch::Sender<Option<CycleDelivery>>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    // A slow cycle delays the next tick instead of bursting to catch up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut next_seq: u64 = 0;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            Some(()) = trigger_rx.recv() => {}
        }

        next_seq += 1;
        let result = probe_candidates(
            &http,
            &candidates,
            &config.state_path,
            config.per_attempt_timeout,
            &cancel,
            next_seq,
        )
        .await;

        // A cycle interrupted by stop() must not mutate visible state.
        if cancel.is_cancelled() {
            break;
        }
        apply_cycle(&shared, &delivery_tx, result);
    }
}

// ─── Tests ───────────────────────────────────────────────────────
