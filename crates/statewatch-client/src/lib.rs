//! statewatch-client: async failover prober and polling scheduler.
//!
//! Wraps the pure decision logic in `statewatch-core` with network IO
//! (`reqwest`) and a cancellable polling loop (`tokio` +
//! `CancellationToken`). One [`scheduler::SyncClient`] instance owns one
//! logical timeline: a single control flow writes the shared snapshot,
//! external consumers only read.

pub mod error;
pub mod probe;
pub mod scheduler;

pub use error::AttemptError;
pub use probe::{probe_candidates, probe_once};
pub use scheduler::{ClientSnapshot, CycleDelivery, SyncClient, SyncConfig, SyncHandle};
