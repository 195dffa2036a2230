//! Attempt and cycle records.
//!
//! One [`CycleResult`] is produced per polling cycle, successful or not.
//! Attempt records are appended in attempt order and never mutated after
//! the cycle completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resolver::CandidateEndpoint;

// ─── Attempt ─────────────────────────────────────────────────────

/// Outcome of a single probe attempt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    #[default]
    Pending,
    Ok,
    Error,
}

/// One record per candidate tried within a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub endpoint: CandidateEndpoint,
    pub outcome: AttemptOutcome,
    /// Human-readable status or error text for the diagnostic trail.
    pub detail: String,
}

impl AttemptRecord {
    pub fn ok(endpoint: CandidateEndpoint, detail: impl Into<String>) -> Self {
        Self {
            endpoint,
            outcome: AttemptOutcome::Ok,
            detail: detail.into(),
        }
    }

    pub fn error(endpoint: CandidateEndpoint, detail: impl Into<String>) -> Self {
        Self {
            endpoint,
            outcome: AttemptOutcome::Error,
            detail: detail.into(),
        }
    }
}

// ─── Cycle Result ────────────────────────────────────────────────

/// The unit handed to consumers after each polling cycle.
///
/// `seq` is assigned by the scheduler in start order; a result whose
/// `seq` is not newer than the last applied one is discarded, so a slow
/// stale cycle can never overwrite a newer cycle's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub seq: u64,
    pub resolved: Option<CandidateEndpoint>,
    pub state: Option<crate::state::PolledState>,
    pub attempts: Vec<AttemptRecord>,
    pub completed_at: DateTime<Utc>,
}

impl CycleResult {
    /// An all-candidates-failed (or empty-candidate) cycle. Reportable,
    /// non-fatal: no resolved endpoint, no state, full attempt list.
    pub fn failed(seq: u64, attempts: Vec<AttemptRecord>, completed_at: DateTime<Utc>) -> Self {
        Self {
            seq,
            resolved: None,
            state: None,
            attempts,
            completed_at,
        }
    }

    /// Whether every attempted candidate failed.
    pub fn all_failed(&self) -> bool {
        self.resolved.is_none()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
