//! Diagnostic projection of the most recent cycle.
//!
//! Pure view over a [`CycleResult`] plus the environment signals the
//! resolver used. Consumed by debugging surfaces only; never influences
//! control flow.

use serde::{Deserialize, Serialize};

use crate::cycle::{AttemptOutcome, CycleResult};
use crate::resolver::EnvironmentSignals;

/// One row of the diagnostic trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptDiagnostic {
    pub location: String,
    pub outcome: AttemptOutcome,
    pub detail: String,
}

/// Snapshot of what the last cycle tried and where it landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Attempts in the order they were made.
    pub attempts: Vec<AttemptDiagnostic>,
    /// Base URL of the endpoint that ultimately succeeded, if any.
    pub resolved_endpoint: Option<String>,
    /// Environment signals the resolver was given.
    pub signals: EnvironmentSignals,
}

impl DiagnosticReport {
    pub fn from_cycle(cycle: &CycleResult, signals: &EnvironmentSignals) -> Self {
        Self {
            attempts: cycle
                .attempts
                .iter()
                .map(|a| AttemptDiagnostic {
                    location: a.endpoint.base.clone(),
                    outcome: a.outcome,
                    detail: a.detail.clone(),
                })
                .collect(),
            resolved_endpoint: cycle.resolved.as_ref().map(|e| e.base.clone()),
            signals: signals.clone(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────
