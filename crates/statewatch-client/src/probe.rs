//! Sequential failover prober.
//!
//! Tries candidates strictly in order, one request per candidate, each
//! bounded by the per-attempt timeout and the caller's cancellation
//! token. Stops at the first success. Holds no state between calls.

use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use statewatch_core::cycle::{AttemptRecord, CycleResult};
use statewatch_core::resolver::CandidateEndpoint;
use statewatch_core::state::PolledState;

use crate::error::{AttemptError, body_snippet};

/// Well-known path of the state document on every candidate.
pub const STATE_PATH: &str = "/api/state";

/// Probe `candidates` in order; first success wins.
///
/// Candidates are tried one at a time — attempt N+1 never starts before
/// attempt N resolves or times out. Cancellation mid-attempt returns the
/// partial result immediately; the caller is expected to discard it.
pub async fn probe_candidates(
    http: &reqwest::Client,
    candidates: &[CandidateEndpoint],
    path: &str,
    per_attempt_timeout: Duration,
    cancel: &CancellationToken,
    seq: u64,
) -> CycleResult {
    let mut attempts = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let url = format!("{}{}", candidate.base, path);

        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(%candidate, "probe cancelled mid-cycle");
                return CycleResult::failed(seq, attempts, Utc::now());
            }
            outcome = attempt_one(http, &url, per_attempt_timeout) => outcome,
        };

        match outcome {
            Ok((status, state)) => {
                tracing::debug!(%candidate, %status, "probe succeeded");
                attempts.push(AttemptRecord::ok(candidate.clone(), status.to_string()));
                return CycleResult {
                    seq,
                    resolved: Some(candidate.clone()),
                    state: Some(state),
                    attempts,
                    completed_at: Utc::now(),
                };
            }
            Err(err) => {
                tracing::debug!(%candidate, error = %err, "probe attempt failed");
                attempts.push(AttemptRecord::error(candidate.clone(), err.to_string()));
            }
        }
    }

    tracing::warn!(
        attempted = attempts.len(),
        "all candidates failed this cycle"
    );
    CycleResult::failed(seq, attempts, Utc::now())
}

/// One-shot convenience: probe once with a fresh HTTP client and no
/// external cancellation. Used by CLI commands outside the scheduler.
pub async fn probe_once(
    candidates: &[CandidateEndpoint],
    path: &str,
    per_attempt_timeout: Duration,
) -> CycleResult {
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();
    probe_candidates(&http, candidates, path, per_attempt_timeout, &cancel, 1).await
}

/// One request to one candidate. The timeout bounds the whole attempt,
/// including reading the body. Returns the status line alongside the
/// decoded state for the diagnostic trail.
async fn attempt_one(
    http: &reqwest::Client,
    url: &str,
    per_attempt_timeout: Duration,
) -> Result<(reqwest::StatusCode, PolledState), AttemptError> {
    let timeout_ms = per_attempt_timeout.as_millis() as u64;

    let fetch = async {
        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::from_transport(&e))?;

        if !status.is_success() {
            return Err(AttemptError::Protocol {
                status: status.as_u16(),
                snippet: body_snippet(&body),
            });
        }

        let state = serde_json::from_str::<PolledState>(&body)
            .map_err(|e| AttemptError::Decode(e.to_string()))?;
        Ok((status, state))
    };

    match tokio::time::timeout(per_attempt_timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::Timeout { ms: timeout_ms }),
    }
}
