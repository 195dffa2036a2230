//! Attempt-level error taxonomy.
//!
//! All four variants are recoverable: each terminates only the current
//! candidate's attempt and the prober advances to the next candidate.
//! There is no fatal error class in this crate — an all-candidates-failed
//! cycle is represented as an empty-resolution `CycleResult`, never
//! raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttemptError {
    /// Connection refused, DNS failure, TLS failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The attempt exceeded its per-attempt timeout.
    #[error("timeout after {ms}ms")]
    Timeout { ms: u64 },

    /// Non-success status code. `snippet` is a bounded body excerpt.
    #[error("status {status}: {snippet}")]
    Protocol { status: u16, snippet: String },

    /// Body is not valid PolledState JSON.
    #[error("decode error: {0}")]
    Decode(String),
}

impl AttemptError {
    /// Classify a reqwest error that occurred before a status line was
    /// available.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Bound a body excerpt for attempt detail strings.
pub(crate) fn body_snippet(body: &str) -> String {
    const MAX: usize = 120;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}

// ─── Tests ───────────────────────────────────────────────────────
