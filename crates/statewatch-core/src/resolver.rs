//! Candidate endpoint resolution.
//!
//! Builds the ordered, de-duplicated list of base URLs the prober will
//! try, from an explicit [`EnvironmentSignals`] value. Pure function:
//! the same signals always produce the same candidate order.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Constants ───────────────────────────────────────────────────

/// Operator-known device address used as the default reachability target.
pub const DEVICE_ADDR: &str = "192.168.4.1";

/// Loopback fallback for plain local development.
pub const LOOPBACK_ADDR: &str = "127.0.0.1";

/// Standard service ports, in priority order (higher priority first).
pub const SERVICE_PORTS: [u16; 2] = [8443, 8080];

// ─── Environment Signals ─────────────────────────────────────────

/// Runtime environment signals consumed by [`resolve`].
///
/// An explicit injected value rather than ambient globals, so resolution
/// is deterministic and testable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Host the page/app was served from, without scheme or port.
    pub current_host: Option<String>,
    /// True when running inside a packaged desktop shell.
    pub desktop_shell: bool,
    /// True when the page was loaded over a secure transport.
    pub secure_transport: bool,
    /// Operator-supplied override base URL. When set it is tried first.
    pub override_base: Option<String>,
}

// ─── Candidate Endpoint ──────────────────────────────────────────

/// One network location the client may try to reach the state service.
///
/// `base` carries scheme, host, and port with no trailing slash.
/// Identity is the exact `base` string; equal strings are de-duplicated
/// within one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateEndpoint {
    pub base: String,
    pub secure: bool,
}

impl CandidateEndpoint {
    pub fn new(base: impl Into<String>, secure: bool) -> Self {
        Self {
            base: base.into(),
            secure,
        }
    }

    fn for_host(host: &str, port: u16, secure: bool) -> Self {
        let scheme = if secure { "https" } else { "http" };
        Self {
            base: format!("{scheme}://{host}:{port}"),
            secure,
        }
    }
}

impl fmt::Display for CandidateEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

// ─── Resolution ──────────────────────────────────────────────────

/// Resolve the ordered candidate list from environment signals.
///
/// Priority rules:
/// 1. An explicit override base is the first candidate.
/// 2. Desktop shell: the known device address over both service ports,
///    secure variant of each port before the insecure variant.
/// 3. Raw-IP host or secure transport: device address as in rule 2,
///    then the current host on both ports using the page's own scheme.
/// 4. Otherwise: loopback over both ports, insecure.
///
/// Duplicates (by exact base string) are removed, first-seen order
/// preserved. Always returns at least one candidate; never panics.
pub fn resolve(signals: &EnvironmentSignals) -> Vec<CandidateEndpoint> {
    let mut candidates = Vec::new();

    if let Some(base) = &signals.override_base {
        let trimmed = base.trim_end_matches('/');
        if !trimmed.is_empty() {
            candidates.push(CandidateEndpoint::new(
                trimmed,
                trimmed.starts_with("https://"),
            ));
        }
    }

    let host_is_raw_ip = signals
        .current_host
        .as_deref()
        .is_some_and(is_raw_ipv4);

    if signals.desktop_shell {
        push_device_candidates(&mut candidates);
    } else if host_is_raw_ip || signals.secure_transport {
        push_device_candidates(&mut candidates);
        if let Some(host) = &signals.current_host {
            for port in SERVICE_PORTS {
                candidates.push(CandidateEndpoint::for_host(
                    host,
                    port,
                    signals.secure_transport,
                ));
            }
        }
    } else {
        for port in SERVICE_PORTS {
            candidates.push(CandidateEndpoint::for_host(LOOPBACK_ADDR, port, false));
        }
    }

    // Degrade to loopback if every rule above produced nothing.
    if candidates.is_empty() {
        for port in SERVICE_PORTS {
            candidates.push(CandidateEndpoint::for_host(LOOPBACK_ADDR, port, false));
        }
    }

    dedup_candidates(candidates)
}

fn push_device_candidates(candidates: &mut Vec<CandidateEndpoint>) {
    for port in SERVICE_PORTS {
        candidates.push(CandidateEndpoint::for_host(DEVICE_ADDR, port, true));
        candidates.push(CandidateEndpoint::for_host(DEVICE_ADDR, port, false));
    }
}

/// Remove duplicate bases, keeping the first occurrence.
fn dedup_candidates(candidates: Vec<CandidateEndpoint>) -> Vec<CandidateEndpoint> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(candidate.base.clone()) {
            unique.push(candidate);
        }
    }
    unique
}

/// Whether `host` is a bare IPv4 address (e.g. `"192.168.4.1"`).
pub fn is_raw_ipv4(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| o.parse::<u8>().is_ok())
}

// ─── Tests ───────────────────────────────────────────────────────
