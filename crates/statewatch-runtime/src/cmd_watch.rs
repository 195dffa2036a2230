//! `statewatch watch` — run the scheduler and stream cycle summaries
//! until interrupted.

use std::time::Duration;

use statewatch_client::{CycleDelivery, SyncClient, SyncConfig};
use statewatch_core::resolver::EnvironmentSignals;

use crate::cli::WatchOpts;

pub async fn cmd_watch(signals: EnvironmentSignals, opts: WatchOpts) -> anyhow::Result<()> {
    let config = SyncConfig {
        interval: Duration::from_millis(opts.interval_ms),
        per_attempt_timeout: Duration::from_millis(opts.timeout_ms),
        ..Default::default()
    };

    let handle = SyncClient::start(signals, config);
    for candidate in handle.candidates() {
        tracing::debug!(%candidate, "candidate");
    }

    let mut rx = handle.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received ctrl-c, shutting down");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(delivery) = rx.borrow().clone() else {
                    continue;
                };
                if opts.json {
                    println!("{}", serde_json::to_string(&delivery_json(&delivery))?);
                } else {
                    println!("{}", format_delivery(&delivery));
                    // First cycle after start-up: do not reprise a
                    // pre-existing signal as breaking news.
                    if let Some(notification) = &delivery.new_notification {
                        if !delivery.first_cycle {
                            println!("  ! {}", notification.message);
                        }
                    }
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

/// Pure formatting logic for cycle summaries, separated for testability.
fn format_delivery(delivery: &CycleDelivery) -> String {
    let attempts = delivery.attempt_count;
    let plural = if attempts == 1 { "" } else { "s" };
    match &delivery.resolved {
        Some(endpoint) => format!(
            "cycle {}: ok via {} ({attempts} attempt{plural})",
            delivery.seq, endpoint
        ),
        None => format!(
            "cycle {}: all {attempts} candidate{plural} failed",
            delivery.seq
        ),
    }
}

fn delivery_json(delivery: &CycleDelivery) -> serde_json::Value {
    serde_json::json!({
        "seq": delivery.seq,
        "first_cycle": delivery.first_cycle,
        "resolved": delivery.resolved.as_ref().map(|e| e.base.clone()),
        "attempts": delivery.attempt_count,
        "new_notification": delivery.new_notification.as_ref().map(|n| n.id.clone()),
        "completed_at": delivery.completed_at.to_rfc3339(),
    })
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use statewatch_core::resolver::CandidateEndpoint;

    fn delivery(resolved: Option<&str>, attempts: usize) -> CycleDelivery {
        CycleDelivery {
            seq: 4,
            first_cycle: false,
            resolved: resolved.map(|b| CandidateEndpoint::new(b, b.starts_with("https"))),
            attempt_count: attempts,
            new_notification: None,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn format_success_line() {
        let out = format_delivery(&delivery(Some("http://192.168.4.1:8080"), 3));
        assert_eq!(out, "cycle 4: ok via http://192.168.4.1:8080 (3 attempts)");
    }

    #[test]
    fn format_single_attempt_singular() {
        let out = format_delivery(&delivery(Some("http://127.0.0.1:8443"), 1));
        assert!(out.ends_with("(1 attempt)"));
    }

    #[test]
    fn format_all_failed_line() {
        let out = format_delivery(&delivery(None, 6));
        assert_eq!(out, "cycle 4: all 6 candidates failed");
    }

    #[test]
    fn json_line_carries_resolution() {
        let value = delivery_json(&delivery(Some("http://127.0.0.1:8080"), 2));
        assert_eq!(value["seq"], 4);
        assert_eq!(value["resolved"], "http://127.0.0.1:8080");
        assert_eq!(value["attempts"], 2);
        assert!(value["new_notification"].is_null());
    }
}
