//! `statewatch probe` — one cycle outside the timer cadence, printed as
//! a diagnostic report.

use std::time::Duration;

use statewatch_client::probe::{STATE_PATH, probe_once};
use statewatch_core::diagnostics::DiagnosticReport;
use statewatch_core::resolver::{EnvironmentSignals, resolve};

use crate::cli::ProbeOpts;

pub async fn cmd_probe(signals: EnvironmentSignals, opts: ProbeOpts) -> anyhow::Result<()> {
    let candidates = resolve(&signals);
    let result = probe_once(
        &candidates,
        STATE_PATH,
        Duration::from_millis(opts.timeout_ms),
    )
    .await;

    let report = DiagnosticReport::from_cycle(&result, &signals);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if result.all_failed() {
        std::process::exit(1);
    }
    Ok(())
}
