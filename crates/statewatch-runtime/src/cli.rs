//! CLI definition using clap derive.

use clap::{Parser, Subcommand};

use statewatch_core::resolver::EnvironmentSignals;

#[derive(Parser)]
#[command(name = "statewatch", about = "resilient polling client for the device state service")]
pub struct Cli {
    /// Override base URL, tried before all resolved candidates
    #[arg(long, env = "STATEWATCH_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Host the front end was served from (for candidate resolution)
    #[arg(long, env = "STATEWATCH_HOST", global = true)]
    pub host: Option<String>,

    /// Treat the environment as a packaged desktop shell
    #[arg(long, env = "STATEWATCH_DESKTOP_SHELL", global = true)]
    pub desktop_shell: bool,

    /// Treat the environment as served over a secure transport
    #[arg(long, env = "STATEWATCH_SECURE", global = true)]
    pub secure: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Environment signals for the candidate resolver.
    pub fn signals(&self) -> EnvironmentSignals {
        EnvironmentSignals {
            current_host: self.host.clone(),
            desktop_shell: self.desktop_shell,
            secure_transport: self.secure,
            override_base: self.base_url.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the polling client and stream cycle summaries
    Watch(WatchOpts),
    /// Run one probe cycle and print the diagnostic report (JSON)
    Probe(ProbeOpts),
    /// Print the resolved candidate order and exit
    Candidates,
}

#[derive(clap::Args)]
pub struct WatchOpts {
    /// Poll interval in milliseconds
    #[arg(long, default_value = "5000")]
    pub interval_ms: u64,

    /// Per-attempt timeout in milliseconds
    #[arg(long, default_value = "1500")]
    pub timeout_ms: u64,

    /// Emit one JSON object per cycle instead of human-readable lines
    #[arg(long)]
    pub json: bool,
}

impl Default for WatchOpts {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            timeout_ms: 1500,
            json: false,
        }
    }
}

#[derive(clap::Args)]
pub struct ProbeOpts {
    /// Per-attempt timeout in milliseconds
    #[arg(long, default_value = "1500")]
    pub timeout_ms: u64,
}

// ─── Tests ───────────────────────────────────────────────────────
