//! statewatch: resilient polling client for the device state service.
//! Single-process binary embedding the resolver, prober, and scheduler.

use clap::Parser;

mod cli;
mod cmd_probe;
mod cmd_watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let signals = args.signals();

    let command = args
        .command
        .unwrap_or_else(|| cli::Command::Watch(cli::WatchOpts::default()));

    match command {
        cli::Command::Watch(opts) => {
            let filter = std::env::var("STATEWATCH_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string());
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .init();

            tracing::info!("statewatch starting");
            cmd_watch::cmd_watch(signals, opts).await?;
        }
        cli::Command::Probe(opts) => {
            cmd_probe::cmd_probe(signals, opts).await?;
        }
        cli::Command::Candidates => {
            for candidate in statewatch_core::resolver::resolve(&signals) {
                println!("{candidate}");
            }
        }
    }

    Ok(())
}
