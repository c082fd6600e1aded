use clap::Parser;
use pathdump::commands::{self, DumpOptions};
use pathdump::config::Cli;
use pathdump::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = DumpOptions {
        json: cli.json,
        quiet: cli.quiet,
    };

    // Convert CLI args to Config; pre-flight checks run inside the job
    let config = Config::try_from(cli)?;
    tracing::debug!(?config, "resolved configuration");

    let stats = commands::run(config, options)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pathdump={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
