use clap::Parser;
use exec_probe_audit::{cli::Cli, config, run_command};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> exec_probe_audit::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;

    run_command(cli.command, &config, cli.quiet).await
}
