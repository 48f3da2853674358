use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokenkeeper::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tokenkeeper", about = "Keeps OAuth2 site credentials fresh", version)]
struct Cli {
    /// Config file path.
    #[arg(long, default_value = "conf.toml")]
    file: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize sites that have never completed the code flow.
    New,
    /// Refresh access tokens close to expiry (the default).
    Refresh,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let mode = match cli.command {
        Some(Command::New) => Mode::New,
        Some(Command::Refresh) | None => Mode::Refresh,
    };

    let store = ConfigStore::new(&cli.file);
    // Held across the whole load-modify-save window.
    let _lock = store.lock()?;
    let mut config = store.load()?;
    info!(file = %store.path().display(), sites = config.sites.len(), "loaded config");

    let client = TokenClient::new()?;
    let controller = Controller::new(&client, &StdinPrompt);

    // Any site failure suppresses the save: the whole batch re-runs on
    // the next scheduled invocation instead of persisting partial state.
    let updated = controller.run(&mut config, mode)?;

    if updated {
        store.save(&config)?;
        info!(file = %store.path().display(), "saved updated credentials");
    }

    Ok(())
}
