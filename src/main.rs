//! lvgen
//!
//! Schema-driven CRUD scaffolding for gin/gorm + Vue admin panels.
//!
//! This is the main entry point: it loads the settings, installs logging
//! and hands the parsed command to `lvgen_cli`.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = lvgen_cli::parse_args();
    let settings = lvgen_cli::Settings::load(cli.config.as_deref())?;

    // RUST_LOG wins over the settings file.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(lvgen_cli::log_directive(&settings)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = lvgen_cli::VERSION, "lvgen starting");
    lvgen_cli::run(cli, settings).await
}
