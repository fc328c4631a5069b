//! Student API server binary

use std::path::PathBuf;

use clap::Parser;
use student_api::config::{Config, ConfigError, CONFIG_PATH_ENV};
use student_api::{server, APP_NAME, APP_VERSION};

// =============================================================================
// CLI
// =============================================================================

/// Student CRUD HTTP service
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Student CRUD HTTP service over SQLite or PostgreSQL")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override http_server.address from the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so CONFIG_PATH can come from it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    tracing::info!("{} v{}", APP_NAME, APP_VERSION);

    let path = cli.config.ok_or(ConfigError::MissingPath)?;
    let mut config = Config::load(&path)?;
    tracing::info!(path = %path.display(), "configuration loaded");

    if let Some(bind) = cli.bind {
        config.http_server.address = bind;
    }

    server::run(config).await
}
