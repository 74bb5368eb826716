//! mint server
//!
//! ## Usage
//!
//! ```bash
//! # Serve with defaults (file://var/mint.db, 127.0.0.1:6543)
//! mint
//!
//! # Use a config file and rebuild the root from its seed
//! mint --config mint.toml --reset
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mint::{App, Config, Database, Seed};

/// mint video publishing server
#[derive(Parser, Debug)]
#[command(name = "mint")]
#[command(about = "Video publishing CMS")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to, overriding the config
    #[arg(long)]
    bind: Option<String>,

    /// Replace the configured root with a freshly seeded one
    #[arg(long)]
    reset: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let db = Database::from_uri(&config.database.uri)?;
    let seed = match &config.seed {
        Some(path) => Seed::load(path)?,
        None => Seed::sample(),
    };
    let created = mint::bootstrap(
        &db,
        &config.database.base,
        &seed,
        &config.server.title,
        args.reset,
    )?;
    if created {
        tracing::info!(base = %config.database.base, "seeded root");
    }

    let app = Arc::new(App::from_config(&config, db)?);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting mint");
    mint::http::serve(app, &config.server.bind).await?;
    Ok(())
}
