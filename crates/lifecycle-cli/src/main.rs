mod components;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use lifecycle_core::app::{AppBuilder, LifecycleConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use components::{DATABASE, DatabaseImporter, HTTP, HttpServer, MODS, ModLoader, PROFILES, SaveServer};

#[derive(Parser)]
#[command(author, version, about = "Run the server startup pass and a few update ticks", long_about = None)]
struct Cli {
    /// JSON lifecycle config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of update ticks to run after startup.
    #[arg(short, long, default_value_t = 3)]
    ticks: u32,

    /// Extensions discovered by the mod loader.
    #[arg(short, long, value_delimiter = ',', default_value = "bots,quests")]
    extensions: Vec<String>,

    /// Print the startup report as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LifecycleConfig::from_file(path)?,
        None => LifecycleConfig::default(),
    };

    let save_server = Arc::new(SaveServer::new(config.update_interval.as_secs()));
    let mut app = AppBuilder::new()
        .with_config(config)
        .on_load(Arc::new(HttpServer::new("127.0.0.1:6969")), HTTP)
        .on_load(Arc::new(ModLoader::new(cli.extensions)), MODS)
        .on_load(Arc::new(DatabaseImporter), DATABASE)
        .on_load(save_server.clone(), PROFILES)
        .on_update(save_server)?
        .expect_routes(&["database-importer", "http-server", "save-server"])
        .build()?;

    let report = app.load().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    tracing::info!(tiers = ?app.registry().snapshot().tiers, "registry after startup");

    let interval = app.config().update_interval;
    for _ in 0..cli.ticks {
        tokio::time::sleep(interval).await;
        let tick = app.updates_mut().tick().await;
        tracing::debug!(?tick, "tick");
    }

    Ok(())
}
