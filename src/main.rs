//! Taskflow API server.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use taskflow::analytics::DbAnalyticsRecorder;
use taskflow::api;
use taskflow::cli::user::run_user;
use taskflow::cli::{Cli, Command};
use taskflow::config::{Config, ConfigLoader, ConfigPaths, EnvOverrides};
use taskflow::db::Database;
use taskflow::engine::Engine;
use taskflow::logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log, cli.verbose)?;

    // An explicit --config takes the place of TASKFLOW_CONFIG_PATH
    let mut env = EnvOverrides::from_env();
    if let Some(config_path) = &cli.config {
        env.config_path = Some(PathBuf::from(config_path));
    }
    let mut loader = ConfigLoader::load_with(ConfigPaths::discover(), &env)?;
    if let Some(path) = loader.config_path() {
        info!("Config: {}", path.display());
    }

    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = loader.into_config();

    config.ensure_db_dir()?;
    let db = Arc::new(Database::open(&config.server.db_path)?);

    match cli.command {
        Some(Command::User(args)) => {
            println!("{}", run_user(&db, &args)?);
        }
        Some(Command::Serve) | None => {
            run_server(config, db).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config, db: Arc<Database>) -> Result<()> {
    info!("Database: {:?}", config.server.db_path);

    let recorder = Arc::new(DbAnalyticsRecorder::new(Arc::clone(&db)));
    let engine = Engine::new(db, recorder, config.stats.clone());

    let (shutdown_tx, addr) = api::start_server(engine, &config.bind_address()).await?;
    info!("Serving on http://{}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    let _ = shutdown_tx.send(());

    Ok(())
}
