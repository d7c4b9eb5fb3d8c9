use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use orbit_api::{db::OrbitDb, transport::ReqwestTransport, OrbitApi};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let db_path = config.database_path()?;
    log::debug!("session database at {}", db_path.display());
    let db = OrbitDb::open(&db_path).await?;
    let app = OrbitApi::restore(db, Arc::new(ReqwestTransport::new())).await;

    let result = commands::execute(&app, config.command).await;

    app.flush().await;
    app.shutdown().await;
    result
}
