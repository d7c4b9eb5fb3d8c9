use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::commands::Command;

/// Orbit - a workspace for composing and sending API requests
#[derive(Parser, Debug)]
#[command(name = "orbit")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// SQLite file holding the session
    #[arg(long, env = "ORBIT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Log filter, e.g. `info` or `orbit_api=debug`
    #[arg(long, env = "ORBIT_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("no data directory; set ORBIT_DB_PATH")?;
        Ok(data_dir.join("orbitapi").join("orbit.sqlite"))
    }
}
