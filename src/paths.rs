use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn database_file_path() -> Result<PathBuf> {
    if let Ok(custom) = env::var("FEEDMARK_DB") {
        return Ok(PathBuf::from(custom));
    }
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("feedmark").join("feedmark.db"))
}

pub fn config_file_path() -> Result<PathBuf> {
    if let Ok(custom) = env::var("FEEDMARK_CONFIG") {
        return Ok(PathBuf::from(custom));
    }
    let base = dirs::config_dir().context("unable to resolve config directory")?;
    Ok(base.join("feedmark").join("config.toml"))
}
