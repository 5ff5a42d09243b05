mod file_config;

pub use file_config::FileConfig;

use crate::transform::ArtistNameSource;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";
pub const DEFAULT_DB_PATH: &str = "warehouse.db";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
    pub reset: bool,
    pub artist_name_source: ArtistNameSource,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
    pub reset: bool,
    pub artist_name_source: ArtistNameSource,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        ensure_dir("song_data", &song_data)?;

        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        ensure_dir("log_data", &log_data)?;

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let reset = file.reset.unwrap_or(cli.reset);
        let artist_name_source = file.artist_name_source.unwrap_or(cli.artist_name_source);

        Ok(AppConfig {
            song_data,
            log_data,
            db_path,
            reset,
            artist_name_source,
        })
    }
}

fn ensure_dir(name: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} directory does not exist: {:?}", name, path);
    }
    if !path.is_dir() {
        bail!("{} is not a directory: {:?}", name, path);
    }
    Ok(())
}
