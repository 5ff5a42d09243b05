use crate::transform::ArtistNameSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Input trees
    pub song_data: Option<String>,
    pub log_data: Option<String>,

    // Warehouse
    pub db_path: Option<String>,
    pub reset: Option<bool>,

    pub artist_name_source: Option<ArtistNameSource>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
