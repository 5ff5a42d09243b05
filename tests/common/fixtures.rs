//! On-disk input trees and warehouse paths for end-to-end tests

use super::constants::*;
use serde_json::json;
use songplay_etl::config::AppConfig;
use songplay_etl::transform::ArtistNameSource;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding `song_data/`, `log_data/` and the warehouse file.
pub struct TestDataset {
    // Keeps the directory alive for the lifetime of the dataset
    _dir: TempDir,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
}

impl TestDataset {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        fs::create_dir_all(&song_data).unwrap();
        fs::create_dir_all(&log_data).unwrap();
        let db_path = dir.path().join("warehouse.db");

        TestDataset {
            _dir: dir,
            song_data,
            log_data,
            db_path,
        }
    }

    /// Dataset with the duplicated-title catalog document already in place.
    pub fn with_song_1() -> Self {
        let dataset = Self::new();
        dataset.write_song("A/A/A/TRAAAAW128F429D538.json", SONG_1_DOCUMENT);
        dataset
    }

    pub fn write_song(&self, relative: &str, document: &str) -> PathBuf {
        write_file(&self.song_data, relative, document)
    }

    /// Writes one event per line.
    pub fn write_log(&self, relative: &str, events: &[serde_json::Value]) -> PathBuf {
        let body = events
            .iter()
            .map(|event| event.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        write_file(&self.log_data, relative, &body)
    }

    pub fn write_raw_log(&self, relative: &str, body: &str) -> PathBuf {
        write_file(&self.log_data, relative, body)
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            db_path: self.db_path.clone(),
            reset: false,
            artist_name_source: ArtistNameSource::Title,
        }
    }
}

fn write_file(root: &Path, relative: &str, body: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();
    path
}

/// A NextSong event of user 8 playing song 1.
pub fn song_play(ts: i64) -> serde_json::Value {
    json!({
        "artist": ARTIST_1_NAME,
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Summers",
        "length": SONG_1_DURATION,
        "level": "free",
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": SONG_1_TITLE,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
        "userId": USER_1_ID.to_string()
    })
}

/// A non-song-play event of a logged-out user.
pub fn home_visit(ts: i64) -> serde_json::Value {
    json!({
        "artist": null,
        "auth": "Logged Out",
        "firstName": null,
        "gender": null,
        "itemInSession": 0,
        "lastName": null,
        "length": null,
        "level": "free",
        "location": null,
        "method": "GET",
        "page": "Home",
        "registration": null,
        "sessionId": 52,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": null,
        "userId": ""
    })
}
