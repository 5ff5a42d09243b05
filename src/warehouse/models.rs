//! Row models, one struct per warehouse table.

use chrono::{DateTime, Utc};

/// Storage format of timestamp columns: sortable, millisecond precision, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    /// Seconds.
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Monday = 0 .. Sunday = 6
    pub weekday: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongplayRow {
    /// Position of the event within its log file.
    pub songplay_id: i64,
    pub source_file: String,
    pub start_time: DateTime<Utc>,
    pub user_id: i64,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Result of the song/artist lookup. Both ids are set, or neither is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
}

impl SongMatch {
    pub fn found(song_id: String, artist_id: String) -> Self {
        SongMatch {
            song_id: Some(song_id),
            artist_id: Some(artist_id),
        }
    }

    pub fn none() -> Self {
        SongMatch::default()
    }

    pub fn is_found(&self) -> bool {
        self.song_id.is_some()
    }
}

/// Row counts per table, for the run summary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplays: usize,
}
