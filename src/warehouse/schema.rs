//! SQLite schema definitions for the listening-activity warehouse.
//!
//! Two dimension tables come from the song catalog (`songs`, `artists`), two
//! from the event log (`users`, `time`), and `songplays` is the fact table
//! linking a play event to its resolved song and artist.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Catalog Dimensions
// =============================================================================

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("artist_id", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("duration", &SqlType::Real), // seconds
    ],
    indices: &[("idx_songs_title", "title")],
    unique_constraints: &[],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
    unique_constraints: &[],
};

// =============================================================================
// Activity Dimensions
// =============================================================================

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true, non_null = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("level", &SqlType::Text), // 'free', 'paid'
    ],
    indices: &[],
    unique_constraints: &[],
};

const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        // 'YYYY-MM-DD HH:MM:SS.mmm', UTC
        sqlite_column!("start_time", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("hour", &SqlType::Integer),
        sqlite_column!("day", &SqlType::Integer),
        sqlite_column!("week", &SqlType::Integer), // ISO week
        sqlite_column!("month", &SqlType::Integer),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("weekday", &SqlType::Integer), // 0 = Monday
    ],
    indices: &[],
    unique_constraints: &[],
};

// =============================================================================
// Fact Table
// =============================================================================

/// songplay_id is the event position inside its log file, so it is only
/// unique together with the file it came from.
const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("songplay_id", &SqlType::Integer, non_null = true),
        sqlite_column!("source_file", &SqlType::Text, non_null = true),
        sqlite_column!("start_time", &SqlType::Text, non_null = true),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!("level", &SqlType::Text),
        sqlite_column!("song_id", &SqlType::Text),
        sqlite_column!("artist_id", &SqlType::Text),
        sqlite_column!("session_id", &SqlType::Integer),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_songplays_start_time", "start_time"),
        ("idx_songplays_user", "user_id"),
    ],
    unique_constraints: &[&["source_file", "songplay_id"]],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const WAREHOUSE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        SONGS_TABLE,
        ARTISTS_TABLE,
        USERS_TABLE,
        TIME_TABLE,
        SONGPLAYS_TABLE,
    ],
}];

/// Names of the warehouse tables, in declaration order.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    latest_schema().tables.iter().map(|t| t.name)
}

pub fn latest_schema() -> &'static VersionedSchema {
    &WAREHOUSE_VERSIONED_SCHEMAS[WAREHOUSE_VERSIONED_SCHEMAS.len() - 1]
}
