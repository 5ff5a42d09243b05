//! Shared constants for end-to-end tests

// ============================================================================
// Catalog
// ============================================================================

pub const SONG_1_ID: &str = "S1";
pub const SONG_1_TITLE: &str = "T1";
pub const SONG_1_DURATION: f64 = 210.5;

pub const ARTIST_1_ID: &str = "A1";

/// Carried in the repeated `title` key of the catalog document.
pub const ARTIST_1_NAME: &str = "Artist1";

/// Catalog document whose `title` key appears twice: song title, then artist name.
pub const SONG_1_DOCUMENT: &str = r#"{"num_songs":1,"song_id":"S1","title":"T1","artist_id":"A1","year":2000,"duration":210.5,"title":"Artist1","artist_location":"NY","artist_latitude":40.7,"artist_longitude":-74.0}"#;

// ============================================================================
// Activity log
// ============================================================================

/// Thursday 2018-11-01 20:57:10.796 UTC
pub const TS_1: i64 = 1541105830796;

/// Thursday 2018-11-01 21:01:46.796 UTC
pub const TS_2: i64 = 1541106106796;

/// Thursday 2018-11-01 21:05:52.796 UTC
pub const TS_3: i64 = 1541106352796;

pub const USER_1_ID: i64 = 8;
