//! Named DML statements used by the loader.
//!
//! The registry is a plain value handed to [`super::SqliteWarehouse`] at
//! construction, so tests or alternative stores can swap individual queries.

/// Statements the loader executes. Positional parameters follow the column
/// order written in each statement.
#[derive(Clone, Debug)]
pub struct QueryRegistry {
    pub song_insert: &'static str,
    pub artist_insert: &'static str,
    pub user_upsert: &'static str,
    pub time_upsert: &'static str,
    pub songplay_insert: &'static str,
    pub song_select: &'static str,
}

pub const WAREHOUSE_QUERIES: QueryRegistry = QueryRegistry {
    song_insert: "INSERT INTO songs (song_id, title, artist_id, year, duration)
                  VALUES (?1, ?2, ?3, ?4, ?5)
                  ON CONFLICT (song_id) DO NOTHING",

    artist_insert: "INSERT INTO artists (artist_id, name, location, latitude, longitude)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT (artist_id) DO NOTHING",

    // Only the subscription level follows the latest event
    user_upsert: "INSERT INTO users (user_id, first_name, last_name, gender, level)
                  VALUES (?1, ?2, ?3, ?4, ?5)
                  ON CONFLICT (user_id) DO UPDATE SET level = excluded.level",

    time_upsert: "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                  ON CONFLICT (start_time) DO NOTHING",

    songplay_insert: "INSERT INTO songplays (songplay_id, source_file, start_time, user_id, level,
                                             song_id, artist_id, session_id, location, user_agent)
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",

    // Exact float equality on duration
    song_select: "SELECT songs.song_id, artists.artist_id
                  FROM songs
                  INNER JOIN artists ON artists.artist_id = songs.artist_id
                  WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
                  LIMIT 1",
};

impl Default for QueryRegistry {
    fn default() -> Self {
        WAREHOUSE_QUERIES
    }
}
