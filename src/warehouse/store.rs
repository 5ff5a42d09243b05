//! SQLite-backed warehouse loader.
//!
//! `SqliteWarehouse` owns the single store connection. Rows of one input
//! file are applied through a [`FileLoad`], which wraps a transaction and is
//! committed once the whole file has been applied.

use super::models::*;
use super::queries::QueryRegistry;
use super::schema::{latest_schema, table_names};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use tracing::{debug, info};

/// Catalog lookup used while deriving songplay rows.
pub trait SongLookup {
    /// Exact match on song title, artist name and duration. Returns the
    /// first match, or an empty [`SongMatch`] when nothing matches.
    fn lookup_song(&self, title: &str, artist_name: &str, duration: f64) -> Result<SongMatch>;
}

/// Write side of the warehouse. Each call is a single statement.
pub trait WarehouseWriter: SongLookup {
    /// No-op when the song_id is already present.
    fn insert_song(&self, row: &SongRow) -> Result<()>;

    /// No-op when the artist_id is already present.
    fn insert_artist(&self, row: &ArtistRow) -> Result<()>;

    /// Inserts the user, or overwrites only `level` of an existing one.
    fn upsert_user(&self, row: &UserRow) -> Result<()>;

    /// No-op when the start_time is already present.
    fn upsert_time(&self, row: &TimeRow) -> Result<()>;

    /// Unconditional insert; fails with a constraint error on key collision.
    fn insert_songplay(&self, row: &SongplayRow) -> Result<()>;
}

pub struct SqliteWarehouse {
    conn: Connection,
    queries: QueryRegistry,
}

impl SqliteWarehouse {
    /// Opens the warehouse database, creating the schema on a fresh database
    /// and validating it otherwise.
    pub fn open<P: AsRef<Path>>(db_path: P, queries: QueryRegistry) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened warehouse database at {:?}", path);
        Self::with_connection(conn, queries)
    }

    pub fn open_in_memory(queries: QueryRegistry) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, queries)
    }

    fn with_connection(conn: Connection, queries: QueryRegistry) -> Result<Self> {
        let schema = latest_schema();

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )?;

        if table_count == 0 {
            info!("Creating warehouse schema at version {}", schema.version);
            schema.create(&conn)?;
        } else {
            schema.validate(&conn)?;
            debug!("Warehouse schema validated");
        }

        Ok(SqliteWarehouse { conn, queries })
    }

    /// Drops and recreates every warehouse table.
    pub fn reset(&mut self) -> Result<()> {
        let schema = latest_schema();
        info!("Resetting warehouse: dropping and recreating all tables");
        let tx = self.conn.transaction()?;
        schema.drop(&tx)?;
        schema.create(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Starts the transaction for one input file.
    pub fn begin_file(&mut self) -> Result<FileLoad<'_>> {
        let tx = self.conn.transaction()?;
        Ok(FileLoad {
            tx,
            queries: &self.queries,
        })
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let mut counts = TableCounts::default();
        for table in table_names() {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            let count = count as usize;
            match table {
                "songs" => counts.songs = count,
                "artists" => counts.artists = count,
                "users" => counts.users = count,
                "time" => counts.time = count,
                "songplays" => counts.songplays = count,
                _ => {}
            }
        }
        Ok(counts)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Outside a [`FileLoad`] every statement commits on its own.
impl SongLookup for SqliteWarehouse {
    fn lookup_song(&self, title: &str, artist_name: &str, duration: f64) -> Result<SongMatch> {
        lookup_song(&self.conn, &self.queries, title, artist_name, duration)
    }
}

impl WarehouseWriter for SqliteWarehouse {
    fn insert_song(&self, row: &SongRow) -> Result<()> {
        insert_song(&self.conn, &self.queries, row)
    }

    fn insert_artist(&self, row: &ArtistRow) -> Result<()> {
        insert_artist(&self.conn, &self.queries, row)
    }

    fn upsert_user(&self, row: &UserRow) -> Result<()> {
        upsert_user(&self.conn, &self.queries, row)
    }

    fn upsert_time(&self, row: &TimeRow) -> Result<()> {
        upsert_time(&self.conn, &self.queries, row)
    }

    fn insert_songplay(&self, row: &SongplayRow) -> Result<()> {
        insert_songplay(&self.conn, &self.queries, row)
    }
}

/// Rows of a single input file. Dropping without [`FileLoad::commit`] rolls
/// every row of the file back.
pub struct FileLoad<'a> {
    tx: Transaction<'a>,
    queries: &'a QueryRegistry,
}

impl FileLoad<'_> {
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

impl SongLookup for FileLoad<'_> {
    fn lookup_song(&self, title: &str, artist_name: &str, duration: f64) -> Result<SongMatch> {
        lookup_song(&self.tx, self.queries, title, artist_name, duration)
    }
}

impl WarehouseWriter for FileLoad<'_> {
    fn insert_song(&self, row: &SongRow) -> Result<()> {
        insert_song(&self.tx, self.queries, row)
    }

    fn insert_artist(&self, row: &ArtistRow) -> Result<()> {
        insert_artist(&self.tx, self.queries, row)
    }

    fn upsert_user(&self, row: &UserRow) -> Result<()> {
        upsert_user(&self.tx, self.queries, row)
    }

    fn upsert_time(&self, row: &TimeRow) -> Result<()> {
        upsert_time(&self.tx, self.queries, row)
    }

    fn insert_songplay(&self, row: &SongplayRow) -> Result<()> {
        insert_songplay(&self.tx, self.queries, row)
    }
}

// =========================================================================
// Statement Execution
// =========================================================================

fn insert_song(conn: &Connection, queries: &QueryRegistry, row: &SongRow) -> Result<()> {
    conn.prepare_cached(queries.song_insert)?.execute(params![
        &row.song_id,
        &row.title,
        &row.artist_id,
        row.year,
        row.duration
    ])?;
    Ok(())
}

fn insert_artist(conn: &Connection, queries: &QueryRegistry, row: &ArtistRow) -> Result<()> {
    conn.prepare_cached(queries.artist_insert)?.execute(params![
        &row.artist_id,
        &row.name,
        &row.location,
        row.latitude,
        row.longitude
    ])?;
    Ok(())
}

fn upsert_user(conn: &Connection, queries: &QueryRegistry, row: &UserRow) -> Result<()> {
    conn.prepare_cached(queries.user_upsert)?.execute(params![
        row.user_id,
        &row.first_name,
        &row.last_name,
        &row.gender,
        &row.level
    ])?;
    Ok(())
}

fn upsert_time(conn: &Connection, queries: &QueryRegistry, row: &TimeRow) -> Result<()> {
    conn.prepare_cached(queries.time_upsert)?.execute(params![
        format_timestamp(&row.start_time),
        row.hour,
        row.day,
        row.week,
        row.month,
        row.year,
        row.weekday
    ])?;
    Ok(())
}

fn insert_songplay(conn: &Connection, queries: &QueryRegistry, row: &SongplayRow) -> Result<()> {
    conn.prepare_cached(queries.songplay_insert)?.execute(params![
        row.songplay_id,
        &row.source_file,
        format_timestamp(&row.start_time),
        row.user_id,
        &row.level,
        &row.song_id,
        &row.artist_id,
        row.session_id,
        &row.location,
        &row.user_agent
    ])?;
    Ok(())
}

fn lookup_song(
    conn: &Connection,
    queries: &QueryRegistry,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> Result<SongMatch> {
    let found = conn
        .prepare_cached(queries.song_select)?
        .query_row(params![title, artist_name, duration], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })
        .optional()?;

    Ok(match found {
        Some((song_id, artist_id)) => SongMatch::found(song_id, artist_id),
        None => SongMatch::none(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::WAREHOUSE_QUERIES;
    use chrono::{TimeZone, Utc};

    fn create_test_store() -> SqliteWarehouse {
        SqliteWarehouse::open_in_memory(WAREHOUSE_QUERIES).unwrap()
    }

    fn song(song_id: &str, title: &str) -> SongRow {
        SongRow {
            song_id: song_id.to_string(),
            title: title.to_string(),
            artist_id: "A1".to_string(),
            year: 2000,
            duration: 210.5,
        }
    }

    fn artist(artist_id: &str, name: &str) -> ArtistRow {
        ArtistRow {
            artist_id: artist_id.to_string(),
            name: name.to_string(),
            location: Some("NY".to_string()),
            latitude: Some(40.7),
            longitude: Some(-74.0),
        }
    }

    fn user(level: &str, first_name: &str) -> UserRow {
        UserRow {
            user_id: 8,
            first_name: first_name.to_string(),
            last_name: "Mcdonald".to_string(),
            gender: Some("F".to_string()),
            level: Some(level.to_string()),
        }
    }

    fn songplay(songplay_id: i64, source_file: &str) -> SongplayRow {
        SongplayRow {
            songplay_id,
            source_file: source_file.to_string(),
            start_time: Utc.timestamp_millis_opt(1541105830796).unwrap(),
            user_id: 8,
            level: Some("free".to_string()),
            song_id: None,
            artist_id: None,
            session_id: 139,
            location: Some("Phoenix-Mesa-Scottsdale, AZ".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    #[test]
    fn test_insert_song_is_idempotent() {
        let store = create_test_store();
        store.insert_song(&song("S1", "T1")).unwrap();
        store.insert_song(&song("S1", "Other title")).unwrap();

        let (count, title): (i64, String) = store
            .connection()
            .query_row("SELECT COUNT(*), MAX(title) FROM songs", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, "T1");
    }

    #[test]
    fn test_insert_artist_keeps_first_row() {
        let store = create_test_store();
        store.insert_artist(&artist("A1", "Artist1")).unwrap();
        store.insert_artist(&artist("A1", "Renamed")).unwrap();

        let name: String = store
            .connection()
            .query_row("SELECT name FROM artists WHERE artist_id = 'A1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(name, "Artist1");
        assert_eq!(store.table_counts().unwrap().artists, 1);
    }

    #[test]
    fn test_upsert_user_overwrites_only_level() {
        let store = create_test_store();
        store.upsert_user(&user("free", "Kaylee")).unwrap();
        store.upsert_user(&user("paid", "Someone else")).unwrap();

        let (first_name, gender, level): (String, String, String) = store
            .connection()
            .query_row(
                "SELECT first_name, gender, level FROM users WHERE user_id = 8",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(first_name, "Kaylee");
        assert_eq!(gender, "F");
        assert_eq!(level, "paid");
    }

    #[test]
    fn test_upsert_time_deduplicates_by_start_time() {
        let store = create_test_store();
        let row = TimeRow {
            start_time: Utc.timestamp_millis_opt(1541105830796).unwrap(),
            hour: 20,
            day: 1,
            week: 44,
            month: 11,
            year: 2018,
            weekday: 3,
        };
        store.upsert_time(&row).unwrap();
        store.upsert_time(&row).unwrap();

        let start_time: String = store
            .connection()
            .query_row("SELECT start_time FROM time", [], |r| r.get(0))
            .unwrap();
        assert_eq!(start_time, "2018-11-01 20:57:10.796");
        assert_eq!(store.table_counts().unwrap().time, 1);
    }

    #[test]
    fn test_insert_songplay_collision_is_constraint_error() {
        let store = create_test_store();
        store.insert_songplay(&songplay(0, "a.json")).unwrap();
        store.insert_songplay(&songplay(0, "b.json")).unwrap();

        let err = store.insert_songplay(&songplay(0, "a.json")).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(store.table_counts().unwrap().songplays, 2);
    }

    #[test]
    fn test_lookup_song_round_trip() {
        let store = create_test_store();
        store.insert_song(&song("S1", "T1")).unwrap();
        store.insert_artist(&artist("A1", "Artist1")).unwrap();

        let found = store.lookup_song("T1", "Artist1", 210.5).unwrap();
        assert_eq!(found, SongMatch::found("S1".to_string(), "A1".to_string()));
    }

    #[test]
    fn test_lookup_song_requires_all_predicates() {
        let store = create_test_store();
        store.insert_song(&song("S1", "T1")).unwrap();
        store.insert_artist(&artist("A1", "Artist1")).unwrap();

        assert_eq!(
            store.lookup_song("T2", "Artist1", 210.5).unwrap(),
            SongMatch::none()
        );
        assert_eq!(
            store.lookup_song("T1", "Artist2", 210.5).unwrap(),
            SongMatch::none()
        );
        assert_eq!(
            store.lookup_song("T1", "Artist1", 210.6).unwrap(),
            SongMatch::none()
        );
    }

    #[test]
    fn test_file_load_without_commit_rolls_back() {
        let mut store = create_test_store();
        {
            let load = store.begin_file().unwrap();
            load.insert_song(&song("S1", "T1")).unwrap();
            assert_eq!(
                load.lookup_song("T1", "Artist1", 210.5).unwrap(),
                SongMatch::none()
            );
        }
        assert_eq!(store.table_counts().unwrap().songs, 0);

        let load = store.begin_file().unwrap();
        load.insert_song(&song("S1", "T1")).unwrap();
        load.insert_artist(&artist("A1", "Artist1")).unwrap();
        assert!(load.lookup_song("T1", "Artist1", 210.5).unwrap().is_found());
        load.commit().unwrap();
        assert_eq!(store.table_counts().unwrap().songs, 1);
    }

    #[test]
    fn test_reset_empties_tables() {
        let mut store = create_test_store();
        store.insert_song(&song("S1", "T1")).unwrap();
        store.upsert_user(&user("free", "Kaylee")).unwrap();

        store.reset().unwrap();
        assert_eq!(store.table_counts().unwrap(), TableCounts::default());
    }

    #[test]
    fn test_reopen_validates_existing_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("warehouse.db");
        {
            let store = SqliteWarehouse::open(&db_path, WAREHOUSE_QUERIES).unwrap();
            store.insert_song(&song("S1", "T1")).unwrap();
        }
        let store = SqliteWarehouse::open(&db_path, WAREHOUSE_QUERIES).unwrap();
        assert_eq!(store.table_counts().unwrap().songs, 1);
    }

    #[test]
    fn test_open_rejects_foreign_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE songs (id INTEGER PRIMARY KEY)", [])
                .unwrap();
        }
        let result = SqliteWarehouse::open(&db_path, WAREHOUSE_QUERIES);
        assert!(matches!(result, Err(crate::error::EtlError::Schema(_))));
    }

    #[test]
    fn test_open_rejects_database_with_varchar_columns() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("postgres_style.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute(
                "CREATE TABLE songs (song_id varchar NOT NULL PRIMARY KEY, title varchar)",
                [],
            )
            .unwrap();
        }
        let result = SqliteWarehouse::open(&db_path, WAREHOUSE_QUERIES);
        assert!(matches!(result, Err(crate::error::EtlError::Schema(_))));
    }
}
