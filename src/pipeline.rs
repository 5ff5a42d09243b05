//! Load run: catalog files first, then activity logs.
//!
//! Each file is parsed, transformed and applied inside its own transaction,
//! which is committed before the next file starts. The first error aborts
//! the run; files committed before it stay committed.

use crate::config::AppConfig;
use crate::error::Result;
use crate::records::{read_document, CatalogRecord, LogBatch, ParsedDocument, RecordKind};
use crate::transform::{
    artist_row_from, song_row_from, songplay_rows_from, time_rows_from, user_rows_from,
    ArtistNameSource,
};
use crate::walker::json_files;
use crate::warehouse::{SqliteWarehouse, TableCounts, WarehouseWriter, WAREHOUSE_QUERIES};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub artist_name_source: ArtistNameSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub files_processed: usize,
    pub rows_applied: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub catalog: PhaseStats,
    pub log: PhaseStats,
    pub counts: TableCounts,
}

/// Opens the warehouse described by `config` and loads both input trees.
pub fn run(config: &AppConfig) -> Result<RunSummary> {
    let mut store = SqliteWarehouse::open(&config.db_path, WAREHOUSE_QUERIES)?;
    if config.reset {
        store.reset()?;
    }

    let options = LoadOptions {
        artist_name_source: config.artist_name_source,
    };
    load_all(&mut store, &config.song_data, &config.log_data, &options)
}

pub fn load_all(
    store: &mut SqliteWarehouse,
    song_data: &Path,
    log_data: &Path,
    options: &LoadOptions,
) -> Result<RunSummary> {
    let catalog = process_data(store, song_data, RecordKind::Catalog, options)?;
    let log = process_data(store, log_data, RecordKind::Log, options)?;
    let counts = store.table_counts()?;

    Ok(RunSummary {
        catalog,
        log,
        counts,
    })
}

/// Loads every `*.json` document under `root` as `kind`, one transaction per file.
pub fn process_data(
    store: &mut SqliteWarehouse,
    root: &Path,
    kind: RecordKind,
    options: &LoadOptions,
) -> Result<PhaseStats> {
    let files = json_files(root)?.collect::<Result<Vec<PathBuf>>>()?;
    let num_files = files.len();
    debug!("Loading {} documents from {}", kind.label(), root.display());
    info!("{} files found in {}", num_files, root.display());

    let mut stats = PhaseStats::default();
    for (index, path) in files.iter().enumerate() {
        let document = read_document(path, kind)?;

        let load = store.begin_file()?;
        let rows = apply_document(&load, &document, options)?;
        load.commit()?;

        debug!("{}: {} rows applied", path.display(), rows);
        stats.files_processed += 1;
        stats.rows_applied += rows;
        info!("{}/{} files processed.", index + 1, num_files);
    }
    Ok(stats)
}

/// Applies the rows derived from one document. Returns the number of
/// statements executed.
pub fn apply_document<W>(writer: &W, document: &ParsedDocument, options: &LoadOptions) -> Result<usize>
where
    W: WarehouseWriter + ?Sized,
{
    match document {
        ParsedDocument::Catalog(record) => apply_catalog_record(writer, record, options),
        ParsedDocument::Log(batch) => apply_log_batch(writer, batch),
    }
}

fn apply_catalog_record<W>(writer: &W, record: &CatalogRecord, options: &LoadOptions) -> Result<usize>
where
    W: WarehouseWriter + ?Sized,
{
    writer.insert_song(&song_row_from(record))?;
    writer.insert_artist(&artist_row_from(record, options.artist_name_source))?;
    Ok(2)
}

fn apply_log_batch<W>(writer: &W, batch: &LogBatch) -> Result<usize>
where
    W: WarehouseWriter + ?Sized,
{
    let time_rows = time_rows_from(batch)?;
    for row in &time_rows {
        writer.upsert_time(row)?;
    }

    let user_rows = user_rows_from(batch)?;
    for row in &user_rows {
        writer.upsert_user(row)?;
    }

    let songplay_rows = songplay_rows_from(batch, writer)?;
    for row in &songplay_rows {
        writer.insert_songplay(row)?;
    }

    Ok(time_rows.len() + user_rows.len() + songplay_rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{parse_catalog_record, parse_log_batch};

    const CATALOG_LINE: &str = r#"{"song_id":"S1","title":"T1","artist_id":"A1","year":2000,"duration":210.5,"title":"Artist1","artist_location":"NY","artist_latitude":40.7,"artist_longitude":-74.0}"#;

    fn store() -> SqliteWarehouse {
        SqliteWarehouse::open_in_memory(WAREHOUSE_QUERIES).unwrap()
    }

    #[test]
    fn test_apply_catalog_then_log() {
        let store = store();
        let record = parse_catalog_record(Path::new("song.json"), CATALOG_LINE).unwrap();
        let applied = apply_document(
            &store,
            &ParsedDocument::Catalog(record),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(applied, 2);

        let log = concat!(
            r#"{"ts":1541105830796,"userId":"8","firstName":"Kaylee","lastName":"Summers","gender":"F","level":"free","page":"NextSong","song":"T1","artist":"Artist1","length":210.5,"sessionId":139,"location":"Phoenix","userAgent":"Mozilla"}"#,
            "\n"
        );
        let batch = parse_log_batch(Path::new("log.json"), log).unwrap();
        let applied =
            apply_document(&store, &ParsedDocument::Log(batch), &LoadOptions::default()).unwrap();
        assert_eq!(applied, 3);

        let (song_id, artist_id): (String, String) = store
            .connection()
            .query_row("SELECT song_id, artist_id FROM songplays", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(song_id, "S1");
        assert_eq!(artist_id, "A1");
    }

    #[test]
    fn test_non_song_play_batch_applies_nothing() {
        let store = store();
        let batch = parse_log_batch(
            Path::new("log.json"),
            r#"{"ts":1541105830796,"userId":"","page":"Home","sessionId":3}"#,
        )
        .unwrap();
        let applied =
            apply_document(&store, &ParsedDocument::Log(batch), &LoadOptions::default()).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(store.table_counts().unwrap(), TableCounts::default());
    }
}
