//! Derivation of warehouse rows from parsed records.
//!
//! Everything here is pure apart from the catalog lookup performed while
//! building songplay rows. Only song play events (`page == "NextSong"`)
//! produce time, user and songplay rows.

use crate::error::{EtlError, Result};
use crate::records::{ActivityEvent, CatalogRecord, LogBatch};
use crate::warehouse::{ArtistRow, SongLookup, SongMatch, SongRow, SongplayRow, TimeRow, UserRow};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Deserialize;

/// Which catalog field the artist name is read from.
///
/// Catalog files are loaded with the artist name taken from the `title` key,
/// which upstream files repeat to carry the artist name. This looks like a
/// data-layout quirk of the source dataset, so `artist_name` is available as
/// an opt-in alternative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ArtistNameSource {
    #[default]
    Title,
    #[value(name = "artist_name")]
    ArtistName,
}

pub fn song_row_from(record: &CatalogRecord) -> SongRow {
    SongRow {
        song_id: record.song_id.clone(),
        title: record.title.clone(),
        artist_id: record.artist_id.clone(),
        year: record.year,
        duration: record.duration,
    }
}

pub fn artist_row_from(record: &CatalogRecord, name_source: ArtistNameSource) -> ArtistRow {
    let name = match name_source {
        ArtistNameSource::Title => record.title_alias.clone(),
        ArtistNameSource::ArtistName => record
            .artist_name
            .clone()
            .unwrap_or_else(|| record.title_alias.clone()),
    };

    ArtistRow {
        artist_id: record.artist_id.clone(),
        name,
        location: record.artist_location.clone(),
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    }
}

pub fn time_rows_from(batch: &LogBatch) -> Result<Vec<TimeRow>> {
    batch
        .song_plays()
        .map(|(_, event)| event_time(batch, event).map(|ts| time_row_at(&ts)))
        .collect()
}

pub fn user_rows_from(batch: &LogBatch) -> Result<Vec<UserRow>> {
    batch
        .song_plays()
        .map(|(_, event)| {
            Ok(UserRow {
                user_id: *required(batch, event, &event.user_id, "userId")?,
                first_name: required(batch, event, &event.first_name, "firstName")?.clone(),
                last_name: required(batch, event, &event.last_name, "lastName")?.clone(),
                gender: event.gender.clone(),
                level: event.level.clone(),
            })
        })
        .collect()
}

/// Builds one songplay row per song play, resolving song and artist ids
/// through `lookup`. songplay_id is the event's position within the batch.
pub fn songplay_rows_from<L>(batch: &LogBatch, lookup: &L) -> Result<Vec<SongplayRow>>
where
    L: SongLookup + ?Sized,
{
    let source_file = batch.source.display().to_string();

    batch
        .song_plays()
        .map(|(position, event)| {
            let song_match = match (&event.song, &event.artist, event.length) {
                (Some(song), Some(artist), Some(length)) => {
                    lookup.lookup_song(song, artist, length)?
                }
                _ => SongMatch::none(),
            };

            Ok(SongplayRow {
                songplay_id: position as i64,
                source_file: source_file.clone(),
                start_time: event_time(batch, event)?,
                user_id: *required(batch, event, &event.user_id, "userId")?,
                level: event.level.clone(),
                song_id: song_match.song_id,
                artist_id: song_match.artist_id,
                session_id: *required(batch, event, &event.session_id, "sessionId")?,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
            })
        })
        .collect()
}

pub fn time_row_at(ts: &DateTime<Utc>) -> TimeRow {
    TimeRow {
        start_time: *ts,
        hour: ts.hour(),
        day: ts.day(),
        week: ts.iso_week().week(),
        month: ts.month(),
        year: ts.year(),
        weekday: ts.weekday().num_days_from_monday(),
    }
}

fn event_time(batch: &LogBatch, event: &ActivityEvent) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(event.ts).ok_or_else(|| {
        EtlError::parse(
            &batch.source,
            event.line,
            format!("timestamp {} out of range", event.ts),
        )
    })
}

fn required<'a, T>(
    batch: &LogBatch,
    event: &ActivityEvent,
    value: &'a Option<T>,
    field: &str,
) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| {
        EtlError::parse(
            &batch.source,
            event.line,
            format!("song play event without {}", field),
        )
    })
}
