//! Song catalog records.

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Metadata of one song and its artist, as found in a catalog document.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogRecord {
    pub song_id: String,
    /// First `title` key of the record.
    pub title: String,
    /// Last `title` key of the record. Upstream catalog files may repeat the
    /// key, the repeated value being the artist name. Equal to `title` when
    /// the key appears once.
    pub title_alias: String,
    pub artist_id: String,
    /// 0 when unknown.
    pub year: i32,
    /// Seconds.
    pub duration: f64,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

// serde_json's derived maps keep only the last value of a repeated key, so the
// record is read entry by entry.
impl<'de> Deserialize<'de> for CatalogRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CatalogRecordVisitor)
    }
}

struct CatalogRecordVisitor;

impl<'de> Visitor<'de> for CatalogRecordVisitor {
    type Value = CatalogRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a song catalog object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut song_id: Option<String> = None;
        let mut titles: Vec<String> = Vec::new();
        let mut artist_id: Option<String> = None;
        let mut year: Option<i32> = None;
        let mut duration: Option<f64> = None;
        let mut artist_name: Option<String> = None;
        let mut artist_location: Option<String> = None;
        let mut artist_latitude: Option<f64> = None;
        let mut artist_longitude: Option<f64> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "song_id" => song_id = Some(map.next_value()?),
                "title" => titles.push(map.next_value()?),
                "artist_id" => artist_id = Some(map.next_value()?),
                "year" => year = map.next_value()?,
                "duration" => duration = Some(map.next_value()?),
                "artist_name" => artist_name = map.next_value()?,
                "artist_location" => artist_location = map.next_value()?,
                "artist_latitude" => artist_latitude = map.next_value()?,
                "artist_longitude" => artist_longitude = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let title = titles
            .first()
            .cloned()
            .ok_or_else(|| de::Error::missing_field("title"))?;
        let title_alias = titles.last().cloned().unwrap_or_else(|| title.clone());

        Ok(CatalogRecord {
            song_id: song_id.ok_or_else(|| de::Error::missing_field("song_id"))?,
            title,
            title_alias,
            artist_id: artist_id.ok_or_else(|| de::Error::missing_field("artist_id"))?,
            year: year.unwrap_or(0),
            duration: duration.ok_or_else(|| de::Error::missing_field("duration"))?,
            artist_name,
            artist_location,
            artist_latitude,
            artist_longitude,
        })
    }
}
