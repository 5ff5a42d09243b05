//! User activity log records.

use serde::de;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Page value of events that represent a song play.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One line of an activity log. Only `ts` and `page` are guaranteed; events of
/// logged-out users carry no user or song fields.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Milliseconds since the Unix epoch, UTC.
    pub ts: i64,
    #[serde(default, deserialize_with = "deserialize_user_id")]
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub page: String,
    pub song: Option<String>,
    pub artist: Option<String>,
    /// Seconds.
    pub length: Option<f64>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,

    /// 1-based line of the event in its source document.
    #[serde(skip)]
    pub line: usize,
}

impl ActivityEvent {
    pub fn is_song_play(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }
}

/// All events of one log document, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct LogBatch {
    pub source: PathBuf,
    pub events: Vec<ActivityEvent>,
}

impl LogBatch {
    /// Song play events paired with their position in the batch.
    pub fn song_plays(&self) -> impl Iterator<Item = (usize, &ActivityEvent)> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.is_song_play())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Number(i64),
    Text(String),
}

/// The log writes user ids as strings, with "" for logged-out users.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawUserId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawUserId::Number(id)) => Ok(Some(id)),
        Some(RawUserId::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid userId {:?}", text)))
        }
    }
}
