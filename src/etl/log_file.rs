//! Activity log files: newline-delimited JSON events, one per line.
//!
//! Only "NextSong" events are loaded. Each of them yields a time row, a user row
//! (deduplicated per file) and a songplay whose song/artist ids come from the
//! warehouse lookup.

use super::driver::FileStats;
use super::error::EtlError;
use super::fields::{integer_or_numeric_string, nullable, string_or_number};
use crate::warehouse::{SongplayRow, TimeRow, UserRow, WarehouseStore};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Value of the `page` field for song-play events.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// A retained "NextSong" event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    /// Epoch milliseconds
    pub ts: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub length: f64,
    #[serde(deserialize_with = "integer_or_numeric_string")]
    pub session_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub user_agent: Option<String>,
}

impl PlayEvent {
    fn user(&self) -> UserRow {
        UserRow {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        }
    }
}

/// Rows extracted from one log file, ready to be loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogBatch {
    /// One per retained event, in file order: `time_rows[i]` belongs to `plays[i]`.
    pub time_rows: Vec<TimeRow>,
    /// Distinct user tuples in first-seen order.
    pub users: Vec<UserRow>,
    pub plays: Vec<PlayEvent>,
}

fn schema_error(line: usize, message: impl Into<String>) -> EtlError {
    EtlError::Schema {
        path: PathBuf::new(),
        line,
        message: message.into(),
    }
}

/// Parse the content of a log file. Pure: nothing is written anywhere.
pub fn parse_log_events(content: &str) -> Result<LogBatch, EtlError> {
    let mut batch = LogBatch::default();
    let mut seen_users = HashSet::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|e| EtlError::Parse {
            path: PathBuf::new(),
            line: line_number,
            message: e.to_string(),
        })?;

        let page = value
            .get("page")
            .and_then(Value::as_str)
            .ok_or_else(|| schema_error(line_number, "missing field `page`"))?;
        if page != NEXT_SONG_PAGE {
            continue;
        }

        let event: PlayEvent =
            serde_json::from_value(value).map_err(|e| schema_error(line_number, e.to_string()))?;
        let time_row = TimeRow::from_epoch_millis(event.ts).ok_or_else(|| {
            schema_error(line_number, format!("timestamp {} is out of range", event.ts))
        })?;

        let user = event.user();
        if seen_users.insert(user.clone()) {
            batch.users.push(user);
        }
        batch.time_rows.push(time_row);
        batch.plays.push(event);
    }

    Ok(batch)
}

/// Write a parsed batch: time rows, then users, then one songplay per event.
///
/// Errors carry no path; callers attach it.
pub fn load_log_batch(store: &dyn WarehouseStore, batch: &LogBatch) -> Result<FileStats, EtlError> {
    let wrap = |e: anyhow::Error| EtlError::store(Path::new(""), e);
    let mut stats = FileStats::default();

    for time_row in &batch.time_rows {
        store.insert_time(time_row).map_err(wrap)?;
        stats.time_rows += 1;
    }

    for user in &batch.users {
        store.insert_user(user).map_err(wrap)?;
        stats.users += 1;
    }

    for (play, time_row) in batch.plays.iter().zip(&batch.time_rows) {
        let found = store
            .find_song_match(&play.song, &play.artist, play.length)
            .map_err(wrap)?;
        match &found {
            Some(_) => stats.matched_songplays += 1,
            None => debug!(
                "No song match for '{}' by '{}' ({}s)",
                play.song, play.artist, play.length
            ),
        }
        let (song_id, artist_id) = match found {
            Some(m) => (Some(m.song_id), Some(m.artist_id)),
            None => (None, None),
        };

        store
            .insert_songplay(&SongplayRow {
                start_time: time_row.start_time.clone(),
                user_id: play.user_id.clone(),
                level: play.level.clone(),
                song_id,
                artist_id,
                session_id: play.session_id,
                location: play.location.clone(),
                user_agent: play.user_agent.clone(),
            })
            .map_err(wrap)?;
        stats.songplays += 1;
    }

    Ok(stats)
}

/// Load one log file.
pub fn process_log_file(store: &dyn WarehouseStore, path: &Path) -> Result<FileStats, EtlError> {
    let content = std::fs::read_to_string(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let batch = parse_log_events(&content).map_err(|e| e.at(path))?;
    debug!(
        "{} play events and {} distinct users in {}",
        batch.plays.len(),
        batch.users.len(),
        path.display()
    );

    load_log_batch(store, &batch).map_err(|e| e.at(path))
}
