//! Song metadata files: one JSON record per file, yielding one song and one artist.

use super::driver::FileStats;
use super::error::EtlError;
use super::fields::nullable;
use crate::warehouse::{ArtistRow, SongRow, WarehouseStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A song metadata record, accessed by field name only.
#[derive(Debug, Deserialize)]
struct SongRecord {
    song_id: String,
    title: String,
    artist_id: String,
    artist_name: String,
    #[serde(deserialize_with = "nullable")]
    artist_location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    artist_latitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    artist_longitude: Option<f64>,
    year: i32,
    duration: f64,
}

fn parse_error(line: usize, message: impl Into<String>) -> EtlError {
    EtlError::Parse {
        path: PathBuf::new(),
        line,
        message: message.into(),
    }
}

/// Parse the content of a song file into its song and artist rows.
///
/// Only the first JSON value of the file is used.
pub fn parse_song_record(content: &str) -> Result<(SongRow, ArtistRow), EtlError> {
    let mut values = serde_json::Deserializer::from_str(content).into_iter::<serde_json::Value>();

    let first = match values.next() {
        None => return Err(parse_error(1, "file holds no JSON record")),
        Some(Err(e)) => return Err(parse_error(e.line(), e.to_string())),
        Some(Ok(value)) => value,
    };
    match values.next() {
        None => {}
        Some(Err(e)) => return Err(parse_error(e.line(), e.to_string())),
        Some(Ok(_)) => {
            warn!("Song file holds more than one record, only the first one is loaded")
        }
    }

    let record: SongRecord =
        serde_json::from_value(first).map_err(|e| parse_error(1, e.to_string()))?;

    let song = SongRow {
        song_id: record.song_id,
        title: record.title,
        artist_id: record.artist_id.clone(),
        year: record.year,
        duration: record.duration,
    };
    let artist = ArtistRow {
        artist_id: record.artist_id,
        name: record.artist_name,
        location: record.artist_location,
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    };
    Ok((song, artist))
}

/// Load one song file: one song insert and one artist insert.
pub fn process_song_file(store: &dyn WarehouseStore, path: &Path) -> Result<FileStats, EtlError> {
    let content = std::fs::read_to_string(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (song, artist) = parse_song_record(&content).map_err(|e| e.at(path))?;
    debug!("Loading song {} by artist {}", song.song_id, artist.artist_id);

    store
        .insert_song(&song)
        .map_err(|e| EtlError::store(path, e))?;
    store
        .insert_artist(&artist)
        .map_err(|e| EtlError::store(path, e))?;

    Ok(FileStats {
        songs: 1,
        artists: 1,
        ..Default::default()
    })
}
