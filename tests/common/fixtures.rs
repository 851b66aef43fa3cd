#![allow(dead_code)]

use super::constants::*;
use rusqlite::Connection;
use serde_json::{json, Value};
use sparkify_etl::etl::{EtlSettings, LoadOptions};
use sparkify_etl::warehouse::SqliteWarehouseStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Song and log directories plus a warehouse path, all inside one temp dir.
pub struct TestDataset {
    // Kept alive for the lifetime of the dataset
    _dir: TempDir,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
}

impl TestDataset {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        fs::create_dir_all(&song_data).unwrap();
        fs::create_dir_all(&log_data).unwrap();
        let db_path = dir.path().join("sparkify.db");
        Self {
            _dir: dir,
            song_data,
            log_data,
            db_path,
        }
    }

    /// A dataset with the two reference songs and no logs.
    pub fn with_reference_songs() -> Self {
        let dataset = Self::new();
        dataset.write_song(
            "A/R/J/TRARJIE.json",
            &song_json(SONG_1_ID, SONG_1_TITLE, ARTIST_1_ID, ARTIST_1_NAME, SONG_1_DURATION),
        );
        dataset.write_song(
            "A/R/M/TRARMJA.json",
            &song_json(SONG_2_ID, SONG_2_TITLE, ARTIST_2_ID, ARTIST_2_NAME, SONG_2_DURATION),
        );
        dataset
    }

    pub fn write_song(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.song_data, relative, content)
    }

    /// Writes one event per line.
    pub fn write_log(&self, relative: &str, events: &[Value]) -> PathBuf {
        let content = events
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        write_file(&self.log_data, relative, &content)
    }

    pub fn open_store(&self) -> SqliteWarehouseStore {
        SqliteWarehouseStore::new(&self.db_path).unwrap()
    }

    pub fn settings(&self, options: LoadOptions) -> EtlSettings {
        EtlSettings {
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            options,
        }
    }

    /// Raw connection for asserting on table contents.
    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).unwrap()
    }

    /// (start_time, user_id, level, song_id, artist_id, session_id) of every songplay.
    pub fn songplays(&self) -> Vec<(String, String, String, Option<String>, Option<String>, i64)> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(
                "SELECT start_time, user_id, level, song_id, artist_id, session_id \
                 FROM songplays ORDER BY songplay_id",
            )
            .unwrap();
        stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
    }
}

fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn song_json(song_id: &str, title: &str, artist_id: &str, artist_name: &str, duration: f64) -> String {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0,
    })
    .to_string()
}

/// A "NextSong" event in the layout of the activity logs.
pub fn play_event(user_id: &str, level: &str, song: &str, artist: &str, length: f64, ts: i64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Summers",
        "length": length,
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
        "userId": user_id,
    })
}

/// A non-song event; these carry nulls where a play would carry song data.
pub fn page_event(page: &str, user_id: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 1,
        "lastName": "Summers",
        "length": null,
        "level": "free",
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "GET",
        "page": page,
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
        "userId": user_id,
    })
}
