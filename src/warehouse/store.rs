//! SQLite-backed warehouse store implementation.

use super::models::{
    ArtistRow, SongMatch, SongRow, SongplayRow, TimeRow, UserRow, WarehouseCounts,
};
use super::schema::WAREHOUSE_VERSIONED_SCHEMAS;
use super::trait_def::WarehouseStore;
use crate::sqlite_persistence::read_schema_version;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const FILE_SAVEPOINT: &str = "file_unit";

/// SQLite-backed warehouse.
///
/// Every source file is loaded inside a savepoint of one outer transaction, so
/// a failing file can be discarded without touching the files loaded before it,
/// and `commit` decides when the finished files become durable.
#[derive(Clone)]
pub struct SqliteWarehouseStore {
    conn: Arc<Mutex<Connection>>,
}

fn prepare_schema(conn: &Connection) -> Result<()> {
    let latest_version = WAREHOUSE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &WAREHOUSE_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let version = match read_schema_version(conn)? {
        Some(version) => version,
        None => bail!("Database is not a warehouse database (unknown user_version)"),
    };
    if version > latest_version {
        bail!("Database version {} is too new", version);
    }
    if version < latest_version {
        bail!(
            "Database version {} is older than {} and schema migration is not supported",
            version,
            latest_version
        );
    }

    WAREHOUSE_VERSIONED_SCHEMAS[version].validate(conn)
}

impl SqliteWarehouseStore {
    /// Open the warehouse at `db_path`, creating the file and the schema when absent.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open warehouse database {:?}", db_path_ref))?;

        prepare_schema(&conn)
            .with_context(|| format!("Invalid warehouse database {:?}", db_path_ref))?;

        let counts = Self::count_rows(&conn)?;
        info!(
            "Opened warehouse: {} songs, {} artists, {} users, {} time rows, {} songplays",
            counts.songs, counts.artists, counts.users, counts.time, counts.songplays
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Warehouse connection mutex poisoned"))
    }

    fn count_rows(conn: &Connection) -> Result<WarehouseCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(WarehouseCounts {
            songs: count("songs")?,
            artists: count("artists")?,
            users: count("users")?,
            time: count("time")?,
            songplays: count("songplays")?,
        })
    }
}

impl WarehouseStore for SqliteWarehouseStore {
    fn insert_song(&self, song: &SongRow) -> Result<()> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (song_id) DO NOTHING",
        )?
        .execute(params![
            song.song_id,
            song.title,
            song.artist_id,
            song.year,
            song.duration
        ])
        .with_context(|| format!("Failed to insert song {}", song.song_id))?;
        Ok(())
    }

    fn insert_artist(&self, artist: &ArtistRow) -> Result<()> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (artist_id) DO NOTHING",
        )?
        .execute(params![
            artist.artist_id,
            artist.name,
            artist.location,
            artist.latitude,
            artist.longitude
        ])
        .with_context(|| format!("Failed to insert artist {}", artist.artist_id))?;
        Ok(())
    }

    fn insert_user(&self, user: &UserRow) -> Result<()> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET level = excluded.level",
        )?
        .execute(params![
            user.user_id,
            user.first_name,
            user.last_name,
            user.gender,
            user.level
        ])
        .with_context(|| format!("Failed to insert user {}", user.user_id))?;
        Ok(())
    }

    fn insert_time(&self, time: &TimeRow) -> Result<()> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (start_time) DO NOTHING",
        )?
        .execute(params![
            time.start_time,
            time.hour,
            time.day,
            time.week,
            time.month,
            time.year,
            time.weekday
        ])
        .with_context(|| format!("Failed to insert time {}", time.start_time))?;
        Ok(())
    }

    fn insert_songplay(&self, songplay: &SongplayRow) -> Result<()> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO songplays
             (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?
        .execute(params![
            songplay.start_time,
            songplay.user_id,
            songplay.level,
            songplay.song_id,
            songplay.artist_id,
            songplay.session_id,
            songplay.location,
            songplay.user_agent
        ])
        .with_context(|| {
            format!(
                "Failed to insert songplay of user {} at {}",
                songplay.user_id, songplay.start_time
            )
        })?;
        Ok(())
    }

    fn find_song_match(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>> {
        let conn = self.conn()?;
        let found = conn
            .prepare_cached(
                "SELECT s.song_id, a.artist_id
                 FROM songs s
                 JOIN artists a ON s.artist_id = a.artist_id
                 WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
                 ORDER BY s.song_id
                 LIMIT 1",
            )?
            .query_row(params![title, artist_name, duration], |row| {
                Ok(SongMatch {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        Ok(found)
    }

    fn begin_file(&self) -> Result<()> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        conn.execute_batch(&format!("SAVEPOINT {}", FILE_SAVEPOINT))?;
        Ok(())
    }

    fn finish_file(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(&format!("RELEASE SAVEPOINT {}", FILE_SAVEPOINT))?;
        Ok(())
    }

    fn abandon_file(&self) -> Result<()> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {0}; RELEASE SAVEPOINT {0};",
            FILE_SAVEPOINT
        ))?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("COMMIT").context("Failed to commit")?;
        debug!("Committed pending warehouse writes");
        Ok(())
    }

    fn get_counts(&self) -> Result<WarehouseCounts> {
        let conn = self.conn()?;
        Self::count_rows(&conn)
    }
}
