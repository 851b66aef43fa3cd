//! Load driver: walks a data directory and feeds every file through its processor,
//! one unit of work per file.

use super::error::EtlError;
use super::locator::find_files;
use super::log_file::process_log_file;
use super::song_file::process_song_file;
use crate::warehouse::{WarehouseCounts, WarehouseStore};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Loads one file into the store and reports what it wrote.
pub type ProcessFn = fn(&dyn WarehouseStore, &Path) -> Result<FileStats, EtlError>;

/// Rows written while loading one or more files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub songs: usize,
    pub artists: usize,
    pub time_rows: usize,
    pub users: usize,
    pub songplays: usize,
    /// Songplays whose song and artist ids were resolved.
    pub matched_songplays: usize,
}

impl FileStats {
    pub fn merge(&mut self, other: &FileStats) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.time_rows += other.time_rows;
        self.users += other.users;
        self.songplays += other.songplays;
        self.matched_songplays += other.matched_songplays;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFamily {
    Song,
    Log,
}

impl FileFamily {
    pub fn processor(self) -> ProcessFn {
        match self {
            FileFamily::Song => process_song_file,
            FileFamily::Log => process_log_file,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileFamily::Song => "song",
            FileFamily::Log => "log",
        }
    }
}

/// What to do when a file fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnFileError {
    /// Discard the failing file, keep the finished ones and stop.
    #[default]
    Abort,
    /// Discard the failing file, log the error and go on with the next one.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Extension of the data files, without the dot.
    pub extension: String,
    pub on_error: OnFileError,
    /// Commit after this many finished files. Values below 1 behave like 1.
    pub commit_every: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            on_error: OnFileError::Abort,
            commit_every: 1,
        }
    }
}

/// A file discarded under [`OnFileError::Skip`].
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: EtlError,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub files_found: usize,
    pub files_loaded: usize,
    pub skipped: Vec<SkippedFile>,
    pub stats: FileStats,
}

/// Everything a full run needs besides the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlSettings {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub options: LoadOptions,
}

#[derive(Debug)]
pub struct RunSummary {
    pub songs: LoadReport,
    pub logs: LoadReport,
    /// Row counts after the run, `None` when they could not be read.
    pub counts: Option<WarehouseCounts>,
}

/// Load every file of `family` found under `root`.
pub fn process_data(
    store: &dyn WarehouseStore,
    root: &Path,
    family: FileFamily,
    options: &LoadOptions,
) -> Result<LoadReport, EtlError> {
    info!("Loading {} data from {}", family.label(), root.display());
    process_data_with(store, root, family.processor(), options)
}

/// Load every matching file under `root` through `processor`.
pub fn process_data_with(
    store: &dyn WarehouseStore,
    root: &Path,
    processor: ProcessFn,
    options: &LoadOptions,
) -> Result<LoadReport, EtlError> {
    let files = find_files(root, &options.extension)?;
    let total = files.len();
    info!("{} files found in {}", total, root.display());

    let commit_every = options.commit_every.max(1);
    let mut report = LoadReport {
        files_found: total,
        ..Default::default()
    };
    let mut pending = 0;

    for (index, path) in files.into_iter().enumerate() {
        store
            .begin_file()
            .map_err(|e| EtlError::store(&path, e))?;

        match processor(store, &path) {
            Ok(stats) => {
                store
                    .finish_file()
                    .map_err(|e| EtlError::store(&path, e))?;
                report.stats.merge(&stats);
                report.files_loaded += 1;

                pending += 1;
                if pending >= commit_every {
                    store.commit().map_err(|e| EtlError::store(&path, e))?;
                    pending = 0;
                }
                info!("{}/{} files processed.", index + 1, total);
            }
            Err(err) => {
                if let Err(e) = store.abandon_file() {
                    error!("Failed to load {}: {}", path.display(), err);
                    let source = e.context(format!("Discarding the file after: {}", err));
                    return Err(EtlError::store(&path, source));
                }
                match options.on_error {
                    OnFileError::Abort => {
                        store.commit().map_err(|e| EtlError::store(&path, e))?;
                        return Err(err);
                    }
                    OnFileError::Skip => {
                        error!(
                            "Skipping {} ({}/{}): {}",
                            path.display(),
                            index + 1,
                            total,
                            err
                        );
                        report.skipped.push(SkippedFile { path, error: err });
                    }
                }
            }
        }
    }

    store.commit().map_err(|e| EtlError::store(root, e))?;
    Ok(report)
}

/// Song pass, then log pass, so that songplays can be matched against the songs.
pub fn run_pipeline(
    store: &dyn WarehouseStore,
    settings: &EtlSettings,
) -> Result<RunSummary, EtlError> {
    let songs = process_data(store, &settings.song_data, FileFamily::Song, &settings.options)?;
    info!(
        "Song pass done: {} files loaded, {} skipped",
        songs.files_loaded,
        songs.skipped.len()
    );

    let logs = process_data(store, &settings.log_data, FileFamily::Log, &settings.options)?;
    info!(
        "Log pass done: {} files loaded, {} skipped, {}/{} songplays matched a song",
        logs.files_loaded,
        logs.skipped.len(),
        logs.stats.matched_songplays,
        logs.stats.songplays
    );

    let counts = match store.get_counts() {
        Ok(counts) => {
            info!(
                "Warehouse now holds {} songs, {} artists, {} users, {} time rows, {} songplays",
                counts.songs, counts.artists, counts.users, counts.time, counts.songplays
            );
            Some(counts)
        }
        Err(e) => {
            warn!("Could not read warehouse counts: {:#}", e);
            None
        }
    };

    Ok(RunSummary {
        songs,
        logs,
        counts,
    })
}
