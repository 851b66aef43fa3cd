//! Extract-transform-load of the song and activity log datasets.

mod driver;
mod error;
mod fields;
mod locator;
mod log_file;
mod song_file;
mod time;

pub use driver::{
    process_data, process_data_with, run_pipeline, EtlSettings, FileFamily, FileStats,
    LoadOptions, LoadReport, OnFileError, ProcessFn, RunSummary, SkippedFile,
};
pub use error::EtlError;
pub use locator::find_files;
pub use log_file::{
    load_log_batch, parse_log_events, process_log_file, LogBatch, PlayEvent, NEXT_SONG_PAGE,
};
pub use song_file::{parse_song_record, process_song_file};
pub use time::{format_start_time, timestamp_from_millis, START_TIME_FORMAT};
