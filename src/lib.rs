//! Sparkify warehouse loader library
//!
//! Loads song metadata and user activity logs into a star schema
//! (songs, artists, users, time, songplays) stored in SQLite.

pub mod config;
pub mod etl;
pub mod sqlite_persistence;
pub mod warehouse;

pub use etl::{run_pipeline, EtlError, EtlSettings};
pub use warehouse::{SqliteWarehouseStore, WarehouseStore};
