//! Common test infrastructure
//!
//! Integration tests build a throwaway dataset on disk with [`TestDataset`],
//! run the loader against it and inspect the resulting warehouse.

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{page_event, play_event, song_json, TestDataset};
