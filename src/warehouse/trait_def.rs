//! WarehouseStore trait definition.

use super::models::{
    ArtistRow, SongMatch, SongRow, SongplayRow, TimeRow, UserRow, WarehouseCounts,
};
use anyhow::Result;

/// Write side of the analytical warehouse, plus the one lookup the log loader needs.
///
/// Idempotency of the inserts is the store's business: dimension inserts must
/// tolerate rows that are already present.
pub trait WarehouseStore: Send + Sync {
    // =========================================================================
    // Inserts
    // =========================================================================

    /// Insert a song. An already known song_id is left untouched.
    fn insert_song(&self, song: &SongRow) -> Result<()>;

    /// Insert an artist. An already known artist_id is left untouched.
    fn insert_artist(&self, artist: &ArtistRow) -> Result<()>;

    /// Insert a user, or update the subscription level of a known one.
    fn insert_user(&self, user: &UserRow) -> Result<()>;

    /// Insert a time row. An already known start_time is left untouched.
    fn insert_time(&self, time: &TimeRow) -> Result<()>;

    /// Append a songplay.
    fn insert_songplay(&self, songplay: &SongplayRow) -> Result<()>;

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the song and artist ids for an exact (title, artist name, duration) match.
    /// Returns Ok(None) when nothing matches.
    fn find_song_match(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>>;

    // =========================================================================
    // Unit of work
    // =========================================================================

    /// Start the unit of work for one source file.
    fn begin_file(&self) -> Result<()>;

    /// Keep everything written since `begin_file`. Nothing is durable until `commit`.
    fn finish_file(&self) -> Result<()>;

    /// Discard everything written since `begin_file`.
    fn abandon_file(&self) -> Result<()>;

    /// Make every finished file durable. A no-op when nothing is pending.
    fn commit(&self) -> Result<()>;

    // =========================================================================
    // Statistics
    // =========================================================================

    fn get_counts(&self) -> Result<WarehouseCounts>;
}
