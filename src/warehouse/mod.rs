mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{
    ArtistRow, SongMatch, SongRow, SongplayRow, TimeRow, UserRow, WarehouseCounts,
};
pub use store::SqliteWarehouseStore;
pub use trait_def::WarehouseStore;
