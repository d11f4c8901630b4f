// LoveNest Library - storage, catalog, HTTP API and the playback core
// The binary only wires config, logging and the server together

pub mod api;       // axum routes over the catalog
pub mod catalog;   // settings, photos, songs + their assets
pub mod config;    // settings and preferences
pub mod player;    // playlist state machine and its runtime
pub mod store;     // JSON collections and blob storage

// Export the stuff other modules actually use
pub use api::{router, ApiError, AppState};
pub use catalog::{CatalogError, MediaCatalog, Owner, Photo, Settings, Song};
pub use config::Config;
pub use player::{PlaybackController, PlayerEvent, PlayerRuntime};
pub use store::{AssetStore, RecordStore};
