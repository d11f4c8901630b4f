// Document store - one JSON file per collection, plus the asset blobs they point at
// Every write replaces the whole collection; there is no partial update primitive

pub mod assets;

pub use assets::{AssetError, AssetId, AssetKind, AssetStore};

use crate::catalog::models::{Photo, Settings, Song};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("collection '{collection}' is corrupt: {source}")]
    Corrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize collection '{collection}': {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error on collection '{collection}': {source}")]
    Io {
        collection: &'static str,
        #[source]
        source: io::Error,
    },
}

/// A named, whole-document collection.
pub trait Collection {
    /// File name inside the data directory.
    const FILE: &'static str;
    type Value: Serialize + DeserializeOwned;

    /// Written the first time the collection is read and found absent.
    fn initial() -> Self::Value;
}

/// The settings singleton.
pub struct SettingsCollection;

pub struct PhotosCollection;

pub struct SongsCollection;

impl Collection for SettingsCollection {
    const FILE: &'static str = "settings.json";
    type Value = Settings;

    fn initial() -> Settings {
        Settings::default()
    }
}

impl Collection for PhotosCollection {
    const FILE: &'static str = "photos.json";
    type Value = Vec<Photo>;

    fn initial() -> Vec<Photo> {
        Vec::new()
    }
}

impl Collection for SongsCollection {
    const FILE: &'static str = "music.json";
    type Value = Vec<Song>;

    fn initial() -> Vec<Song> {
        Vec::new()
    }
}

/// Whole-collection read/rewrite over a data directory.
///
/// Updates are read-modify-write: `get`, mutate in memory, `put`. Two writers
/// interleaving on the same collection lose one side's change (last write
/// wins). Callers keep a single writer per process; the HTTP layer does this
/// by holding the catalog behind one lock.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    /// Open the store and make sure every collection exists and parses.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
                collection: "<data dir>",
                source,
            })?;
            info!("Created data directory: {}", data_dir.display());
        }

        let store = Self { data_dir };
        store.get::<SettingsCollection>()?;
        store.get::<PhotosCollection>()?;
        store.get::<SongsCollection>()?;

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Read a collection, initialising it with its defaults if absent.
    ///
    /// A document that exists but does not parse is an error, never an empty
    /// collection.
    pub fn get<C: Collection>(&self) -> Result<C::Value, StoreError> {
        let path = self.path_of::<C>();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let value = C::initial();
                self.put::<C>(&value)?;
                info!("Initialised {} with defaults", C::FILE);
                return Ok(value);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    collection: C::FILE,
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            collection: C::FILE,
            source,
        })
    }

    /// Overwrite a whole collection.
    pub fn put<C: Collection>(&self, value: &C::Value) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
            collection: C::FILE,
            source,
        })?;

        // temp + rename so readers never see half a document
        let path = self.path_of::<C>();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| StoreError::Io {
                collection: C::FILE,
                source,
            })?;

        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn path_of<C: Collection>(&self) -> PathBuf {
        self.data_dir.join(C::FILE)
    }
}
