use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Public prefix every stored asset is served under.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Errors from raw asset storage.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("not an asset url: {0}")]
    BadUrl(String),
    #[error("asset I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Which partition an asset lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Photo,
    Audio,
    Cover,
    Avatar,
    Background,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Photo,
        AssetKind::Audio,
        AssetKind::Cover,
        AssetKind::Avatar,
        AssetKind::Background,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            AssetKind::Photo => "photos",
            AssetKind::Audio => "music",
            AssetKind::Cover => "covers",
            AssetKind::Avatar => "avatars",
            AssetKind::Background => "backgrounds",
        }
    }

    pub fn from_dir_name(dir: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == dir)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Photo => "photo",
            AssetKind::Audio => "audio",
            AssetKind::Cover => "cover",
            AssetKind::Avatar => "avatar",
            AssetKind::Background => "background",
        };
        f.write_str(name)
    }
}

/// A stored blob: its partition plus a generated file name (`<uuid>.<ext>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId {
    kind: AssetKind,
    file_name: String,
}

impl AssetId {
    /// Fresh identifier. Only the extension of the original name survives.
    pub fn generate(kind: AssetKind, original_name: Option<&str>) -> Self {
        let stem = Uuid::new_v4().to_string();
        let file_name = match original_name.and_then(sanitized_extension) {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        };
        Self { kind, file_name }
    }

    /// Parse `/uploads/<dir>/<file>` back into an identifier.
    pub fn from_url(url: &str) -> Result<Self, AssetError> {
        let bad = || AssetError::BadUrl(url.to_string());
        let rest = url
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(bad)?;
        let (dir, file_name) = rest.split_once('/').ok_or_else(bad)?;
        let kind = AssetKind::from_dir_name(dir).ok_or_else(bad)?;

        // no traversal out of the partition
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.starts_with('.')
        {
            return Err(bad());
        }

        Ok(Self {
            kind,
            file_name: file_name.to_string(),
        })
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn url(&self) -> String {
        format!("{}/{}/{}", UPLOADS_PREFIX, self.kind.dir_name(), self.file_name)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.dir_name(), self.file_name)
    }
}

/// Remove a half-written file. Returns false (and logs) when it could not be removed.
fn discard_partial(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not remove partial asset {}: {}", path.display(), e);
            false
        }
    }
}

fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Binary blobs on disk, one directory per [`AssetKind`].
///
/// Writes for different identifiers never touch the same file, so saves can
/// run concurrently.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    max_bytes: u64,
}

impl AssetStore {
    pub fn open(root: impl Into<PathBuf>, max_bytes: u64) -> Result<Self, AssetError> {
        let root = root.into();
        for kind in AssetKind::ALL {
            let dir = root.join(kind.dir_name());
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
                info!("Created asset directory: {}", dir.display());
            }
        }

        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn check_size(&self, size: u64) -> Result<(), AssetError> {
        if size > self.max_bytes {
            return Err(AssetError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Store `bytes` under a new identifier in the partition for `kind`.
    pub fn save(
        &self,
        kind: AssetKind,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<AssetId, AssetError> {
        self.check_size(bytes.len() as u64)?;

        let id = AssetId::generate(kind, original_name);
        let path = self.path_for(&id);

        // create_new: an identifier is never overwritten
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        let written = file.write_all(bytes).and_then(|_| file.sync_all());
        if let Err(e) = written {
            drop(file);
            discard_partial(&path);
            return Err(e.into());
        }

        info!("Stored {} asset {} ({} bytes)", kind, id, bytes.len());
        Ok(id)
    }

    pub fn read(&self, id: &AssetId) -> Result<Vec<u8>, AssetError> {
        Ok(fs::read(self.path_for(id))?)
    }

    pub fn exists(&self, id: &AssetId) -> bool {
        self.path_for(id).is_file()
    }

    /// Remove an asset. Missing assets are fine.
    pub fn delete(&self, id: &AssetId) -> Result<(), AssetError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                info!("Deleted asset {}", id);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Asset {} already gone", id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn url_for(&self, id: &AssetId) -> String {
        id.url()
    }

    pub fn path_for(&self, id: &AssetId) -> PathBuf {
        self.root.join(id.kind.dir_name()).join(&id.file_name)
    }
}
