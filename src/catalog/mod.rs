// Media catalog - the only gateway to persisted state
// Ties every photo/song record to the asset(s) it references

pub mod models;

pub use models::{
    AvatarSlot, BackgroundType, NewSong, Owner, Photo, Settings, SettingsPatch, Song, Stats,
    Upload,
};

use crate::config::StorageConfig;
use crate::store::{
    AssetError, AssetId, AssetKind, AssetStore, PhotosCollection, RecordStore, SettingsCollection,
    SongsCollection, StoreError,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    /// Storing an asset failed; nothing was recorded. `orphaned` lists assets
    /// from the same request that were already stored.
    #[error("failed to store {kind} asset: {source}")]
    AssetSave {
        kind: AssetKind,
        #[source]
        source: AssetError,
        orphaned: Vec<String>,
    },
    /// Writing the collection failed after the assets were stored. The
    /// listed assets now have no record.
    #[error("failed to persist record: {source}")]
    Persist {
        #[source]
        source: StoreError,
        orphaned: Vec<String>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl CatalogError {
    /// Rejected input, as opposed to a storage failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CatalogError::Validation(_) | CatalogError::TooLarge { .. })
    }

    /// Assets left without a record by a failed create.
    pub fn orphaned_assets(&self) -> &[String] {
        match self {
            CatalogError::AssetSave { orphaned, .. } | CatalogError::Persist { orphaned, .. } => {
                orphaned
            }
            _ => &[],
        }
    }
}

/// An asset that could not be removed while deleting its record.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCleanupFailure {
    pub url: String,
    pub error: String,
}

/// Result of a best-effort delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    /// False when the id was unknown.
    pub removed: bool,
    pub asset_failures: Vec<AssetCleanupFailure>,
}

impl DeleteOutcome {
    pub fn is_clean(&self) -> bool {
        self.asset_failures.is_empty()
    }
}

pub struct MediaCatalog {
    records: RecordStore,
    assets: AssetStore,
    settings: Settings,
    photos: Vec<Photo>,
    songs: Vec<Song>,
}

impl MediaCatalog {
    pub fn open(config: &StorageConfig) -> Result<Self, CatalogError> {
        let records = RecordStore::open(&config.data_dir)?;
        let assets = AssetStore::open(&config.uploads_dir, config.max_upload_bytes)?;
        Self::from_parts(records, assets)
    }

    pub fn from_parts(records: RecordStore, assets: AssetStore) -> Result<Self, CatalogError> {
        let settings = records.get::<SettingsCollection>()?;
        let photos = records.get::<PhotosCollection>()?;
        let songs = records.get::<SongsCollection>()?;

        info!(
            "Catalog loaded: {} photos, {} songs from {}",
            photos.len(),
            songs.len(),
            records.data_dir().display()
        );

        Ok(Self {
            records,
            assets,
            settings,
            photos,
            songs,
        })
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    // ---- settings ----

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings, CatalogError> {
        let mut settings = self.records.get::<SettingsCollection>()?;
        settings.merge(patch);
        self.records.put::<SettingsCollection>(&settings)?;
        self.settings = settings.clone();
        info!("Settings updated");
        Ok(settings)
    }

    pub fn set_avatar(&mut self, slot: AvatarSlot, upload: Option<Upload>) -> Result<Settings, CatalogError> {
        let upload = require_file(upload, "avatar")?;
        let id = self.store_assets(&[(AssetKind::Avatar, &upload)])?.remove(0);

        let mut settings = self.records.get::<SettingsCollection>()?;
        let slot_url = match slot {
            AvatarSlot::First => &mut settings.avatar1_url,
            AvatarSlot::Second => &mut settings.avatar2_url,
        };
        let previous = slot_url.replace(id.url());
        self.persist_settings(settings.clone(), &[id])?;

        if let Some(previous) = previous {
            self.remove_asset_url(&previous);
        }
        Ok(settings)
    }

    pub fn set_background(&mut self, upload: Option<Upload>) -> Result<Settings, CatalogError> {
        let upload = require_file(upload, "background")?;
        let id = self.store_assets(&[(AssetKind::Background, &upload)])?.remove(0);

        let mut settings = self.records.get::<SettingsCollection>()?;
        settings.background_type = BackgroundType::Image;
        let previous = settings.background_url.replace(id.url());
        self.persist_settings(settings.clone(), &[id])?;

        if let Some(previous) = previous {
            self.remove_asset_url(&previous);
        }
        Ok(settings)
    }

    fn persist_settings(&mut self, settings: Settings, stored: &[AssetId]) -> Result<(), CatalogError> {
        self.records
            .put::<SettingsCollection>(&settings)
            .map_err(|source| persist_failed(source, stored))?;
        self.settings = settings;
        Ok(())
    }

    // ---- photos ----

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Store the image, then append and persist its record.
    pub fn add_photo(
        &mut self,
        upload: Option<Upload>,
        caption: Option<String>,
        photo_date: Option<NaiveDate>,
    ) -> Result<Photo, CatalogError> {
        let upload = require_file(upload, "photo")?;
        let id = self.store_assets(&[(AssetKind::Photo, &upload)])?.remove(0);

        let now = Utc::now();
        let photo = Photo {
            id: Uuid::new_v4(),
            url: id.url(),
            caption: caption.map(|c| c.trim().to_string()).unwrap_or_default(),
            photo_date: photo_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        };

        let mut photos = self.records.get::<PhotosCollection>()?;
        photos.push(photo.clone());
        self.records
            .put::<PhotosCollection>(&photos)
            .map_err(|source| persist_failed(source, &[id]))?;
        self.photos = photos;

        info!("Added photo {} ({})", photo.id, photo.url);
        Ok(photo)
    }

    /// Remove a photo and its image. Unknown ids succeed without changes.
    pub fn delete_photo(&mut self, id: Uuid) -> Result<DeleteOutcome, CatalogError> {
        let mut photos = self.records.get::<PhotosCollection>()?;
        let Some(pos) = photos.iter().position(|p| p.id == id) else {
            return Ok(DeleteOutcome::default());
        };

        let photo = photos.remove(pos);
        let mut outcome = DeleteOutcome {
            removed: true,
            asset_failures: Vec::new(),
        };
        self.cleanup_asset(&photo.url, &mut outcome);

        self.records.put::<PhotosCollection>(&photos)?;
        self.photos = photos;

        info!("Deleted photo {}", id);
        Ok(outcome)
    }

    // ---- songs ----

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs in catalog order, optionally for one owner only.
    pub fn list_songs(&self, owner: Option<Owner>) -> Vec<&Song> {
        self.songs
            .iter()
            .filter(|song| owner.map_or(true, |owner| song.owner == owner))
            .collect()
    }

    pub fn add_song(
        &mut self,
        fields: NewSong,
        audio: Option<Upload>,
        cover: Option<Upload>,
    ) -> Result<Song, CatalogError> {
        let title = fields.title.trim().to_string();
        if title.is_empty() {
            return Err(CatalogError::Validation("song title is required".to_string()));
        }

        let audio = audio.filter(|a| !a.is_empty());
        let cover = cover.filter(|c| !c.is_empty());
        let url = fields
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        if audio.is_none() && url.is_none() {
            return Err(CatalogError::Validation(
                "either an audio file or an external url is required".to_string(),
            ));
        }

        let mut uploads = Vec::new();
        if let Some(audio) = &audio {
            uploads.push((AssetKind::Audio, audio));
        }
        if let Some(cover) = &cover {
            uploads.push((AssetKind::Cover, cover));
        }
        let stored = self.store_assets(&uploads)?;

        let url_of = |kind: AssetKind| stored.iter().find(|id| id.kind() == kind).map(AssetId::url);
        let song = Song {
            id: Uuid::new_v4(),
            title,
            artist: fields.artist.map(|a| a.trim().to_string()).unwrap_or_default(),
            owner: fields.owner.unwrap_or_default(),
            url,
            file_url: url_of(AssetKind::Audio),
            cover_art_url: url_of(AssetKind::Cover),
            created_at: Utc::now(),
        };

        let mut songs = self.records.get::<SongsCollection>()?;
        songs.push(song.clone());
        self.records
            .put::<SongsCollection>(&songs)
            .map_err(|source| persist_failed(source, &stored))?;
        self.songs = songs;

        info!("Added song {} '{}' for {}", song.id, song.title, song.owner);
        Ok(song)
    }

    /// Remove a song, its audio and its cover. Unknown ids succeed without changes.
    pub fn delete_song(&mut self, id: Uuid) -> Result<DeleteOutcome, CatalogError> {
        let mut songs = self.records.get::<SongsCollection>()?;
        let Some(pos) = songs.iter().position(|s| s.id == id) else {
            return Ok(DeleteOutcome::default());
        };

        let song = songs.remove(pos);
        let mut outcome = DeleteOutcome {
            removed: true,
            asset_failures: Vec::new(),
        };
        // independent: a failing audio delete still lets the cover go
        for url in [&song.file_url, &song.cover_art_url].into_iter().flatten() {
            self.cleanup_asset(url, &mut outcome);
        }

        self.records.put::<SongsCollection>(&songs)?;
        self.songs = songs;

        info!("Deleted song {} '{}'", id, song.title);
        Ok(outcome)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        Stats::compute(&self.settings, self.photos.len(), self.songs.len(), now)
    }

    // ---- asset plumbing ----

    /// Size-check every upload first, then store them in order.
    fn store_assets(&self, uploads: &[(AssetKind, &Upload)]) -> Result<Vec<AssetId>, CatalogError> {
        for (_, upload) in uploads {
            self.assets.check_size(upload.len()).map_err(|e| match e {
                AssetError::TooLarge { size, limit } => CatalogError::TooLarge { size, limit },
                other => CatalogError::Asset(other),
            })?;
        }

        let mut stored: Vec<AssetId> = Vec::with_capacity(uploads.len());
        for (kind, upload) in uploads {
            match self.assets.save(*kind, upload.file_name.as_deref(), &upload.bytes) {
                Ok(id) => stored.push(id),
                Err(source) => {
                    let orphaned: Vec<String> = stored.iter().map(AssetId::url).collect();
                    if !orphaned.is_empty() {
                        warn!("Saving {} failed; leaving orphaned assets {:?}", kind, orphaned);
                    }
                    return Err(CatalogError::AssetSave {
                        kind: *kind,
                        source,
                        orphaned,
                    });
                }
            }
        }
        Ok(stored)
    }

    fn cleanup_asset(&self, url: &str, outcome: &mut DeleteOutcome) {
        let result = AssetId::from_url(url).and_then(|id| self.assets.delete(&id));
        if let Err(e) = result {
            warn!("Could not delete asset {}: {}", url, e);
            outcome.asset_failures.push(AssetCleanupFailure {
                url: url.to_string(),
                error: e.to_string(),
            });
        }
    }

    fn remove_asset_url(&self, url: &str) {
        let mut outcome = DeleteOutcome::default();
        self.cleanup_asset(url, &mut outcome);
    }
}

fn require_file(upload: Option<Upload>, field: &str) -> Result<Upload, CatalogError> {
    upload
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CatalogError::Validation(format!("no {} file", field)))
}

fn persist_failed(source: StoreError, stored: &[AssetId]) -> CatalogError {
    let orphaned: Vec<String> = stored.iter().map(AssetId::url).collect();
    warn!("Record write failed; assets {:?} are now orphaned", orphaned);
    CatalogError::Persist { source, orphaned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn catalog() -> (tempfile::TempDir, MediaCatalog) {
        catalog_with_limit(1024)
    }

    fn catalog_with_limit(limit: u64) -> (tempfile::TempDir, MediaCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorageConfig::rooted_at(dir.path());
        config.max_upload_bytes = limit;
        let catalog = MediaCatalog::open(&config).unwrap();
        (dir, catalog)
    }

    fn asset_bytes(catalog: &MediaCatalog, url: &str) -> Vec<u8> {
        let id = AssetId::from_url(url).unwrap();
        catalog.assets().read(&id).unwrap()
    }

    fn song(title: &str, owner: Owner, with_audio: bool) -> (NewSong, Option<Upload>) {
        let fields = NewSong {
            title: title.to_string(),
            artist: Some("Someone".to_string()),
            owner: Some(owner),
            url: (!with_audio).then(|| format!("https://example.com/{}", title)),
        };
        let audio = with_audio.then(|| Upload::new(format!("{}.mp3", title), title.as_bytes()));
        (fields, audio)
    }

    #[test]
    fn test_add_photo_stores_asset_and_record() {
        let (_dir, mut catalog) = catalog();
        let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();

        let photo = catalog
            .add_photo(
                Some(Upload::new("beach.jpg", b"sand".to_vec())),
                Some(" first trip ".to_string()),
                Some(date),
            )
            .unwrap();

        assert_eq!(catalog.photos().len(), 1);
        assert_eq!(photo.caption, "first trip");
        assert_eq!(photo.photo_date, date);
        assert_eq!(asset_bytes(&catalog, &photo.url), b"sand");
    }

    #[test]
    fn test_add_photo_without_file_is_rejected() {
        let (_dir, mut catalog) = catalog();
        let err = catalog.add_photo(None, None, None).unwrap_err();
        assert!(err.is_client_error());

        let err = catalog
            .add_photo(Some(Upload::new("empty.jpg", Vec::new())), None, None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(catalog.photos().is_empty());
    }

    #[test]
    fn test_oversized_photo_leaves_nothing_behind() {
        let (dir, mut catalog) = catalog_with_limit(3);
        let err = catalog
            .add_photo(Some(Upload::new("big.jpg", b"1234".to_vec())), None, None)
            .unwrap_err();

        assert!(matches!(err, CatalogError::TooLarge { size: 4, limit: 3 }));
        assert!(catalog.photos().is_empty());
        assert_eq!(fs::read_dir(dir.path().join("uploads/photos")).unwrap().count(), 0);
    }

    #[test]
    fn test_delete_photo_twice_is_idempotent() {
        let (_dir, mut catalog) = catalog();
        let photo = catalog
            .add_photo(Some(Upload::new("a.png", b"a".to_vec())), None, None)
            .unwrap();
        let asset = AssetId::from_url(&photo.url).unwrap();

        let first = catalog.delete_photo(photo.id).unwrap();
        assert!(first.removed);
        assert!(first.is_clean());
        assert!(!catalog.assets().exists(&asset));
        assert!(catalog.photos().is_empty());

        let second = catalog.delete_photo(photo.id).unwrap();
        assert_eq!(second, DeleteOutcome::default());
        assert!(catalog.photos().is_empty());
    }

    #[test]
    fn test_delete_photo_survives_broken_asset_reference() {
        let (_dir, mut catalog) = catalog();
        let mut photos = vec![Photo {
            id: Uuid::new_v4(),
            url: "/somewhere/else.png".to_string(),
            caption: String::new(),
            photo_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: Utc::now(),
        }];
        catalog.records.put::<PhotosCollection>(&photos).unwrap();
        let id = photos.remove(0).id;

        let outcome = catalog.delete_photo(id).unwrap();
        assert!(outcome.removed);
        assert_eq!(outcome.asset_failures.len(), 1);
        assert_eq!(outcome.asset_failures[0].url, "/somewhere/else.png");
        assert!(catalog.photos().is_empty());
    }

    #[test]
    fn test_add_song_requires_title_and_source() {
        let (_dir, mut catalog) = catalog();

        let err = catalog
            .add_song(
                NewSong {
                    title: "   ".to_string(),
                    url: Some("https://example.com".to_string()),
                    ..NewSong::default()
                },
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let err = catalog
            .add_song(
                NewSong {
                    title: "No source".to_string(),
                    url: Some("  ".to_string()),
                    ..NewSong::default()
                },
                None,
                Some(Upload::new("cover.jpg", b"c".to_vec())),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(catalog.songs().is_empty());
    }

    #[test]
    fn test_add_song_with_audio_and_cover() {
        let (_dir, mut catalog) = catalog();
        let song = catalog
            .add_song(
                NewSong {
                    title: "Perfect".to_string(),
                    artist: None,
                    owner: None,
                    url: None,
                },
                Some(Upload::new("perfect.mp3", b"mp3".to_vec())),
                Some(Upload::new("cover.png", b"png".to_vec())),
            )
            .unwrap();

        assert_eq!(song.owner, Owner::Tuyen);
        assert!(song.is_playable());
        assert_eq!(asset_bytes(&catalog, song.file_url.as_deref().unwrap()), b"mp3");
        assert_eq!(asset_bytes(&catalog, song.cover_art_url.as_deref().unwrap()), b"png");
        assert!(song.file_url.as_deref().unwrap().starts_with("/uploads/music/"));
        assert!(song.cover_art_url.as_deref().unwrap().starts_with("/uploads/covers/"));
    }

    #[test]
    fn test_oversized_cover_stores_no_audio() {
        let (dir, mut catalog) = catalog_with_limit(4);
        let err = catalog
            .add_song(
                NewSong {
                    title: "Too big".to_string(),
                    ..NewSong::default()
                },
                Some(Upload::new("a.mp3", b"ok".to_vec())),
                Some(Upload::new("c.png", b"too big".to_vec())),
            )
            .unwrap_err();

        assert!(matches!(err, CatalogError::TooLarge { .. }));
        assert_eq!(fs::read_dir(dir.path().join("uploads/music")).unwrap().count(), 0);
        assert!(catalog.songs().is_empty());
    }

    #[test]
    fn test_delete_song_removes_audio_and_cover() {
        let (_dir, mut catalog) = catalog();
        let song = catalog
            .add_song(
                NewSong {
                    title: "Lover".to_string(),
                    ..NewSong::default()
                },
                Some(Upload::new("lover.m4a", b"m4a".to_vec())),
                Some(Upload::new("lover.jpg", b"jpg".to_vec())),
            )
            .unwrap();
        let audio = AssetId::from_url(song.file_url.as_deref().unwrap()).unwrap();
        let cover = AssetId::from_url(song.cover_art_url.as_deref().unwrap()).unwrap();

        let outcome = catalog.delete_song(song.id).unwrap();
        assert!(outcome.removed && outcome.is_clean());
        assert!(!catalog.assets().exists(&audio));
        assert!(!catalog.assets().exists(&cover));
        assert!(catalog.songs().is_empty());

        assert!(!catalog.delete_song(song.id).unwrap().removed);
    }

    #[test]
    fn test_list_songs_filters_by_owner_in_order() {
        let (_dir, mut catalog) = catalog();
        for (title, owner, audio) in [
            ("A", Owner::Tuyen, true),
            ("B", Owner::Trang, false),
            ("C", Owner::Tuyen, false),
            ("D", Owner::Trang, true),
        ] {
            let (fields, upload) = song(title, owner, audio);
            catalog.add_song(fields, upload, None).unwrap();
        }

        let titles = |songs: Vec<&Song>| songs.iter().map(|s| s.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(catalog.list_songs(None)), ["A", "B", "C", "D"]);
        assert_eq!(titles(catalog.list_songs(Some(Owner::Tuyen))), ["A", "C"]);
        assert_eq!(titles(catalog.list_songs(Some(Owner::Trang))), ["B", "D"]);
    }

    #[test]
    fn test_update_settings_merges_and_persists() {
        let (dir, mut catalog) = catalog();
        catalog
            .update_settings(SettingsPatch {
                couple_name: Some("Y".to_string()),
                anniversary_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                ..SettingsPatch::default()
            })
            .unwrap();

        let updated = catalog
            .update_settings(SettingsPatch {
                couple_name: Some("X".to_string()),
                ..SettingsPatch::default()
            })
            .unwrap();
        assert_eq!(updated.couple_name, "X");
        assert_eq!(updated.anniversary_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        // reopened from disk
        let reopened = MediaCatalog::open(&StorageConfig::rooted_at(dir.path())).unwrap();
        assert_eq!(reopened.settings(), &updated);
    }

    #[test]
    fn test_new_avatar_replaces_old_asset() {
        let (_dir, mut catalog) = catalog();
        let first = catalog
            .set_avatar(AvatarSlot::Second, Some(Upload::new("me.png", b"1".to_vec())))
            .unwrap();
        let old_url = first.avatar2_url.clone().unwrap();
        assert!(first.avatar1_url.is_none());

        let second = catalog
            .set_avatar(AvatarSlot::Second, Some(Upload::new("me2.png", b"2".to_vec())))
            .unwrap();
        let new_url = second.avatar2_url.clone().unwrap();
        assert_ne!(old_url, new_url);
        assert!(!catalog.assets().exists(&AssetId::from_url(&old_url).unwrap()));
        assert_eq!(asset_bytes(&catalog, &new_url), b"2");
    }

    #[test]
    fn test_background_upload_switches_type() {
        let (_dir, mut catalog) = catalog();
        assert!(catalog.set_background(None).unwrap_err().is_client_error());

        let settings = catalog
            .set_background(Some(Upload::new("bg.jpg", b"bg".to_vec())))
            .unwrap();
        assert_eq!(settings.background_type, BackgroundType::Image);
        assert!(settings
            .background_url
            .as_deref()
            .unwrap()
            .starts_with("/uploads/backgrounds/"));
        assert_eq!(catalog.settings(), &settings);
    }

    #[test]
    fn test_stats_counts_snapshot() {
        let (_dir, mut catalog) = catalog();
        catalog
            .add_photo(Some(Upload::new("a.png", b"a".to_vec())), None, None)
            .unwrap();
        let (fields, audio) = song("A", Owner::Tuyen, true);
        catalog.add_song(fields, audio, None).unwrap();

        let stats = catalog.stats(Utc::now());
        assert_eq!(stats.photo_count, 1);
        assert_eq!(stats.song_count, 1);
        assert!(stats.days > 0);
    }

    #[test]
    fn test_documents_with_blank_refs_and_timestamp_dates_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::rooted_at(dir.path());
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(
            config.data_dir.join("music.json"),
            r#"[{"id":"0b0c6a55-6a4e-4f0e-9a38-3f1d0e0b8c11","title":"Link","artist":"",
                 "owner":"tuyen","url":"https://youtu.be/x","fileUrl":"","coverArtUrl":"",
                 "createdAt":"2025-02-14T18:30:00.000Z"},
                {"id":"5f3a1f5e-2d7e-4c55-8a0e-0f6f0d7f6b22","title":"Stored","artist":"",
                 "owner":"tuyen","url":"","fileUrl":"/uploads/music/a.mp3","coverArtUrl":"",
                 "createdAt":"2025-02-14T18:30:00.000Z"}]"#,
        )
        .unwrap();
        fs::write(
            config.data_dir.join("photos.json"),
            r#"[{"id":"9d1c6a55-6a4e-4f0e-9a38-3f1d0e0b8c11","url":"/uploads/photos/a.jpg",
                 "caption":"","photoDate":"2025-02-14T18:30:00.000Z",
                 "createdAt":"2025-02-14T18:30:00.000Z"}]"#,
        )
        .unwrap();

        let catalog = MediaCatalog::open(&config).unwrap();
        assert_eq!(catalog.photos()[0].photo_date, NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());

        let songs = catalog.songs();
        assert!(songs[0].is_link_only());
        assert_eq!(songs[1].url, None);
        let playlist = crate::player::derive_playlist(songs, Owner::Tuyen);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist[0].title, "Stored");
    }
}
