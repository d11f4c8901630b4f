// HTTP API - JSON + multipart routes over the media catalog
// All catalog access goes through one mutex on the blocking pool, so the store only ever has one writer

mod error;
mod form;
mod routes;

pub use error::ApiError;

use crate::catalog::MediaCatalog;
use crate::store::assets::UPLOADS_PREFIX;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

// room for the form's text fields and multipart framing
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Mutex<MediaCatalog>>,
    uploads_dir: PathBuf,
    max_upload_bytes: u64,
}

impl AppState {
    pub fn new(catalog: MediaCatalog) -> Self {
        let uploads_dir = catalog.assets().root().to_path_buf();
        let max_upload_bytes = catalog.assets().max_bytes();
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            uploads_dir,
            max_upload_bytes,
        }
    }

    /// Run `f` against the catalog on the blocking pool. Catalog calls do
    /// synchronous file I/O, so they never run on a runtime worker.
    pub(crate) async fn with_catalog<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut MediaCatalog) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        tokio::task::spawn_blocking(move || {
            // a panicked request leaves the snapshot as it was last persisted
            let mut catalog = catalog.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut catalog)
        })
        .await?
    }
}

/// Build the full application: API routes, stored assets under `/uploads`,
/// and optionally a front-end directory for everything else.
pub fn router(state: AppState, web_dir: Option<&Path>) -> Router {
    let uploads = ServeDir::new(&state.uploads_dir);

    // a song form carries audio and cover
    let body_limit = state
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let mut app = Router::new()
        .route("/api/settings", get(routes::get_settings).put(routes::put_settings))
        .route("/api/settings/avatar", post(routes::upload_avatar))
        .route("/api/settings/background", post(routes::upload_background))
        .route("/api/photos", get(routes::list_photos).post(routes::create_photo))
        .route("/api/photos/:id", delete(routes::delete_photo))
        .route("/api/music", get(routes::list_music).post(routes::create_song))
        .route("/api/music/:id", delete(routes::delete_song))
        .route("/api/stats", get(routes::stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .nest_service(UPLOADS_PREFIX, uploads)
        .with_state(state);

    if let Some(web_dir) = web_dir {
        info!("Serving web UI from {}", web_dir.display());
        let spa_fallback = ServeDir::new(web_dir).fallback(ServeFile::new(web_dir.join("index.html")));
        app = app.fallback_service(spa_fallback);
    }

    app.layer(TraceLayer::new_for_http())
}
