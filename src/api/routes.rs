use super::error::ApiError;
use super::form::Form;
use super::AppState;
use crate::catalog::models::parse_photo_date;
use crate::catalog::{AvatarSlot, NewSong, Owner, Photo, Settings, SettingsPatch, Song, Stats};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Ack {
    ok: bool,
}

const ACK: Ack = Ack { ok: true };

#[derive(Debug, Deserialize)]
pub struct MusicQuery {
    owner: Option<String>,
}

// ---- settings ----

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    let settings = state.with_catalog(|catalog| Ok(catalog.settings().clone())).await?;
    Ok(Json(settings))
}

pub async fn put_settings(
    State(state): State<AppState>,
    patch: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(patch) = patch?;
    let settings = state
        .with_catalog(move |catalog| Ok(catalog.update_settings(patch)?))
        .await?;
    Ok(Json(settings))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Settings>, ApiError> {
    let mut form = Form::read(multipart, state.max_upload_bytes).await?;
    let slot: AvatarSlot = form
        .text("which")
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::BadRequest)?;

    let avatar = form.take_file("avatar");
    let settings = state
        .with_catalog(move |catalog| Ok(catalog.set_avatar(slot, avatar)?))
        .await?;
    Ok(Json(settings))
}

pub async fn upload_background(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Settings>, ApiError> {
    let mut form = Form::read(multipart, state.max_upload_bytes).await?;
    let background = form.take_file("background");
    let settings = state
        .with_catalog(move |catalog| Ok(catalog.set_background(background)?))
        .await?;
    Ok(Json(settings))
}

// ---- photos ----

pub async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<Photo>>, ApiError> {
    let photos = state.with_catalog(|catalog| Ok(catalog.photos().to_vec())).await?;
    Ok(Json(photos))
}

pub async fn create_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Photo>), ApiError> {
    let mut form = Form::read(multipart, state.max_upload_bytes).await?;
    let photo_date = form
        .text("photoDate")
        .map(|raw| {
            parse_photo_date(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("invalid photoDate {:?}", raw)))
        })
        .transpose()?;
    let caption = form.text("caption").map(str::to_string);

    let upload = form.take_file("photo");
    let photo = state
        .with_catalog(move |catalog| Ok(catalog.add_photo(upload, caption, photo_date)?))
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn delete_photo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Ack>, ApiError> {
    // unknown or malformed ids are already "deleted"
    if let Ok(id) = Uuid::parse_str(&id) {
        state
            .with_catalog(move |catalog| Ok(catalog.delete_photo(id)?))
            .await?;
    } else {
        debug!("Ignoring delete of malformed photo id {:?}", id);
    }
    Ok(Json(ACK))
}

// ---- music ----

pub async fn list_music(
    State(state): State<AppState>,
    Query(query): Query<MusicQuery>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let filter = match query.owner.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        None => None,
        Some(owner) => match owner.parse::<Owner>() {
            Ok(owner) => Some(owner),
            // nobody else owns songs
            Err(_) => return Ok(Json(Vec::new())),
        },
    };
    let songs = state
        .with_catalog(move |catalog| Ok(catalog.list_songs(filter).into_iter().cloned().collect()))
        .await?;
    Ok(Json(songs))
}

pub async fn create_song(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    let mut form = Form::read(multipart, state.max_upload_bytes).await?;
    let owner = form
        .text("owner")
        .map(|raw| raw.parse::<Owner>().map_err(ApiError::BadRequest))
        .transpose()?;

    let fields = NewSong {
        title: form.text("title").unwrap_or_default().to_string(),
        artist: form.text("artist").map(str::to_string),
        owner,
        url: form.text("url").map(str::to_string),
    };
    let audio = form.take_file("audio");
    let cover = form.take_file("cover");

    let song = state
        .with_catalog(move |catalog| Ok(catalog.add_song(fields, audio, cover)?))
        .await?;
    Ok((StatusCode::CREATED, Json(song)))
}

pub async fn delete_song(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Ack>, ApiError> {
    if let Ok(id) = Uuid::parse_str(&id) {
        state
            .with_catalog(move |catalog| Ok(catalog.delete_song(id)?))
            .await?;
    } else {
        debug!("Ignoring delete of malformed song id {:?}", id);
    }
    Ok(Json(ACK))
}

// ---- stats ----

pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let stats = state.with_catalog(|catalog| Ok(catalog.stats(Utc::now()))).await?;
    Ok(Json(stats))
}
