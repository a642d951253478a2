// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::auth::store::StoreError;
use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{CreateSongRequest, Song, SongSummary};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/songs",
    tag = "Songs",
    responses(
        (status = 200, description = "All songs, ordered by artist", body = [SongSummary]),
    )
)]
pub async fn list_songs(State(state): State<AppState>) -> Json<Vec<SongSummary>> {
    Json(state.songs.list().await)
}

#[utoipa::path(
    get,
    path = "/v1/songs/{song_id}",
    tag = "Songs",
    params(("song_id" = String, Path, description = "Song slug")),
    responses(
        (status = 200, description = "Song", body = Song),
        (status = 404, description = "Song not found"),
    )
)]
pub async fn get_song(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
) -> Result<Json<Song>, ApiError> {
    state
        .songs
        .get(&song_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("song not found"))
}

#[utoipa::path(
    post,
    path = "/v1/songs",
    tag = "Songs",
    request_body = CreateSongRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Song created", body = Song),
        (status = 400, description = "Missing artist or name"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "A song with this id already exists"),
    )
)]
pub async fn create_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CreateSongRequest>,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    if request.artist.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::bad_request("artist and name are required"));
    }
    let song = request.into_song();
    if song.id.is_empty() {
        return Err(ApiError::bad_request("name must contain letters or digits"));
    }

    let song = state.songs.insert(song).await.map_err(|e| match e {
        StoreError::Conflict(id) => ApiError::conflict(format!("song {id} already exists")),
        other => ApiError::bad_request(other.to_string()),
    })?;
    info!(song_id = %song.id, user_id = %user.user_id, "song created");
    Ok((StatusCode::CREATED, Json(song)))
}

#[utoipa::path(
    delete,
    path = "/v1/songs/{song_id}",
    tag = "Songs",
    params(("song_id" = String, Path, description = "Song slug")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Song deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Song not found"),
    )
)]
pub async fn delete_song(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(song_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.songs.delete(&song_id).await {
        return Err(ApiError::not_found("song not found"));
    }
    info!(song_id = %song_id, user_id = %user.user_id, "song deleted");
    Ok(StatusCode::NO_CONTENT)
}
