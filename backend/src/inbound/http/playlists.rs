//! Playlist API handlers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::services::NewPlaylist;
use crate::domain::{Playlist, PlaylistId, UserId, VideoId};

use super::auth::{Authenticated, MaybeAuthenticated};
use super::envelope::{ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Playlist creation payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
}

/// Partial playlist update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Owned projection of a playlist document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Playlist> for PlaylistResponse {
    fn from(playlist: Playlist) -> Self {
        Self {
            id: playlist.id.to_string(),
            owner_id: playlist.owner_id.to_string(),
            name: playlist.name,
            description: playlist.description,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

/// Create a playlist owned by the actor.
#[utoipa::path(
    post,
    path = "/api/v1/playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist created", body = PlaylistResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["playlists"],
    operation_id = "createPlaylist"
)]
#[post("/playlists")]
pub async fn create_playlist(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<CreatePlaylistRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let playlist = state
        .playlists
        .create(
            actor.0,
            NewPlaylist {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok(ok(
        PlaylistResponse::from(playlist),
        "playlist created successfully",
    ))
}

/// Paged playlists owned by a user.
#[utoipa::path(
    get,
    path = "/api/v1/playlists/user/{userId}",
    params(PageQuery),
    responses(
        (status = 200, description = "Playlists page"),
        (status = 404, description = "User not found")
    ),
    tags = ["playlists"],
    operation_id = "userPlaylists"
)]
#[get("/playlists/user/{userId}")]
pub async fn user_playlists(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let owner = UserId::parse(&path.into_inner())?;
    let page = state
        .playlists
        .user_playlists(owner, query.to_request())
        .await?;
    Ok(ok(page, "user playlists fetched successfully"))
}

/// Playlist detail with its published videos.
#[utoipa::path(
    get,
    path = "/api/v1/playlists/{playlistId}",
    responses(
        (status = 200, description = "Playlist detail"),
        (status = 404, description = "Playlist not found")
    ),
    tags = ["playlists"],
    operation_id = "playlistDetail"
)]
#[get("/playlists/{playlistId}")]
pub async fn playlist_detail(
    state: web::Data<HttpState>,
    _actor: MaybeAuthenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = PlaylistId::parse(&path.into_inner())?;
    let detail = state.playlists.detail(id).await?;
    Ok(ok(detail, "playlist fetched successfully"))
}

/// Owner-gated partial update.
#[utoipa::path(
    patch,
    path = "/api/v1/playlists/{playlistId}",
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = PlaylistResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tags = ["playlists"],
    operation_id = "updatePlaylist"
)]
#[patch("/playlists/{playlistId}")]
pub async fn update_playlist(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdatePlaylistRequest>,
) -> ApiResult<HttpResponse> {
    let id = PlaylistId::parse(&path.into_inner())?;
    let payload = payload.into_inner();
    let playlist = state
        .playlists
        .update(actor.0, id, payload.name, payload.description)
        .await?;
    Ok(ok(
        PlaylistResponse::from(playlist),
        "playlist updated successfully",
    ))
}

/// Owner-gated delete.
#[utoipa::path(
    delete,
    path = "/api/v1/playlists/{playlistId}",
    responses(
        (status = 200, description = "Playlist deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tags = ["playlists"],
    operation_id = "deletePlaylist"
)]
#[delete("/playlists/{playlistId}")]
pub async fn delete_playlist(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = PlaylistId::parse(&path.into_inner())?;
    state.playlists.delete(actor.0, id).await?;
    Ok(ok(json!({}), "playlist deleted successfully"))
}

/// Owner-gated set-insert of a video into a playlist.
#[utoipa::path(
    patch,
    path = "/api/v1/playlists/add/{videoId}/{playlistId}",
    responses(
        (status = 200, description = "Video added", body = PlaylistResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist or video not found")
    ),
    tags = ["playlists"],
    operation_id = "addVideoToPlaylist"
)]
#[patch("/playlists/add/{videoId}/{playlistId}")]
pub async fn add_video_to_playlist(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (video_id, playlist_id) = path.into_inner();
    let video_id = VideoId::parse(&video_id)?;
    let playlist_id = PlaylistId::parse(&playlist_id)?;
    let playlist = state
        .playlists
        .add_video(actor.0, playlist_id, video_id)
        .await?;
    Ok(ok(
        PlaylistResponse::from(playlist),
        "video added to playlist successfully",
    ))
}

/// Owner-gated removal of a video from a playlist.
#[utoipa::path(
    patch,
    path = "/api/v1/playlists/remove/{videoId}/{playlistId}",
    responses(
        (status = 200, description = "Video removed", body = PlaylistResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tags = ["playlists"],
    operation_id = "removeVideoFromPlaylist"
)]
#[patch("/playlists/remove/{videoId}/{playlistId}")]
pub async fn remove_video_from_playlist(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (video_id, playlist_id) = path.into_inner();
    let video_id = VideoId::parse(&video_id)?;
    let playlist_id = PlaylistId::parse(&playlist_id)?;
    let playlist = state
        .playlists
        .remove_video(actor.0, playlist_id, video_id)
        .await?;
    Ok(ok(
        PlaylistResponse::from(playlist),
        "video removed from playlist successfully",
    ))
}
