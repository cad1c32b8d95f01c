//! Video API handlers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::services::NewVideo;
use crate::domain::{UserId, Video, VideoId, VideoSearch};

use super::auth::{Authenticated, MaybeAuthenticated};
use super::envelope::{ok, ApiResult};
use super::state::HttpState;

/// Publish payload; media URLs come from the upload pipeline.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideoRequest {
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
}

/// Partial video update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// Listing query: text search, owner filter, pagination.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Owned projection of a video document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            id: video.id.to_string(),
            owner_id: video.owner_id.to_string(),
            title: video.title,
            description: video.description,
            video_file: video.video_url,
            thumbnail: video.thumbnail_url,
            duration: video.duration_secs,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

/// Paged listing of published videos.
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    params(VideoListQuery),
    responses((status = 200, description = "Videos page")),
    tags = ["videos"],
    operation_id = "listVideos"
)]
#[get("/videos")]
pub async fn list_videos(
    state: web::Data<HttpState>,
    _actor: MaybeAuthenticated,
    query: web::Query<VideoListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let owner = query
        .user_id
        .as_deref()
        .map(UserId::parse)
        .transpose()?;
    let search = VideoSearch {
        owner,
        text: query.query.clone(),
        published_only: true,
    };
    let page = state
        .videos
        .list(
            &search,
            crate::domain::PageRequest::new(query.page, query.limit),
        )
        .await?;
    Ok(ok(page, "videos fetched successfully"))
}

/// Publish a new video.
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = PublishVideoRequest,
    responses(
        (status = 200, description = "Video published", body = VideoResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["videos"],
    operation_id = "publishVideo"
)]
#[post("/videos")]
pub async fn publish_video(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<PublishVideoRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let video = state
        .videos
        .publish(
            actor.0,
            NewVideo {
                title: payload.title,
                description: payload.description,
                video_url: payload.video_file,
                thumbnail_url: payload.thumbnail,
                duration_secs: payload.duration,
            },
        )
        .await?;
    Ok(ok(VideoResponse::from(video), "video uploaded successfully"))
}

/// Side-effecting detail fetch: bumps the view counter and records the
/// video in the actor's watch history.
#[utoipa::path(
    get,
    path = "/api/v1/videos/{videoId}",
    responses(
        (status = 200, description = "Video detail"),
        (status = 401, description = "Unauthorised"),
        (status = 404, description = "Video not found")
    ),
    tags = ["videos"],
    operation_id = "videoDetail"
)]
#[get("/videos/{videoId}")]
pub async fn video_detail(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = VideoId::parse(&path.into_inner())?;
    let detail = state.videos.detail(actor.0, id).await?;
    Ok(ok(detail, "video fetched successfully"))
}

/// Owner-gated partial update.
#[utoipa::path(
    patch,
    path = "/api/v1/videos/{videoId}",
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    tags = ["videos"],
    operation_id = "updateVideo"
)]
#[patch("/videos/{videoId}")]
pub async fn update_video(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateVideoRequest>,
) -> ApiResult<HttpResponse> {
    let id = VideoId::parse(&path.into_inner())?;
    let payload = payload.into_inner();
    let video = state
        .videos
        .update(
            actor.0,
            id,
            payload.title,
            payload.description,
            payload.thumbnail,
        )
        .await?;
    Ok(ok(VideoResponse::from(video), "video updated successfully"))
}

/// Owner-gated delete with the transitive cascade.
#[utoipa::path(
    delete,
    path = "/api/v1/videos/{videoId}",
    responses(
        (status = 200, description = "Video deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    tags = ["videos"],
    operation_id = "deleteVideo"
)]
#[delete("/videos/{videoId}")]
pub async fn delete_video(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = VideoId::parse(&path.into_inner())?;
    state.videos.delete(actor.0, id).await?;
    Ok(ok(json!({}), "video deleted successfully"))
}

/// Owner-gated publish-flag flip.
#[utoipa::path(
    patch,
    path = "/api/v1/videos/toggle/publish/{videoId}",
    responses(
        (status = 200, description = "Publish flag toggled", body = VideoResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    tags = ["videos"],
    operation_id = "togglePublish"
)]
#[patch("/videos/toggle/publish/{videoId}")]
pub async fn toggle_publish(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = VideoId::parse(&path.into_inner())?;
    let video = state.videos.toggle_publish(actor.0, id).await?;
    Ok(ok(
        VideoResponse::from(video),
        "publish status toggled successfully",
    ))
}
