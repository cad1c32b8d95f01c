//! Comment API handlers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Comment, CommentId, VideoId};

use super::auth::{Authenticated, MaybeAuthenticated};
use super::envelope::{created, ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Comment body payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
}

/// Owned projection of a comment document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            video_id: comment.video_id.to_string(),
            owner_id: comment.owner_id.to_string(),
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// Paged comments under a video.
#[utoipa::path(
    get,
    path = "/api/v1/comments/{videoId}",
    params(PageQuery),
    responses(
        (status = 200, description = "Comments page"),
        (status = 404, description = "Video not found")
    ),
    tags = ["comments"],
    operation_id = "videoComments"
)]
#[get("/comments/{videoId}")]
pub async fn video_comments(
    state: web::Data<HttpState>,
    actor: MaybeAuthenticated,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let video_id = VideoId::parse(&path.into_inner())?;
    let page = state
        .comments
        .list(video_id, actor.0, query.to_request())
        .await?;
    Ok(ok(page, "comments fetched successfully"))
}

/// Add a comment under a video.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{videoId}",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Video not found")
    ),
    tags = ["comments"],
    operation_id = "addComment"
)]
#[post("/comments/{videoId}")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let video_id = VideoId::parse(&path.into_inner())?;
    let comment = state
        .comments
        .add(actor.0, video_id, &payload.content)
        .await?;
    Ok(created(
        CommentResponse::from(comment),
        "comment added successfully",
    ))
}

/// Owner-gated body edit.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/c/{commentId}",
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/comments/c/{commentId}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let comment_id = CommentId::parse(&path.into_inner())?;
    let comment = state
        .comments
        .update(actor.0, comment_id, &payload.content)
        .await?;
    Ok(ok(
        CommentResponse::from(comment),
        "comment updated successfully",
    ))
}

/// Owner-gated delete; the comment's likes are cascaded.
#[utoipa::path(
    delete,
    path = "/api/v1/comments/c/{commentId}",
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/c/{commentId}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let comment_id = CommentId::parse(&path.into_inner())?;
    state.comments.delete(actor.0, comment_id).await?;
    Ok(ok(json!({}), "comment deleted successfully"))
}
