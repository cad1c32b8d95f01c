//! Like API handlers.

use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::domain::{CommentId, LikeTarget, TweetId, VideoId};

use super::auth::Authenticated;
use super::envelope::{ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Toggle the actor's like on a video.
#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/v/{videoId}",
    responses(
        (status = 200, description = "Like state toggled"),
        (status = 404, description = "Video not found")
    ),
    tags = ["likes"],
    operation_id = "toggleVideoLike"
)]
#[post("/likes/toggle/v/{videoId}")]
pub async fn toggle_video_like(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = VideoId::parse(&path.into_inner())?;
    let liked = state
        .likes
        .toggle(actor.0, LikeTarget::Video(id))
        .await?;
    Ok(ok(json!({ "liked": liked }), "like state toggled"))
}

/// Toggle the actor's like on a comment.
#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/c/{commentId}",
    responses(
        (status = 200, description = "Like state toggled"),
        (status = 404, description = "Comment not found")
    ),
    tags = ["likes"],
    operation_id = "toggleCommentLike"
)]
#[post("/likes/toggle/c/{commentId}")]
pub async fn toggle_comment_like(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = CommentId::parse(&path.into_inner())?;
    let liked = state
        .likes
        .toggle(actor.0, LikeTarget::Comment(id))
        .await?;
    Ok(ok(json!({ "liked": liked }), "like state toggled"))
}

/// Toggle the actor's like on a tweet.
#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/t/{tweetId}",
    responses(
        (status = 200, description = "Like state toggled"),
        (status = 404, description = "Tweet not found")
    ),
    tags = ["likes"],
    operation_id = "toggleTweetLike"
)]
#[post("/likes/toggle/t/{tweetId}")]
pub async fn toggle_tweet_like(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = TweetId::parse(&path.into_inner())?;
    let liked = state
        .likes
        .toggle(actor.0, LikeTarget::Tweet(id))
        .await?;
    Ok(ok(json!({ "liked": liked }), "like state toggled"))
}

/// Paged videos the actor has liked.
#[utoipa::path(
    get,
    path = "/api/v1/likes/videos",
    params(PageQuery),
    responses(
        (status = 200, description = "Liked videos page"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["likes"],
    operation_id = "likedVideos"
)]
#[get("/likes/videos")]
pub async fn liked_videos(
    state: web::Data<HttpState>,
    actor: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let page = state
        .likes
        .liked_videos(actor.0, query.to_request())
        .await?;
    Ok(ok(page, "liked videos fetched successfully"))
}
