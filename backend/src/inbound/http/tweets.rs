//! Tweet API handlers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Tweet, TweetId, UserId};

use super::auth::{Authenticated, MaybeAuthenticated};
use super::envelope::{ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Tweet body payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetRequest {
    pub content: String,
}

/// Owned projection of a tweet document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tweet> for TweetResponse {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id.to_string(),
            owner_id: tweet.owner_id.to_string(),
            content: tweet.content,
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        }
    }
}

/// Create a tweet owned by the actor.
#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet created", body = TweetResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["tweets"],
    operation_id = "createTweet"
)]
#[post("/tweets")]
pub async fn create_tweet(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<TweetRequest>,
) -> ApiResult<HttpResponse> {
    let tweet = state.tweets.create(actor.0, &payload.content).await?;
    Ok(ok(TweetResponse::from(tweet), "tweet created successfully"))
}

/// Paged tweets by a user, relative to the actor.
#[utoipa::path(
    get,
    path = "/api/v1/tweets/user/{userId}",
    params(PageQuery),
    responses(
        (status = 200, description = "Tweets page"),
        (status = 404, description = "User not found")
    ),
    tags = ["tweets"],
    operation_id = "userTweets"
)]
#[get("/tweets/user/{userId}")]
pub async fn user_tweets(
    state: web::Data<HttpState>,
    actor: MaybeAuthenticated,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let user = UserId::parse(&path.into_inner())?;
    let page = state
        .tweets
        .user_tweets(user, actor.0, query.to_request())
        .await?;
    Ok(ok(page, "tweets fetched successfully"))
}

/// Owner-gated body edit.
#[utoipa::path(
    patch,
    path = "/api/v1/tweets/{tweetId}",
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = TweetResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    tags = ["tweets"],
    operation_id = "updateTweet"
)]
#[patch("/tweets/{tweetId}")]
pub async fn update_tweet(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
    payload: web::Json<TweetRequest>,
) -> ApiResult<HttpResponse> {
    let id = TweetId::parse(&path.into_inner())?;
    let tweet = state.tweets.update(actor.0, id, &payload.content).await?;
    Ok(ok(TweetResponse::from(tweet), "tweet updated successfully"))
}

/// Owner-gated delete; the tweet's likes are cascaded.
#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweetId}",
    responses(
        (status = 200, description = "Tweet deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    tags = ["tweets"],
    operation_id = "deleteTweet"
)]
#[delete("/tweets/{tweetId}")]
pub async fn delete_tweet(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = TweetId::parse(&path.into_inner())?;
    state.tweets.delete(actor.0, id).await?;
    Ok(ok(json!({}), "tweet deleted successfully"))
}
