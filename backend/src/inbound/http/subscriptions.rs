//! Subscription API handlers.

use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::domain::UserId;

use super::auth::{Authenticated, MaybeAuthenticated};
use super::envelope::{ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Toggle the actor's subscription to a channel.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions/c/{channelId}",
    responses(
        (status = 200, description = "Subscription state toggled"),
        (status = 404, description = "Channel not found")
    ),
    tags = ["subscriptions"],
    operation_id = "toggleSubscription"
)]
#[post("/subscriptions/c/{channelId}")]
pub async fn toggle_subscription(
    state: web::Data<HttpState>,
    actor: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let channel = UserId::parse(&path.into_inner())?;
    let subscribed = state.subscriptions.toggle(actor.0, channel).await?;
    let message = if subscribed {
        "subscribed successfully"
    } else {
        "unsubscribed successfully"
    };
    Ok(ok(json!({ "subscribed": subscribed }), message))
}

/// Paged subscribers of a channel.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/c/{channelId}",
    params(PageQuery),
    responses(
        (status = 200, description = "Subscribers page"),
        (status = 404, description = "Channel not found")
    ),
    tags = ["subscriptions"],
    operation_id = "channelSubscribers"
)]
#[get("/subscriptions/c/{channelId}")]
pub async fn channel_subscribers(
    state: web::Data<HttpState>,
    actor: MaybeAuthenticated,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let channel = UserId::parse(&path.into_inner())?;
    let page = state
        .subscriptions
        .channel_subscribers(channel, actor.0, query.to_request())
        .await?;
    Ok(ok(page, "subscribers fetched successfully"))
}

/// Paged channels a user subscribes to.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/u/{subscriberId}",
    params(PageQuery),
    responses(
        (status = 200, description = "Subscribed channels page"),
        (status = 404, description = "User not found")
    ),
    tags = ["subscriptions"],
    operation_id = "subscribedChannels"
)]
#[get("/subscriptions/u/{subscriberId}")]
pub async fn subscribed_channels(
    state: web::Data<HttpState>,
    _actor: MaybeAuthenticated,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let subscriber = UserId::parse(&path.into_inner())?;
    let page = state
        .subscriptions
        .subscribed_channels(subscriber, query.to_request())
        .await?;
    Ok(ok(page, "subscribed channels fetched successfully"))
}
