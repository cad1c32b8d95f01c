//! OpenAPI surface used by Swagger UI and tooling.

use utoipa::OpenApi;

use crate::inbound::http::{comments, health, likes, playlists, subscriptions, tweets, users, videos};

/// Aggregated OpenAPI document for the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck,
        users::register,
        users::login,
        users::logout,
        users::refresh_token,
        users::current_user,
        users::update_account,
        users::update_avatar,
        users::update_cover_image,
        users::change_password,
        users::delete_account,
        users::watch_history,
        users::channel_profile,
        videos::list_videos,
        videos::publish_video,
        videos::video_detail,
        videos::update_video,
        videos::delete_video,
        videos::toggle_publish,
        comments::video_comments,
        comments::add_comment,
        comments::update_comment,
        comments::delete_comment,
        likes::toggle_video_like,
        likes::toggle_comment_like,
        likes::toggle_tweet_like,
        likes::liked_videos,
        subscriptions::toggle_subscription,
        subscriptions::channel_subscribers,
        subscriptions::subscribed_channels,
        playlists::create_playlist,
        playlists::user_playlists,
        playlists::playlist_detail,
        playlists::update_playlist,
        playlists::delete_playlist,
        playlists::add_video_to_playlist,
        playlists::remove_video_from_playlist,
        tweets::create_tweet,
        tweets::user_tweets,
        tweets::update_tweet,
        tweets::delete_tweet,
    ),
    components(schemas(
        users::RegisterRequest,
        users::LoginRequest,
        users::RefreshRequest,
        users::UpdateAccountRequest,
        users::AvatarRequest,
        users::CoverImageRequest,
        users::ChangePasswordRequest,
        users::DeleteAccountRequest,
        users::UserResponse,
        users::SessionResponse,
        videos::PublishVideoRequest,
        videos::UpdateVideoRequest,
        videos::VideoResponse,
        comments::CommentRequest,
        comments::CommentResponse,
        playlists::CreatePlaylistRequest,
        playlists::UpdatePlaylistRequest,
        playlists::PlaylistResponse,
        tweets::TweetRequest,
        tweets::TweetResponse,
    )),
    tags(
        (name = "health", description = "Service probes"),
        (name = "users", description = "Accounts and sessions"),
        (name = "videos", description = "Video publishing and retrieval"),
        (name = "comments", description = "Comments under videos"),
        (name = "likes", description = "Like toggles"),
        (name = "subscriptions", description = "Channel subscriptions"),
        (name = "playlists", description = "Playlists"),
        (name = "tweets", description = "Short posts"),
    )
)]
pub struct ApiDoc;
