//! Application assembly: adapters into services into routes.

pub mod config;

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use crate::domain::ports::{
    CommentRepository, LikeRepository, PasswordHasher, PlaylistRepository, ReadModelExecutor,
    SubscriptionRepository, TokenIssuer, TweetRepository, UserRepository, VideoRepository,
};
use crate::domain::services::{
    CommentService, LikeService, PlaylistService, SubscriptionService, TweetService, UserService,
    VideoService,
};
use crate::domain::ReadModelComposer;
use crate::inbound::http::{
    comments, health, likes, playlists, subscriptions, tweets, users, videos, HttpState,
};
use crate::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselLikeRepository, DieselPlaylistRepository,
    DieselReadModels, DieselSubscriptionRepository, DieselTweetRepository, DieselUserRepository,
    DieselVideoRepository, MemoryStore, PoolConfig, PoolError,
};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer, TokenConfig};

pub use config::AppConfig;

/// Port bundle wired into the services.
struct Adapters {
    users: Arc<dyn UserRepository>,
    videos: Arc<dyn VideoRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    playlists: Arc<dyn PlaylistRepository>,
    tweets: Arc<dyn TweetRepository>,
    executor: Arc<dyn ReadModelExecutor>,
}

fn assemble(
    adapters: Adapters,
    token_config: TokenConfig,
    cookie_secure: bool,
) -> HttpState {
    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::new(token_config));
    let passwords: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);
    let read_models = ReadModelComposer::new(adapters.executor);

    HttpState {
        accounts: Arc::new(UserService::new(
            adapters.users.clone(),
            tokens.clone(),
            passwords,
            read_models.clone(),
        )),
        videos: Arc::new(VideoService::new(
            adapters.videos.clone(),
            adapters.users.clone(),
            adapters.comments.clone(),
            adapters.likes.clone(),
            read_models.clone(),
        )),
        comments: Arc::new(CommentService::new(
            adapters.comments.clone(),
            adapters.videos.clone(),
            adapters.likes.clone(),
            read_models.clone(),
        )),
        likes: Arc::new(LikeService::new(
            adapters.likes.clone(),
            adapters.videos.clone(),
            adapters.comments,
            adapters.tweets.clone(),
            read_models.clone(),
        )),
        subscriptions: Arc::new(SubscriptionService::new(
            adapters.subscriptions,
            adapters.users,
            read_models.clone(),
        )),
        playlists: Arc::new(PlaylistService::new(
            adapters.playlists,
            adapters.videos,
            read_models.clone(),
        )),
        tweets: Arc::new(TweetService::new(
            adapters.tweets,
            adapters.likes,
            read_models,
        )),
        tokens,
        cookie_secure,
    }
}

/// State over the in-memory store, used when no database is configured
/// and by the HTTP tests.
pub fn in_memory_state(token_config: TokenConfig, cookie_secure: bool) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    assemble(
        Adapters {
            users: store.clone(),
            videos: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            subscriptions: store.clone(),
            playlists: store.clone(),
            tweets: store.clone(),
            executor: store,
        },
        token_config,
        cookie_secure,
    )
}

/// State over PostgreSQL.
pub async fn postgres_state(
    database_url: &str,
    token_config: TokenConfig,
    cookie_secure: bool,
) -> Result<HttpState, PoolError> {
    let pool = DbPool::new(PoolConfig::new(database_url)).await?;
    Ok(assemble(
        Adapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            videos: Arc::new(DieselVideoRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
            likes: Arc::new(DieselLikeRepository::new(pool.clone())),
            subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
            playlists: Arc::new(DieselPlaylistRepository::new(pool.clone())),
            tweets: Arc::new(DieselTweetRepository::new(pool.clone())),
            executor: Arc::new(DieselReadModels::new(pool)),
        },
        token_config,
        cookie_secure,
    ))
}

/// Build the state described by the configuration.
pub async fn build_state(config: &AppConfig) -> Result<HttpState, PoolError> {
    match &config.database_url {
        Some(url) => postgres_state(url, config.tokens.clone(), config.cookie_secure).await,
        None => {
            warn!("DATABASE_URL is not set; falling back to the in-memory store");
            Ok(in_memory_state(config.tokens.clone(), config.cookie_secure))
        }
    }
}

/// Register every API route under the caller's scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(health::healthcheck)
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::refresh_token)
        .service(users::current_user)
        .service(users::update_account)
        .service(users::update_avatar)
        .service(users::update_cover_image)
        .service(users::change_password)
        .service(users::delete_account)
        .service(users::watch_history)
        .service(users::channel_profile)
        .service(videos::list_videos)
        .service(videos::publish_video)
        .service(videos::toggle_publish)
        .service(videos::video_detail)
        .service(videos::update_video)
        .service(videos::delete_video)
        .service(comments::video_comments)
        .service(comments::add_comment)
        .service(comments::update_comment)
        .service(comments::delete_comment)
        .service(likes::toggle_video_like)
        .service(likes::toggle_comment_like)
        .service(likes::toggle_tweet_like)
        .service(likes::liked_videos)
        .service(subscriptions::toggle_subscription)
        .service(subscriptions::channel_subscribers)
        .service(subscriptions::subscribed_channels)
        .service(playlists::create_playlist)
        .service(playlists::user_playlists)
        .service(playlists::add_video_to_playlist)
        .service(playlists::remove_video_from_playlist)
        .service(playlists::playlist_detail)
        .service(playlists::update_playlist)
        .service(playlists::delete_playlist)
        .service(tweets::create_tweet)
        .service(tweets::user_tweets)
        .service(tweets::update_tweet)
        .service(tweets::delete_tweet);
}

/// Run the HTTP server until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let state = build_state(&config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let data = web::Data::new(state);
    let bind_addr = config.bind_addr;

    let server = actix_web::HttpServer::new(move || {
        let app = actix_web::App::new()
            .app_data(data.clone())
            .service(web::scope("/api/v1").configure(configure_api));

        #[cfg(debug_assertions)]
        let app = {
            use utoipa::OpenApi;
            app.service(
                utoipa_swagger_ui::SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
            )
        };

        app
    })
    .bind(bind_addr)?;

    server.run().await
}
