//! End-to-end HTTP tests over the in-memory store.
//!
//! These drive the full stack — extractors, services, composer, store —
//! through `actix_web::test` without any external processes.

use actix_web::{test as actix_test, web, App};
use serde_json::{json, Value};

use crate::inbound::http::HttpState;
use crate::outbound::security::TokenConfig;
use crate::server;

fn test_state() -> web::Data<HttpState> {
    web::Data::new(server::in_memory_state(
        TokenConfig {
            access_secret: "test-access-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            ..TokenConfig::default()
        },
        false,
    ))
}

fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .service(web::scope("/api/v1").configure(server::configure_api))
}

fn register_payload(name: &str) -> Value {
    json!({
        "username": name,
        "email": format!("{name}@example.com"),
        "fullName": format!("{name} person"),
        "password": "correct horse battery",
        "avatar": "https://cdn.example.com/avatar.png",
    })
}

macro_rules! post_json {
    ($app:expr, $uri:expr, $body:expr) => {{
        let req = actix_test::TestRequest::post()
            .uri($uri)
            .set_json(&$body)
            .to_request();
        actix_test::call_service(&$app, req).await
    }};
    ($app:expr, $uri:expr, $body:expr, $token:expr) => {{
        let req = actix_test::TestRequest::post()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(&$body)
            .to_request();
        actix_test::call_service(&$app, req).await
    }};
}

macro_rules! get_with_token {
    ($app:expr, $uri:expr, $token:expr) => {{
        let req = actix_test::TestRequest::get()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        actix_test::call_service(&$app, req).await
    }};
}

/// Register + login; returns the access token.
macro_rules! open_session {
    ($app:expr, $name:expr) => {{
        let res = post_json!($app, "/api/v1/users/register", register_payload($name));
        assert!(res.status().is_success(), "registration failed");
        let res = post_json!(
            $app,
            "/api/v1/users/login",
            json!({ "username": $name, "password": "correct horse battery" })
        );
        assert!(res.status().is_success(), "login failed");
        let body: Value = actix_test::read_body_json(res).await;
        body["data"]["accessToken"]
            .as_str()
            .expect("access token in body")
            .to_owned()
    }};
}

#[actix_web::test]
async fn registration_strips_credentials_and_rejects_duplicates() {
    let app = actix_test::init_service(test_app(test_state())).await;

    let res = post_json!(app, "/api/v1/users/register", register_payload("creator"));
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["statusCode"], json!(200));
    assert_eq!(body["data"]["username"], json!("creator"));
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("refreshToken").is_none());

    let res = post_json!(app, "/api/v1/users/register", register_payload("creator"));
    assert_eq!(res.status(), 409);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn blank_fields_are_rejected_as_missing() {
    let app = actix_test::init_service(test_app(test_state())).await;

    let mut payload = register_payload("creator");
    payload["avatar"] = json!("   ");
    let res = post_json!(app, "/api/v1/users/register", payload);
    assert_eq!(res.status(), 400);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], json!("avatar is required"));
}

#[actix_web::test]
async fn secure_routes_reject_anonymous_requests_uniformly() {
    let app = actix_test::init_service(test_app(test_state())).await;

    for uri in [
        "/api/v1/users/current",
        "/api/v1/users/history",
        "/api/v1/likes/videos",
    ] {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), 401, "{uri} should be secure");
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["statusCode"], json!(401));
    }
}

#[actix_web::test]
async fn login_sets_cookies_and_refresh_rotates_the_pair() {
    let app = actix_test::init_service(test_app(test_state())).await;

    let res = post_json!(app, "/api/v1/users/register", register_payload("creator"));
    assert!(res.status().is_success());
    let res = post_json!(
        app,
        "/api/v1/users/login",
        json!({ "email": "creator@example.com", "password": "correct horse battery" })
    );
    assert_eq!(res.status(), 200);
    let refresh_cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "refreshToken")
        .expect("refresh cookie set")
        .into_owned();
    assert!(res
        .response()
        .cookies()
        .any(|c| c.name() == "accessToken"));
    let body: Value = actix_test::read_body_json(res).await;
    let old_refresh = body["data"]["refreshToken"]
        .as_str()
        .expect("refresh token in body")
        .to_owned();

    // Rotation with the cookie succeeds and invalidates the old value.
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users/refresh-token")
        .cookie(refresh_cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let res = post_json!(
        app,
        "/api/v1/users/refresh-token",
        json!({ "refreshToken": old_refresh })
    );
    assert_eq!(res.status(), 401);
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let res = post_json!(app, "/api/v1/users/register", register_payload("creator"));
    assert!(res.status().is_success());

    let res = post_json!(
        app,
        "/api/v1/users/login",
        json!({ "username": "creator", "password": "wrong" })
    );
    assert_eq!(res.status(), 401);
}

#[actix_web::test]
async fn video_lifecycle_matches_the_platform_contract() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let token = open_session!(app, "creator");

    // Publish.
    let res = post_json!(
        app,
        "/api/v1/videos",
        json!({
            "title": "systems programming",
            "description": "borrow checker stories",
            "videoFile": "https://cdn.example.com/v.mp4",
            "thumbnail": "https://cdn.example.com/t.png",
            "duration": 321.5,
        }),
        token
    );
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    let video_id = body["data"]["id"].as_str().expect("video id").to_owned();
    assert_eq!(body["data"]["views"], json!(0));
    assert_eq!(body["data"]["isPublished"], json!(false));

    // First detail fetch: views 1, history has the video once.
    let res = get_with_token!(app, &format!("/api/v1/videos/{video_id}"), token);
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["views"], json!(1));
    assert_eq!(body["data"]["isLiked"], json!(false));
    assert_eq!(body["data"]["likesCount"], json!(0));

    // Second fetch: views 2, history still one entry.
    let res = get_with_token!(app, &format!("/api/v1/videos/{video_id}"), token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["views"], json!(2));

    let res = get_with_token!(app, "/api/v1/users/history", token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["items"][0]["id"], json!(video_id));

    // Toggle like twice returns to the original state.
    let res = post_json!(
        app,
        &format!("/api/v1/likes/toggle/v/{video_id}"),
        json!({}),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["liked"], json!(true));

    let res = get_with_token!(app, &format!("/api/v1/videos/{video_id}"), token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["isLiked"], json!(true));
    assert_eq!(body["data"]["likesCount"], json!(1));

    let res = post_json!(
        app,
        &format!("/api/v1/likes/toggle/v/{video_id}"),
        json!({}),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["liked"], json!(false));

    // Comment, then delete the video; everything cascades.
    let res = post_json!(
        app,
        &format!("/api/v1/comments/{video_id}"),
        json!({ "content": "first!" }),
        token
    );
    assert_eq!(res.status(), 201);

    let req = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/videos/{video_id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let res = get_with_token!(app, &format!("/api/v1/videos/{video_id}"), token);
    assert_eq!(res.status(), 404);

    let res = get_with_token!(app, &format!("/api/v1/comments/{video_id}"), token);
    assert_eq!(res.status(), 404);
}

#[actix_web::test]
async fn non_owner_mutations_fail_and_change_nothing() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let owner_token = open_session!(app, "owner");
    let intruder_token = open_session!(app, "intruder");

    let res = post_json!(
        app,
        "/api/v1/playlists",
        json!({ "name": "favourites", "description": "the good ones" }),
        owner_token
    );
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    let playlist_id = body["data"]["id"].as_str().expect("playlist id").to_owned();

    let req = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/playlists/{playlist_id}"))
        .insert_header(("Authorization", format!("Bearer {intruder_token}")))
        .set_json(json!({ "name": "stolen" }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);

    let req = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/playlists/{playlist_id}"))
        .insert_header(("Authorization", format!("Bearer {intruder_token}")))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);

    let res = get_with_token!(app, &format!("/api/v1/playlists/{playlist_id}"), owner_token);
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["name"], json!("favourites"));
}

#[actix_web::test]
async fn comment_like_state_is_relative_to_the_actor() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let token = open_session!(app, "creator");

    let res = post_json!(
        app,
        "/api/v1/videos",
        json!({
            "title": "t",
            "description": "d",
            "videoFile": "v.mp4",
            "thumbnail": "t.png",
            "duration": 1.0,
        }),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    let video_id = body["data"]["id"].as_str().expect("video id").to_owned();

    let res = post_json!(
        app,
        &format!("/api/v1/comments/{video_id}"),
        json!({ "content": "nice" }),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    let comment_id = body["data"]["id"].as_str().expect("comment id").to_owned();

    let res = post_json!(
        app,
        &format!("/api/v1/likes/toggle/c/{comment_id}"),
        json!({}),
        token
    );
    assert_eq!(res.status(), 200);

    // Authenticated listing sees the membership.
    let res = get_with_token!(app, &format!("/api/v1/comments/{video_id}"), token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["items"][0]["likesCount"], json!(1));
    assert_eq!(body["data"]["items"][0]["isLiked"], json!(true));
    assert_eq!(
        body["data"]["items"][0]["owner"]["username"],
        json!("creator")
    );

    // Anonymous listing degrades to false, never null.
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/comments/{video_id}"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["items"][0]["likesCount"], json!(1));
    assert_eq!(body["data"]["items"][0]["isLiked"], json!(false));
}

#[actix_web::test]
async fn subscription_toggle_and_channel_profile_facts() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let channel_token = open_session!(app, "channel");
    let fan_token = open_session!(app, "fan");

    // The channel's own id comes from its profile.
    let res = get_with_token!(app, "/api/v1/users/current", channel_token);
    let body: Value = actix_test::read_body_json(res).await;
    let channel_id = body["data"]["id"].as_str().expect("channel id").to_owned();

    let res = post_json!(
        app,
        &format!("/api/v1/subscriptions/c/{channel_id}"),
        json!({}),
        fan_token
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["subscribed"], json!(true));

    let res = get_with_token!(app, "/api/v1/users/c/channel", fan_token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["subscriberCount"], json!(1));
    assert_eq!(body["data"]["isSubscribed"], json!(true));

    // Anonymous profile degrades to false.
    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/c/channel")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["subscriberCount"], json!(1));
    assert_eq!(body["data"]["isSubscribed"], json!(false));

    // Toggle back restores the original state.
    let res = post_json!(
        app,
        &format!("/api/v1/subscriptions/c/{channel_id}"),
        json!({}),
        fan_token
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["subscribed"], json!(false));
}

#[actix_web::test]
async fn playlist_membership_is_a_set_and_detail_lists_published_videos() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let token = open_session!(app, "creator");

    let res = post_json!(
        app,
        "/api/v1/videos",
        json!({
            "title": "t",
            "description": "d",
            "videoFile": "v.mp4",
            "thumbnail": "t.png",
            "duration": 1.0,
        }),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    let video_id = body["data"]["id"].as_str().expect("video id").to_owned();

    // Publish the upload so the playlist detail includes it.
    let req = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/videos/toggle/publish/{video_id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), 200);

    let res = post_json!(
        app,
        "/api/v1/playlists",
        json!({ "name": "mix", "description": "assorted" }),
        token
    );
    let body: Value = actix_test::read_body_json(res).await;
    let playlist_id = body["data"]["id"].as_str().expect("playlist id").to_owned();

    // Adding twice keeps a single membership row.
    for _ in 0..2 {
        let req = actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/playlists/add/{video_id}/{playlist_id}"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
    }

    let res = get_with_token!(app, &format!("/api/v1/playlists/{playlist_id}"), token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["totalVideos"], json!(1));
    assert_eq!(body["data"]["videos"][0]["id"], json!(video_id));
}

#[actix_web::test]
async fn tweets_carry_like_facts_for_their_author_listing() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let token = open_session!(app, "poster");

    let res = post_json!(app, "/api/v1/tweets", json!({ "content": "hello" }), token);
    assert_eq!(res.status(), 200);
    let body: Value = actix_test::read_body_json(res).await;
    let tweet_id = body["data"]["id"].as_str().expect("tweet id").to_owned();
    let owner_id = body["data"]["ownerId"].as_str().expect("owner id").to_owned();

    let res = post_json!(
        app,
        &format!("/api/v1/likes/toggle/t/{tweet_id}"),
        json!({}),
        token
    );
    assert_eq!(res.status(), 200);

    let res = get_with_token!(app, &format!("/api/v1/tweets/user/{owner_id}"), token);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["items"][0]["likesCount"], json!(1));
    assert_eq!(body["data"]["items"][0]["isLiked"], json!(true));
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = actix_test::init_service(test_app(test_state())).await;
    let token = open_session!(app, "creator");

    let res = get_with_token!(app, "/api/v1/videos/not-a-uuid", token);
    assert_eq!(res.status(), 400);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], json!("invalid video id"));
}
