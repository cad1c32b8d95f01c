//! User API handlers.
//!
//! ```text
//! POST /api/v1/users/register
//! POST /api/v1/users/login
//! POST /api/v1/users/logout
//! POST /api/v1/users/refresh-token
//! GET  /api/v1/users/current
//! ...
//! ```

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::services::{Credentials, NewAccount};
use crate::domain::{Error, User};

use super::auth::{
    clear_session_cookies, presented_refresh_cookie, session_cookies, Authenticated,
    MaybeAuthenticated,
};
use super::envelope::{ok, ApiResult};
use super::pagination::PageQuery;
use super::state::HttpState;

/// Registration payload. Media URLs come from the upload pipeline.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: String,
    pub cover_image: Option<String>,
}

/// Login payload; either identifier may be supplied.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh payload for clients that do not use the cookie.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Partial account-detail update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Avatar replacement.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    pub avatar: String,
}

/// Cover image replacement.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverImageRequest {
    pub cover_image: String,
}

/// Password change payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Re-authentication payload for account deletion.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// Public projection of a user; credential fields never appear here.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar_url,
            cover_image: user.cover_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Login/refresh response: the user plus both credentials, which are
/// also set as HTTP-only cookies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered"),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Identity already taken")
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .accounts
        .register(NewAccount {
            username: payload.username,
            email: payload.email,
            full_name: payload.full_name,
            password: payload.password,
            avatar_url: payload.avatar,
            cover_image_url: payload.cover_image,
        })
        .await?;
    Ok(ok(
        UserResponse::from(user),
        "user registered successfully",
    ))
}

/// Authenticate and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials")
    ),
    tags = ["users"],
    operation_id = "loginUser"
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let (user, pair) = state
        .accounts
        .login(Credentials {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let (access, refresh) = session_cookies(&pair, state.cookie_secure);
    let body = SessionResponse {
        user: UserResponse::from(user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };
    Ok(HttpResponse::Ok().cookie(access).cookie(refresh).json(
        super::envelope::Envelope {
            status_code: 200,
            data: body,
            message: "user logged in successfully".to_owned(),
            success: true,
        },
    ))
}

/// Close the session and clear both cookies.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "logoutUser"
)]
#[post("/users/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    actor: Authenticated,
) -> ApiResult<HttpResponse> {
    state.accounts.logout(actor.0).await?;
    let (access, refresh) = clear_session_cookies();
    Ok(HttpResponse::Ok().cookie(access).cookie(refresh).json(
        super::envelope::Envelope {
            status_code: 200,
            data: json!({}),
            message: "user logged out".to_owned(),
            success: true,
        },
    ))
}

/// Rotate the credential pair using the renewal credential.
#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Session refreshed", body = SessionResponse),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tags = ["users"],
    operation_id = "refreshToken"
)]
#[post("/users/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: Option<web::Json<RefreshRequest>>,
) -> ApiResult<HttpResponse> {
    let presented = presented_refresh_cookie(&request)
        .or_else(|| payload.and_then(|body| body.into_inner().refresh_token))
        .ok_or_else(|| Error::unauthorized("refresh token is required"))?;

    let (user, pair) = state.accounts.refresh_session(&presented).await?;

    let (access, refresh) = session_cookies(&pair, state.cookie_secure);
    let body = SessionResponse {
        user: UserResponse::from(user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };
    Ok(HttpResponse::Ok().cookie(access).cookie(refresh).json(
        super::envelope::Envelope {
            status_code: 200,
            data: body,
            message: "session refreshed".to_owned(),
            success: true,
        },
    ))
}

/// Fetch the authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/users/current",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/current")]
pub async fn current_user(
    state: web::Data<HttpState>,
    actor: Authenticated,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.current(actor.0).await?;
    Ok(ok(UserResponse::from(user), "current user fetched"))
}

/// Partial account-detail update.
#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "updateAccount"
)]
#[patch("/users/update-account")]
pub async fn update_account(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<UpdateAccountRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .accounts
        .update_account(actor.0, payload.full_name, payload.email)
        .await?;
    Ok(ok(UserResponse::from(user), "account updated successfully"))
}

/// Replace the avatar reference.
#[utoipa::path(
    patch,
    path = "/api/v1/users/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "updateAvatar"
)]
#[patch("/users/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .accounts
        .update_avatar(actor.0, &payload.avatar)
        .await?;
    Ok(ok(UserResponse::from(user), "avatar updated successfully"))
}

/// Replace the cover image reference.
#[utoipa::path(
    patch,
    path = "/api/v1/users/cover-image",
    request_body = CoverImageRequest,
    responses(
        (status = 200, description = "Cover image updated"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "updateCoverImage"
)]
#[patch("/users/cover-image")]
pub async fn update_cover_image(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<CoverImageRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .accounts
        .update_cover_image(actor.0, &payload.cover_image)
        .await?;
    Ok(ok(
        UserResponse::from(user),
        "cover image updated successfully",
    ))
}

/// Change the password after verifying the old one.
#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old password incorrect"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/users/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    state
        .accounts
        .change_password(actor.0, &payload.old_password, &payload.new_password)
        .await?;
    Ok(ok(json!({}), "password changed successfully"))
}

/// Delete the account after re-authentication.
#[utoipa::path(
    delete,
    path = "/api/v1/users/account",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    actor: Authenticated,
    payload: web::Json<DeleteAccountRequest>,
) -> ApiResult<HttpResponse> {
    state
        .accounts
        .delete_account(actor.0, &payload.password)
        .await?;
    let (access, refresh) = clear_session_cookies();
    Ok(HttpResponse::Ok().cookie(access).cookie(refresh).json(
        super::envelope::Envelope {
            status_code: 200,
            data: json!({}),
            message: "account deleted".to_owned(),
            success: true,
        },
    ))
}

/// The actor's watch history.
#[utoipa::path(
    get,
    path = "/api/v1/users/history",
    params(PageQuery),
    responses(
        (status = 200, description = "Watch history"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "watchHistory"
)]
#[get("/users/history")]
pub async fn watch_history(
    state: web::Data<HttpState>,
    actor: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let page = state
        .accounts
        .watch_history(actor.0, query.to_request())
        .await?;
    Ok(ok(page, "watch history fetched successfully"))
}

/// Public channel profile by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/c/{username}",
    responses(
        (status = 200, description = "Channel profile"),
        (status = 404, description = "Channel does not exist")
    ),
    tags = ["users"],
    operation_id = "channelProfile"
)]
#[get("/users/c/{username}")]
pub async fn channel_profile(
    state: web::Data<HttpState>,
    actor: MaybeAuthenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let profile = state
        .accounts
        .channel_profile(&path.into_inner(), actor.0)
        .await?;
    Ok(ok(profile, "channel profile fetched successfully"))
}
