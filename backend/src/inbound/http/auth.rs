//! Credential extraction for HTTP handlers.
//!
//! The access credential arrives as an HTTP-only cookie with a bearer
//! header fallback. [`Authenticated`] gates secure routes with a uniform
//! 401; [`MaybeAuthenticated`] powers anonymous reads, where the
//! actor-relative fields degrade to `false` instead of failing.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::ids::UserId;
use crate::domain::ports::{TokenError, TokenPair};
use crate::domain::Error;

use super::envelope::ApiError;
use super::state::HttpState;

/// Cookie carrying the access credential.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the renewal credential.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Actor identity proven by a valid access credential.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub UserId);

/// Actor identity when the route also serves anonymous readers.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthenticated(pub Option<UserId>);

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(actix_web::http::header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
}

fn presented_access_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or_else(|| bearer_token(req))
}

/// The renewal credential presented with a refresh request, if any.
pub fn presented_refresh_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
}

async fn verify_actor(req: HttpRequest, token: String) -> Result<UserId, ApiError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| ApiError::from(Error::internal("application state is missing")))?;

    let user_id = state.tokens.verify_access(&token).map_err(|err| match err {
        TokenError::Expired => Error::unauthorized("access token has expired"),
        TokenError::Invalid | TokenError::Signing { .. } => {
            Error::unauthorized("invalid access token")
        }
    })?;

    // The subject must still exist; a deleted account's tokens die with
    // it.
    state
        .accounts
        .current(user_id)
        .await
        .map_err(|_| Error::unauthorized("invalid access token"))?;
    Ok(user_id)
}

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token = presented_access_token(&req)
                .ok_or_else(|| ApiError::from(Error::unauthorized("login required")))?;
            let user_id = verify_actor(req, token).await?;
            Ok(Self(user_id))
        })
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match presented_access_token(&req) {
                None => Ok(Self(None)),
                Some(token) => {
                    let user_id = verify_actor(req, token).await?;
                    Ok(Self(Some(user_id)))
                }
            }
        })
    }
}

/// Build the pair of HTTP-only session cookies.
pub fn session_cookies(pair: &TokenPair, secure: bool) -> (Cookie<'static>, Cookie<'static>) {
    let build = |name: &'static str, value: String| {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .finish()
    };
    (
        build(ACCESS_COOKIE, pair.access_token.clone()),
        build(REFRESH_COOKIE, pair.refresh_token.clone()),
    )
}

/// Build removal cookies that clear both credentials.
pub fn clear_session_cookies() -> (Cookie<'static>, Cookie<'static>) {
    let build = |name: &'static str| {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        cookie.make_removal();
        cookie
    };
    (build(ACCESS_COOKIE), build(REFRESH_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookies_are_http_only() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        let (access, refresh) = session_cookies(&pair, true);
        assert_eq!(access.name(), ACCESS_COOKIE);
        assert_eq!(refresh.name(), REFRESH_COOKIE);
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.value(), "a");
    }

    #[test]
    fn clear_cookies_are_expired() {
        let (access, _) = clear_session_cookies();
        assert_eq!(access.value(), "");
        assert!(access.expires().is_some());
    }
}
