//! Environment-driven application configuration.

use std::env;
use std::net::SocketAddr;

use tracing::warn;
use uuid::Uuid;

use crate::outbound::security::TokenConfig;

/// Application configuration assembled from environment variables.
///
/// - `BIND_ADDR` — listen address, default `0.0.0.0:8080`.
/// - `DATABASE_URL` — PostgreSQL URL; without it the in-memory store is
///   used.
/// - `COOKIE_SECURE` — set to `0` to drop the `Secure` cookie flag in
///   local development.
/// - `ACCESS_TOKEN_SECRET` / `REFRESH_TOKEN_SECRET` — signing secrets;
///   ephemeral ones are generated (with a warning) when unset.
/// - `ACCESS_TOKEN_TTL_SECS` / `REFRESH_TOKEN_TTL_SECS` — credential
///   lifetimes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub cookie_secure: bool,
    pub tokens: TokenConfig,
}

fn secret_from_env(name: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            warn!(variable = name, "using an ephemeral signing secret; sessions will not survive a restart");
            Uuid::new_v4().to_string()
        })
}

fn ttl_from_env(name: &str, default_secs: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default_secs)
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let cookie_secure = env::var("COOKIE_SECURE").map(|v| v != "0").unwrap_or(true);

        let defaults = TokenConfig::default();
        let tokens = TokenConfig {
            access_secret: secret_from_env("ACCESS_TOKEN_SECRET"),
            refresh_secret: secret_from_env("REFRESH_TOKEN_SECRET"),
            access_ttl_secs: ttl_from_env("ACCESS_TOKEN_TTL_SECS", defaults.access_ttl_secs),
            refresh_ttl_secs: ttl_from_env("REFRESH_TOKEN_TTL_SECS", defaults.refresh_ttl_secs),
        };

        Self {
            bind_addr,
            database_url,
            cookie_secure,
            tokens,
        }
    }
}
