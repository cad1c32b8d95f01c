//! JWT-backed token issuer.
//!
//! Access and renewal credentials are HS256 JWTs signed with distinct
//! secrets, so one class can never verify as the other. Claims carry the
//! subject id and the issue/expiry instants.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;
use crate::domain::ports::{TokenError, TokenIssuer, TokenPair};

/// Secrets and lifetimes for the two credential classes.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            // One day of access, ten days of renewal.
            access_ttl_secs: 60 * 60 * 24,
            refresh_ttl_secs: 60 * 60 * 24 * 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// JWT implementation of the `TokenIssuer` port.
pub struct JwtTokenIssuer {
    config: TokenConfig,
}

impl JwtTokenIssuer {
    /// Create an issuer from the given configuration.
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn sign(subject: UserId, secret: &str, ttl_secs: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|err| TokenError::Signing {
            message: err.to_string(),
        })
    }

    fn check(token: &str, secret: &str) -> Result<UserId, TokenError> {
        let validation = Validation::default();
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        UserId::parse(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_pair(&self, subject: UserId) -> Result<TokenPair, TokenError> {
        let access_token = Self::sign(
            subject,
            &self.config.access_secret,
            self.config.access_ttl_secs,
        )?;
        let refresh_token = Self::sign(
            subject,
            &self.config.refresh_secret,
            self.config.refresh_ttl_secs,
        )?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn verify_access(&self, token: &str) -> Result<UserId, TokenError> {
        Self::check(token, &self.config.access_secret)
    }

    fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError> {
        Self::check(token, &self.config.refresh_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(TokenConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            ..TokenConfig::default()
        })
    }

    #[test]
    fn issued_tokens_verify_for_their_own_class() {
        let subject = UserId::random();
        let pair = issuer().issue_pair(subject).expect("pair");

        assert_eq!(
            issuer().verify_access(&pair.access_token).expect("access"),
            subject
        );
        assert_eq!(
            issuer()
                .verify_refresh(&pair.refresh_token)
                .expect("refresh"),
            subject
        );
    }

    #[test]
    fn classes_are_not_interchangeable() {
        let pair = issuer().issue_pair(UserId::random()).expect("pair");

        assert_eq!(
            issuer().verify_access(&pair.refresh_token),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            issuer().verify_refresh(&pair.access_token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn garbage_tokens_are_invalid() {
        assert_eq!(
            issuer().verify_access("not-a-token"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expired_tokens_report_expiry() {
        let config = TokenConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            access_ttl_secs: -120,
            refresh_ttl_secs: -120,
        };
        let pair = JwtTokenIssuer::new(config)
            .issue_pair(UserId::random())
            .expect("pair");

        assert_eq!(
            issuer().verify_access(&pair.access_token),
            Err(TokenError::Expired)
        );
    }
}
