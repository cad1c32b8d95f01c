//! Account and session management.
//!
//! Covers registration, the credential lifecycle (login, refresh,
//! logout), account maintenance, and the user-centric read models.

use std::sync::Arc;

use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::ports::{
    PasswordHasher, TokenError, TokenIssuer, TokenPair, UserRepository,
};
use crate::domain::read_model::views::{ChannelProfile, Page, VideoSummary};
use crate::domain::read_model::{PageRequest, ReadModelComposer};
use crate::domain::user::{AccountChanges, User};
use crate::domain::validation::{
    missing_field_error, normalise_email, normalise_username, require_non_blank,
};

use super::map_store_error;

/// Registration payload after transport decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

/// Login payload; either identifier may be supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Account and session service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenIssuer>,
    passwords: Arc<dyn PasswordHasher>,
    read_models: ReadModelComposer,
}

fn map_issue_error(error: TokenError) -> Error {
    Error::internal(format!("failed to issue credentials: {error}"))
}

impl UserService {
    /// Create the service over its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenIssuer>,
        passwords: Arc<dyn PasswordHasher>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            read_models,
        }
    }

    /// Register a new account. The created user is re-read before being
    /// reported, so a write the store cannot confirm surfaces as a
    /// failure.
    pub async fn register(&self, account: NewAccount) -> Result<User, Error> {
        let username = normalise_username(&account.username)?;
        let email = normalise_email(&account.email)?;
        let full_name = require_non_blank("fullName", &account.full_name)?.to_lowercase();
        let password = require_non_blank("password", &account.password)?;
        let avatar_url = require_non_blank("avatar", &account.avatar_url)?;
        let cover_image_url = account
            .cover_image_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);

        let taken = self
            .users
            .identity_taken(&username, &email, &full_name)
            .await
            .map_err(map_store_error)?;
        if taken {
            return Err(Error::conflict(
                "user with this email, username, or full name already exists",
            ));
        }

        let password_hash = self
            .passwords
            .hash(&password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(
            username,
            email,
            full_name,
            password_hash,
            avatar_url,
            cover_image_url,
        );
        self.users.insert(&user).await.map_err(map_store_error)?;

        self.users
            .find_by_id(user.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("user registration could not be confirmed"))
    }

    /// Authenticate and open a session: issue a credential pair and
    /// persist the renewal credential on the user.
    pub async fn login(&self, credentials: Credentials) -> Result<(User, TokenPair), Error> {
        let identifier = credentials
            .username
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| {
                credentials
                    .email
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            })
            .map(str::to_lowercase)
            .ok_or_else(|| missing_field_error("username or email"))?;

        let user = self
            .users
            .find_by_login(&identifier)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::invalid_request("user does not exist"))?;

        if !self
            .passwords
            .verify(&credentials.password, &user.password_hash)
        {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let pair = self.tokens.issue_pair(user.id).map_err(map_issue_error)?;
        self.users
            .set_refresh_token(user.id, Some(&pair.refresh_token))
            .await
            .map_err(map_store_error)?;
        Ok((user, pair))
    }

    /// Rotate the credential pair. The presented renewal credential must
    /// verify and match the stored value; any failure is terminal and the
    /// caller must log in again.
    pub async fn refresh_session(&self, presented: &str) -> Result<(User, TokenPair), Error> {
        let subject = self.tokens.verify_refresh(presented).map_err(|err| match err {
            TokenError::Expired => Error::unauthorized("refresh token has expired"),
            TokenError::Invalid | TokenError::Signing { .. } => {
                Error::unauthorized("invalid refresh token")
            }
        })?;

        let user = self
            .users
            .find_by_id(subject)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthorized("invalid refresh token"))?;

        if user.refresh_token.as_deref() != Some(presented) {
            return Err(Error::unauthorized(
                "refresh token is expired or already used",
            ));
        }

        let pair = self.tokens.issue_pair(user.id).map_err(map_issue_error)?;
        self.users
            .set_refresh_token(user.id, Some(&pair.refresh_token))
            .await
            .map_err(map_store_error)?;
        Ok((user, pair))
    }

    /// Close the session by unsetting the stored renewal credential.
    pub async fn logout(&self, actor: UserId) -> Result<(), Error> {
        self.users
            .set_refresh_token(actor, None)
            .await
            .map_err(map_store_error)
    }

    /// Fetch the authenticated user.
    pub async fn current(&self, actor: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(actor)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Partial account-detail update.
    pub async fn update_account(
        &self,
        actor: UserId,
        full_name: Option<String>,
        email: Option<String>,
    ) -> Result<User, Error> {
        if full_name.is_none() && email.is_none() {
            return Err(Error::invalid_request("at least one field is required"));
        }
        let changes = AccountChanges {
            full_name: full_name
                .as_deref()
                .map(|value| require_non_blank("fullName", value).map(|v| v.to_lowercase()))
                .transpose()?,
            email: email.as_deref().map(normalise_email).transpose()?,
        };
        self.users
            .update_account(actor, &changes)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Replace the avatar reference.
    pub async fn update_avatar(&self, actor: UserId, url: &str) -> Result<User, Error> {
        let url = require_non_blank("avatar", url)?;
        self.users
            .set_avatar(actor, &url)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Replace the cover image reference.
    pub async fn update_cover_image(&self, actor: UserId, url: &str) -> Result<User, Error> {
        let url = require_non_blank("coverImage", url)?;
        self.users
            .set_cover_image(actor, &url)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Change the password after verifying the old one.
    pub async fn change_password(
        &self,
        actor: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        let new_password = require_non_blank("newPassword", new_password)?;
        let user = self.current(actor).await?;
        if !self.passwords.verify(old_password, &user.password_hash) {
            return Err(Error::invalid_request("old password is not correct"));
        }
        let hash = self
            .passwords
            .hash(&new_password)
            .map_err(|err| Error::internal(err.to_string()))?;
        self.users
            .set_password_hash(actor, &hash)
            .await
            .map_err(map_store_error)
    }

    /// Delete the account after re-authentication. Content owned by the
    /// user is left behind; the read model degrades its owner join to
    /// absent.
    pub async fn delete_account(&self, actor: UserId, password: &str) -> Result<(), Error> {
        let user = self.current(actor).await?;
        if !self.passwords.verify(password, &user.password_hash) {
            return Err(Error::unauthorized("password is not correct"));
        }
        let deleted = self.users.delete(actor).await.map_err(map_store_error)?;
        if !deleted {
            warn!(user = %actor, "account deletion raced another delete");
        }
        Ok(())
    }

    /// The actor's watch history, newest uploads first.
    pub async fn watch_history(
        &self,
        actor: UserId,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        self.read_models.watch_history(actor, page).await
    }

    /// Public channel profile by username.
    pub async fn channel_profile(
        &self,
        username: &str,
        actor: Option<UserId>,
    ) -> Result<ChannelProfile, Error> {
        let username = require_non_blank("username", username)?;
        self.read_models.channel_profile(&username, actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        MockPasswordHasher, MockReadModelExecutor, MockTokenIssuer, MockUserRepository, StoreError,
    };

    fn sample_user() -> User {
        User::new(
            "ada".into(),
            "ada@example.com".into(),
            "ada lovelace".into(),
            "hashed".into(),
            "https://cdn.example.com/a.png".into(),
            None,
        )
    }

    fn account() -> NewAccount {
        NewAccount {
            username: "Ada".into(),
            email: "Ada@Example.com".into(),
            full_name: "Ada Lovelace".into(),
            password: "correct horse".into(),
            avatar_url: "https://cdn.example.com/a.png".into(),
            cover_image_url: Some("   ".into()),
        }
    }

    fn service(
        users: MockUserRepository,
        tokens: MockTokenIssuer,
        passwords: MockPasswordHasher,
    ) -> UserService {
        UserService::new(
            Arc::new(users),
            Arc::new(tokens),
            Arc::new(passwords),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    #[tokio::test]
    async fn register_normalises_identity_and_confirms_the_write() {
        let mut users = MockUserRepository::new();
        users
            .expect_identity_taken()
            .withf(|username, email, full_name| {
                username == "ada" && email == "ada@example.com" && full_name == "ada lovelace"
            })
            .times(1)
            .returning(|_, _, _| Ok(false));
        users
            .expect_insert()
            .withf(|user: &User| {
                // A blank cover image counts as missing.
                user.cover_image_url.is_none() && user.password_hash == "hashed"
            })
            .times(1)
            .returning(|_| Ok(()));
        users
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(User { id, ..sample_user() })));

        let mut passwords = MockPasswordHasher::new();
        passwords
            .expect_hash()
            .times(1)
            .returning(|_| Ok("hashed".into()));

        let created = service(users, MockTokenIssuer::new(), passwords)
            .register(account())
            .await
            .expect("registered");
        assert_eq!(created.username, "ada");
    }

    #[tokio::test]
    async fn register_rejects_taken_identities_with_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_identity_taken()
            .times(1)
            .returning(|_, _, _| Ok(true));
        users.expect_insert().times(0);

        let err = service(users, MockTokenIssuer::new(), MockPasswordHasher::new())
            .register(account())
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn register_reports_unconfirmed_writes_as_internal() {
        let mut users = MockUserRepository::new();
        users
            .expect_identity_taken()
            .returning(|_, _, _| Ok(false));
        users.expect_insert().returning(|_| Ok(()));
        users.expect_find_by_id().returning(|_| Ok(None));

        let mut passwords = MockPasswordHasher::new();
        passwords.expect_hash().returning(|_| Ok("hashed".into()));

        let err = service(users, MockTokenIssuer::new(), passwords)
            .register(account())
            .await
            .expect_err("unconfirmed");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn login_rejects_wrong_passwords_without_touching_tokens() {
        let user = sample_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .withf(|identifier: &str| identifier == "ada")
            .times(1)
            .return_once(move |_| Ok(Some(user)));
        users.expect_set_refresh_token().times(0);

        let mut passwords = MockPasswordHasher::new();
        passwords.expect_verify().times(1).returning(|_, _| false);

        let err = service(users, MockTokenIssuer::new(), passwords)
            .login(Credentials {
                username: Some("Ada".into()),
                email: None,
                password: "wrong".into(),
            })
            .await
            .expect_err("unauthorised");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn login_persists_the_new_refresh_token() {
        let user = sample_user();
        let user_id = user.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .return_once(move |_| Ok(Some(user)));
        users
            .expect_set_refresh_token()
            .withf(move |id, token| *id == user_id && token == &Some("refresh"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut passwords = MockPasswordHasher::new();
        passwords.expect_verify().returning(|_, _| true);

        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue_pair().times(1).returning(|_| {
            Ok(TokenPair {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
            })
        });

        let (_, pair) = service(users, tokens, passwords)
            .login(Credentials {
                username: None,
                email: Some("ada@example.com".into()),
                password: "pw".into(),
            })
            .await
            .expect("logged in");
        assert_eq!(pair.access_token, "access");
    }

    #[tokio::test]
    async fn refresh_rejects_a_rotated_out_token() {
        let mut user = sample_user();
        user.refresh_token = Some("current".into());
        let subject = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(user)));
        users.expect_set_refresh_token().times(0);

        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_verify_refresh()
            .returning(move |_| Ok(subject));

        let err = service(users, tokens, MockPasswordHasher::new())
            .refresh_session("stale")
            .await
            .expect_err("stale token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn refresh_maps_expired_tokens_to_unauthorized() {
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_verify_refresh()
            .returning(|_| Err(TokenError::Expired));

        let err = service(MockUserRepository::new(), tokens, MockPasswordHasher::new())
            .refresh_session("old")
            .await
            .expect_err("expired");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "refresh token has expired");
    }

    #[tokio::test]
    async fn logout_unsets_the_stored_token() {
        let actor = UserId::random();
        let mut users = MockUserRepository::new();
        users
            .expect_set_refresh_token()
            .withf(move |id, token| *id == actor && token.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        service(users, MockTokenIssuer::new(), MockPasswordHasher::new())
            .logout(actor)
            .await
            .expect("logged out");
    }

    #[tokio::test]
    async fn update_account_requires_at_least_one_field() {
        let err = service(
            MockUserRepository::new(),
            MockTokenIssuer::new(),
            MockPasswordHasher::new(),
        )
        .update_account(UserId::random(), None, None)
        .await
        .expect_err("empty update");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn change_password_verifies_the_old_password_first() {
        let user = sample_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(user)));
        users.expect_set_password_hash().times(0);

        let mut passwords = MockPasswordHasher::new();
        passwords.expect_verify().returning(|_, _| false);

        let err = service(users, MockTokenIssuer::new(), passwords)
            .change_password(UserId::random(), "wrong", "new password")
            .await
            .expect_err("wrong old password");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_service_unavailable() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .returning(|_| Err(StoreError::connection("down")));

        let err = service(users, MockTokenIssuer::new(), MockPasswordHasher::new())
            .login(Credentials {
                username: Some("ada".into()),
                email: None,
                password: "pw".into(),
            })
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
