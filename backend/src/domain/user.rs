//! User identity record.

use chrono::{DateTime, Utc};

use super::ids::UserId;

/// Registered account.
///
/// `password_hash` and `refresh_token` never leave the domain: the HTTP
/// adapter projects users through DTOs that omit both fields.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    /// Unique handle, stored lowercase.
    pub username: String,
    /// Unique address, stored lowercase.
    pub email: String,
    /// Unique display name, stored lowercase.
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// Current renewal credential; `None` while logged out.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user.
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        avatar_url: String,
        cover_image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::random(),
            username,
            email,
            full_name,
            password_hash,
            avatar_url,
            cover_image_url,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial account update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl AccountChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none()
    }
}
