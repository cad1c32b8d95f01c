//! Credential primitive adapters.

pub mod passwords;
pub mod tokens;

pub use passwords::Argon2PasswordHasher;
pub use tokens::{JwtTokenIssuer, TokenConfig};
