//! Ownership guard for mutations of owned entities.
//!
//! Every write to a Video, Comment, Playlist, or Tweet passes through
//! [`ensure_owner`] before the store is touched, so a failed check can
//! never leave a partial mutation behind.

use super::error::Error;
use super::ids::UserId;

/// Entities that belong to exactly one user.
pub trait Owned {
    /// Identifier of the owning user.
    fn owner_id(&self) -> UserId;
}

/// Authorisation predicate shared by every owned-entity mutation.
///
/// An absent entity is a [`crate::domain::ErrorCode::NotFound`] outcome,
/// distinct from the [`crate::domain::ErrorCode::Forbidden`] raised when
/// the entity exists but belongs to someone else.
pub fn ensure_owner<E: Owned>(entity: Option<E>, actor: UserId, noun: &str) -> Result<E, Error> {
    let entity = entity.ok_or_else(|| Error::not_found(format!("{noun} not found")))?;
    if entity.owner_id() != actor {
        return Err(Error::forbidden(format!(
            "only the owner can modify this {noun}"
        )));
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;

    #[derive(Debug)]
    struct Post {
        owner: UserId,
    }

    impl Owned for Post {
        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    #[test]
    fn missing_entity_is_not_found() {
        let err = ensure_owner::<Post>(None, UserId::random(), "post").expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "post not found");
    }

    #[test]
    fn foreign_entity_is_forbidden() {
        let post = Post {
            owner: UserId::random(),
        };
        let err = ensure_owner(Some(post), UserId::random(), "post").expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn owner_passes_through() {
        let owner = UserId::random();
        let post = Post { owner };
        assert!(ensure_owner(Some(post), owner, "post").is_ok());
    }
}
