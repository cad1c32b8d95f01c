//! PostgreSQL-backed `LikeRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::{LikeId, UserId};
use crate::domain::like::{Like, LikeTarget};
use crate::domain::ports::{LikeRepository, StoreError};

use super::models::LikeRow;
use super::schema::likes;
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `LikeRepository` port.
#[derive(Clone)]
pub struct DieselLikeRepository {
    pool: DbPool,
}

impl DieselLikeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for DieselLikeRepository {
    async fn find(
        &self,
        actor: UserId,
        target: &LikeTarget,
    ) -> Result<Option<Like>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<LikeRow> = likes::table
            .filter(
                likes::liked_by
                    .eq(*actor.as_uuid())
                    .and(likes::target_kind.eq(target.kind().as_str()))
                    .and(likes::target_id.eq(target.target_uuid())),
            )
            .select(LikeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(LikeRow::into_like).transpose()
    }

    async fn insert(&self, like: &Like) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(likes::table)
            .values(LikeRow::from(like))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: LikeId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(likes::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_for_target(&self, target: &LikeTarget) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            likes::table.filter(
                likes::target_kind
                    .eq(target.kind().as_str())
                    .and(likes::target_id.eq(target.target_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
