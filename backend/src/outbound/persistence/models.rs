//! Row structs bridging Diesel and the domain entities.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ids::{
    CommentId, LikeId, PlaylistId, SubscriptionId, TweetId, UserId, VideoId,
};
use crate::domain::like::{Like, LikeTarget, LikeTargetKind};
use crate::domain::ports::StoreError;
use crate::domain::{Comment, Playlist, Subscription, Tweet, User, Video};

use super::schema::{
    comments, likes, playlist_videos, playlists, subscriptions, tweets, users, videos,
    watch_history,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            avatar_url: row.avatar_url,
            cover_image_url: row.cover_image_url,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            avatar_url: user.avatar_url.clone(),
            cover_image_url: user.cover_image_url.clone(),
            refresh_token: user.refresh_token.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial account update; `None` fields are skipped by Diesel.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserAccountChangeset<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = videos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VideoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Self {
            id: VideoId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            duration_secs: row.duration_secs,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Video> for VideoRow {
    fn from(video: &Video) -> Self {
        Self {
            id: *video.id.as_uuid(),
            owner_id: *video.owner_id.as_uuid(),
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: video.video_url.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            duration_secs: video.duration_secs,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

/// Partial video update; `None` fields are skipped by Diesel.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = videos)]
pub struct VideoChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: Uuid,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            video_id: VideoId::from_uuid(row.video_id),
            owner_id: UserId::from_uuid(row.owner_id),
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Comment> for CommentRow {
    fn from(comment: &Comment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            video_id: *comment.video_id.as_uuid(),
            owner_id: *comment.owner_id.as_uuid(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LikeRow {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl LikeRow {
    /// Convert back to the domain entity; an unknown target kind is a
    /// corrupt row and surfaces as a query error.
    pub fn into_like(self) -> Result<Like, StoreError> {
        let kind = LikeTargetKind::parse(&self.target_kind).ok_or_else(|| {
            StoreError::query(format!("unknown like target kind: {}", self.target_kind))
        })?;
        Ok(Like {
            id: LikeId::from_uuid(self.id),
            liked_by: UserId::from_uuid(self.liked_by),
            target: LikeTarget::from_parts(kind, self.target_id),
            created_at: self.created_at,
        })
    }
}

impl From<&Like> for LikeRow {
    fn from(like: &Like) -> Self {
        Self {
            id: *like.id.as_uuid(),
            liked_by: *like.liked_by.as_uuid(),
            target_kind: like.target.kind().as_str().to_owned(),
            target_id: like.target.target_uuid(),
            created_at: like.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: SubscriptionId::from_uuid(row.id),
            subscriber_id: UserId::from_uuid(row.subscriber_id),
            channel_id: UserId::from_uuid(row.channel_id),
            created_at: row.created_at,
        }
    }
}

impl From<&Subscription> for SubscriptionRow {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: *subscription.id.as_uuid(),
            subscriber_id: *subscription.subscriber_id.as_uuid(),
            channel_id: *subscription.channel_id.as_uuid(),
            created_at: subscription.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = playlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlaylistRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Self {
            id: PlaylistId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Playlist> for PlaylistRow {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: *playlist.id.as_uuid(),
            owner_id: *playlist.owner_id.as_uuid(),
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

/// Partial playlist update; `None` fields are skipped by Diesel.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = playlists)]
pub struct PlaylistChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = playlist_videos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlaylistVideoRow {
    pub playlist_id: Uuid,
    pub video_id: Uuid,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tweets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TweetRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TweetRow> for Tweet {
    fn from(row: TweetRow) -> Self {
        Self {
            id: TweetId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Tweet> for TweetRow {
    fn from(tweet: &Tweet) -> Self {
        Self {
            id: *tweet.id.as_uuid(),
            owner_id: *tweet.owner_id.as_uuid(),
            content: tweet.content.clone(),
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = watch_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WatchHistoryRow {
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub watched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_rows_round_trip_through_the_tagged_target() {
        let like = Like::new(UserId::random(), LikeTarget::Tweet(TweetId::random()));
        let row = LikeRow::from(&like);
        assert_eq!(row.target_kind, "tweet");
        let back = row.into_like().expect("valid kind");
        assert_eq!(back, like);
    }

    #[test]
    fn corrupt_like_kind_is_a_query_error() {
        let row = LikeRow {
            id: Uuid::new_v4(),
            liked_by: Uuid::new_v4(),
            target_kind: "playlist".into(),
            target_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            row.into_like(),
            Err(StoreError::Query { .. })
        ));
    }
}
