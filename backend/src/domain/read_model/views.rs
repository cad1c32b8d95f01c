//! Projected, actor-relative view types.
//!
//! These are the only shapes the read side hands to the HTTP layer.
//! Owner data is always reduced to the public summary; password and
//! credential fields cannot appear here by construction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::ids::{CommentId, PlaylistId, TweetId, UserId, VideoId};
use crate::domain::user::User;
use crate::domain::video::Video;

/// Public projection of an owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl OwnerSummary {
    /// Reduce a full user to its public summary.
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

/// One page of projected items plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Video row in listings, history, liked videos, and playlists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: Option<OwnerSummary>,
}

impl VideoSummary {
    /// Project a video with an optional joined owner.
    pub fn project(video: &Video, owner: Option<&User>) -> Self {
        Self {
            id: video.id,
            title: video.title.clone(),
            description: video.description.clone(),
            video_file: video.video_url.clone(),
            thumbnail: video.thumbnail_url.clone(),
            duration: video.duration_secs,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner: owner.map(OwnerSummary::from_user),
        }
    }
}

/// Channel block embedded in a video detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCard {
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscriber_count: i64,
    pub is_subscribed: bool,
}

/// Detail view of a single video, relative to the requesting actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub owner: Option<ChannelCard>,
}

/// Comment row, relative to the requesting actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub owner: Option<OwnerSummary>,
}

/// Tweet row, relative to the requesting actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    pub id: TweetId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub owner: Option<OwnerSummary>,
}

/// Public channel profile, relative to the requesting actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscriber_count: i64,
    pub channels_subscribed_to_count: i64,
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}

/// Subscriber row in a channel's subscriber listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberView {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscriber_count: i64,
    pub is_subscribed: bool,
}

/// Channel row in a user's subscribed-channels listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelView {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub latest_video: Option<VideoSummary>,
}

/// Playlist row in a user's playlist listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    pub description: String,
    pub total_videos: i64,
    pub total_views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detail view of a playlist with its published videos.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: PlaylistId,
    pub name: String,
    pub description: String,
    pub owner: Option<OwnerSummary>,
    pub total_videos: i64,
    pub total_views: i64,
    pub videos: Vec<VideoSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "ada".into(),
            "ada@example.com".into(),
            "ada lovelace".into(),
            "hash".into(),
            "https://cdn.example.com/a.png".into(),
            None,
        )
    }

    #[test]
    fn owner_summary_drops_credential_fields() {
        let summary = OwnerSummary::from_user(&user());
        let json = serde_json::to_value(&summary).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "username": "ada",
                "fullName": "ada lovelace",
                "avatar": "https://cdn.example.com/a.png",
            })
        );
    }

    #[test]
    fn video_summary_serialises_camel_case() {
        let owner = user();
        let video = Video::new(
            owner.id,
            "t".into(),
            "d".into(),
            "https://cdn.example.com/v.mp4".into(),
            "https://cdn.example.com/t.png".into(),
            12.5,
        );
        let json =
            serde_json::to_value(VideoSummary::project(&video, Some(&owner))).expect("serialise");
        assert_eq!(json["videoFile"], "https://cdn.example.com/v.mp4");
        assert_eq!(json["isPublished"], false);
        assert_eq!(json["owner"]["username"], "ada");
    }
}
