//! In-memory store adapter.
//!
//! Implements every repository port plus the pipeline executor over
//! process-local collections. The server falls back to this store when
//! no database URL is configured, and the HTTP tests run against it.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::ids::{CommentId, LikeId, PlaylistId, SubscriptionId, TweetId, UserId, VideoId};
use crate::domain::like::{Like, LikeTarget};
use crate::domain::playlist::{Playlist, PlaylistChanges};
use crate::domain::ports::{
    CommentRepository, LikeRepository, PlaylistRepository, ReadModelExecutor, StoreError,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use crate::domain::read_model::pipeline::{
    Filter, Pipeline, PipelinePage, PipelineRow, Subject, SubjectRecord, VideoFacts,
};
use crate::domain::subscription::Subscription;
use crate::domain::tweet::Tweet;
use crate::domain::user::{AccountChanges, User};
use crate::domain::video::{Video, VideoChanges};

#[derive(Debug, Clone)]
struct Membership {
    playlist: PlaylistId,
    video: VideoId,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct WatchEntry {
    user: UserId,
    video: VideoId,
}

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    videos: Vec<Video>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
    playlists: Vec<Playlist>,
    tweets: Vec<Tweet>,
    memberships: Vec<Membership>,
    watch_history: Vec<WatchEntry>,
}

/// Process-local store satisfying every persistence port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::query("store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::query("store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut store = self.write()?;
        let clash = store.users.iter().any(|existing| {
            existing.username == user.username
                || existing.email == user.email
                || existing.full_name == user.full_name
        });
        if clash {
            return Err(StoreError::duplicate("user identity already exists"));
        }
        store.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn identity_taken(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.read()?.users.iter().any(|u| {
            u.username == username || u.email == email || u.full_name == full_name
        }))
    }

    async fn update_account(
        &self,
        id: UserId,
        changes: &AccountChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut store = self.write()?;
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(full_name) = &changes.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_avatar(&self, id: UserId, url: &str) -> Result<Option<User>, StoreError> {
        let mut store = self.write()?;
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.avatar_url = url.to_owned();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_cover_image(&self, id: UserId, url: &str) -> Result<Option<User>, StoreError> {
        let mut store = self.write()?;
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.cover_image_url = Some(url.to_owned());
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
        let mut store = self.write()?;
        if let Some(user) = store.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = hash.to_owned();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_refresh_token<'a>(
        &self,
        id: UserId,
        token: Option<&'a str>,
    ) -> Result<(), StoreError> {
        let mut store = self.write()?;
        if let Some(user) = store.users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = token.map(ToOwned::to_owned);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_watch(&self, user: UserId, video: VideoId) -> Result<(), StoreError> {
        let mut store = self.write()?;
        let already = store
            .watch_history
            .iter()
            .any(|entry| entry.user == user && entry.video == video);
        if !already {
            store.watch_history.push(WatchEntry { user, video });
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        store.watch_history.retain(|entry| entry.user != id);
        Ok(store.users.len() < before)
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn insert(&self, video: &Video) -> Result<(), StoreError> {
        self.write()?.videos.push(video.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: VideoId) -> Result<Option<Video>, StoreError> {
        Ok(self.read()?.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn update(
        &self,
        id: VideoId,
        changes: &VideoChanges,
    ) -> Result<Option<Video>, StoreError> {
        let mut store = self.write()?;
        let Some(video) = store.videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            video.title = title.clone();
        }
        if let Some(description) = &changes.description {
            video.description = description.clone();
        }
        if let Some(thumbnail_url) = &changes.thumbnail_url {
            video.thumbnail_url = thumbnail_url.clone();
        }
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn set_published(
        &self,
        id: VideoId,
        published: bool,
    ) -> Result<Option<Video>, StoreError> {
        let mut store = self.write()?;
        let Some(video) = store.videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        video.is_published = published;
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn increment_views(&self, id: VideoId) -> Result<(), StoreError> {
        let mut store = self.write()?;
        if let Some(video) = store.videos.iter_mut().find(|v| v.id == id) {
            video.views += 1;
        }
        Ok(())
    }

    async fn delete(&self, id: VideoId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.videos.len();
        store.videos.retain(|v| v.id != id);
        Ok(store.videos.len() < before)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError> {
        self.write()?.comments.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self.read()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut store = self.write()?;
        let Some(comment) = store.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.content = content.to_owned();
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: CommentId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.comments.len();
        store.comments.retain(|c| c.id != id);
        Ok(store.comments.len() < before)
    }

    async fn ids_for_video(&self, video: VideoId) -> Result<Vec<CommentId>, StoreError> {
        Ok(self
            .read()?
            .comments
            .iter()
            .filter(|c| c.video_id == video)
            .map(|c| c.id)
            .collect())
    }

    async fn delete_for_video(&self, video: VideoId) -> Result<u64, StoreError> {
        let mut store = self.write()?;
        let before = store.comments.len();
        store.comments.retain(|c| c.video_id != video);
        Ok((before - store.comments.len()) as u64)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn find(
        &self,
        actor: UserId,
        target: &LikeTarget,
    ) -> Result<Option<Like>, StoreError> {
        Ok(self
            .read()?
            .likes
            .iter()
            .find(|like| like.liked_by == actor && like.target == *target)
            .cloned())
    }

    async fn insert(&self, like: &Like) -> Result<(), StoreError> {
        let mut store = self.write()?;
        let exists = store
            .likes
            .iter()
            .any(|existing| existing.liked_by == like.liked_by && existing.target == like.target);
        if exists {
            return Err(StoreError::duplicate("like pair already exists"));
        }
        store.likes.push(like.clone());
        Ok(())
    }

    async fn delete(&self, id: LikeId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.likes.len();
        store.likes.retain(|like| like.id != id);
        Ok(store.likes.len() < before)
    }

    async fn delete_for_target(&self, target: &LikeTarget) -> Result<u64, StoreError> {
        let mut store = self.write()?;
        let before = store.likes.len();
        store.likes.retain(|like| like.target != *target);
        Ok((before - store.likes.len()) as u64)
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn find(
        &self,
        subscriber: UserId,
        channel: UserId,
    ) -> Result<Option<Subscription>, StoreError> {
        Ok(self
            .read()?
            .subscriptions
            .iter()
            .find(|s| s.subscriber_id == subscriber && s.channel_id == channel)
            .cloned())
    }

    async fn insert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        let mut store = self.write()?;
        let exists = store.subscriptions.iter().any(|existing| {
            existing.subscriber_id == subscription.subscriber_id
                && existing.channel_id == subscription.channel_id
        });
        if exists {
            return Err(StoreError::duplicate("subscription pair already exists"));
        }
        store.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.subscriptions.len();
        store.subscriptions.retain(|s| s.id != id);
        Ok(store.subscriptions.len() < before)
    }
}

#[async_trait]
impl PlaylistRepository for MemoryStore {
    async fn insert(&self, playlist: &Playlist) -> Result<(), StoreError> {
        self.write()?.playlists.push(playlist.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PlaylistId) -> Result<Option<Playlist>, StoreError> {
        Ok(self.read()?.playlists.iter().find(|p| p.id == id).cloned())
    }

    async fn update(
        &self,
        id: PlaylistId,
        changes: &PlaylistChanges,
    ) -> Result<Option<Playlist>, StoreError> {
        let mut store = self.write()?;
        let Some(playlist) = store.playlists.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            playlist.name = name.clone();
        }
        if let Some(description) = &changes.description {
            playlist.description = description.clone();
        }
        playlist.updated_at = Utc::now();
        Ok(Some(playlist.clone()))
    }

    async fn delete(&self, id: PlaylistId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.playlists.len();
        store.playlists.retain(|p| p.id != id);
        store.memberships.retain(|m| m.playlist != id);
        Ok(store.playlists.len() < before)
    }

    async fn add_video(&self, playlist: PlaylistId, video: VideoId) -> Result<(), StoreError> {
        let mut store = self.write()?;
        let already = store
            .memberships
            .iter()
            .any(|m| m.playlist == playlist && m.video == video);
        if !already {
            store.memberships.push(Membership {
                playlist,
                video,
                added_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove_video(
        &self,
        playlist: PlaylistId,
        video: VideoId,
    ) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.memberships.len();
        store
            .memberships
            .retain(|m| !(m.playlist == playlist && m.video == video));
        Ok(store.memberships.len() < before)
    }
}

#[async_trait]
impl TweetRepository for MemoryStore {
    async fn insert(&self, tweet: &Tweet) -> Result<(), StoreError> {
        self.write()?.tweets.push(tweet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TweetId) -> Result<Option<Tweet>, StoreError> {
        Ok(self.read()?.tweets.iter().find(|t| t.id == id).cloned())
    }

    async fn update_content(
        &self,
        id: TweetId,
        content: &str,
    ) -> Result<Option<Tweet>, StoreError> {
        let mut store = self.write()?;
        let Some(tweet) = store.tweets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tweet.content = content.to_owned();
        tweet.updated_at = Utc::now();
        Ok(Some(tweet.clone()))
    }

    async fn delete(&self, id: TweetId) -> Result<bool, StoreError> {
        let mut store = self.write()?;
        let before = store.tweets.len();
        store.tweets.retain(|t| t.id != id);
        Ok(store.tweets.len() < before)
    }
}

impl Collections {
    fn liked(&self, actor: UserId, target: &LikeTarget) -> bool {
        self.likes
            .iter()
            .any(|like| like.liked_by == actor && like.target == *target)
    }

    fn matches_video(&self, video: &Video, filter: &Filter) -> bool {
        match filter {
            Filter::Id(id) => video.id.as_uuid() == id,
            Filter::Owner(owner) => video.owner_id == *owner,
            Filter::PublishedOnly => video.is_published,
            Filter::Text(text) => {
                let needle = text.to_lowercase();
                video.title.to_lowercase().contains(&needle)
                    || video.description.to_lowercase().contains(&needle)
            }
            Filter::LikedBy(actor) => self.liked(*actor, &LikeTarget::Video(video.id)),
            Filter::WatchedBy(user) => self
                .watch_history
                .iter()
                .any(|entry| entry.user == *user && entry.video == video.id),
            Filter::InPlaylist(playlist) => self
                .memberships
                .iter()
                .any(|m| m.playlist == *playlist && m.video == video.id),
            _ => true,
        }
    }

    fn matches_channel(&self, user: &User, filter: &Filter) -> bool {
        match filter {
            Filter::Id(id) => user.id.as_uuid() == id,
            Filter::Username(name) => user.username == *name,
            Filter::SubscriberOf(channel) => self
                .subscriptions
                .iter()
                .any(|s| s.channel_id == *channel && s.subscriber_id == user.id),
            Filter::SubscribedBy(subscriber) => self
                .subscriptions
                .iter()
                .any(|s| s.subscriber_id == *subscriber && s.channel_id == user.id),
            _ => true,
        }
    }

    fn matches_comment(comment: &Comment, filter: &Filter) -> bool {
        match filter {
            Filter::Id(id) => comment.id.as_uuid() == id,
            Filter::OnVideo(video) => comment.video_id == *video,
            Filter::Owner(owner) => comment.owner_id == *owner,
            _ => true,
        }
    }

    fn matches_tweet(tweet: &Tweet, filter: &Filter) -> bool {
        match filter {
            Filter::Id(id) => tweet.id.as_uuid() == id,
            Filter::Owner(owner) => tweet.owner_id == *owner,
            _ => true,
        }
    }

    fn matches_playlist(playlist: &Playlist, filter: &Filter) -> bool {
        match filter {
            Filter::Id(id) => playlist.id.as_uuid() == id,
            Filter::Owner(owner) => playlist.owner_id == *owner,
            _ => true,
        }
    }

    fn subjects(&self, pipeline: &Pipeline) -> Vec<SubjectRecord> {
        let filters = pipeline.filters();
        match pipeline.subject() {
            Subject::Videos => self
                .videos
                .iter()
                .filter(|video| filters.iter().all(|f| self.matches_video(video, f)))
                .cloned()
                .map(SubjectRecord::Video)
                .collect(),
            Subject::Comments => self
                .comments
                .iter()
                .filter(|comment| filters.iter().all(|f| Self::matches_comment(comment, f)))
                .cloned()
                .map(SubjectRecord::Comment)
                .collect(),
            Subject::Tweets => self
                .tweets
                .iter()
                .filter(|tweet| filters.iter().all(|f| Self::matches_tweet(tweet, f)))
                .cloned()
                .map(SubjectRecord::Tweet)
                .collect(),
            Subject::Channels => self
                .users
                .iter()
                .filter(|user| filters.iter().all(|f| self.matches_channel(user, f)))
                .cloned()
                .map(SubjectRecord::Channel)
                .collect(),
            Subject::Playlists => self
                .playlists
                .iter()
                .filter(|playlist| filters.iter().all(|f| Self::matches_playlist(playlist, f)))
                .cloned()
                .map(SubjectRecord::Playlist)
                .collect(),
        }
    }

    fn like_target_for(subject: &SubjectRecord) -> Option<LikeTarget> {
        match subject {
            SubjectRecord::Video(v) => Some(LikeTarget::Video(v.id)),
            SubjectRecord::Comment(c) => Some(LikeTarget::Comment(c.id)),
            SubjectRecord::Tweet(t) => Some(LikeTarget::Tweet(t.id)),
            _ => None,
        }
    }

    fn channel_video_facts(&self, channel: UserId) -> VideoFacts {
        let mut owned: Vec<&Video> = self
            .videos
            .iter()
            .filter(|v| v.owner_id == channel && v.is_published)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        VideoFacts {
            video_count: owned.len() as i64,
            views_total: owned.iter().map(|v| v.views).sum(),
            latest_video: owned.first().map(|v| (*v).clone()),
        }
    }

    fn playlist_video_facts(&self, playlist: PlaylistId) -> VideoFacts {
        let members: HashMap<Uuid, DateTime<Utc>> = self
            .memberships
            .iter()
            .filter(|m| m.playlist == playlist)
            .map(|m| (*m.video.as_uuid(), m.added_at))
            .collect();
        let mut member_videos: Vec<&Video> = self
            .videos
            .iter()
            .filter(|v| members.contains_key(v.id.as_uuid()))
            .collect();
        member_videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        VideoFacts {
            video_count: member_videos.len() as i64,
            views_total: member_videos.iter().map(|v| v.views).sum(),
            latest_video: member_videos.first().map(|v| (*v).clone()),
        }
    }

    fn hydrate(&self, pipeline: &Pipeline, subject: SubjectRecord) -> PipelineRow {
        let owner_id = subject.owner_id();
        let mut row = PipelineRow::new(subject);

        if pipeline.joins_owner() {
            row.owner = self.users.iter().find(|u| u.id == owner_id).cloned();
        }

        if let Some(actor) = pipeline.likes_actor() {
            if let Some(target) = Self::like_target_for(&row.subject) {
                row.likes_count = self
                    .likes
                    .iter()
                    .filter(|like| like.target == target)
                    .count() as i64;
                row.liked_by_actor = actor.map_or(false, |actor| self.liked(actor, &target));
            }
        }

        if let Some(actor) = pipeline.subscriptions_actor() {
            // On the videos subject the facts describe the owner channel;
            // on the channels subject, the channel itself.
            let channel = match &row.subject {
                SubjectRecord::Channel(user) => Some(user.id),
                SubjectRecord::Video(video) => Some(video.owner_id),
                _ => None,
            };
            if let Some(channel) = channel {
                row.subscriber_count = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.channel_id == channel)
                    .count() as i64;
                row.subscribed_to_count = self
                    .subscriptions
                    .iter()
                    .filter(|s| s.subscriber_id == channel)
                    .count() as i64;
                row.subscribed_by_actor = actor.map_or(false, |actor| {
                    self.subscriptions
                        .iter()
                        .any(|s| s.channel_id == channel && s.subscriber_id == actor)
                });
            }
        }

        if pipeline.derives_video_facts() {
            row.video_facts = match &row.subject {
                SubjectRecord::Channel(user) => Some(self.channel_video_facts(user.id)),
                SubjectRecord::Playlist(playlist) => {
                    Some(self.playlist_video_facts(playlist.id))
                }
                _ => None,
            };
        }

        row
    }
}

#[async_trait]
impl ReadModelExecutor for MemoryStore {
    async fn execute(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let store = self.read()?;
        let mut subjects = store.subjects(pipeline);
        subjects.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = subjects.len() as u64;
        let page_subjects = match pipeline.page() {
            Some(page) => {
                let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
                subjects
                    .into_iter()
                    .skip(offset)
                    .take(page.limit() as usize)
                    .collect()
            }
            None => subjects,
        };

        let rows = page_subjects
            .into_iter()
            .map(|subject| store.hydrate(pipeline, subject))
            .collect();
        Ok(PipelinePage { rows, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::read_model::pipeline::PageRequest;

    fn user(name: &str) -> User {
        User::new(
            name.into(),
            format!("{name}@example.com"),
            format!("{name} display"),
            "hash".into(),
            "avatar".into(),
            None,
        )
    }

    async fn seeded() -> (MemoryStore, User, Video) {
        let store = MemoryStore::new();
        let owner = user("owner");
        UserRepository::insert(&store, &owner).await.expect("user");
        let mut video = Video::new(
            owner.id,
            "Rust in anger".into(),
            "systems stories".into(),
            "v.mp4".into(),
            "t.png".into(),
            10.0,
        );
        video.is_published = true;
        VideoRepository::insert(&store, &video).await.expect("video");
        (store, owner, video)
    }

    #[tokio::test]
    async fn duplicate_user_identity_is_rejected() {
        let store = MemoryStore::new();
        let ada = user("ada");
        UserRepository::insert(&store, &ada).await.expect("first");
        let clash = user("ada");
        let err = UserRepository::insert(&store, &clash)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn record_watch_has_set_semantics() {
        let (store, owner, video) = seeded().await;
        store.record_watch(owner.id, video.id).await.expect("watch");
        store.record_watch(owner.id, video.id).await.expect("watch");

        let page = store
            .execute(
                &Pipeline::over(Subject::Videos)
                    .matching(Filter::WatchedBy(owner.id))
                    .paginate(PageRequest::default()),
            )
            .await
            .expect("history");
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn like_pairs_are_unique() {
        let (store, owner, video) = seeded().await;
        let like = Like::new(owner.id, LikeTarget::Video(video.id));
        LikeRepository::insert(&store, &like).await.expect("like");
        let again = Like::new(owner.id, LikeTarget::Video(video.id));
        let err = LikeRepository::insert(&store, &again)
            .await
            .expect_err("duplicate pair");
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn pipeline_counts_likes_and_derives_membership() {
        let (store, owner, video) = seeded().await;
        let other = user("other");
        UserRepository::insert(&store, &other).await.expect("user");
        for actor in [owner.id, other.id] {
            let like = Like::new(actor, LikeTarget::Video(video.id));
            LikeRepository::insert(&store, &like).await.expect("like");
        }

        let page = store
            .execute(
                &Pipeline::over(Subject::Videos)
                    .matching(Filter::Id(*video.id.as_uuid()))
                    .derive_likes(Some(owner.id)),
            )
            .await
            .expect("pipeline");
        let row = page.rows.first().expect("row");
        assert_eq!(row.likes_count, 2);
        assert!(row.liked_by_actor);

        let anonymous = store
            .execute(
                &Pipeline::over(Subject::Videos)
                    .matching(Filter::Id(*video.id.as_uuid()))
                    .derive_likes(None),
            )
            .await
            .expect("pipeline");
        let row = anonymous.rows.first().expect("row");
        assert_eq!(row.likes_count, 2);
        assert!(!row.liked_by_actor);
    }

    #[tokio::test]
    async fn pagination_reports_the_pre_page_total() {
        let store = MemoryStore::new();
        let owner = user("owner");
        UserRepository::insert(&store, &owner).await.expect("user");
        for index in 0..25 {
            let mut video = Video::new(
                owner.id,
                format!("video {index}"),
                "d".into(),
                "v".into(),
                "t".into(),
                1.0,
            );
            video.is_published = true;
            VideoRepository::insert(&store, &video).await.expect("video");
        }

        let page = store
            .execute(
                &Pipeline::over(Subject::Videos)
                    .matching(Filter::PublishedOnly)
                    .sort_newest_first()
                    .paginate(PageRequest::new(Some(3), Some(10))),
            )
            .await
            .expect("page");
        assert_eq!(page.total, 25);
        assert_eq!(page.rows.len(), 5);
    }

    #[tokio::test]
    async fn missing_owner_joins_as_absent_not_error() {
        let (store, owner, video) = seeded().await;
        UserRepository::delete(&store, owner.id).await.expect("gone");

        let page = store
            .execute(
                &Pipeline::over(Subject::Videos)
                    .matching(Filter::Id(*video.id.as_uuid()))
                    .join_owner(),
            )
            .await
            .expect("pipeline");
        let row = page.rows.first().expect("row");
        assert!(row.owner.is_none());
    }
}
