//! PostgreSQL-backed pipeline executor.
//!
//! Translates the typed stage descriptors into SQL: match stages become
//! `WHERE` clauses (id-set filters are resolved through the join tables
//! first), pagination becomes `COUNT` plus `OFFSET`/`LIMIT`, and the
//! derive stages become batched lookups over the join tables for the
//! rows on the page. Orphaned join rows simply never match a subject
//! row, so they are excluded by construction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ids::UserId;
use crate::domain::like::LikeTargetKind;
use crate::domain::ports::{ReadModelExecutor, StoreError};
use crate::domain::read_model::pipeline::{
    Filter, Pipeline, PipelinePage, PipelineRow, Subject, SubjectRecord, VideoFacts,
};
use crate::domain::{Comment, Playlist, Tweet, User, Video};

use super::models::{
    CommentRow, LikeRow, PlaylistRow, PlaylistVideoRow, SubscriptionRow, TweetRow, UserRow,
    VideoRow,
};
use super::schema::{
    comments, likes, playlist_videos, playlists, subscriptions, tweets, users, videos,
    watch_history,
};
use super::{map_diesel_error, map_pool_error, DbPool};

/// Diesel-backed implementation of the `ReadModelExecutor` port.
#[derive(Clone)]
pub struct DieselReadModels {
    pool: DbPool,
}

impl DieselReadModels {
    /// Create a new executor with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A match filter with any cross-collection reference pre-resolved to an
/// id set.
enum Resolved {
    Plain(Filter),
    IdIn(Vec<Uuid>),
}

/// Per-channel subscription aggregates.
#[derive(Default, Clone, Copy)]
struct SubFacts {
    subscriber_count: i64,
    subscribed_by_actor: bool,
    subscribed_to_count: i64,
}

async fn load_owner_map<C>(conn: &mut C, ids: &[Uuid]) -> Result<HashMap<Uuid, User>, StoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(ids.iter().copied()))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(rows.into_iter().map(|r| (r.id, User::from(r))).collect())
}

async fn load_like_facts<C>(
    conn: &mut C,
    kind: LikeTargetKind,
    subject_ids: &[Uuid],
    actor: Option<UserId>,
) -> Result<HashMap<Uuid, (i64, bool)>, StoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if subject_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<LikeRow> = likes::table
        .filter(
            likes::target_kind
                .eq(kind.as_str())
                .and(likes::target_id.eq_any(subject_ids.iter().copied())),
        )
        .select(LikeRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let actor_uuid = actor.map(|a| *a.as_uuid());
    let mut facts: HashMap<Uuid, (i64, bool)> = HashMap::new();
    for row in rows {
        let entry = facts.entry(row.target_id).or_insert((0, false));
        entry.0 += 1;
        if Some(row.liked_by) == actor_uuid {
            entry.1 = true;
        }
    }
    Ok(facts)
}

async fn load_subscription_facts<C>(
    conn: &mut C,
    channel_ids: &[Uuid],
    actor: Option<UserId>,
) -> Result<HashMap<Uuid, SubFacts>, StoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if channel_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let to_rows: Vec<SubscriptionRow> = subscriptions::table
        .filter(subscriptions::channel_id.eq_any(channel_ids.iter().copied()))
        .select(SubscriptionRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let from_rows: Vec<SubscriptionRow> = subscriptions::table
        .filter(subscriptions::subscriber_id.eq_any(channel_ids.iter().copied()))
        .select(SubscriptionRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let actor_uuid = actor.map(|a| *a.as_uuid());
    let mut facts: HashMap<Uuid, SubFacts> = HashMap::new();
    for row in to_rows {
        let entry = facts.entry(row.channel_id).or_default();
        entry.subscriber_count += 1;
        if Some(row.subscriber_id) == actor_uuid {
            entry.subscribed_by_actor = true;
        }
    }
    for row in from_rows {
        facts.entry(row.subscriber_id).or_default().subscribed_to_count += 1;
    }
    Ok(facts)
}

async fn load_channel_video_facts<C>(
    conn: &mut C,
    owner_ids: &[Uuid],
) -> Result<HashMap<Uuid, VideoFacts>, StoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if owner_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<VideoRow> = videos::table
        .filter(
            videos::owner_id
                .eq_any(owner_ids.iter().copied())
                .and(videos::is_published.eq(true)),
        )
        .order(videos::created_at.desc())
        .select(VideoRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut facts: HashMap<Uuid, VideoFacts> = HashMap::new();
    for row in rows {
        let entry = facts.entry(row.owner_id).or_default();
        entry.video_count += 1;
        entry.views_total += row.views;
        // Rows arrive newest first, so the first row per owner wins.
        if entry.latest_video.is_none() {
            entry.latest_video = Some(Video::from(row));
        }
    }
    Ok(facts)
}

async fn load_playlist_video_facts<C>(
    conn: &mut C,
    playlist_ids: &[Uuid],
) -> Result<HashMap<Uuid, VideoFacts>, StoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    if playlist_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let memberships: Vec<PlaylistVideoRow> = playlist_videos::table
        .filter(playlist_videos::playlist_id.eq_any(playlist_ids.iter().copied()))
        .select(PlaylistVideoRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let video_ids: Vec<Uuid> = memberships.iter().map(|m| m.video_id).collect();
    let video_map: HashMap<Uuid, Video> = if video_ids.is_empty() {
        HashMap::new()
    } else {
        let rows: Vec<VideoRow> = videos::table
            .filter(videos::id.eq_any(video_ids))
            .select(VideoRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|r| (r.id, Video::from(r)))
            .collect()
    };

    let mut facts: HashMap<Uuid, VideoFacts> = HashMap::new();
    for membership in memberships {
        // Membership rows whose video is gone are orphans; skip them.
        let Some(video) = video_map.get(&membership.video_id) else {
            continue;
        };
        let entry = facts.entry(membership.playlist_id).or_default();
        entry.video_count += 1;
        entry.views_total += video.views;
        let newer = entry
            .latest_video
            .as_ref()
            .map_or(true, |latest| video.created_at > latest.created_at);
        if newer {
            entry.latest_video = Some(video.clone());
        }
    }
    Ok(facts)
}

impl DieselReadModels {
    /// Resolve cross-collection filters (liked-by, watched-by,
    /// in-playlist, subscriber-of, subscribed-by) into id sets.
    async fn resolve_filters<C>(
        conn: &mut C,
        pipeline: &Pipeline,
    ) -> Result<Vec<Resolved>, StoreError>
    where
        C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
    {
        let mut resolved = Vec::new();
        for filter in pipeline.filters() {
            match filter {
                Filter::LikedBy(actor) => {
                    let ids: Vec<Uuid> = likes::table
                        .filter(
                            likes::liked_by
                                .eq(*actor.as_uuid())
                                .and(likes::target_kind.eq(LikeTargetKind::Video.as_str())),
                        )
                        .select(likes::target_id)
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    resolved.push(Resolved::IdIn(ids));
                }
                Filter::WatchedBy(user) => {
                    let ids: Vec<Uuid> = watch_history::table
                        .filter(watch_history::user_id.eq(*user.as_uuid()))
                        .select(watch_history::video_id)
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    resolved.push(Resolved::IdIn(ids));
                }
                Filter::InPlaylist(playlist) => {
                    let ids: Vec<Uuid> = playlist_videos::table
                        .filter(playlist_videos::playlist_id.eq(*playlist.as_uuid()))
                        .select(playlist_videos::video_id)
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    resolved.push(Resolved::IdIn(ids));
                }
                Filter::SubscriberOf(channel) => {
                    let ids: Vec<Uuid> = subscriptions::table
                        .filter(subscriptions::channel_id.eq(*channel.as_uuid()))
                        .select(subscriptions::subscriber_id)
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    resolved.push(Resolved::IdIn(ids));
                }
                Filter::SubscribedBy(subscriber) => {
                    let ids: Vec<Uuid> = subscriptions::table
                        .filter(subscriptions::subscriber_id.eq(*subscriber.as_uuid()))
                        .select(subscriptions::channel_id)
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    resolved.push(Resolved::IdIn(ids));
                }
                other => resolved.push(Resolved::Plain((*other).clone())),
            }
        }
        Ok(resolved)
    }

    async fn run_videos(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let resolved = Self::resolve_filters(&mut conn, pipeline).await?;

        let build = |resolved: &[Resolved]| {
            let mut query = videos::table.into_boxed();
            for item in resolved {
                query = match item {
                    Resolved::IdIn(ids) => query.filter(videos::id.eq_any(ids.clone())),
                    Resolved::Plain(Filter::Id(id)) => query.filter(videos::id.eq(*id)),
                    Resolved::Plain(Filter::Owner(owner)) => {
                        query.filter(videos::owner_id.eq(*owner.as_uuid()))
                    }
                    Resolved::Plain(Filter::PublishedOnly) => {
                        query.filter(videos::is_published.eq(true))
                    }
                    Resolved::Plain(Filter::Text(text)) => {
                        let pattern = format!("%{text}%");
                        query.filter(
                            videos::title
                                .ilike(pattern.clone())
                                .or(videos::description.ilike(pattern)),
                        )
                    }
                    Resolved::Plain(_) => query,
                };
            }
            query
        };

        let total = match pipeline.page() {
            Some(_) => {
                let count: i64 = build(&resolved)
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                u64::try_from(count).unwrap_or(0)
            }
            None => 0,
        };

        let mut query = build(&resolved).order(videos::created_at.desc());
        if let Some(page) = pipeline.page() {
            query = query.offset(page.offset()).limit(i64::from(page.limit()));
        }
        let rows: Vec<VideoRow> = query
            .select(VideoRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let subjects: Vec<Video> = rows.into_iter().map(Video::from).collect();
        let total = if pipeline.page().is_some() {
            total
        } else {
            subjects.len() as u64
        };

        let subject_ids: Vec<Uuid> = subjects.iter().map(|v| *v.id.as_uuid()).collect();
        let owner_ids: Vec<Uuid> = subjects.iter().map(|v| *v.owner_id.as_uuid()).collect();

        let owners = if pipeline.joins_owner() {
            load_owner_map(&mut conn, &owner_ids).await?
        } else {
            HashMap::new()
        };
        let like_facts = match pipeline.likes_actor() {
            Some(actor) => {
                load_like_facts(&mut conn, LikeTargetKind::Video, &subject_ids, actor).await?
            }
            None => HashMap::new(),
        };
        let sub_facts = match pipeline.subscriptions_actor() {
            Some(actor) => load_subscription_facts(&mut conn, &owner_ids, actor).await?,
            None => HashMap::new(),
        };

        let rows = subjects
            .into_iter()
            .map(|video| {
                let owner_uuid = *video.owner_id.as_uuid();
                let subject_uuid = *video.id.as_uuid();
                let mut row = PipelineRow::new(SubjectRecord::Video(video));
                row.owner = owners.get(&owner_uuid).cloned();
                if let Some((count, liked)) = like_facts.get(&subject_uuid) {
                    row.likes_count = *count;
                    row.liked_by_actor = *liked;
                }
                if let Some(facts) = sub_facts.get(&owner_uuid) {
                    row.subscriber_count = facts.subscriber_count;
                    row.subscribed_by_actor = facts.subscribed_by_actor;
                }
                row
            })
            .collect();
        Ok(PipelinePage { rows, total })
    }

    async fn run_comments(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let build = |pipeline: &Pipeline| {
            let mut query = comments::table.into_boxed();
            for filter in pipeline.filters() {
                query = match filter {
                    Filter::Id(id) => query.filter(comments::id.eq(*id)),
                    Filter::OnVideo(video) => {
                        query.filter(comments::video_id.eq(*video.as_uuid()))
                    }
                    Filter::Owner(owner) => {
                        query.filter(comments::owner_id.eq(*owner.as_uuid()))
                    }
                    _ => query,
                };
            }
            query
        };

        let total = match pipeline.page() {
            Some(_) => {
                let count: i64 = build(pipeline)
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                u64::try_from(count).unwrap_or(0)
            }
            None => 0,
        };

        let mut query = build(pipeline).order(comments::created_at.desc());
        if let Some(page) = pipeline.page() {
            query = query.offset(page.offset()).limit(i64::from(page.limit()));
        }
        let rows: Vec<CommentRow> = query
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let subjects: Vec<Comment> = rows.into_iter().map(Comment::from).collect();
        let total = if pipeline.page().is_some() {
            total
        } else {
            subjects.len() as u64
        };

        let subject_ids: Vec<Uuid> = subjects.iter().map(|c| *c.id.as_uuid()).collect();
        let owner_ids: Vec<Uuid> = subjects.iter().map(|c| *c.owner_id.as_uuid()).collect();

        let owners = if pipeline.joins_owner() {
            load_owner_map(&mut conn, &owner_ids).await?
        } else {
            HashMap::new()
        };
        let like_facts = match pipeline.likes_actor() {
            Some(actor) => {
                load_like_facts(&mut conn, LikeTargetKind::Comment, &subject_ids, actor).await?
            }
            None => HashMap::new(),
        };

        let rows = subjects
            .into_iter()
            .map(|comment| {
                let owner_uuid = *comment.owner_id.as_uuid();
                let subject_uuid = *comment.id.as_uuid();
                let mut row = PipelineRow::new(SubjectRecord::Comment(comment));
                row.owner = owners.get(&owner_uuid).cloned();
                if let Some((count, liked)) = like_facts.get(&subject_uuid) {
                    row.likes_count = *count;
                    row.liked_by_actor = *liked;
                }
                row
            })
            .collect();
        Ok(PipelinePage { rows, total })
    }

    async fn run_tweets(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let build = |pipeline: &Pipeline| {
            let mut query = tweets::table.into_boxed();
            for filter in pipeline.filters() {
                query = match filter {
                    Filter::Id(id) => query.filter(tweets::id.eq(*id)),
                    Filter::Owner(owner) => query.filter(tweets::owner_id.eq(*owner.as_uuid())),
                    _ => query,
                };
            }
            query
        };

        let total = match pipeline.page() {
            Some(_) => {
                let count: i64 = build(pipeline)
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                u64::try_from(count).unwrap_or(0)
            }
            None => 0,
        };

        let mut query = build(pipeline).order(tweets::created_at.desc());
        if let Some(page) = pipeline.page() {
            query = query.offset(page.offset()).limit(i64::from(page.limit()));
        }
        let rows: Vec<TweetRow> = query
            .select(TweetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let subjects: Vec<Tweet> = rows.into_iter().map(Tweet::from).collect();
        let total = if pipeline.page().is_some() {
            total
        } else {
            subjects.len() as u64
        };

        let subject_ids: Vec<Uuid> = subjects.iter().map(|t| *t.id.as_uuid()).collect();
        let owner_ids: Vec<Uuid> = subjects.iter().map(|t| *t.owner_id.as_uuid()).collect();

        let owners = if pipeline.joins_owner() {
            load_owner_map(&mut conn, &owner_ids).await?
        } else {
            HashMap::new()
        };
        let like_facts = match pipeline.likes_actor() {
            Some(actor) => {
                load_like_facts(&mut conn, LikeTargetKind::Tweet, &subject_ids, actor).await?
            }
            None => HashMap::new(),
        };

        let rows = subjects
            .into_iter()
            .map(|tweet| {
                let owner_uuid = *tweet.owner_id.as_uuid();
                let subject_uuid = *tweet.id.as_uuid();
                let mut row = PipelineRow::new(SubjectRecord::Tweet(tweet));
                row.owner = owners.get(&owner_uuid).cloned();
                if let Some((count, liked)) = like_facts.get(&subject_uuid) {
                    row.likes_count = *count;
                    row.liked_by_actor = *liked;
                }
                row
            })
            .collect();
        Ok(PipelinePage { rows, total })
    }

    async fn run_channels(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let resolved = Self::resolve_filters(&mut conn, pipeline).await?;

        let build = |resolved: &[Resolved]| {
            let mut query = users::table.into_boxed();
            for item in resolved {
                query = match item {
                    Resolved::IdIn(ids) => query.filter(users::id.eq_any(ids.clone())),
                    Resolved::Plain(Filter::Id(id)) => query.filter(users::id.eq(*id)),
                    Resolved::Plain(Filter::Username(name)) => {
                        query.filter(users::username.eq(name.clone()))
                    }
                    Resolved::Plain(_) => query,
                };
            }
            query
        };

        let total = match pipeline.page() {
            Some(_) => {
                let count: i64 = build(&resolved)
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                u64::try_from(count).unwrap_or(0)
            }
            None => 0,
        };

        let mut query = build(&resolved).order(users::created_at.desc());
        if let Some(page) = pipeline.page() {
            query = query.offset(page.offset()).limit(i64::from(page.limit()));
        }
        let rows: Vec<UserRow> = query
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let subjects: Vec<User> = rows.into_iter().map(User::from).collect();
        let total = if pipeline.page().is_some() {
            total
        } else {
            subjects.len() as u64
        };

        let subject_ids: Vec<Uuid> = subjects.iter().map(|u| *u.id.as_uuid()).collect();

        let sub_facts = match pipeline.subscriptions_actor() {
            Some(actor) => load_subscription_facts(&mut conn, &subject_ids, actor).await?,
            None => HashMap::new(),
        };
        let video_facts = if pipeline.derives_video_facts() {
            load_channel_video_facts(&mut conn, &subject_ids).await?
        } else {
            HashMap::new()
        };

        let rows = subjects
            .into_iter()
            .map(|user| {
                let subject_uuid = *user.id.as_uuid();
                let mut row = PipelineRow::new(SubjectRecord::Channel(user));
                if let Some(facts) = sub_facts.get(&subject_uuid) {
                    row.subscriber_count = facts.subscriber_count;
                    row.subscribed_by_actor = facts.subscribed_by_actor;
                    row.subscribed_to_count = facts.subscribed_to_count;
                }
                row.video_facts = video_facts.get(&subject_uuid).cloned();
                row
            })
            .collect();
        Ok(PipelinePage { rows, total })
    }

    async fn run_playlists(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let build = |pipeline: &Pipeline| {
            let mut query = playlists::table.into_boxed();
            for filter in pipeline.filters() {
                query = match filter {
                    Filter::Id(id) => query.filter(playlists::id.eq(*id)),
                    Filter::Owner(owner) => {
                        query.filter(playlists::owner_id.eq(*owner.as_uuid()))
                    }
                    _ => query,
                };
            }
            query
        };

        let total = match pipeline.page() {
            Some(_) => {
                let count: i64 = build(pipeline)
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                u64::try_from(count).unwrap_or(0)
            }
            None => 0,
        };

        let mut query = build(pipeline).order(playlists::created_at.desc());
        if let Some(page) = pipeline.page() {
            query = query.offset(page.offset()).limit(i64::from(page.limit()));
        }
        let rows: Vec<PlaylistRow> = query
            .select(PlaylistRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let subjects: Vec<Playlist> = rows.into_iter().map(Playlist::from).collect();
        let total = if pipeline.page().is_some() {
            total
        } else {
            subjects.len() as u64
        };

        let subject_ids: Vec<Uuid> = subjects.iter().map(|p| *p.id.as_uuid()).collect();
        let owner_ids: Vec<Uuid> = subjects.iter().map(|p| *p.owner_id.as_uuid()).collect();

        let owners = if pipeline.joins_owner() {
            load_owner_map(&mut conn, &owner_ids).await?
        } else {
            HashMap::new()
        };
        let video_facts = if pipeline.derives_video_facts() {
            load_playlist_video_facts(&mut conn, &subject_ids).await?
        } else {
            HashMap::new()
        };

        let rows = subjects
            .into_iter()
            .map(|playlist| {
                let owner_uuid = *playlist.owner_id.as_uuid();
                let subject_uuid = *playlist.id.as_uuid();
                let mut row = PipelineRow::new(SubjectRecord::Playlist(playlist));
                row.owner = owners.get(&owner_uuid).cloned();
                row.video_facts = video_facts.get(&subject_uuid).cloned();
                row
            })
            .collect();
        Ok(PipelinePage { rows, total })
    }
}

#[async_trait]
impl ReadModelExecutor for DieselReadModels {
    async fn execute(&self, pipeline: &Pipeline) -> Result<PipelinePage, StoreError> {
        match pipeline.subject() {
            Subject::Videos => self.run_videos(pipeline).await,
            Subject::Comments => self.run_comments(pipeline).await,
            Subject::Tweets => self.run_tweets(pipeline).await,
            Subject::Channels => self.run_channels(pipeline).await,
            Subject::Playlists => self.run_playlists(pipeline).await,
        }
    }
}
