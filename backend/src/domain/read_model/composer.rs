//! Read-model composition.
//!
//! One place builds every denormalised, actor-relative view: it assembles
//! a typed pipeline, hands it to the executor port, and projects the
//! hydrated rows. Endpoints never shape joins ad hoc.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ids::{PlaylistId, UserId, VideoId};
use crate::domain::ports::{ReadModelExecutor, StoreError};
use crate::domain::read_model::pipeline::{
    Filter, PageRequest, Pipeline, PipelinePage, PipelineRow, Subject, SubjectRecord,
};
use crate::domain::read_model::views::{
    ChannelCard, ChannelProfile, CommentView, OwnerSummary, Page, PlaylistDetail, PlaylistSummary,
    SubscribedChannelView, SubscriberView, TweetView, VideoDetail, VideoSummary,
};

/// Search criteria for the video listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSearch {
    pub owner: Option<UserId>,
    pub text: Option<String>,
    pub published_only: bool,
}

fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::Connection { message } => Error::service_unavailable(message),
        StoreError::Query { message } | StoreError::Duplicate { message } => {
            Error::internal(message)
        }
    }
}

/// Builds pipelines and projects their output into endpoint views.
#[derive(Clone)]
pub struct ReadModelComposer {
    executor: Arc<dyn ReadModelExecutor>,
}

impl ReadModelComposer {
    /// Create a composer over the given executor.
    pub fn new(executor: Arc<dyn ReadModelExecutor>) -> Self {
        Self { executor }
    }

    async fn run(&self, pipeline: &Pipeline) -> Result<PipelinePage, Error> {
        self.executor
            .execute(pipeline)
            .await
            .map_err(map_store_error)
    }

    async fn subject_exists(&self, subject: Subject, id: uuid::Uuid) -> Result<bool, Error> {
        let probe = Pipeline::over(subject).matching(Filter::Id(id));
        let page = self.run(&probe).await?;
        Ok(!page.rows.is_empty())
    }

    /// Detail view of one video, relative to the actor.
    pub async fn video_detail(
        &self,
        id: VideoId,
        actor: Option<UserId>,
    ) -> Result<VideoDetail, Error> {
        let pipeline = Pipeline::over(Subject::Videos)
            .matching(Filter::Id(*id.as_uuid()))
            .join_owner()
            .derive_likes(actor)
            .derive_subscriptions(actor);
        let page = self.run(&pipeline).await?;
        let row = page
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("video not found"))?;
        project_video_detail(row)
    }

    /// Paged video listing matching the search criteria.
    pub async fn videos(
        &self,
        search: &VideoSearch,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        let mut pipeline = Pipeline::over(Subject::Videos);
        if search.published_only {
            pipeline = pipeline.matching(Filter::PublishedOnly);
        }
        if let Some(owner) = search.owner {
            pipeline = pipeline.matching(Filter::Owner(owner));
        }
        if let Some(text) = &search.text {
            pipeline = pipeline.matching(Filter::Text(text.clone()));
        }
        let pipeline = pipeline.join_owner().sort_newest_first().paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_video_summary)
    }

    /// Paged comments under a video, relative to the actor.
    pub async fn comments_for_video(
        &self,
        video: VideoId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<CommentView>, Error> {
        if !self
            .subject_exists(Subject::Videos, *video.as_uuid())
            .await?
        {
            return Err(Error::not_found("video not found"));
        }
        let pipeline = Pipeline::over(Subject::Comments)
            .matching(Filter::OnVideo(video))
            .join_owner()
            .derive_likes(actor)
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_comment)
    }

    /// Paged tweets by a user, relative to the actor.
    pub async fn tweets_by_user(
        &self,
        user: UserId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<TweetView>, Error> {
        if !self
            .subject_exists(Subject::Channels, *user.as_uuid())
            .await?
        {
            return Err(Error::not_found("user not found"));
        }
        let pipeline = Pipeline::over(Subject::Tweets)
            .matching(Filter::Owner(user))
            .join_owner()
            .derive_likes(actor)
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_tweet)
    }

    /// Paged videos the actor has liked.
    pub async fn liked_videos(
        &self,
        actor: UserId,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        let pipeline = Pipeline::over(Subject::Videos)
            .matching(Filter::LikedBy(actor))
            .join_owner()
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_video_summary)
    }

    /// Paged videos in the actor's watch history.
    pub async fn watch_history(
        &self,
        actor: UserId,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        let pipeline = Pipeline::over(Subject::Videos)
            .matching(Filter::WatchedBy(actor))
            .join_owner()
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_video_summary)
    }

    /// Channel profile by username, relative to the actor.
    pub async fn channel_profile(
        &self,
        username: &str,
        actor: Option<UserId>,
    ) -> Result<ChannelProfile, Error> {
        let pipeline = Pipeline::over(Subject::Channels)
            .matching(Filter::Username(username.trim().to_lowercase()))
            .derive_subscriptions(actor);
        let page = self.run(&pipeline).await?;
        let row = page
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("channel does not exist"))?;
        project_channel_profile(row)
    }

    /// Paged subscribers of a channel, each with their own subscriber
    /// facts relative to the actor.
    pub async fn channel_subscribers(
        &self,
        channel: UserId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<SubscriberView>, Error> {
        if !self
            .subject_exists(Subject::Channels, *channel.as_uuid())
            .await?
        {
            return Err(Error::not_found("channel not found"));
        }
        let pipeline = Pipeline::over(Subject::Channels)
            .matching(Filter::SubscriberOf(channel))
            .derive_subscriptions(actor)
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_subscriber)
    }

    /// Paged channels the user subscribes to, each with its latest
    /// published video.
    pub async fn subscribed_channels(
        &self,
        subscriber: UserId,
        page: PageRequest,
    ) -> Result<Page<SubscribedChannelView>, Error> {
        if !self
            .subject_exists(Subject::Channels, *subscriber.as_uuid())
            .await?
        {
            return Err(Error::not_found("user not found"));
        }
        let pipeline = Pipeline::over(Subject::Channels)
            .matching(Filter::SubscribedBy(subscriber))
            .derive_video_facts()
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_subscribed_channel)
    }

    /// Paged playlists owned by a user, with video totals.
    pub async fn user_playlists(
        &self,
        owner: UserId,
        page: PageRequest,
    ) -> Result<Page<PlaylistSummary>, Error> {
        if !self
            .subject_exists(Subject::Channels, *owner.as_uuid())
            .await?
        {
            return Err(Error::not_found("user not found"));
        }
        let pipeline = Pipeline::over(Subject::Playlists)
            .matching(Filter::Owner(owner))
            .derive_video_facts()
            .sort_newest_first()
            .paginate(page);
        let result = self.run(&pipeline).await?;
        project_page(result, page, project_playlist_summary)
    }

    /// Detail view of a playlist with its published videos.
    pub async fn playlist_detail(&self, id: PlaylistId) -> Result<PlaylistDetail, Error> {
        let pipeline = Pipeline::over(Subject::Playlists)
            .matching(Filter::Id(*id.as_uuid()))
            .join_owner();
        let page = self.run(&pipeline).await?;
        let row = page
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("playlist not found"))?;

        let videos_pipeline = Pipeline::over(Subject::Videos)
            .matching(Filter::InPlaylist(id))
            .matching(Filter::PublishedOnly)
            .join_owner()
            .sort_newest_first();
        let videos = self.run(&videos_pipeline).await?;
        let videos = videos
            .rows
            .into_iter()
            .map(project_video_summary)
            .collect::<Result<Vec<_>, _>>()?;

        let playlist = match row.subject {
            SubjectRecord::Playlist(playlist) => playlist,
            _ => return Err(unexpected_subject()),
        };
        let total_videos = i64::try_from(videos.len()).unwrap_or(i64::MAX);
        let total_views = videos.iter().map(|v| v.views).sum();
        Ok(PlaylistDetail {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description,
            owner: row.owner.as_ref().map(OwnerSummary::from_user),
            total_videos,
            total_views,
            videos,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        })
    }
}

fn unexpected_subject() -> Error {
    Error::internal("pipeline returned an unexpected subject record")
}

fn project_page<T>(
    result: PipelinePage,
    page: PageRequest,
    project: impl Fn(PipelineRow) -> Result<T, Error>,
) -> Result<Page<T>, Error> {
    let items = result
        .rows
        .into_iter()
        .map(project)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        items,
        total: result.total,
        page: page.page(),
        limit: page.limit(),
    })
}

fn project_video_summary(row: PipelineRow) -> Result<VideoSummary, Error> {
    let video = match &row.subject {
        SubjectRecord::Video(video) => video,
        _ => return Err(unexpected_subject()),
    };
    Ok(VideoSummary::project(video, row.owner.as_ref()))
}

fn project_video_detail(row: PipelineRow) -> Result<VideoDetail, Error> {
    let video = match row.subject {
        SubjectRecord::Video(video) => video,
        _ => return Err(unexpected_subject()),
    };
    let owner = row.owner.as_ref().map(|user| ChannelCard {
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        avatar: user.avatar_url.clone(),
        subscriber_count: row.subscriber_count,
        is_subscribed: row.subscribed_by_actor,
    });
    Ok(VideoDetail {
        id: video.id,
        title: video.title,
        description: video.description,
        video_file: video.video_url,
        thumbnail: video.thumbnail_url,
        duration: video.duration_secs,
        views: video.views,
        is_published: video.is_published,
        created_at: video.created_at,
        likes_count: row.likes_count,
        is_liked: row.liked_by_actor,
        owner,
    })
}

fn project_comment(row: PipelineRow) -> Result<CommentView, Error> {
    let comment = match row.subject {
        SubjectRecord::Comment(comment) => comment,
        _ => return Err(unexpected_subject()),
    };
    Ok(CommentView {
        id: comment.id,
        content: comment.content,
        created_at: comment.created_at,
        likes_count: row.likes_count,
        is_liked: row.liked_by_actor,
        owner: row.owner.as_ref().map(OwnerSummary::from_user),
    })
}

fn project_tweet(row: PipelineRow) -> Result<TweetView, Error> {
    let tweet = match row.subject {
        SubjectRecord::Tweet(tweet) => tweet,
        _ => return Err(unexpected_subject()),
    };
    Ok(TweetView {
        id: tweet.id,
        content: tweet.content,
        created_at: tweet.created_at,
        likes_count: row.likes_count,
        is_liked: row.liked_by_actor,
        owner: row.owner.as_ref().map(OwnerSummary::from_user),
    })
}

fn project_channel_profile(row: PipelineRow) -> Result<ChannelProfile, Error> {
    let user = match row.subject {
        SubjectRecord::Channel(user) => user,
        _ => return Err(unexpected_subject()),
    };
    Ok(ChannelProfile {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        avatar: user.avatar_url,
        cover_image: user.cover_image_url,
        subscriber_count: row.subscriber_count,
        channels_subscribed_to_count: row.subscribed_to_count,
        is_subscribed: row.subscribed_by_actor,
        created_at: user.created_at,
    })
}

fn project_subscriber(row: PipelineRow) -> Result<SubscriberView, Error> {
    let user = match row.subject {
        SubjectRecord::Channel(user) => user,
        _ => return Err(unexpected_subject()),
    };
    Ok(SubscriberView {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        avatar: user.avatar_url,
        subscriber_count: row.subscriber_count,
        is_subscribed: row.subscribed_by_actor,
    })
}

fn project_subscribed_channel(row: PipelineRow) -> Result<SubscribedChannelView, Error> {
    let user = match row.subject {
        SubjectRecord::Channel(user) => user,
        _ => return Err(unexpected_subject()),
    };
    let latest_video = row
        .video_facts
        .as_ref()
        .and_then(|facts| facts.latest_video.as_ref())
        .map(|video| VideoSummary::project(video, None));
    Ok(SubscribedChannelView {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        avatar: user.avatar_url,
        latest_video,
    })
}

fn project_playlist_summary(row: PipelineRow) -> Result<PlaylistSummary, Error> {
    let playlist = match row.subject {
        SubjectRecord::Playlist(playlist) => playlist,
        _ => return Err(unexpected_subject()),
    };
    let facts = row.video_facts.unwrap_or_default();
    Ok(PlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description,
        total_videos: facts.video_count,
        total_views: facts.views_total,
        created_at: playlist.created_at,
        updated_at: playlist.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::MockReadModelExecutor;
    use crate::domain::user::User;
    use crate::domain::video::Video;

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

    fn composer_with(executor: MockReadModelExecutor) -> ReadModelComposer {
        ReadModelComposer::new(Arc::new(executor))
    }

    #[tokio::test]
    async fn video_detail_reports_not_found_for_empty_pipelines() {
        let mut executor = MockReadModelExecutor::new();
        executor.expect_execute().times(1).returning(|_| {
            Ok(PipelinePage {
                rows: Vec::new(),
                total: 0,
            })
        });

        let err = composer_with(executor)
            .video_detail(VideoId::random(), None)
            .await
            .expect_err("missing video");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn video_detail_defaults_actor_fields_to_false() {
        let owner = user();
        let video = Video::new(
            owner.id,
            "t".into(),
            "d".into(),
            "v".into(),
            "th".into(),
            1.0,
        );
        let mut row = PipelineRow::new(SubjectRecord::Video(video));
        row.owner = Some(owner);
        let mut executor = MockReadModelExecutor::new();
        executor.expect_execute().times(1).return_once(move |_| {
            Ok(PipelinePage {
                rows: vec![row],
                total: 1,
            })
        });

        let detail = composer_with(executor)
            .video_detail(VideoId::random(), None)
            .await
            .expect("detail");
        assert!(!detail.is_liked);
        assert_eq!(detail.likes_count, 0);
        let owner = detail.owner.expect("owner present");
        assert!(!owner.is_subscribed);
        assert_eq!(owner.subscriber_count, 0);
    }

    #[tokio::test]
    async fn comments_require_the_root_video_to_exist() {
        let mut executor = MockReadModelExecutor::new();
        // Probe for the root subject comes back empty; the comments
        // pipeline must never run.
        executor
            .expect_execute()
            .times(1)
            .withf(|pipeline| pipeline.subject() == Subject::Videos)
            .returning(|_| {
                Ok(PipelinePage {
                    rows: Vec::new(),
                    total: 0,
                })
            });

        let err = composer_with(executor)
            .comments_for_video(VideoId::random(), None, PageRequest::default())
            .await
            .expect_err("missing root");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn video_listing_builds_filters_from_the_search() {
        let owner = UserId::random();
        let mut executor = MockReadModelExecutor::new();
        executor
            .expect_execute()
            .times(1)
            .withf(move |pipeline| {
                let filters = pipeline.filters();
                pipeline.subject() == Subject::Videos
                    && filters.contains(&&Filter::PublishedOnly)
                    && filters.contains(&&Filter::Owner(owner))
                    && filters.contains(&&Filter::Text("rust".into()))
                    && pipeline.joins_owner()
                    && pipeline.page().is_some()
            })
            .returning(|_| {
                Ok(PipelinePage {
                    rows: Vec::new(),
                    total: 0,
                })
            });

        let search = VideoSearch {
            owner: Some(owner),
            text: Some("rust".into()),
            published_only: true,
        };
        let page = composer_with(executor)
            .videos(&search, PageRequest::default())
            .await
            .expect("page");
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn store_connection_failures_become_service_unavailable() {
        let mut executor = MockReadModelExecutor::new();
        executor
            .expect_execute()
            .returning(|_| Err(StoreError::connection("down")));

        let err = composer_with(executor)
            .liked_videos(UserId::random(), PageRequest::default())
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
