//! Video lifecycle: publish, side-effecting detail reads, owner-gated
//! mutation, and the transitive delete cascade.

use std::sync::Arc;

use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ids::{UserId, VideoId};
use crate::domain::like::LikeTarget;
use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{CommentRepository, LikeRepository, UserRepository, VideoRepository};
use crate::domain::read_model::views::{Page, VideoDetail, VideoSummary};
use crate::domain::read_model::{PageRequest, ReadModelComposer, VideoSearch};
use crate::domain::validation::require_non_blank;
use crate::domain::video::{Video, VideoChanges};

use super::map_store_error;

/// Publish payload after transport decoding. Media URLs come from the
/// upload pipeline, which runs before this service is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: f64,
}

/// Video service.
#[derive(Clone)]
pub struct VideoService {
    videos: Arc<dyn VideoRepository>,
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
    read_models: ReadModelComposer,
}

impl VideoService {
    /// Create the service over its ports.
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            videos,
            users,
            comments,
            likes,
            read_models,
        }
    }

    /// Publish a new video owned by the actor. Uploads start unpublished.
    pub async fn publish(&self, actor: UserId, video: NewVideo) -> Result<Video, Error> {
        let title = require_non_blank("title", &video.title)?;
        let description = require_non_blank("description", &video.description)?;
        let video_url = require_non_blank("videoFile", &video.video_url)?;
        let thumbnail_url = require_non_blank("thumbnail", &video.thumbnail_url)?;
        if !video.duration_secs.is_finite() || video.duration_secs < 0.0 {
            return Err(Error::invalid_request(
                "duration must be a non-negative number",
            ));
        }

        let video = Video::new(
            actor,
            title,
            description,
            video_url,
            thumbnail_url,
            video.duration_secs,
        );
        self.videos.insert(&video).await.map_err(map_store_error)?;

        self.videos
            .find_by_id(video.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("video upload could not be confirmed"))
    }

    /// Side-effecting detail fetch: every call bumps the view counter and
    /// set-inserts the video into the actor's watch history before the
    /// composed view is produced.
    pub async fn detail(&self, actor: UserId, id: VideoId) -> Result<VideoDetail, Error> {
        self.videos
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("video not found"))?;

        self.videos
            .increment_views(id)
            .await
            .map_err(map_store_error)?;
        self.users
            .record_watch(actor, id)
            .await
            .map_err(map_store_error)?;

        self.read_models.video_detail(id, Some(actor)).await
    }

    /// Paged listing of published videos.
    pub async fn list(
        &self,
        search: &VideoSearch,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        self.read_models.videos(search, page).await
    }

    /// Owner-gated partial update.
    pub async fn update(
        &self,
        actor: UserId,
        id: VideoId,
        title: Option<String>,
        description: Option<String>,
        thumbnail_url: Option<String>,
    ) -> Result<Video, Error> {
        let changes = VideoChanges {
            title: title
                .as_deref()
                .map(|value| require_non_blank("title", value))
                .transpose()?,
            description: description
                .as_deref()
                .map(|value| require_non_blank("description", value))
                .transpose()?,
            thumbnail_url: thumbnail_url
                .as_deref()
                .map(|value| require_non_blank("thumbnail", value))
                .transpose()?,
        };
        if changes.is_empty() {
            return Err(Error::invalid_request("at least one field is required"));
        }

        let current = self.videos.find_by_id(id).await.map_err(map_store_error)?;
        ensure_owner(current, actor, "video")?;

        self.videos
            .update(id, &changes)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("video not found"))
    }

    /// Owner-gated publish-flag flip.
    pub async fn toggle_publish(&self, actor: UserId, id: VideoId) -> Result<Video, Error> {
        let current = self.videos.find_by_id(id).await.map_err(map_store_error)?;
        let video = ensure_owner(current, actor, "video")?;

        self.videos
            .set_published(id, !video.is_published)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("video not found"))
    }

    /// Owner-gated delete with a transitive, best-effort cascade: the
    /// video's likes, its comments, and each comment's likes. Cascade
    /// failures after the primary delete are logged, not rolled back.
    pub async fn delete(&self, actor: UserId, id: VideoId) -> Result<(), Error> {
        let current = self.videos.find_by_id(id).await.map_err(map_store_error)?;
        ensure_owner(current, actor, "video")?;

        self.videos.delete(id).await.map_err(map_store_error)?;

        if let Err(error) = self.likes.delete_for_target(&LikeTarget::Video(id)).await {
            warn!(video = %id, %error, "cascade of video likes failed");
        }
        match self.comments.ids_for_video(id).await {
            Ok(comment_ids) => {
                for comment_id in comment_ids {
                    if let Err(error) = self
                        .likes
                        .delete_for_target(&LikeTarget::Comment(comment_id))
                        .await
                    {
                        warn!(comment = %comment_id, %error, "cascade of comment likes failed");
                    }
                }
                if let Err(error) = self.comments.delete_for_video(id).await {
                    warn!(video = %id, %error, "cascade of video comments failed");
                }
            }
            Err(error) => {
                warn!(video = %id, %error, "could not enumerate comments for cascade");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ids::CommentId;
    use crate::domain::ports::{
        MockCommentRepository, MockLikeRepository, MockReadModelExecutor, MockUserRepository,
        MockVideoRepository,
    };

    fn new_video() -> NewVideo {
        NewVideo {
            title: "title".into(),
            description: "description".into(),
            video_url: "https://cdn.example.com/v.mp4".into(),
            thumbnail_url: "https://cdn.example.com/t.png".into(),
            duration_secs: 42.0,
        }
    }

    fn service(
        videos: MockVideoRepository,
        users: MockUserRepository,
        comments: MockCommentRepository,
        likes: MockLikeRepository,
    ) -> VideoService {
        VideoService::new(
            Arc::new(videos),
            Arc::new(users),
            Arc::new(comments),
            Arc::new(likes),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    #[tokio::test]
    async fn publish_rejects_blank_required_fields() {
        let mut video = new_video();
        video.title = "   ".into();

        let err = service(
            MockVideoRepository::new(),
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .publish(UserId::random(), video)
        .await
        .expect_err("blank title");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn publish_confirms_the_write_by_re_reading() {
        let mut videos = MockVideoRepository::new();
        videos.expect_insert().times(1).returning(|_| Ok(()));
        videos.expect_find_by_id().times(1).returning(|_| Ok(None));

        let err = service(
            videos,
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .publish(UserId::random(), new_video())
        .await
        .expect_err("unconfirmed write");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn update_by_a_non_owner_is_forbidden_and_writes_nothing() {
        let owner = UserId::random();
        let id = VideoId::random();
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().times(1).returning(move |_| {
            Ok(Some(Video::new(
                owner,
                "t".into(),
                "d".into(),
                "v".into(),
                "th".into(),
                1.0,
            )))
        });
        videos.expect_update().times(0);

        let err = service(
            videos,
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .update(UserId::random(), id, Some("new".into()), None, None)
        .await
        .expect_err("foreign video");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_requires_at_least_one_field() {
        let err = service(
            MockVideoRepository::new(),
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .update(UserId::random(), VideoId::random(), None, None, None)
        .await
        .expect_err("empty update");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn delete_cascades_to_likes_and_comment_likes() {
        let owner = UserId::random();
        let id = VideoId::random();
        let comment_id = CommentId::random();

        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(move |_| {
            Ok(Some(Video::new(
                owner,
                "t".into(),
                "d".into(),
                "v".into(),
                "th".into(),
                1.0,
            )))
        });
        videos.expect_delete().times(1).returning(|_| Ok(true));

        let mut likes = MockLikeRepository::new();
        likes
            .expect_delete_for_target()
            .withf(move |target| *target == LikeTarget::Video(id))
            .times(1)
            .returning(|_| Ok(2));
        likes
            .expect_delete_for_target()
            .withf(move |target| *target == LikeTarget::Comment(comment_id))
            .times(1)
            .returning(|_| Ok(1));

        let mut comments = MockCommentRepository::new();
        comments
            .expect_ids_for_video()
            .times(1)
            .returning(move |_| Ok(vec![comment_id]));
        comments
            .expect_delete_for_video()
            .times(1)
            .returning(|_| Ok(1));

        service(videos, MockUserRepository::new(), comments, likes)
            .delete(owner, id)
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn delete_of_a_missing_video_is_not_found() {
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(|_| Ok(None));
        videos.expect_delete().times(0);

        let err = service(
            videos,
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .delete(UserId::random(), VideoId::random())
        .await
        .expect_err("missing video");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn toggle_publish_flips_the_current_flag() {
        let owner = UserId::random();
        let id = VideoId::random();
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(move |_| {
            Ok(Some(Video::new(
                owner,
                "t".into(),
                "d".into(),
                "v".into(),
                "th".into(),
                1.0,
            )))
        });
        videos
            .expect_set_published()
            .withf(|_, published| *published)
            .times(1)
            .returning(move |vid, published| {
                let mut video =
                    Video::new(owner, "t".into(), "d".into(), "v".into(), "th".into(), 1.0);
                video.id = vid;
                video.is_published = published;
                Ok(Some(video))
            });

        let video = service(
            videos,
            MockUserRepository::new(),
            MockCommentRepository::new(),
            MockLikeRepository::new(),
        )
        .toggle_publish(owner, id)
        .await
        .expect("toggled");
        assert!(video.is_published);
    }
}
