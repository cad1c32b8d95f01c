//! Comment lifecycle under a video.

use std::sync::Arc;

use tracing::warn;

use crate::domain::comment::Comment;
use crate::domain::error::Error;
use crate::domain::ids::{CommentId, UserId, VideoId};
use crate::domain::like::LikeTarget;
use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{CommentRepository, LikeRepository, VideoRepository};
use crate::domain::read_model::views::{CommentView, Page};
use crate::domain::read_model::{PageRequest, ReadModelComposer};
use crate::domain::validation::require_non_blank;

use super::map_store_error;

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    videos: Arc<dyn VideoRepository>,
    likes: Arc<dyn LikeRepository>,
    read_models: ReadModelComposer,
}

impl CommentService {
    /// Create the service over its ports.
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        videos: Arc<dyn VideoRepository>,
        likes: Arc<dyn LikeRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            comments,
            videos,
            likes,
            read_models,
        }
    }

    /// Add a comment under an existing video.
    pub async fn add(
        &self,
        actor: UserId,
        video_id: VideoId,
        content: &str,
    ) -> Result<Comment, Error> {
        let content = require_non_blank("content", content)?;
        self.videos
            .find_by_id(video_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("video not found"))?;

        let comment = Comment::new(video_id, actor, content);
        self.comments
            .insert(&comment)
            .await
            .map_err(map_store_error)?;

        self.comments
            .find_by_id(comment.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::internal("comment could not be confirmed"))
    }

    /// Paged comments under a video, relative to the actor.
    pub async fn list(
        &self,
        video_id: VideoId,
        actor: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<CommentView>, Error> {
        self.read_models
            .comments_for_video(video_id, actor, page)
            .await
    }

    /// Owner-gated body edit.
    pub async fn update(
        &self,
        actor: UserId,
        id: CommentId,
        content: &str,
    ) -> Result<Comment, Error> {
        let content = require_non_blank("content", content)?;
        let current = self
            .comments
            .find_by_id(id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "comment")?;

        self.comments
            .update_content(id, &content)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("comment not found"))
    }

    /// Owner-gated delete; the comment's likes are cascaded best-effort.
    pub async fn delete(&self, actor: UserId, id: CommentId) -> Result<(), Error> {
        let current = self
            .comments
            .find_by_id(id)
            .await
            .map_err(map_store_error)?;
        ensure_owner(current, actor, "comment")?;

        self.comments.delete(id).await.map_err(map_store_error)?;
        if let Err(error) = self.likes.delete_for_target(&LikeTarget::Comment(id)).await {
            warn!(comment = %id, %error, "cascade of comment likes failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        MockCommentRepository, MockLikeRepository, MockReadModelExecutor, MockVideoRepository,
    };
    use crate::domain::video::Video;

    fn service(
        comments: MockCommentRepository,
        videos: MockVideoRepository,
        likes: MockLikeRepository,
    ) -> CommentService {
        CommentService::new(
            Arc::new(comments),
            Arc::new(videos),
            Arc::new(likes),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    #[tokio::test]
    async fn add_requires_the_video_to_exist() {
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().times(0);

        let err = service(comments, videos, MockLikeRepository::new())
            .add(UserId::random(), VideoId::random(), "first!")
            .await
            .expect_err("missing video");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn add_rejects_blank_content_before_any_lookup() {
        let err = service(
            MockCommentRepository::new(),
            MockVideoRepository::new(),
            MockLikeRepository::new(),
        )
        .add(UserId::random(), VideoId::random(), "  \n ")
        .await
        .expect_err("blank content");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn add_persists_and_confirms_the_comment() {
        let owner = UserId::random();
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(move |id| {
            let mut video = Video::new(owner, "t".into(), "d".into(), "v".into(), "th".into(), 1.0);
            video.id = id;
            Ok(Some(video))
        });
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().times(1).returning(|_| Ok(()));
        comments
            .expect_find_by_id()
            .times(1)
            .returning(|id| {
                let mut comment = Comment::new(VideoId::random(), UserId::random(), "first!".into());
                comment.id = id;
                Ok(Some(comment))
            });

        let comment = service(comments, videos, MockLikeRepository::new())
            .add(UserId::random(), VideoId::random(), "  first!  ")
            .await
            .expect("added");
        assert_eq!(comment.content, "first!");
    }

    #[tokio::test]
    async fn update_by_a_non_owner_is_forbidden() {
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(|id| {
            let mut comment = Comment::new(VideoId::random(), UserId::random(), "hi".into());
            comment.id = id;
            Ok(Some(comment))
        });
        comments.expect_update_content().times(0);

        let err = service(
            comments,
            MockVideoRepository::new(),
            MockLikeRepository::new(),
        )
        .update(UserId::random(), CommentId::random(), "edit")
        .await
        .expect_err("foreign comment");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_cascades_the_comment_likes() {
        let actor = UserId::random();
        let id = CommentId::random();
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(move |cid| {
            let mut comment = Comment::new(VideoId::random(), actor, "hi".into());
            comment.id = cid;
            Ok(Some(comment))
        });
        comments.expect_delete().times(1).returning(|_| Ok(true));

        let mut likes = MockLikeRepository::new();
        likes
            .expect_delete_for_target()
            .withf(move |target| *target == LikeTarget::Comment(id))
            .times(1)
            .returning(|_| Ok(3));

        service(comments, MockVideoRepository::new(), likes)
            .delete(actor, id)
            .await
            .expect("deleted");
    }
}
