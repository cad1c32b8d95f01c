//! Like toggling.
//!
//! A toggle is a single decision point: look up the join row for the
//! (actor, target) pair, then either delete it or create it — never
//! both.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::like::{Like, LikeTarget};
use crate::domain::ports::{
    CommentRepository, LikeRepository, StoreError, TweetRepository, VideoRepository,
};
use crate::domain::read_model::views::{Page, VideoSummary};
use crate::domain::read_model::{PageRequest, ReadModelComposer};

use super::map_store_error;

/// Like service.
#[derive(Clone)]
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    videos: Arc<dyn VideoRepository>,
    comments: Arc<dyn CommentRepository>,
    tweets: Arc<dyn TweetRepository>,
    read_models: ReadModelComposer,
}

impl LikeService {
    /// Create the service over its ports.
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        videos: Arc<dyn VideoRepository>,
        comments: Arc<dyn CommentRepository>,
        tweets: Arc<dyn TweetRepository>,
        read_models: ReadModelComposer,
    ) -> Self {
        Self {
            likes,
            videos,
            comments,
            tweets,
            read_models,
        }
    }

    async fn target_exists(&self, target: &LikeTarget) -> Result<bool, Error> {
        let exists = match target {
            LikeTarget::Video(id) => self
                .videos
                .find_by_id(*id)
                .await
                .map_err(map_store_error)?
                .is_some(),
            LikeTarget::Comment(id) => self
                .comments
                .find_by_id(*id)
                .await
                .map_err(map_store_error)?
                .is_some(),
            LikeTarget::Tweet(id) => self
                .tweets
                .find_by_id(*id)
                .await
                .map_err(map_store_error)?
                .is_some(),
        };
        Ok(exists)
    }

    /// Toggle the actor's like on the target. Returns the new liked
    /// state.
    pub async fn toggle(&self, actor: UserId, target: LikeTarget) -> Result<bool, Error> {
        if !self.target_exists(&target).await? {
            return Err(Error::not_found(format!("{} not found", target.kind())));
        }

        let existing = self
            .likes
            .find(actor, &target)
            .await
            .map_err(map_store_error)?;
        match existing {
            Some(like) => {
                self.likes.delete(like.id).await.map_err(map_store_error)?;
                Ok(false)
            }
            None => {
                let like = Like::new(actor, target);
                match self.likes.insert(&like).await {
                    Ok(()) => Ok(true),
                    // A concurrent toggle won the insert; the pair is
                    // liked either way.
                    Err(StoreError::Duplicate { .. }) => Ok(true),
                    Err(error) => Err(map_store_error(error)),
                }
            }
        }
    }

    /// Paged videos the actor has liked.
    pub async fn liked_videos(
        &self,
        actor: UserId,
        page: PageRequest,
    ) -> Result<Page<VideoSummary>, Error> {
        self.read_models.liked_videos(actor, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ids::VideoId;
    use crate::domain::ports::{
        MockCommentRepository, MockLikeRepository, MockReadModelExecutor, MockTweetRepository,
        MockVideoRepository,
    };
    use crate::domain::video::Video;

    fn service(likes: MockLikeRepository, videos: MockVideoRepository) -> LikeService {
        LikeService::new(
            Arc::new(likes),
            Arc::new(videos),
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockTweetRepository::new()),
            ReadModelComposer::new(Arc::new(MockReadModelExecutor::new())),
        )
    }

    fn existing_video() -> MockVideoRepository {
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(|id| {
            let mut video = Video::new(
                UserId::random(),
                "t".into(),
                "d".into(),
                "v".into(),
                "th".into(),
                1.0,
            );
            video.id = id;
            Ok(Some(video))
        });
        videos
    }

    #[tokio::test]
    async fn toggle_creates_when_absent_and_reports_liked() {
        let mut likes = MockLikeRepository::new();
        likes.expect_find().times(1).returning(|_, _| Ok(None));
        likes.expect_insert().times(1).returning(|_| Ok(()));
        likes.expect_delete().times(0);

        let liked = service(likes, existing_video())
            .toggle(UserId::random(), LikeTarget::Video(VideoId::random()))
            .await
            .expect("toggled");
        assert!(liked);
    }

    #[tokio::test]
    async fn toggle_deletes_when_present_and_reports_unliked() {
        let actor = UserId::random();
        let target = LikeTarget::Video(VideoId::random());
        let like = Like::new(actor, target);
        let like_id = like.id;

        let mut likes = MockLikeRepository::new();
        likes
            .expect_find()
            .times(1)
            .return_once(move |_, _| Ok(Some(like)));
        likes
            .expect_delete()
            .withf(move |id| *id == like_id)
            .times(1)
            .returning(|_| Ok(true));
        likes.expect_insert().times(0);

        let liked = service(likes, existing_video())
            .toggle(actor, target)
            .await
            .expect("toggled");
        assert!(!liked);
    }

    #[tokio::test]
    async fn toggle_on_a_missing_target_is_not_found() {
        let mut videos = MockVideoRepository::new();
        videos.expect_find_by_id().returning(|_| Ok(None));
        let mut likes = MockLikeRepository::new();
        likes.expect_find().times(0);

        let err = service(likes, videos)
            .toggle(UserId::random(), LikeTarget::Video(VideoId::random()))
            .await
            .expect_err("missing target");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "video not found");
    }

    #[tokio::test]
    async fn a_lost_insert_race_still_reports_liked() {
        let mut likes = MockLikeRepository::new();
        likes.expect_find().returning(|_, _| Ok(None));
        likes
            .expect_insert()
            .returning(|_| Err(StoreError::duplicate("pair exists")));

        let liked = service(likes, existing_video())
            .toggle(UserId::random(), LikeTarget::Video(VideoId::random()))
            .await
            .expect("race tolerated");
        assert!(liked);
    }
}
