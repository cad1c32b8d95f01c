//! Typed pipeline descriptors for composed reads.
//!
//! A [`Pipeline`] is an ordered sequence of explicit stage descriptors —
//! match, join, derive, sort, paginate — that a store adapter translates
//! into its native query language. The composer builds pipelines; it
//! never sees store syntax.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::ids::{PlaylistId, UserId, VideoId};
use crate::domain::playlist::Playlist;
use crate::domain::tweet::Tweet;
use crate::domain::user::User;
use crate::domain::video::Video;

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Collection a pipeline reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Videos,
    Comments,
    Tweets,
    /// Users viewed as channels.
    Channels,
    Playlists,
}

/// Match criteria a pipeline can filter its subject by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Subject primary key equals the given id.
    Id(Uuid),
    /// Subject owner equals the given user.
    Owner(UserId),
    /// Only published videos.
    PublishedOnly,
    /// Title or description contains the given text.
    Text(String),
    /// Comments attached to the given video.
    OnVideo(VideoId),
    /// Videos the given actor has liked.
    LikedBy(UserId),
    /// Videos in the given actor's watch history.
    WatchedBy(UserId),
    /// Videos belonging to the given playlist.
    InPlaylist(PlaylistId),
    /// Channels subject: users subscribed to the given channel.
    SubscriberOf(UserId),
    /// Channels subject: channels the given user subscribes to.
    SubscribedBy(UserId),
    /// Channels subject: user with the given username.
    Username(String),
}

/// 1-indexed page request with a bounded limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Clamp raw query values into a valid request. Zero and out-of-range
    /// values fall back to the defaults rather than erroring.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    /// The requested page, starting at 1.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One step of a composed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Restrict the subject set.
    Match(Filter),
    /// Join the owning user onto each row. A missing owner leaves the
    /// field absent; it is never an error.
    JoinOwner,
    /// Join like rows to derive `likes_count` and, when an actor is
    /// present, `liked_by_actor`. Anonymous actors derive `false`.
    DeriveLikes { actor: Option<UserId> },
    /// Join subscription rows to derive subscriber facts. On the videos
    /// subject the facts describe the owner channel; on the channels
    /// subject they describe the channel itself.
    DeriveSubscriptions { actor: Option<UserId> },
    /// Join owned/member videos to derive counts, view totals, and the
    /// most recent published video.
    DeriveVideoFacts,
    /// Order newest first. The only supported order.
    SortNewestFirst,
    /// Apply page/limit and report the pre-page total.
    Paginate(PageRequest),
}

/// Ordered stage sequence over one subject collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    subject: Subject,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Start a pipeline over the given subject.
    pub fn over(subject: Subject) -> Self {
        Self {
            subject,
            stages: Vec::new(),
        }
    }

    /// Append a match stage.
    pub fn matching(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    /// Append the owner join stage.
    pub fn join_owner(mut self) -> Self {
        self.stages.push(Stage::JoinOwner);
        self
    }

    /// Append the like-derivation stage.
    pub fn derive_likes(mut self, actor: Option<UserId>) -> Self {
        self.stages.push(Stage::DeriveLikes { actor });
        self
    }

    /// Append the subscription-derivation stage.
    pub fn derive_subscriptions(mut self, actor: Option<UserId>) -> Self {
        self.stages.push(Stage::DeriveSubscriptions { actor });
        self
    }

    /// Append the video-facts stage.
    pub fn derive_video_facts(mut self) -> Self {
        self.stages.push(Stage::DeriveVideoFacts);
        self
    }

    /// Append the sort stage.
    pub fn sort_newest_first(mut self) -> Self {
        self.stages.push(Stage::SortNewestFirst);
        self
    }

    /// Append the pagination stage.
    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.stages.push(Stage::Paginate(page));
        self
    }

    /// Subject collection of this pipeline.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// The full stage sequence.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Every match filter, in order.
    pub fn filters(&self) -> Vec<&Filter> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                Stage::Match(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    /// Whether the owner join stage is present.
    pub fn joins_owner(&self) -> bool {
        self.stages.iter().any(|s| matches!(s, Stage::JoinOwner))
    }

    /// The like-derivation actor, if the stage is present.
    pub fn likes_actor(&self) -> Option<Option<UserId>> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::DeriveLikes { actor } => Some(*actor),
            _ => None,
        })
    }

    /// The subscription-derivation actor, if the stage is present.
    pub fn subscriptions_actor(&self) -> Option<Option<UserId>> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::DeriveSubscriptions { actor } => Some(*actor),
            _ => None,
        })
    }

    /// Whether the video-facts stage is present.
    pub fn derives_video_facts(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, Stage::DeriveVideoFacts))
    }

    /// The pagination request, if the stage is present.
    pub fn page(&self) -> Option<PageRequest> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Paginate(page) => Some(*page),
            _ => None,
        })
    }
}

/// A subject row in executor output.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectRecord {
    Video(Video),
    Comment(Comment),
    Tweet(Tweet),
    Channel(User),
    Playlist(Playlist),
}

impl SubjectRecord {
    /// Creation time used by the newest-first sort.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Video(v) => v.created_at,
            Self::Comment(c) => c.created_at,
            Self::Tweet(t) => t.created_at,
            Self::Channel(u) => u.created_at,
            Self::Playlist(p) => p.created_at,
        }
    }

    /// Owner reference, where the subject has one. Channels own
    /// themselves.
    pub fn owner_id(&self) -> UserId {
        match self {
            Self::Video(v) => v.owner_id,
            Self::Comment(c) => c.owner_id,
            Self::Tweet(t) => t.owner_id,
            Self::Channel(u) => u.id,
            Self::Playlist(p) => p.owner_id,
        }
    }

    /// Primary key as a raw UUID.
    pub fn id_uuid(&self) -> Uuid {
        match self {
            Self::Video(v) => *v.id.as_uuid(),
            Self::Comment(c) => *c.id.as_uuid(),
            Self::Tweet(t) => *t.id.as_uuid(),
            Self::Channel(u) => *u.id.as_uuid(),
            Self::Playlist(p) => *p.id.as_uuid(),
        }
    }
}

/// Video aggregates derived for channels and playlists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFacts {
    pub video_count: i64,
    pub views_total: i64,
    pub latest_video: Option<Video>,
}

/// Fully hydrated pipeline output row.
///
/// Derived fields default to zero/false so a subject with no join rows
/// still carries every field.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRow {
    pub subject: SubjectRecord,
    pub owner: Option<User>,
    pub likes_count: i64,
    pub liked_by_actor: bool,
    pub subscriber_count: i64,
    pub subscribed_by_actor: bool,
    pub subscribed_to_count: i64,
    pub video_facts: Option<VideoFacts>,
}

impl PipelineRow {
    /// Row with every derived field at its default.
    pub fn new(subject: SubjectRecord) -> Self {
        Self {
            subject,
            owner: None,
            likes_count: 0,
            liked_by_actor: false,
            subscriber_count: 0,
            subscribed_by_actor: false,
            subscribed_to_count: 0,
            video_facts: None,
        }
    }
}

/// Executor output: one page of rows plus the pre-page total.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePage {
    pub rows: Vec<PipelineRow>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(0), 1, 10)]
    #[case(Some(3), Some(25), 3, 25)]
    #[case(Some(1), Some(1000), 1, MAX_PAGE_LIMIT)]
    fn page_requests_clamp_raw_input(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::new(page, limit);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[test]
    fn offset_skips_earlier_pages() {
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PageRequest::new(None, None).offset(), 0);
    }

    #[test]
    fn builder_records_stages_in_order() {
        let actor = UserId::random();
        let pipeline = Pipeline::over(Subject::Comments)
            .matching(Filter::OnVideo(VideoId::random()))
            .join_owner()
            .derive_likes(Some(actor))
            .sort_newest_first()
            .paginate(PageRequest::default());

        assert_eq!(pipeline.subject(), Subject::Comments);
        assert_eq!(pipeline.stages().len(), 5);
        assert!(pipeline.joins_owner());
        assert_eq!(pipeline.likes_actor(), Some(Some(actor)));
        assert_eq!(pipeline.subscriptions_actor(), None);
        assert!(pipeline.page().is_some());
    }

    #[test]
    fn anonymous_like_derivation_is_representable() {
        let pipeline = Pipeline::over(Subject::Videos).derive_likes(None);
        assert_eq!(pipeline.likes_actor(), Some(None));
    }
}
