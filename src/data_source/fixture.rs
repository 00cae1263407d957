use super::{CommentAck, DataSource, FollowAck, ReactionAck};
use crate::error::Result;
use crate::fixtures;
use crate::models::{ClipComment, CreatorProfile, Reaction, SessionCard, SkillClip};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

/// Serves the built-in catalog after a short simulated network delay.
/// Every call hands out fresh copies.
#[derive(Debug, Clone)]
pub struct FixtureDataSource {
    fetch_latency: Duration,
    reaction_latency: Duration,
    comment_latency: Duration,
}

impl Default for FixtureDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDataSource {
    pub fn new() -> Self {
        Self {
            fetch_latency: Duration::from_millis(350),
            reaction_latency: Duration::from_millis(250),
            comment_latency: Duration::from_millis(400),
        }
    }

    pub fn instant() -> Self {
        Self {
            fetch_latency: Duration::ZERO,
            reaction_latency: Duration::ZERO,
            comment_latency: Duration::ZERO,
        }
    }

    async fn simulate<T>(&self, latency: Duration, payload: T) -> Result<T> {
        if !latency.is_zero() {
            sleep(latency).await;
        }
        Ok(payload)
    }
}

#[async_trait]
impl DataSource for FixtureDataSource {
    fn name(&self) -> &'static str {
        "fixtures"
    }

    async fn fetch_sessions(&self) -> Result<Vec<SessionCard>> {
        self.simulate(self.fetch_latency, fixtures::sessions()).await
    }

    async fn fetch_creators(&self) -> Result<Vec<CreatorProfile>> {
        self.simulate(self.fetch_latency, fixtures::creators()).await
    }

    async fn fetch_clips(&self) -> Result<Vec<SkillClip>> {
        self.simulate(self.fetch_latency, fixtures::clips()).await
    }

    async fn fetch_clip_comments(&self) -> Result<Vec<ClipComment>> {
        self.simulate(self.fetch_latency, fixtures::clip_comments()).await
    }

    async fn follow_creator(&self, creator_id: &str, follow: bool) -> Result<FollowAck> {
        let ack = FollowAck {
            creator_id: creator_id.to_string(),
            follow,
        };
        self.simulate(self.reaction_latency, ack).await
    }

    async fn react_to_clip(&self, clip_id: &str, reaction: Reaction) -> Result<ReactionAck> {
        let ack = ReactionAck {
            clip_id: clip_id.to_string(),
            reaction,
        };
        self.simulate(self.reaction_latency, ack).await
    }

    async fn submit_clip_comment(&self, clip_id: &str, text: &str) -> Result<CommentAck> {
        let ack = CommentAck {
            clip_id: clip_id.to_string(),
            comment_id: format!("comment-{}", Uuid::new_v4().simple()),
            text: text.to_string(),
        };
        self.simulate(self.comment_latency, ack).await
    }
}
