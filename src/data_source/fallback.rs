use super::{CommentAck, DataSource, FollowAck, ReactionAck};
use crate::error::Result;
use crate::models::{ClipComment, CreatorProfile, Reaction, SessionCard, SkillClip};
use async_trait::async_trait;
use tracing::error;

/// Tries `primary` first and answers from `fallback` when it fails.
pub struct FallbackDataSource {
    primary: Box<dyn DataSource>,
    fallback: Box<dyn DataSource>,
}

impl FallbackDataSource {
    pub fn new(primary: Box<dyn DataSource>, fallback: Box<dyn DataSource>) -> Self {
        Self { primary, fallback }
    }

    fn report(&self, operation: &str, e: &crate::error::Error) {
        error!(
            source = self.primary.name(),
            operation,
            error = %e,
            "falling back to {}",
            self.fallback.name()
        );
    }
}

#[async_trait]
impl DataSource for FallbackDataSource {
    fn name(&self) -> &'static str {
        "remote+fixtures"
    }

    async fn fetch_sessions(&self) -> Result<Vec<SessionCard>> {
        match self.primary.fetch_sessions().await {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                self.report("fetch_sessions", &e);
                self.fallback.fetch_sessions().await
            }
        }
    }

    async fn fetch_creators(&self) -> Result<Vec<CreatorProfile>> {
        match self.primary.fetch_creators().await {
            Ok(creators) => Ok(creators),
            Err(e) => {
                self.report("fetch_creators", &e);
                self.fallback.fetch_creators().await
            }
        }
    }

    async fn fetch_clips(&self) -> Result<Vec<SkillClip>> {
        match self.primary.fetch_clips().await {
            Ok(clips) => Ok(clips),
            Err(e) => {
                self.report("fetch_clips", &e);
                self.fallback.fetch_clips().await
            }
        }
    }

    async fn fetch_clip_comments(&self) -> Result<Vec<ClipComment>> {
        match self.primary.fetch_clip_comments().await {
            Ok(comments) => Ok(comments),
            Err(e) => {
                self.report("fetch_clip_comments", &e);
                self.fallback.fetch_clip_comments().await
            }
        }
    }

    async fn follow_creator(&self, creator_id: &str, follow: bool) -> Result<FollowAck> {
        match self.primary.follow_creator(creator_id, follow).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                self.report("follow_creator", &e);
                self.fallback.follow_creator(creator_id, follow).await
            }
        }
    }

    async fn react_to_clip(&self, clip_id: &str, reaction: Reaction) -> Result<ReactionAck> {
        match self.primary.react_to_clip(clip_id, reaction).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                self.report("react_to_clip", &e);
                self.fallback.react_to_clip(clip_id, reaction).await
            }
        }
    }

    async fn submit_clip_comment(&self, clip_id: &str, text: &str) -> Result<CommentAck> {
        match self.primary.submit_clip_comment(clip_id, text).await {
            Ok(ack) => Ok(ack),
            Err(e) => {
                self.report("submit_clip_comment", &e);
                self.fallback.submit_clip_comment(clip_id, text).await
            }
        }
    }
}
