//! Catalog supply and engagement writes.
//!
//! The app only sees [`DataSource`]. Which implementation backs it is decided
//! once at startup by [`select`]: the built-in fixtures, or the live backend
//! wrapped so that any failed call falls back to the fixtures.

mod fallback;
mod fixture;
mod remote;

pub use fallback::FallbackDataSource;
pub use fixture::FixtureDataSource;
pub use remote::RemoteDataSource;

use crate::config::Config;
use crate::error::Result;
use crate::models::{Catalog, ClipComment, CreatorProfile, Reaction, SessionCard, SkillClip};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowAck {
    pub creator_id: String,
    pub follow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAck {
    pub clip_id: String,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAck {
    pub clip_id: String,
    pub comment_id: String,
    pub text: String,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_sessions(&self) -> Result<Vec<SessionCard>>;
    async fn fetch_creators(&self) -> Result<Vec<CreatorProfile>>;
    async fn fetch_clips(&self) -> Result<Vec<SkillClip>>;
    async fn fetch_clip_comments(&self) -> Result<Vec<ClipComment>>;

    async fn follow_creator(&self, creator_id: &str, follow: bool) -> Result<FollowAck>;
    async fn react_to_clip(&self, clip_id: &str, reaction: Reaction) -> Result<ReactionAck>;
    async fn submit_clip_comment(&self, clip_id: &str, text: &str) -> Result<CommentAck>;
}

/// Issues the four catalog fetches concurrently. Each slot is `None` when
/// its fetch failed, so callers can keep what they already had.
pub async fn fetch_catalog(source: &dyn DataSource) -> PartialCatalog {
    let (sessions, creators, clips, comments) = tokio::join!(
        source.fetch_sessions(),
        source.fetch_creators(),
        source.fetch_clips(),
        source.fetch_clip_comments(),
    );

    PartialCatalog {
        sessions: log_failure("sessions", sessions),
        creators: log_failure("creators", creators),
        clips: log_failure("clips", clips),
        comments: log_failure("clip comments", comments),
    }
}

#[derive(Debug, Default)]
pub struct PartialCatalog {
    pub sessions: Option<Vec<SessionCard>>,
    pub creators: Option<Vec<CreatorProfile>>,
    pub clips: Option<Vec<SkillClip>>,
    pub comments: Option<Vec<ClipComment>>,
}

impl PartialCatalog {
    /// Overwrites only the collections that loaded.
    pub fn merge_into(self, catalog: &mut Catalog) {
        if let Some(sessions) = self.sessions {
            catalog.sessions = sessions;
        }
        if let Some(creators) = self.creators {
            catalog.creators = creators;
        }
        if let Some(clips) = self.clips {
            catalog.clips = clips;
        }
        if let Some(comments) = self.comments {
            catalog.comments = comments;
        }
    }
}

fn log_failure<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "failed to load {}", what);
            None
        }
    }
}

pub fn select(config: &Config, viewer_id: String) -> Arc<dyn DataSource> {
    match &config.backend {
        Some(backend) => {
            info!(url = %backend.url, "using live backend with fixture fallback");
            Arc::new(FallbackDataSource::new(
                Box::new(RemoteDataSource::new(backend.clone(), viewer_id)),
                Box::new(FixtureDataSource::new()),
            ))
        }
        None => {
            info!("no backend configured, using built-in fixtures");
            Arc::new(FixtureDataSource::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use std::path::PathBuf;

    fn config(backend: Option<BackendConfig>) -> Config {
        Config {
            backend,
            store_path: PathBuf::from("unused.json"),
            log_directive: "warn".into(),
        }
    }

    #[test]
    fn select_follows_backend_presence() {
        assert_eq!(select(&config(None), "viewer".into()).name(), "fixtures");
        let backend = BackendConfig {
            url: "http://localhost:9".into(),
            anon_key: "anon".into(),
        };
        assert_eq!(
            select(&config(Some(backend)), "viewer".into()).name(),
            "remote+fixtures"
        );
    }

    #[tokio::test]
    async fn fetch_catalog_loads_all_four() {
        let source = FixtureDataSource::instant();
        let mut catalog = Catalog::default();
        fetch_catalog(&source).await.merge_into(&mut catalog);
        assert!(!catalog.sessions.is_empty());
        assert!(!catalog.creators.is_empty());
        assert!(!catalog.clips.is_empty());
        assert!(!catalog.comments.is_empty());
    }

    #[test]
    fn merge_keeps_collections_that_failed() {
        let mut catalog = Catalog {
            sessions: crate::fixtures::sessions(),
            ..Catalog::default()
        };
        PartialCatalog {
            clips: Some(crate::fixtures::clips()),
            ..PartialCatalog::default()
        }
        .merge_into(&mut catalog);
        assert_eq!(catalog.sessions.len(), crate::fixtures::sessions().len());
        assert_eq!(catalog.clips.len(), crate::fixtures::clips().len());
    }
}
