use crate::tags::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Live,
    Soon,
    Later,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Live => "live",
            SessionStatus::Soon => "soon",
            SessionStatus::Later => "later",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCard {
    pub id: String,
    pub title: String,
    pub tag: Tag,
    pub host: String,
    pub host_avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_video_url: Option<String>,
    pub language: String,
    pub start_time: String,
    /// Minutes
    pub duration: u32,
    pub level: SkillLevel,
    pub rating: f64,
    pub status: SessionStatus,
    pub blurb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillClip {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub preview_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Seconds
    pub duration: u32,
    pub likes: u64,
    pub comments: u64,
    pub saves: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub languages: Vec<String>,
    pub specialty: Vec<Tag>,
    pub followers: u64,
    pub upcoming_sessions: u32,
    pub clip_count: u32,
}

impl CreatorProfile {
    /// Stand-in for clips whose creator id is missing from the catalog.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown creator".to_string(),
            avatar: String::new(),
            bio: String::new(),
            languages: Vec::new(),
            specialty: Vec::new(),
            followers: 0,
            upcoming_sessions: 0,
            clip_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentRole {
    Question,
    Tip,
    Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipComment {
    pub id: String,
    pub clip_id: String,
    pub author: String,
    pub avatar: String,
    pub role: CommentRole,
    pub body: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Save,
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reaction::Like => "like",
            Reaction::Save => "save",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub sessions: Vec<SessionCard>,
    pub creators: Vec<CreatorProfile>,
    pub clips: Vec<SkillClip>,
    pub comments: Vec<ClipComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session: Option<SessionCard>,
}

impl FeedbackPayload {
    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            tags: Vec::new(),
            notes: String::new(),
            session: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        (1..=5).contains(&self.rating)
    }
}

#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub title: String,
    pub tag: Tag,
    pub start_time: String,
    pub duration: u32,
    pub level: SkillLevel,
    pub status: SessionStatus,
    pub blurb: String,
}

#[derive(Debug, Clone)]
pub struct ClipDraft {
    pub title: String,
    pub tag: Tag,
    pub preview_url: String,
    pub duration: u32,
    pub video_url: Option<String>,
}
