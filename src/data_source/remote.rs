use super::{CommentAck, DataSource, FollowAck, ReactionAck};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::{
    ClipComment, CommentRole, CreatorProfile, Reaction, SessionCard, SessionStatus, SkillClip,
    SkillLevel,
};
use crate::tags::Tag;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

const SESSION_COLUMNS: &str =
    "id,title,tag,host,host_avatar,demo_video_url,language,start_time,duration,level,rating,status,blurb";
const CREATOR_COLUMNS: &str =
    "id,name,avatar,bio,languages,specialty,followers,upcoming_sessions,clip_count";
const CLIP_COLUMNS: &str =
    "id,title,creator_id,preview_url,video_url,duration,likes,comments,saves,views,tags,cta_session_id";
const COMMENT_COLUMNS: &str = "id,clip_id,author,avatar,role,body,timestamp";

/// Table-per-collection REST backend (PostgREST conventions).
pub struct RemoteDataSource {
    client: Client,
    config: BackendConfig,
    viewer_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionRecord {
    id: String,
    title: String,
    tag: String,
    host: String,
    #[serde(default)]
    host_avatar: Option<String>,
    #[serde(default)]
    demo_video_url: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
    level: String,
    #[serde(default)]
    rating: Option<f64>,
    status: String,
    #[serde(default)]
    blurb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatorRecord {
    id: String,
    name: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    languages: Option<Vec<String>>,
    #[serde(default)]
    specialty: Option<Vec<String>>,
    #[serde(default)]
    followers: Option<u64>,
    #[serde(default)]
    upcoming_sessions: Option<u32>,
    #[serde(default)]
    clip_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ClipRecord {
    id: String,
    title: String,
    creator_id: String,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    comments: Option<u64>,
    #[serde(default)]
    saves: Option<u64>,
    #[serde(default)]
    views: Option<u64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    cta_session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    id: String,
    clip_id: String,
    author: String,
    #[serde(default)]
    avatar: Option<String>,
    role: String,
    body: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct InsertedId {
    id: String,
}

fn quarantine_tags(owner: &str, raw: Option<Vec<String>>) -> Vec<Tag> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value.parse::<Tag>() {
            Ok(tag) => Some(tag),
            Err(_) => {
                warn!(owner, tag = %value, "dropping unrecognized tag");
                None
            }
        })
        .collect()
}

fn enum_column<T: DeserializeOwned>(owner: &str, column: &str, raw: &str) -> Option<T> {
    match serde_json::from_value(Value::String(raw.to_string())) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(owner, column, value = %raw, "skipping row with unrecognized value");
            None
        }
    }
}

impl SessionRecord {
    fn into_session(self) -> Option<SessionCard> {
        let tag = match self.tag.parse::<Tag>() {
            Ok(tag) => tag,
            Err(_) => {
                warn!(session = %self.id, tag = %self.tag, "skipping session with unrecognized tag");
                return None;
            }
        };
        let level: SkillLevel = enum_column(&self.id, "level", &self.level)?;
        let status: SessionStatus = enum_column(&self.id, "status", &self.status)?;
        Some(SessionCard {
            id: self.id,
            title: self.title,
            tag,
            host: self.host,
            host_avatar: self.host_avatar.unwrap_or_default(),
            demo_video_url: self.demo_video_url,
            language: self.language.unwrap_or_else(|| "English".to_string()),
            start_time: self.start_time.unwrap_or_else(|| "TBD".to_string()),
            duration: self.duration.unwrap_or(0),
            level,
            rating: self.rating.unwrap_or(0.0),
            status,
            blurb: self.blurb.unwrap_or_default(),
        })
    }
}

impl From<CreatorRecord> for CreatorProfile {
    fn from(record: CreatorRecord) -> Self {
        let specialty = quarantine_tags(&record.id, record.specialty);
        CreatorProfile {
            id: record.id,
            name: record.name,
            avatar: record.avatar.unwrap_or_default(),
            bio: record.bio.unwrap_or_default(),
            languages: record.languages.unwrap_or_default(),
            specialty,
            followers: record.followers.unwrap_or(0),
            upcoming_sessions: record.upcoming_sessions.unwrap_or(0),
            clip_count: record.clip_count.unwrap_or(0),
        }
    }
}

impl From<ClipRecord> for SkillClip {
    fn from(record: ClipRecord) -> Self {
        let tags = quarantine_tags(&record.id, record.tags);
        SkillClip {
            id: record.id,
            title: record.title,
            creator_id: record.creator_id,
            preview_url: record.preview_url.unwrap_or_default(),
            video_url: record.video_url,
            duration: record.duration.unwrap_or(0),
            likes: record.likes.unwrap_or(0),
            comments: record.comments.unwrap_or(0),
            saves: record.saves.unwrap_or(0),
            views: record.views,
            tags,
            cta_session_id: record.cta_session_id,
        }
    }
}

impl CommentRecord {
    fn into_comment(self) -> Option<ClipComment> {
        let role: CommentRole = enum_column(&self.id, "role", &self.role)?;
        Some(ClipComment {
            id: self.id,
            clip_id: self.clip_id,
            author: self.author,
            avatar: self.avatar.unwrap_or_default(),
            role,
            body: self.body,
            timestamp: self.timestamp,
        })
    }
}

impl RemoteDataSource {
    pub fn new(config: BackendConfig, viewer_id: String) -> Self {
        Self {
            client: Client::new(),
            config,
            viewer_id,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    async fn check(table: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Backend(format!("{} returned {}: {}", table, status, body)))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, columns: &str, order: &str) -> Result<Vec<T>> {
        debug!(table, "fetching from backend");
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", columns), ("order", order)]);
        let response = self.authorized(request).send().await?;
        let response = Self::check(table, response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataSource for RemoteDataSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch_sessions(&self) -> Result<Vec<SessionCard>> {
        let records: Vec<SessionRecord> = self
            .select("sessions", SESSION_COLUMNS, "start_time.asc")
            .await?;
        Ok(records
            .into_iter()
            .filter_map(SessionRecord::into_session)
            .collect())
    }

    async fn fetch_creators(&self) -> Result<Vec<CreatorProfile>> {
        let records: Vec<CreatorRecord> = self
            .select("creators", CREATOR_COLUMNS, "followers.desc")
            .await?;
        Ok(records.into_iter().map(CreatorProfile::from).collect())
    }

    async fn fetch_clips(&self) -> Result<Vec<SkillClip>> {
        let records: Vec<ClipRecord> = self.select("clips", CLIP_COLUMNS, "created_at.desc").await?;
        Ok(records.into_iter().map(SkillClip::from).collect())
    }

    async fn fetch_clip_comments(&self) -> Result<Vec<ClipComment>> {
        let records: Vec<CommentRecord> = self
            .select("clip_comments", COMMENT_COLUMNS, "timestamp.desc")
            .await?;
        Ok(records
            .into_iter()
            .filter_map(CommentRecord::into_comment)
            .collect())
    }

    async fn follow_creator(&self, creator_id: &str, follow: bool) -> Result<FollowAck> {
        let table = "creator_follows";
        let request = if follow {
            self.client
                .post(self.table_url(table))
                .header("Prefer", "resolution=merge-duplicates")
                .json(&json!({ "creator_id": creator_id, "viewer_id": self.viewer_id }))
        } else {
            self.client.delete(self.table_url(table)).query(&[
                ("creator_id", format!("eq.{}", creator_id)),
                ("viewer_id", format!("eq.{}", self.viewer_id)),
            ])
        };
        let response = self.authorized(request).send().await?;
        Self::check(table, response).await?;

        Ok(FollowAck {
            creator_id: creator_id.to_string(),
            follow,
        })
    }

    async fn react_to_clip(&self, clip_id: &str, reaction: Reaction) -> Result<ReactionAck> {
        let table = "clip_reactions";
        let request = self.client.post(self.table_url(table)).json(&json!({
            "clip_id": clip_id,
            "reaction": reaction,
            "viewer_id": self.viewer_id,
        }));
        let response = self.authorized(request).send().await?;
        Self::check(table, response).await?;

        Ok(ReactionAck {
            clip_id: clip_id.to_string(),
            reaction,
        })
    }

    async fn submit_clip_comment(&self, clip_id: &str, text: &str) -> Result<CommentAck> {
        let table = "clip_comments";
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&json!({
                "clip_id": clip_id,
                "body": text,
                "role": CommentRole::Tip,
                "author": "You",
                "avatar": "",
                "viewer_id": self.viewer_id,
                "timestamp": Utc::now().to_rfc3339(),
            }));
        let response = self.authorized(request).send().await?;
        let response = Self::check(table, response).await?;
        let inserted: Vec<InsertedId> = response.json().await?;
        let comment_id = inserted
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| Error::Backend("clip_comments insert returned no row".to_string()))?;

        Ok(CommentAck {
            clip_id: clip_id.to_string(),
            comment_id,
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source(server: &MockServer) -> RemoteDataSource {
        RemoteDataSource::new(
            BackendConfig {
                url: server.uri(),
                anon_key: "anon-key".into(),
            },
            "viewer-1".into(),
        )
    }

    #[tokio::test]
    async fn sessions_skip_rows_with_unknown_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sessions"))
            .and(query_param("order", "start_time.asc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "s1", "title": "Knife skills", "tag": "cooking", "host": "Mina",
                    "host_avatar": null, "language": "English", "start_time": "Today",
                    "duration": 30, "level": "Beginner", "rating": 4.7, "status": "live",
                    "blurb": "Dice an onion."
                },
                {
                    "id": "s2", "title": "Knitting", "tag": "knitting", "host": "Bo",
                    "level": "Advanced", "status": "later"
                }
            ])))
            .mount(&server)
            .await;

        let sessions = source(&server).await.fetch_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].tag, Tag::Cooking);
        assert_eq!(sessions[0].status, SessionStatus::Live);
        assert_eq!(sessions[0].host_avatar, "");
    }

    #[tokio::test]
    async fn rows_with_unknown_level_status_or_role_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "s1", "title": "Scales", "tag": "music", "host": "Nara",
                  "level": "Expert", "status": "live" },
                { "id": "s2", "title": "Chords", "tag": "music", "host": "Nara",
                  "level": "Beginner", "status": "someday" },
                { "id": "s3", "title": "Rhythm", "tag": "music", "host": "Nara",
                  "level": "Intermediate", "status": "soon" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clip_comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "k1", "clip_id": "c1", "author": "Bo", "role": "Rant",
                  "body": "meh", "timestamp": "1h" },
                { "id": "k2", "clip_id": "c1", "author": "Ana", "role": "Question",
                  "body": "Which key?", "timestamp": "2h" }
            ])))
            .mount(&server)
            .await;

        let remote = source(&server).await;
        let sessions = remote.fetch_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "s3");
        assert_eq!(sessions[0].level, SkillLevel::Intermediate);

        let comments = remote.fetch_clip_comments().await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].role, CommentRole::Question);
    }

    #[tokio::test]
    async fn clip_tags_outside_catalog_are_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clips"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "c1", "title": "Loop", "creator_id": "creator-nara",
                    "tags": ["music", "vaporwave"], "likes": 3
                }
            ])))
            .mount(&server)
            .await;

        let clips = source(&server).await.fetch_clips().await.unwrap();
        assert_eq!(clips[0].tags, vec![Tag::Music]);
        assert_eq!(clips[0].likes, 3);
        assert_eq!(clips[0].saves, 0);
        assert_eq!(clips[0].views, None);
    }

    #[tokio::test]
    async fn error_status_becomes_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/creators"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = source(&server).await.fetch_creators().await.unwrap_err();
        assert!(matches!(err, Error::Backend(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn comment_insert_returns_backend_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/clip_comments"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({
                "clip_id": "clip-101", "body": "Gracias!", "viewer_id": "viewer-1", "role": "Tip"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "comment-99" }])))
            .mount(&server)
            .await;

        let ack = source(&server)
            .await
            .submit_clip_comment("clip-101", "Gracias!")
            .await
            .unwrap();
        assert_eq!(ack.comment_id, "comment-99");
    }

    #[tokio::test]
    async fn unfollow_deletes_by_creator_and_viewer() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/creator_follows"))
            .and(query_param("creator_id", "eq.creator-nara"))
            .and(query_param("viewer_id", "eq.viewer-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ack = source(&server)
            .await
            .follow_creator("creator-nara", false)
            .await
            .unwrap();
        assert!(!ack.follow);
    }
}
