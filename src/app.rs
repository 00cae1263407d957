//! Phase/navigation state machine. Async actions take `&mut self`, so two
//! handlers never interleave their mutations.

use crate::activity::{ActivityLog, NewActivity};
use crate::affinity::AffinityMap;
use crate::analytics::Analytics;
use crate::data_source::{self, DataSource};
use crate::error::{Error, Result};
use crate::filtering::{self, FilterOptions};
use crate::matchmaking;
use crate::models::{
    Catalog, ClipComment, ClipDraft, CommentRole, CreatorProfile, FeedbackPayload, Reaction, SessionCard,
    SessionDraft, SkillClip,
};
use crate::ranking;
use crate::seed;
use crate::tags::{CategoryFilter, Tag};
use crate::upload::{UploadTask, SELF_CREATOR_ID};
use crate::user_models::{AuthUser, ProfileUpdate, SignInRequest, Theme, UserProfile};
use crate::user_storage::UserStorage;
use serde_json::json;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const TUNE_DELTA: f64 = 1.5;
pub const EXPLORE_DELTA: f64 = 0.5;
pub const JOIN_DELTA: f64 = 1.5;
pub const FEATURED_CLIP_COUNT: usize = 3;
pub const MATCHING_STATUS: &str = "Bringing in your host…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Landing,
    Onboarding,
    Discovery,
    Session,
    Feedback,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Landing => "landing",
            Phase::Onboarding => "onboarding",
            Phase::Discovery => "discovery",
            Phase::Session => "session",
            Phase::Feedback => "feedback",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryView {
    #[default]
    Sessions,
    Clips,
    Channels,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipViewMode {
    #[default]
    All,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuneIntent {
    More,
    Less,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub title: &'static str,
    pub body: &'static str,
}

pub static TOUR_STEPS: [TourStep; 3] = [
    TourStep {
        title: "Navigate everything",
        body: "Use the top pills to jump between Sessions, Clips, and Channels.",
    },
    TourStep {
        title: "Discover creators",
        body: "Check the \"Creators to follow\" rail for short clips from trending teachers.",
    },
    TourStep {
        title: "Share your expertise",
        body: "Open your profile to publish clips or schedule sessions for the community.",
    },
];

#[derive(Debug, Clone, Default)]
struct TourState {
    /// Persisted flag for the current identity
    completed: bool,
    /// Already shown during this sign-in
    triggered: bool,
    visible: bool,
    step: usize,
}

pub struct App {
    storage: UserStorage,
    source: Arc<dyn DataSource>,
    analytics: Analytics,

    phase: Phase,
    view: DiscoveryView,
    clip_view_mode: ClipViewMode,
    theme: Theme,
    sign_in_open: bool,

    auth_user: Option<AuthUser>,
    profile: Option<UserProfile>,
    affinity: AffinityMap,
    activity: ActivityLog,

    catalog: Catalog,
    loading: bool,
    user_sessions: Vec<SessionCard>,
    user_clips: Vec<SkillClip>,
    seeded: bool,

    saved_clip_ids: Vec<String>,
    liked_clip_ids: HashSet<String>,
    following: HashSet<String>,
    local_comments: Vec<ClipComment>,

    search_query: String,
    category: CategoryFilter,
    focused_clip_id: Option<String>,
    now_playing: Option<String>,

    active_session: Option<SessionCard>,
    feedback: Option<FeedbackPayload>,
    is_matching: bool,
    status_message: Option<String>,

    tour: TourState,
}

fn log_store_error<T: Default>(what: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "storage failure while {}", what);
            T::default()
        }
    }
}

impl App {
    /// Builds the app and restores identity, profile and theme from storage.
    /// Without a stored identity the app starts on the landing phase.
    pub async fn start(storage: UserStorage, source: Arc<dyn DataSource>) -> Self {
        let theme = log_store_error("loading theme", storage.load_theme().await).unwrap_or_default();
        let restored = log_store_error("restoring identity", storage.load_auth_user().await);

        let mut app = Self {
            storage,
            source,
            analytics: Analytics::new(),
            phase: Phase::Landing,
            view: DiscoveryView::default(),
            clip_view_mode: ClipViewMode::default(),
            theme,
            sign_in_open: false,
            auth_user: None,
            profile: None,
            affinity: AffinityMap::new(),
            activity: ActivityLog::new(),
            catalog: Catalog::default(),
            loading: true,
            user_sessions: Vec::new(),
            user_clips: Vec::new(),
            seeded: false,
            saved_clip_ids: Vec::new(),
            liked_clip_ids: HashSet::new(),
            following: HashSet::new(),
            local_comments: Vec::new(),
            search_query: String::new(),
            category: CategoryFilter::All,
            focused_clip_id: None,
            now_playing: None,
            active_session: None,
            feedback: None,
            is_matching: false,
            status_message: None,
            tour: TourState::default(),
        };

        if let Some(user) = restored {
            info!(user = %user.id, "restored signed-in identity");
            app.adopt_identity(user).await;
        }
        app
    }

    /// Fetches all four catalog collections concurrently; collections whose
    /// fetch fails keep their previous contents.
    pub async fn load_catalog(&mut self) {
        self.loading = true;
        data_source::fetch_catalog(self.source.as_ref())
            .await
            .merge_into(&mut self.catalog);
        self.loading = false;
        debug!(
            sessions = self.catalog.sessions.len(),
            clips = self.catalog.clips.len(),
            "catalog loaded"
        );
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            info!(from = %self.phase, to = %next, "phase change");
        }
        self.phase = next;
        if next == Phase::Discovery {
            self.maybe_trigger_tour();
        }
    }

    async fn adopt_identity(&mut self, user: AuthUser) {
        let stored_profile = log_store_error("loading profile", self.storage.load_profile(&user.id).await);
        self.saved_clip_ids =
            log_store_error("loading saved clips", self.storage.load_saved_clips(&user.id).await);
        self.tour = TourState {
            completed: log_store_error("reading tour flag", self.storage.tour_completed(&user.id).await),
            ..TourState::default()
        };
        self.auth_user = Some(user);

        match stored_profile {
            Some(profile) => {
                self.set_profile(profile).await;
                self.transition(Phase::Discovery);
            }
            None => {
                self.profile = None;
                self.transition(Phase::Onboarding);
            }
        }
    }

    /// Every profile change re-derives affinity and is written through.
    async fn set_profile(&mut self, profile: UserProfile) {
        self.affinity.initialize(&profile);
        if !self.seeded && !profile.teach_tags.is_empty() {
            self.user_sessions = seed::seed_sessions_from_profile(&profile);
            self.user_clips = seed::seed_clips_from_profile(&profile);
            self.seeded = true;
        }
        if let Some(user) = &self.auth_user {
            log_store_error("saving profile", self.storage.save_profile(&user.id, &profile).await);
        }
        self.profile = Some(profile);
    }

    fn require_profile(&self) -> Result<&UserProfile> {
        self.profile
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("Sign in and finish onboarding first".to_string()))
    }

    fn require_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Expected {} phase, currently {}",
                expected, self.phase
            )))
        }
    }

    fn record(&mut self, activity: NewActivity) {
        let entry = self.activity.record(activity);
        debug!(label = %entry.label, "activity recorded");
    }

    // Landing and identity

    pub fn begin(&mut self) -> Result<()> {
        self.require_phase(Phase::Landing)?;
        self.sign_in_open = true;
        Ok(())
    }

    pub fn close_sign_in(&mut self) {
        self.sign_in_open = false;
    }

    pub async fn sign_in(&mut self, request: SignInRequest) -> Result<Phase> {
        self.require_phase(Phase::Landing)?;
        let user = request.into_user()?;
        log_store_error("saving identity", self.storage.save_auth_user(&user).await);
        self.sign_in_open = false;
        self.analytics.track_event("auth.signed_in", json!({ "user": user.id }));
        self.adopt_identity(user).await;
        Ok(self.phase)
    }

    /// Back to landing. In-memory state is dropped, the stored profile stays.
    pub async fn sign_out(&mut self) {
        if let Some(user) = &self.auth_user {
            info!(user = %user.id, "signing out");
        }
        log_store_error("clearing identity", self.storage.clear_auth_user().await);

        self.auth_user = None;
        self.profile = None;
        self.affinity.clear();
        self.activity.clear();
        self.user_sessions.clear();
        self.user_clips.clear();
        self.seeded = false;
        self.saved_clip_ids.clear();
        self.liked_clip_ids.clear();
        self.following.clear();
        self.local_comments.clear();
        self.clip_view_mode = ClipViewMode::All;
        self.view = DiscoveryView::Sessions;
        self.focused_clip_id = None;
        self.now_playing = None;
        self.active_session = None;
        self.feedback = None;
        self.is_matching = false;
        self.status_message = None;
        self.tour = TourState::default();
        self.sign_in_open = false;
        self.transition(Phase::Landing);
    }

    pub async fn complete_onboarding(&mut self, profile: UserProfile) -> Result<()> {
        self.require_phase(Phase::Onboarding)?;
        if !profile.can_complete_onboarding() {
            return Err(Error::InvalidInput(
                "A name and at least one learn tag are required".to_string(),
            ));
        }

        let learn = profile
            .learn_tags
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.set_profile(profile).await;
        self.record(
            NewActivity::new("Onboarding complete")
                .detail(format!("Ready to learn {}", learn))
                .icon("✨"),
        );
        self.analytics.track_event("onboarding.completed", json!({ "learn": learn }));
        self.transition(Phase::Discovery);
        Ok(())
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        let mut profile = self.require_profile()?.clone();
        profile.apply(update);
        if !profile.can_complete_onboarding() {
            return Err(Error::InvalidInput(
                "A profile keeps a name and at least one learn tag".to_string(),
            ));
        }
        self.set_profile(profile).await;
        Ok(())
    }

    // Discovery navigation

    fn enter_discovery(&mut self, view: DiscoveryView) -> Result<()> {
        self.require_profile()?;
        self.now_playing = None;
        self.view = view;
        self.clip_view_mode = ClipViewMode::All;
        self.transition(Phase::Discovery);
        Ok(())
    }

    pub fn select_view(&mut self, view: DiscoveryView) -> Result<()> {
        self.enter_discovery(view)
    }

    pub fn open_profile(&mut self) -> Result<()> {
        self.enter_discovery(DiscoveryView::Profile)
    }

    pub fn return_home(&mut self) -> Result<()> {
        self.enter_discovery(DiscoveryView::Sessions)?;
        self.active_session = None;
        self.search_query.clear();
        self.category = CategoryFilter::All;
        Ok(())
    }

    pub fn open_saved_clips(&mut self) -> Result<()> {
        self.enter_discovery(DiscoveryView::Clips)?;
        self.search_query.clear();
        self.category = CategoryFilter::All;
        self.clip_view_mode = ClipViewMode::Saved;
        Ok(())
    }

    pub fn watch_clip(&mut self, clip_id: &str) -> Result<()> {
        self.enter_discovery(DiscoveryView::Clips)?;
        self.search_query.clear();
        self.category = CategoryFilter::All;
        self.focused_clip_id = Some(clip_id.to_string());
        Ok(())
    }

    pub fn clear_focused_clip(&mut self) {
        self.focused_clip_id = None;
    }

    pub fn set_clip_view_mode(&mut self, mode: ClipViewMode) {
        self.clip_view_mode = mode;
    }

    pub fn play_clip(&mut self, clip_id: &str) {
        self.now_playing = Some(clip_id.to_string());
    }

    pub fn stop_playback(&mut self) {
        self.now_playing = None;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Choosing a concrete category also counts as interest in it.
    pub fn select_category(&mut self, category: CategoryFilter) {
        self.category = category;
        if let CategoryFilter::Tag(tag) = category {
            self.affinity.bump(tag, EXPLORE_DELTA);
            self.record(
                NewActivity::new(format!("Exploring {}", tag))
                    .detail("Tuning recommendations")
                    .tag(tag)
                    .icon("🔎"),
            );
        }
    }

    pub fn tune_tag(&mut self, tag: Tag, intent: TuneIntent) {
        match intent {
            TuneIntent::More => {
                self.affinity.bump(tag, TUNE_DELTA);
                self.record(
                    NewActivity::new(format!("Show more {}", tag))
                        .detail("Preference updated")
                        .tag(tag)
                        .icon("⭐"),
                );
            }
            TuneIntent::Less => {
                self.affinity.decrease(tag, TUNE_DELTA);
                self.record(
                    NewActivity::new(format!("Show less {}", tag))
                        .detail("Preference updated")
                        .tag(tag)
                        .icon("⚖️"),
                );
            }
        }
    }

    // Sessions

    /// Matchmaking, then the session phase. Returns `Ok(false)` and leaves
    /// the phase alone if `cancel` fires while matching.
    pub async fn join_session(&mut self, session: SessionCard, cancel: &CancellationToken) -> Result<bool> {
        self.require_profile()?;
        self.require_phase(Phase::Discovery)?;

        self.now_playing = None;
        self.is_matching = true;
        self.status_message = Some(MATCHING_STATUS.to_string());

        let matched = matchmaking::request_match(session, cancel).await;

        self.is_matching = false;
        self.status_message = None;
        let Some(session) = matched else {
            return Ok(false);
        };

        self.affinity.bump(session.tag, JOIN_DELTA);
        self.record(
            NewActivity::new(format!("Joined {}", session.title))
                .detail(format!("Live {} session", session.tag))
                .tag(session.tag)
                .icon("🎥"),
        );
        self.analytics
            .track_event("session.joined", json!({ "sessionId": session.id }));
        self.active_session = Some(session);
        self.transition(Phase::Session);
        Ok(true)
    }

    pub async fn join_session_by_id(&mut self, session_id: &str, cancel: &CancellationToken) -> Result<bool> {
        let session = self
            .personalized_sessions()
            .into_iter()
            .chain(self.user_sessions.iter().cloned())
            .find(|session| session.id == session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;
        self.join_session(session, cancel).await
    }

    pub fn leave_session(&mut self) -> Result<()> {
        self.require_phase(Phase::Session)?;
        self.transition(Phase::Feedback);
        Ok(())
    }

    pub fn submit_feedback(&mut self, mut payload: FeedbackPayload) -> Result<()> {
        self.require_phase(Phase::Feedback)?;
        if !payload.can_submit() {
            return Err(Error::InvalidInput("A rating from 1 to 5 is required".to_string()));
        }
        payload.session = self.active_session.take();
        self.analytics
            .track_event("session.feedback", json!({ "rating": payload.rating }));
        self.feedback = Some(payload);
        self.transition(Phase::Discovery);
        Ok(())
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback = None;
    }

    pub fn create_session(&mut self, draft: SessionDraft) -> Result<SessionCard> {
        let session = seed::session_from_draft(draft, self.require_profile()?);
        self.record(
            NewActivity::new(format!("Scheduled {}", session.title))
                .detail(format!("Hosting a {} exchange", session.tag))
                .tag(session.tag)
                .icon("🗓"),
        );
        self.user_sessions.insert(0, session.clone());
        Ok(session)
    }

    // Clips

    /// Uploads the draft and publishes the clip. Returns `None` if `cancel`
    /// fires before the upload finishes.
    pub async fn publish_clip(&mut self, draft: ClipDraft, cancel: &CancellationToken) -> Result<Option<SkillClip>> {
        self.require_profile()?;
        self.publish_upload(UploadTask::start(draft), cancel).await
    }

    /// Like [`App::publish_clip`] for an upload the caller already started,
    /// e.g. to watch its progress.
    pub async fn publish_upload(&mut self, upload: UploadTask, cancel: &CancellationToken) -> Result<Option<SkillClip>> {
        self.require_profile()?;
        let finished = tokio::select! {
            clip = upload.finish() => clip,
            _ = cancel.cancelled() => None,
        };
        let Some(mut clip) = finished else {
            debug!("clip upload abandoned");
            return Ok(None);
        };

        clip.cta_session_id = self.user_sessions.first().map(|s| s.id.clone());
        if let Some(&tag) = clip.tags.first() {
            self.record(
                NewActivity::new(format!("Published clip: {}", clip.title))
                    .detail(format!("Shared a {} tip", tag))
                    .tag(tag)
                    .icon("🎬"),
            );
        }
        self.analytics.track_event("clip.published", json!({ "clipId": clip.id }));
        self.user_clips.insert(0, clip.clone());
        Ok(Some(clip))
    }

    pub async fn toggle_save_clip(&mut self, clip_id: &str, saved: bool) {
        if saved {
            if !self.saved_clip_ids.iter().any(|id| id == clip_id) {
                self.saved_clip_ids.push(clip_id.to_string());
            }
        } else {
            self.saved_clip_ids.retain(|id| id != clip_id);
        }
        if let Some(user) = &self.auth_user {
            log_store_error(
                "saving clip list",
                self.storage.save_saved_clips(&user.id, &self.saved_clip_ids).await,
            );
        }

        let activity = if saved {
            NewActivity::new("Saved a clip").detail("Pinned for later").icon("📌")
        } else {
            NewActivity::new("Removed saved clip")
                .detail("Unpinned from saved")
                .icon("🗂️")
        };
        self.record(activity);
        self.analytics.track_event(
            if saved { "clip.saved" } else { "clip.unsaved" },
            json!({ "clipId": clip_id, "count": self.saved_clip_ids.len() }),
        );

        if saved {
            if let Some(clip) = self.catalog.clips.iter_mut().find(|c| c.id == clip_id) {
                clip.saves += 1;
            }
            if let Err(e) = self.source.react_to_clip(clip_id, Reaction::Save).await {
                warn!(clip = clip_id, error = %e, "failed to sync clip save");
            }
        }
    }

    pub async fn like_clip(&mut self, clip_id: &str) -> bool {
        let liked = !self.liked_clip_ids.remove(clip_id);
        if liked {
            self.liked_clip_ids.insert(clip_id.to_string());
        }
        if let Some(clip) = self.catalog.clips.iter_mut().find(|c| c.id == clip_id) {
            clip.likes = if liked {
                clip.likes + 1
            } else {
                clip.likes.saturating_sub(1)
            };
        }
        if liked {
            if let Err(e) = self.source.react_to_clip(clip_id, Reaction::Like).await {
                warn!(clip = clip_id, error = %e, "failed to send like");
            }
        }
        liked
    }

    pub async fn follow_creator(&mut self, creator_id: &str, follow: bool) {
        let changed = if follow {
            self.following.insert(creator_id.to_string())
        } else {
            self.following.remove(creator_id)
        };
        if changed {
            if let Some(creator) = self.catalog.creators.iter_mut().find(|c| c.id == creator_id) {
                creator.followers = if follow {
                    creator.followers + 1
                } else {
                    creator.followers.saturating_sub(1)
                };
            }
        }
        if let Err(e) = self.source.follow_creator(creator_id, follow).await {
            warn!(creator = creator_id, error = %e, "failed to sync follow");
        }
    }

    /// `None` when the text is blank or the backend rejected the comment.
    pub async fn comment_on_clip(&mut self, clip_id: &str, text: &str) -> Option<ClipComment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let ack = match self.source.submit_clip_comment(clip_id, text).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!(clip = clip_id, error = %e, "failed to submit comment");
                return None;
            }
        };

        let comment = ClipComment {
            id: ack.comment_id,
            clip_id: clip_id.to_string(),
            author: "You".to_string(),
            avatar: self
                .profile
                .as_ref()
                .map(UserProfile::avatar_or_initials)
                .unwrap_or_default(),
            role: CommentRole::Tip,
            body: text.to_string(),
            timestamp: "Just now".to_string(),
        };
        if let Some(clip) = self.catalog.clips.iter_mut().find(|c| c.id == clip_id) {
            clip.comments += 1;
        }
        self.local_comments.insert(0, comment.clone());
        Some(comment)
    }

    // Guided tour

    fn maybe_trigger_tour(&mut self) {
        if self.auth_user.is_none() || self.tour.completed || self.tour.triggered {
            return;
        }
        self.tour.triggered = true;
        self.tour.visible = true;
        self.tour.step = 0;
        debug!("guided tour launched");
    }

    pub fn tour_step(&self) -> Option<&'static TourStep> {
        if self.tour.visible {
            TOUR_STEPS.get(self.tour.step)
        } else {
            None
        }
    }

    pub async fn advance_tour(&mut self) {
        if !self.tour.visible {
            return;
        }
        if self.tour.step + 1 >= TOUR_STEPS.len() {
            self.close_tour().await;
        } else {
            self.tour.step += 1;
        }
    }

    pub async fn close_tour(&mut self) {
        self.tour.visible = false;
        self.tour.triggered = true;
        self.tour.completed = true;
        if let Some(user) = &self.auth_user {
            log_store_error("saving tour flag", self.storage.mark_tour_completed(&user.id).await);
        }
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        log_store_error("saving theme", self.storage.save_theme(self.theme).await);
        self.theme
    }

    // Derived views

    fn filter_options(&self) -> FilterOptions {
        FilterOptions::new(self.search_query.clone(), self.category)
    }

    fn personalized_sessions(&self) -> Vec<SessionCard> {
        ranking::personalize_sessions(&self.catalog.sessions, self.profile.as_ref())
    }

    pub fn visible_sessions(&self) -> Vec<SessionCard> {
        let filtered = filtering::filter_sessions(&self.personalized_sessions(), &self.filter_options());
        ranking::rank_sessions(filtered, &self.affinity)
    }

    pub fn visible_clips(&self) -> Vec<SkillClip> {
        let mut filtered = filtering::filter_clips(&self.catalog.clips, &self.filter_options(), |id| {
            self.catalog
                .creators
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.as_str())
        });
        if self.clip_view_mode == ClipViewMode::Saved {
            filtered = filtering::saved_only(filtered, &self.saved_clip_ids);
        }
        ranking::rank_clips(filtered, &self.affinity)
    }

    pub fn visible_creators(&self) -> Vec<CreatorProfile> {
        filtering::filter_creators(&self.catalog.creators, &self.filter_options())
    }

    pub fn featured_clips(&self) -> &[SkillClip] {
        let end = self.catalog.clips.len().min(FEATURED_CLIP_COUNT);
        &self.catalog.clips[..end]
    }

    pub fn saved_clips(&self) -> Vec<SkillClip> {
        filtering::saved_only(self.catalog.clips.clone(), &self.saved_clip_ids)
    }

    pub fn highlight_tag(&self) -> Option<Tag> {
        self.affinity.highest_tag()
    }

    /// Never fails: `self` maps to the signed-in user and unknown ids get a
    /// placeholder.
    pub fn creator_for(&self, creator_id: &str) -> CreatorProfile {
        if creator_id == SELF_CREATOR_ID {
            if let Some(profile) = &self.profile {
                return CreatorProfile {
                    id: SELF_CREATOR_ID.to_string(),
                    name: profile.name.clone(),
                    avatar: profile.avatar_or_initials(),
                    bio: profile.bio.clone().unwrap_or_default(),
                    languages: Vec::new(),
                    specialty: profile.teach_tags.clone(),
                    followers: 0,
                    upcoming_sessions: self.user_sessions.len() as u32,
                    clip_count: self.user_clips.len() as u32,
                };
            }
        }
        self.catalog
            .creators
            .iter()
            .find(|c| c.id == creator_id)
            .cloned()
            .unwrap_or_else(|| CreatorProfile::placeholder(creator_id))
    }

    /// Local comments first, newest first.
    pub fn comments_for(&self, clip_id: &str) -> Vec<ClipComment> {
        self.local_comments
            .iter()
            .chain(self.catalog.comments.iter())
            .filter(|comment| comment.clip_id == clip_id)
            .cloned()
            .collect()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> DiscoveryView {
        self.view
    }

    pub fn clip_view_mode(&self) -> ClipViewMode {
        self.clip_view_mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_sign_in_open(&self) -> bool {
        self.sign_in_open
    }

    pub fn auth_user(&self) -> Option<&AuthUser> {
        self.auth_user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn affinity(&self) -> &AffinityMap {
        &self.affinity
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user_sessions(&self) -> &[SessionCard] {
        &self.user_sessions
    }

    pub fn user_clips(&self) -> &[SkillClip] {
        &self.user_clips
    }

    pub fn saved_clip_ids(&self) -> &[String] {
        &self.saved_clip_ids
    }

    pub fn is_following(&self, creator_id: &str) -> bool {
        self.following.contains(creator_id)
    }

    pub fn is_liked(&self, clip_id: &str) -> bool {
        self.liked_clip_ids.contains(clip_id)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn focused_clip_id(&self) -> Option<&str> {
        self.focused_clip_id.as_deref()
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn active_session(&self) -> Option<&SessionCard> {
        self.active_session.as_ref()
    }

    pub fn feedback(&self) -> Option<&FeedbackPayload> {
        self.feedback.as_ref()
    }

    pub fn is_matching(&self) -> bool {
        self.is_matching
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::FixtureDataSource;
    use crate::storage::MemoryStore;
    use crate::user_models::MINIMUM_AGE;

    fn storage() -> UserStorage {
        UserStorage::new(Arc::new(MemoryStore::new()))
    }

    async fn app_with(storage: UserStorage) -> App {
        let mut app = App::start(storage, Arc::new(FixtureDataSource::instant())).await;
        app.load_catalog().await;
        app
    }

    fn request(email: &str) -> SignInRequest {
        SignInRequest {
            name: "Mina".into(),
            email: email.into(),
            age: 24,
        }
    }

    async fn discovering(learn: Vec<Tag>, teach: Vec<Tag>) -> App {
        let mut app = app_with(storage()).await;
        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", learn, teach))
            .await
            .unwrap();
        app
    }

    #[tokio::test]
    async fn fresh_start_lands_on_landing() {
        let mut app = app_with(storage()).await;
        assert_eq!(app.phase(), Phase::Landing);
        assert!(!app.is_loading());
        assert_eq!(app.catalog().sessions.len(), 6);

        app.begin().unwrap();
        assert!(app.is_sign_in_open());
    }

    #[tokio::test]
    async fn underage_sign_in_is_rejected() {
        let mut app = app_with(storage()).await;
        let mut young = request("kid@example.com");
        young.age = MINIMUM_AGE - 1;
        assert!(matches!(app.sign_in(young).await, Err(Error::InvalidInput(_))));
        assert_eq!(app.phase(), Phase::Landing);
        assert!(app.auth_user().is_none());
    }

    #[tokio::test]
    async fn onboarding_requires_a_learn_tag() {
        let mut app = app_with(storage()).await;
        assert_eq!(app.sign_in(request("mina@example.com")).await.unwrap(), Phase::Onboarding);

        let empty = UserProfile::new("Mina", vec![], vec![Tag::Music]);
        assert!(app.complete_onboarding(empty).await.is_err());
        assert_eq!(app.phase(), Phase::Onboarding);
        assert!(app.profile().is_none());
    }

    #[tokio::test]
    async fn onboarding_seeds_affinity_and_activity() {
        let app = discovering(vec![Tag::Music], vec![Tag::Cooking]).await;
        assert_eq!(app.phase(), Phase::Discovery);
        assert_eq!(app.affinity().score(Tag::Music), 2.0);
        assert_eq!(app.affinity().score(Tag::Cooking), 1.0);
        assert_eq!(app.highlight_tag(), Some(Tag::Music));
        assert_eq!(app.activity().latest().unwrap().label, "Onboarding complete");
        assert_eq!(app.user_sessions().len(), 1);
        assert_eq!(app.user_clips().len(), 1);
        assert_eq!(app.visible_sessions()[0].tag, Tag::Music);
    }

    #[tokio::test]
    async fn category_and_tuning_adjust_affinity() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;

        app.select_category(CategoryFilter::Tag(Tag::Wellness));
        assert_eq!(app.affinity().score(Tag::Wellness), EXPLORE_DELTA);
        assert!(app.visible_sessions().iter().all(|s| s.tag == Tag::Wellness));

        app.select_category(CategoryFilter::All);
        app.tune_tag(Tag::Music, TuneIntent::Less);
        app.tune_tag(Tag::Music, TuneIntent::Less);
        assert_eq!(app.affinity().score(Tag::Music), 0.0);
        assert_eq!(app.activity().latest().unwrap().label, "Show less music");
    }

    #[tokio::test]
    async fn navigation_stops_playback_and_resets_filters() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        app.set_search_query("sourdough");
        app.select_category(CategoryFilter::Tag(Tag::Cooking));
        app.play_clip("clip-202");

        app.open_saved_clips().unwrap();
        assert_eq!(app.now_playing(), None);
        assert_eq!(app.view(), DiscoveryView::Clips);
        assert_eq!(app.clip_view_mode(), ClipViewMode::Saved);
        assert_eq!(app.search_query(), "");
        assert_eq!(app.category(), CategoryFilter::All);
        assert!(app.visible_clips().is_empty());

        app.select_view(DiscoveryView::Channels).unwrap();
        assert_eq!(app.clip_view_mode(), ClipViewMode::All);
    }

    #[tokio::test]
    async fn saved_clips_persist_per_identity() {
        let store = storage();
        let mut app = app_with(store.clone()).await;
        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", vec![Tag::Music], vec![]))
            .await
            .unwrap();

        app.toggle_save_clip("clip-303", true).await;
        app.toggle_save_clip("clip-303", true).await;
        assert_eq!(app.saved_clip_ids(), ["clip-303".to_string()]);
        assert_eq!(store.load_saved_clips("mina@example.com").await.unwrap(), vec!["clip-303"]);

        app.toggle_save_clip("clip-303", false).await;
        assert!(app.saved_clips().is_empty());
    }

    #[tokio::test]
    async fn like_toggles_and_follow_counts() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        let likes = app.catalog().clips[0].likes;
        let clip_id = app.catalog().clips[0].id.clone();

        assert!(app.like_clip(&clip_id).await);
        assert_eq!(app.catalog().clips[0].likes, likes + 1);
        assert!(!app.like_clip(&clip_id).await);
        assert_eq!(app.catalog().clips[0].likes, likes);

        let followers = app.creator_for("creator-nara").followers;
        app.follow_creator("creator-nara", true).await;
        app.follow_creator("creator-nara", true).await;
        assert!(app.is_following("creator-nara"));
        assert_eq!(app.creator_for("creator-nara").followers, followers + 1);
    }

    #[tokio::test]
    async fn comments_are_prepended_locally() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        assert!(app.comment_on_clip("clip-101", "   ").await.is_none());

        let comment = app.comment_on_clip("clip-101", " Gracias! ").await.unwrap();
        assert_eq!(comment.body, "Gracias!");
        assert_eq!(comment.author, "You");
        assert_eq!(app.comments_for("clip-101")[0], comment);
    }

    #[tokio::test]
    async fn creator_lookup_resolves_self_and_unknown() {
        let app = discovering(vec![Tag::Music], vec![Tag::Diy]).await;
        let me = app.creator_for(SELF_CREATOR_ID);
        assert_eq!(me.name, "Mina");
        assert_eq!(me.specialty, vec![Tag::Diy]);

        let ghost = app.creator_for("creator-missing");
        assert_eq!(ghost, CreatorProfile::placeholder("creator-missing"));
    }

    #[tokio::test]
    async fn tour_shows_once_and_persists() {
        let store = storage();
        let mut app = app_with(store.clone()).await;
        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", vec![Tag::Music], vec![]))
            .await
            .unwrap();

        assert_eq!(app.tour_step(), Some(&TOUR_STEPS[0]));
        app.advance_tour().await;
        app.advance_tour().await;
        assert_eq!(app.tour_step(), Some(&TOUR_STEPS[2]));
        app.advance_tour().await;
        assert_eq!(app.tour_step(), None);
        assert!(store.tour_completed("mina@example.com").await.unwrap());

        app.return_home().unwrap();
        assert_eq!(app.tour_step(), None);
    }

    #[tokio::test]
    async fn feedback_guards_the_rating() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        assert!(app.leave_session().is_err());
        assert!(app.submit_feedback(FeedbackPayload::new(4)).is_err());
        assert_eq!(app.phase(), Phase::Discovery);
    }

    #[tokio::test]
    async fn create_session_requires_a_profile() {
        let mut app = app_with(storage()).await;
        let draft = SessionDraft {
            title: "Knife skills".into(),
            tag: Tag::Cooking,
            start_time: String::new(),
            duration: 20,
            level: crate::models::SkillLevel::Beginner,
            status: crate::models::SessionStatus::Soon,
            blurb: String::new(),
        };
        assert!(app.create_session(draft.clone()).is_err());

        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", vec![Tag::Music], vec![]))
            .await
            .unwrap();
        let session = app.create_session(draft).unwrap();
        assert_eq!(app.user_sessions()[0], session);
        assert_eq!(app.activity().latest().unwrap().label, "Scheduled Knife skills");
    }

    #[tokio::test(start_paused = true)]
    async fn published_clip_links_to_first_user_session() {
        let mut app = discovering(vec![Tag::Music], vec![Tag::Cooking]).await;
        let draft = ClipDraft {
            title: "Fold, don't stir".into(),
            tag: Tag::Cooking,
            preview_url: String::new(),
            duration: 40,
            video_url: None,
        };

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(app.publish_clip(draft.clone(), &cancel).await.unwrap(), None);
        assert_eq!(app.user_clips().len(), 1);

        let clip = app
            .publish_clip(draft, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(clip.cta_session_id.as_deref(), Some("self-session-0"));
        assert_eq!(app.user_clips()[0], clip);
        assert_eq!(app.creator_for(&clip.creator_id).name, "Mina");
    }

    #[tokio::test]
    async fn profile_edits_keep_a_learn_tag_and_name() {
        let store = storage();
        let mut app = app_with(store.clone()).await;
        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", vec![Tag::Music], vec![]))
            .await
            .unwrap();
        app.tune_tag(Tag::Music, TuneIntent::More);
        assert_eq!(app.affinity().score(Tag::Music), 3.5);

        let emptied = ProfileUpdate {
            learn_tags: Some(vec![]),
            ..ProfileUpdate::default()
        };
        assert!(matches!(app.update_profile(emptied).await, Err(Error::InvalidInput(_))));
        let short_name = ProfileUpdate {
            name: Some("M".into()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(app.update_profile(short_name).await, Err(Error::InvalidInput(_))));

        assert_eq!(app.profile().unwrap().learn_tags, vec![Tag::Music]);
        assert_eq!(app.affinity().score(Tag::Music), 3.5);
        let stored = store.load_profile("mina@example.com").await.unwrap().unwrap();
        assert_eq!(stored.learn_tags, vec![Tag::Music]);
    }

    #[tokio::test]
    async fn profile_update_reinitializes_affinity() {
        let store = storage();
        let mut app = app_with(store.clone()).await;
        app.sign_in(request("mina@example.com")).await.unwrap();
        app.complete_onboarding(UserProfile::new("Mina", vec![Tag::Music], vec![]))
            .await
            .unwrap();
        app.tune_tag(Tag::Music, TuneIntent::More);

        app.update_profile(ProfileUpdate {
            teach_tags: Some(vec![Tag::Diy]),
            bio: Some("Fixes bikes".into()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();

        assert_eq!(app.affinity().score(Tag::Music), 2.0);
        assert_eq!(app.affinity().score(Tag::Diy), 1.0);
        let stored = store.load_profile("mina@example.com").await.unwrap().unwrap();
        assert_eq!(stored.teach_tags, vec![Tag::Diy]);
        assert_eq!(stored.bio.as_deref(), Some("Fixes bikes"));
    }

    #[tokio::test]
    async fn watch_clip_focuses_and_clears_filters() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        app.set_search_query("knife");
        app.select_category(CategoryFilter::Tag(Tag::Cooking));
        app.play_clip("clip-101");

        app.watch_clip("clip-303").unwrap();
        assert_eq!(app.view(), DiscoveryView::Clips);
        assert_eq!(app.focused_clip_id(), Some("clip-303"));
        assert_eq!(app.now_playing(), None);
        assert_eq!(app.search_query(), "");
        assert_eq!(app.category(), CategoryFilter::All);

        app.clear_focused_clip();
        assert_eq!(app.focused_clip_id(), None);
    }

    #[tokio::test]
    async fn open_profile_switches_view() {
        let mut app = app_with(storage()).await;
        assert!(app.open_profile().is_err());

        let mut app = discovering(vec![Tag::Music], vec![]).await;
        app.play_clip("clip-303");
        app.open_profile().unwrap();
        assert_eq!(app.view(), DiscoveryView::Profile);
        assert_eq!(app.phase(), Phase::Discovery);
        assert_eq!(app.now_playing(), None);
    }

    #[tokio::test]
    async fn featured_clips_are_the_first_three() {
        let app = discovering(vec![Tag::Music], vec![]).await;
        let ids: Vec<&str> = app.featured_clips().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["clip-101", "clip-202", "clip-303"]);
    }

    #[tokio::test(start_paused = true)]
    async fn feedback_can_be_dismissed() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        app.join_session_by_id("session-3", &CancellationToken::new())
            .await
            .unwrap();
        app.leave_session().unwrap();
        app.submit_feedback(FeedbackPayload::new(5)).unwrap();
        assert!(app.feedback().is_some());

        app.dismiss_feedback();
        assert!(app.feedback().is_none());
        assert_eq!(app.phase(), Phase::Discovery);
    }

    #[tokio::test(start_paused = true)]
    async fn engagement_is_tracked() {
        let mut app = discovering(vec![Tag::Music], vec![]).await;
        app.toggle_save_clip("clip-303", true).await;
        app.toggle_save_clip("clip-303", false).await;
        app.join_session_by_id("session-3", &CancellationToken::new())
            .await
            .unwrap();
        app.leave_session().unwrap();
        app.submit_feedback(FeedbackPayload::new(4)).unwrap();

        let names: Vec<String> = app.analytics().events().into_iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                "auth.signed_in",
                "onboarding.completed",
                "clip.saved",
                "clip.unsaved",
                "session.joined",
                "session.feedback",
            ]
        );
        let joined = &app.analytics().events()[4];
        assert_eq!(joined.metadata["sessionId"], "session-3");
    }

    #[tokio::test]
    async fn theme_toggle_persists() {
        let store = storage();
        let mut app = app_with(store.clone()).await;
        assert_eq!(app.theme(), Theme::Light);
        assert_eq!(app.toggle_theme().await, Theme::Dark);
        assert_eq!(store.load_theme().await.unwrap(), Some(Theme::Dark));
    }
}
