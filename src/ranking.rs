use crate::affinity::AffinityMap;
use crate::models::{SessionCard, SkillClip};
use crate::user_models::UserProfile;
use std::cmp::Ordering;

const LEARN_TAG_RATING_BOOST: f64 = 0.1;
const MAX_RATING: f64 = 5.0;

pub fn session_relevance(session: &SessionCard, affinity: &AffinityMap) -> f64 {
    affinity.score(session.tag)
}

/// Best score across the clip's tags, 0 when none are tracked.
pub fn clip_relevance(clip: &SkillClip, affinity: &AffinityMap) -> f64 {
    clip.tags
        .iter()
        .map(|tag| affinity.score(*tag))
        .fold(0.0, f64::max)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn rank_sessions(mut sessions: Vec<SessionCard>, affinity: &AffinityMap) -> Vec<SessionCard> {
    sessions.sort_by(|a, b| descending(session_relevance(a, affinity), session_relevance(b, affinity)));
    sessions
}

pub fn rank_clips(mut clips: Vec<SkillClip>, affinity: &AffinityMap) -> Vec<SkillClip> {
    clips.sort_by(|a, b| descending(clip_relevance(a, affinity), clip_relevance(b, affinity)));
    clips
}

/// Display copy of the catalog with a small rating lift on sessions the user
/// wants to learn. The catalog itself is left untouched.
pub fn personalize_sessions(sessions: &[SessionCard], profile: Option<&UserProfile>) -> Vec<SessionCard> {
    let Some(profile) = profile else {
        return sessions.to_vec();
    };

    sessions
        .iter()
        .map(|session| {
            let mut session = session.clone();
            if profile.learn_tags.contains(&session.tag) {
                session.rating = (session.rating + LEARN_TAG_RATING_BOOST).min(MAX_RATING);
            }
            session
        })
        .collect()
}
