use crate::fixtures::{CLIP_VIDEO_PLACEHOLDER, SESSION_VIDEO_PLACEHOLDER};
use crate::models::{SessionCard, SessionDraft, SessionStatus, SkillClip, SkillLevel};
use crate::upload::SELF_CREATOR_ID;
use crate::user_models::UserProfile;
use uuid::Uuid;

const MAX_SEEDED: usize = 3;

fn profile_language(profile: &UserProfile) -> String {
    profile
        .learn_tags
        .first()
        .map(|tag| tag.as_str().to_string())
        .unwrap_or_else(|| "English".to_string())
}

pub fn seed_sessions_from_profile(profile: &UserProfile) -> Vec<SessionCard> {
    profile
        .teach_tags
        .iter()
        .take(MAX_SEEDED)
        .enumerate()
        .map(|(index, &tag)| SessionCard {
            id: format!("self-session-{}", index),
            title: format!("{} micro exchange #{}", tag.capitalized(), index + 1),
            tag,
            host: profile.name.clone(),
            host_avatar: profile.avatar_or_initials(),
            demo_video_url: Some(SESSION_VIDEO_PLACEHOLDER.to_string()),
            language: profile_language(profile),
            start_time: if index == 0 {
                "Tonight · 19:00".to_string()
            } else {
                "Tomorrow · 09:00".to_string()
            },
            duration: 10 + index as u32 * 5,
            level: if index % 2 == 0 {
                SkillLevel::Beginner
            } else {
                SkillLevel::Intermediate
            },
            rating: 4.8,
            status: if index == 0 {
                SessionStatus::Soon
            } else {
                SessionStatus::Later
            },
            blurb: format!("Live walkthrough on {} for SkillSwap Live community.", tag),
        })
        .collect()
}

pub fn seed_clips_from_profile(profile: &UserProfile) -> Vec<SkillClip> {
    profile
        .teach_tags
        .iter()
        .take(MAX_SEEDED)
        .enumerate()
        .map(|(index, &tag)| {
            let i = index as u64;
            SkillClip {
                id: format!("self-clip-{}", index),
                title: format!("{} tip {}", tag.capitalized(), index + 1),
                creator_id: SELF_CREATOR_ID.to_string(),
                preview_url: format!("https://source.unsplash.com/random/800x600?{}", tag),
                video_url: Some(CLIP_VIDEO_PLACEHOLDER.to_string()),
                duration: 30 + index as u32 * 10,
                likes: 320 + i * 45,
                comments: 24 + i * 6,
                saves: 88 + i * 20,
                views: Some(4200 + i * 600),
                tags: vec![tag],
                cta_session_id: Some(format!("self-session-{}", index)),
            }
        })
        .collect()
}

pub fn session_from_draft(draft: SessionDraft, profile: &UserProfile) -> SessionCard {
    SessionCard {
        id: format!("user-session-{}", Uuid::new_v4()),
        title: draft.title,
        tag: draft.tag,
        host: profile.name.clone(),
        host_avatar: profile.avatar_or_initials(),
        demo_video_url: None,
        language: profile_language(profile),
        start_time: if draft.start_time.trim().is_empty() {
            "TBD".to_string()
        } else {
            draft.start_time
        },
        duration: draft.duration,
        level: draft.level,
        rating: 4.9,
        status: draft.status,
        blurb: if draft.blurb.trim().is_empty() {
            "Live exchange hosted by you.".to_string()
        } else {
            draft.blurb
        },
    }
}
