use crate::models::{
    ClipComment, CommentRole, CreatorProfile, SessionCard, SessionStatus, SkillClip, SkillLevel,
};
use crate::tags::Tag;

pub const SESSION_VIDEO_PLACEHOLDER: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4";
pub const CLIP_VIDEO_PLACEHOLDER: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4";

#[allow(clippy::too_many_arguments)]
fn session(
    id: &str,
    title: &str,
    tag: Tag,
    host: &str,
    avatar: u8,
    language: &str,
    start_time: &str,
    duration: u32,
    level: SkillLevel,
    rating: f64,
    status: SessionStatus,
    blurb: &str,
) -> SessionCard {
    SessionCard {
        id: id.to_string(),
        title: title.to_string(),
        tag,
        host: host.to_string(),
        host_avatar: format!("https://i.pravatar.cc/100?img={}", avatar),
        demo_video_url: Some(SESSION_VIDEO_PLACEHOLDER.to_string()),
        language: language.to_string(),
        start_time: start_time.to_string(),
        duration,
        level,
        rating,
        status,
        blurb: blurb.to_string(),
    }
}

pub fn sessions() -> Vec<SessionCard> {
    use SessionStatus::*;
    use SkillLevel::*;

    vec![
        session(
            "session-1",
            "Beginner Spanish Cafe Chat",
            Tag::Languages,
            "Lucía Márquez",
            44,
            "Spanish",
            "Today · 18:00",
            30,
            Beginner,
            4.6,
            Live,
            "Practice small talk over coffee.",
        ),
        session(
            "session-2",
            "Sourdough Starter SOS",
            Tag::Cooking,
            "Sam Brew",
            12,
            "English",
            "Tomorrow · 10:00",
            40,
            Intermediate,
            4.9,
            Soon,
            "Fix a sluggish starter and bake together.",
        ),
        session(
            "session-3",
            "Lo-fi Beats in 20 Minutes",
            Tag::Music,
            "Nara Kim",
            36,
            "English",
            "Today · 21:00",
            20,
            Beginner,
            4.8,
            Live,
            "Build a chill loop from scratch with free tools.",
        ),
        session(
            "session-4",
            "Deep Work Sprint Planning",
            Tag::Productivity,
            "Sam Brew",
            12,
            "English",
            "Friday · 08:00",
            25,
            Intermediate,
            4.4,
            Later,
            "Plan a focused week with time blocks.",
        ),
        session(
            "session-5",
            "Morning Mobility Flow",
            Tag::Wellness,
            "Lucía Márquez",
            44,
            "Spanish",
            "Saturday · 07:30",
            15,
            Beginner,
            4.7,
            Later,
            "Gentle stretches to wake up your spine.",
        ),
        session(
            "session-6",
            "Rust Ownership Office Hours",
            Tag::Technology,
            "Nara Kim",
            36,
            "Korean",
            "Tomorrow · 19:00",
            45,
            Advanced,
            4.5,
            Soon,
            "Bring your borrow checker errors and we untangle them.",
        ),
    ]
}

pub fn creators() -> Vec<CreatorProfile> {
    vec![
        CreatorProfile {
            id: "creator-lucia".to_string(),
            name: "Lucía Márquez".to_string(),
            avatar: "https://i.pravatar.cc/100?img=44".to_string(),
            bio: "Polyglot guide making travel Spanish fun + fearless.".to_string(),
            languages: vec!["Spanish".to_string(), "English".to_string()],
            specialty: vec![Tag::Languages, Tag::Wellness],
            followers: 12_800,
            upcoming_sessions: 3,
            clip_count: 42,
        },
        CreatorProfile {
            id: "creator-sambrew".to_string(),
            name: "Sam Brew".to_string(),
            avatar: "https://i.pravatar.cc/100?img=12".to_string(),
            bio: "Coffee ritual coach & kitchen minimalism nerd.".to_string(),
            languages: vec!["English".to_string()],
            specialty: vec![Tag::Cooking, Tag::Productivity],
            followers: 9_400,
            upcoming_sessions: 2,
            clip_count: 28,
        },
        CreatorProfile {
            id: "creator-nara".to_string(),
            name: "Nara Kim".to_string(),
            avatar: "https://i.pravatar.cc/100?img=36".to_string(),
            bio: "Lo-fi beat maker sharing daily 5-min grooves.".to_string(),
            languages: vec!["English".to_string(), "Korean".to_string()],
            specialty: vec![Tag::Music, Tag::Technology],
            followers: 15_600,
            upcoming_sessions: 4,
            clip_count: 64,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn clip(
    id: &str,
    title: &str,
    creator_id: &str,
    duration: u32,
    likes: u64,
    comments: u64,
    saves: u64,
    views: u64,
    tags: Vec<Tag>,
    cta_session_id: Option<&str>,
) -> SkillClip {
    SkillClip {
        id: id.to_string(),
        title: title.to_string(),
        creator_id: creator_id.to_string(),
        preview_url: format!("https://source.unsplash.com/random/800x600?{}", tags[0]),
        video_url: Some(CLIP_VIDEO_PLACEHOLDER.to_string()),
        duration,
        likes,
        comments,
        saves,
        views: Some(views),
        tags,
        cta_session_id: cta_session_id.map(str::to_string),
    }
}

pub fn clips() -> Vec<SkillClip> {
    vec![
        clip(
            "clip-101",
            "5 cafe phrases that sound local",
            "creator-lucia",
            45,
            1_240,
            2,
            310,
            18_200,
            vec![Tag::Languages],
            Some("session-1"),
        ),
        clip(
            "clip-202",
            "Pour-over in 90 seconds",
            "creator-sambrew",
            60,
            860,
            1,
            240,
            9_700,
            vec![Tag::Cooking, Tag::Productivity],
            Some("session-2"),
        ),
        clip(
            "clip-303",
            "Sidechain a kick with no plugins",
            "creator-nara",
            38,
            2_310,
            0,
            520,
            31_400,
            vec![Tag::Music, Tag::Technology],
            Some("session-3"),
        ),
        clip(
            "clip-404",
            "Two-minute desk reset",
            "creator-lucia",
            30,
            640,
            0,
            120,
            5_100,
            vec![Tag::Wellness],
            None,
        ),
    ]
}

pub fn clip_comments() -> Vec<ClipComment> {
    vec![
        ClipComment {
            id: "comment-1".to_string(),
            clip_id: "clip-101".to_string(),
            author: "Bella".to_string(),
            avatar: "https://i.pravatar.cc/60?img=52".to_string(),
            role: CommentRole::Question,
            body: "Could you cover casual goodbyes next?".to_string(),
            timestamp: "2m ago".to_string(),
        },
        ClipComment {
            id: "comment-2".to_string(),
            clip_id: "clip-101".to_string(),
            author: "Omar".to_string(),
            avatar: "https://i.pravatar.cc/60?img=61".to_string(),
            role: CommentRole::Tip,
            body: "I pair these phrases with flashcards, game changer.".to_string(),
            timestamp: "6m ago".to_string(),
        },
        ClipComment {
            id: "comment-3".to_string(),
            clip_id: "clip-202".to_string(),
            author: "Hiromi".to_string(),
            avatar: "https://i.pravatar.cc/60?img=17".to_string(),
            role: CommentRole::Request,
            body: "Show a cold brew version please!".to_string(),
            timestamp: "12m ago".to_string(),
        },
    ]
}
