use crate::models::{CreatorProfile, SessionCard, SkillClip};
use crate::tags::CategoryFilter;

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub search_query: String,
    pub category: CategoryFilter,
}

impl FilterOptions {
    pub fn new(search_query: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            search_query: search_query.into(),
            category,
        }
    }

    fn normalized_query(&self) -> String {
        self.search_query.trim().to_lowercase()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn filter_sessions(sessions: &[SessionCard], options: &FilterOptions) -> Vec<SessionCard> {
    let query = options.normalized_query();

    sessions
        .iter()
        .filter(|session| {
            let matches_category = match options.category {
                CategoryFilter::All => true,
                CategoryFilter::Tag(tag) => session.tag == tag,
            };
            let matches_search = query.is_empty()
                || contains(&session.title, &query)
                || contains(&session.host, &query)
                || contains(&session.blurb, &query);
            matches_category && matches_search
        })
        .cloned()
        .collect()
}

/// Clips match the search on title or on the creator's display name, which
/// `creator_name` resolves (returning `None` for unknown creators).
pub fn filter_clips<'a, F>(
    clips: &[SkillClip],
    options: &FilterOptions,
    creator_name: F,
) -> Vec<SkillClip>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let query = options.normalized_query();

    clips
        .iter()
        .filter(|clip| {
            let matches_category = match options.category {
                CategoryFilter::All => true,
                CategoryFilter::Tag(tag) => clip.tags.contains(&tag),
            };
            let matches_search = query.is_empty()
                || contains(&clip.title, &query)
                || creator_name(&clip.creator_id)
                    .map(|name| contains(name, &query))
                    .unwrap_or(false);
            matches_category && matches_search
        })
        .cloned()
        .collect()
}

pub fn saved_only(clips: Vec<SkillClip>, saved_ids: &[String]) -> Vec<SkillClip> {
    clips
        .into_iter()
        .filter(|clip| saved_ids.iter().any(|id| *id == clip.id))
        .collect()
}

pub fn filter_creators(creators: &[CreatorProfile], options: &FilterOptions) -> Vec<CreatorProfile> {
    let query = options.normalized_query();

    creators
        .iter()
        .filter(|creator| {
            let matches_category = match options.category {
                CategoryFilter::All => true,
                CategoryFilter::Tag(tag) => creator.specialty.contains(&tag),
            };
            let matches_search =
                query.is_empty() || contains(&creator.name, &query) || contains(&creator.bio, &query);
            matches_category && matches_search
        })
        .cloned()
        .collect()
}
