use crate::tags::Tag;
use crate::user_models::UserProfile;
use tracing::debug;

pub const LEARN_WEIGHT: f64 = 2.0;
pub const TEACH_WEIGHT: f64 = 1.0;

/// Tag scores kept in first-insertion order, which is also the tie-break
/// order for [`AffinityMap::highest_tag`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffinityMap {
    scores: Vec<(Tag, f64)>,
}

impl AffinityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profile(profile: &UserProfile) -> Self {
        let mut map = Self::new();
        map.initialize(profile);
        map
    }

    pub fn initialize(&mut self, profile: &UserProfile) {
        self.scores.clear();
        for tag in &profile.learn_tags {
            self.bump(*tag, LEARN_WEIGHT);
        }
        for tag in &profile.teach_tags {
            self.bump(*tag, TEACH_WEIGHT);
        }
        debug!(scores = ?self.scores, "affinity initialized from profile");
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }

    pub fn score(&self, tag: Tag) -> f64 {
        self.scores
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    }

    pub fn bump(&mut self, tag: Tag, amount: f64) {
        let next = self.score(tag) + amount;
        self.set(tag, next);
    }

    /// Lowers a score, flooring at zero.
    pub fn decrease(&mut self, tag: Tag, amount: f64) {
        let next = (self.score(tag) - amount).max(0.0);
        self.set(tag, next);
    }

    /// Tag with the strictly greatest score; earlier-inserted tags win ties.
    /// `None` when the map is empty or the best score is zero.
    pub fn highest_tag(&self) -> Option<Tag> {
        let mut best: Option<(Tag, f64)> = None;
        for &(tag, score) in &self.scores {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((tag, score)),
            }
        }
        best.filter(|(_, score)| *score > 0.0).map(|(tag, _)| tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, f64)> + '_ {
        self.scores.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn set(&mut self, tag: Tag, value: f64) {
        match self.scores.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = value,
            None => self.scores.push((tag, value)),
        }
        debug!(%tag, score = value, "affinity updated");
    }
}
