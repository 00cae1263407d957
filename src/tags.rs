use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tag {
    ArtDesign,
    BusinessFinance,
    Cooking,
    Diy,
    Languages,
    MartialArts,
    Music,
    Productivity,
    Technology,
    Wellness,
}

impl Tag {
    /// Catalog order, used for category pickers and deterministic tie-breaks.
    pub const ALL: [Tag; 10] = [
        Tag::ArtDesign,
        Tag::BusinessFinance,
        Tag::Cooking,
        Tag::Diy,
        Tag::Languages,
        Tag::MartialArts,
        Tag::Music,
        Tag::Productivity,
        Tag::Technology,
        Tag::Wellness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::ArtDesign => "artDesign",
            Tag::BusinessFinance => "businessFinance",
            Tag::Cooking => "cooking",
            Tag::Diy => "diy",
            Tag::Languages => "languages",
            Tag::MartialArts => "martialArts",
            Tag::Music => "music",
            Tag::Productivity => "productivity",
            Tag::Technology => "technology",
            Tag::Wellness => "wellness",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tag::ArtDesign => "Art/Design",
            Tag::BusinessFinance => "Business/Finance",
            Tag::Cooking => "Cooking",
            Tag::Diy => "DIY",
            Tag::Languages => "Languages",
            Tag::MartialArts => "Martial Arts",
            Tag::Music => "Music/Audio",
            Tag::Productivity => "Productivity",
            Tag::Technology => "Technology",
            Tag::Wellness => "Wellness",
        }
    }

    pub fn capitalized(self) -> String {
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownTag(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Tag(Tag),
}

impl From<Tag> for CategoryFilter {
    fn from(tag: Tag) -> Self {
        CategoryFilter::Tag(tag)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Tag(tag) => tag.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Tag)
    }
}
