use crate::error::{Error, Result};
use crate::tags::Tag;
use serde::{Deserialize, Serialize};

pub const MINIMUM_AGE: u32 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub provider: AuthProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub name: String,
    pub email: String,
    pub age: u32,
}

impl SignInRequest {
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty() && self.age >= MINIMUM_AGE
    }

    /// The email doubles as the identity key, so it is normalised to lower case.
    pub fn into_user(self) -> Result<AuthUser> {
        if self.age < MINIMUM_AGE {
            return Err(Error::InvalidInput(format!(
                "You must be at least {} years old to join",
                MINIMUM_AGE
            )));
        }
        if !self.can_submit() {
            return Err(Error::InvalidInput("Name and email are required".to_string()));
        }
        let email = self.email.trim().to_lowercase();
        Ok(AuthUser {
            id: email.clone(),
            name: self.name.trim().to_string(),
            email,
            provider: AuthProvider::Email,
            age: Some(self.age),
            avatar_url: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub timezone: String,
    pub learn_tags: Vec<Tag>,
    pub teach_tags: Vec<Tag>,
    /// Free-form windows such as "Morning" or "Evening"
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, learn_tags: Vec<Tag>, teach_tags: Vec<Tag>) -> Self {
        Self {
            name: name.into(),
            timezone: "UTC".to_string(),
            learn_tags,
            teach_tags,
            availability: Vec::new(),
            bio: None,
            avatar_url: None,
        }
    }

    /// Onboarding can only be submitted with a real name and at least one learn tag.
    pub fn can_complete_onboarding(&self) -> bool {
        self.name.trim().chars().count() >= 2 && !self.learn_tags.is_empty()
    }

    pub fn avatar_or_initials(&self) -> String {
        self.avatar_url.clone().unwrap_or_else(|| {
            format!(
                "https://api.dicebear.com/7.x/initials/svg?seed={}",
                urlencoding::encode(&self.name)
            )
        })
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
        if let Some(learn_tags) = update.learn_tags {
            self.learn_tags = learn_tags;
        }
        if let Some(teach_tags) = update.teach_tags {
            self.teach_tags = teach_tags;
        }
        if let Some(availability) = update.availability {
            self.availability = availability;
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
    }
}

/// Partial edit from the profile panel; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub learn_tags: Option<Vec<Tag>>,
    pub teach_tags: Option<Vec<Tag>>,
    pub availability: Option<Vec<String>>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
