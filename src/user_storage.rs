use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::user_models::{AuthUser, Theme, UserProfile};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

const AUTH_USER_KEY: &str = "skillswap-auth-user";
const THEME_KEY: &str = "skillswap-theme";
const VIEWER_KEY: &str = "skillswap-viewer-id";

fn profile_key(user_id: &str) -> String {
    format!("skillswap-profile-{}", user_id)
}

fn saved_clips_key(user_id: &str) -> String {
    format!("skillswap-saved-{}", user_id)
}

fn tour_key(user_id: &str) -> String {
    format!("skillswap-tour-complete-{}", user_id)
}

/// Typed access to everything the app persists, keyed per identity where
/// it matters. Malformed JSON is logged and read back as absent.
#[derive(Clone)]
pub struct UserStorage {
    store: Arc<dyn KeyValueStore>,
}

impl UserStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed stored value");
                Ok(None)
            }
        }
    }

    pub async fn load_auth_user(&self) -> Result<Option<AuthUser>> {
        self.get_json(AUTH_USER_KEY).await
    }

    pub async fn save_auth_user(&self, user: &AuthUser) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(AUTH_USER_KEY, &json).await
    }

    pub async fn clear_auth_user(&self) -> Result<()> {
        self.store.remove(AUTH_USER_KEY).await
    }

    pub async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.get_json(&profile_key(user_id)).await
    }

    pub async fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.store.set(&profile_key(user_id), &json).await
    }

    pub async fn load_saved_clips(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .get_json(&saved_clips_key(user_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn save_saved_clips(&self, user_id: &str, clip_ids: &[String]) -> Result<()> {
        let json = serde_json::to_string(clip_ids)?;
        self.store.set(&saved_clips_key(user_id), &json).await
    }

    pub async fn tour_completed(&self, user_id: &str) -> Result<bool> {
        Ok(self.store.get(&tour_key(user_id)).await?.is_some())
    }

    pub async fn mark_tour_completed(&self, user_id: &str) -> Result<()> {
        self.store.set(&tour_key(user_id), "1").await
    }

    pub async fn load_theme(&self) -> Result<Option<Theme>> {
        Ok(self
            .store
            .get(THEME_KEY)
            .await?
            .and_then(|raw| Theme::parse(&raw)))
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str()).await
    }

    /// Anonymous per-installation id, generated on first use.
    pub async fn viewer_id(&self) -> Result<String> {
        if let Some(existing) = self.store.get(VIEWER_KEY).await? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }
        let generated = Uuid::new_v4().to_string();
        self.store.set(VIEWER_KEY, &generated).await?;
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tags::Tag;

    fn storage() -> (Arc<MemoryStore>, UserStorage) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), UserStorage::new(store))
    }

    #[tokio::test]
    async fn profile_is_scoped_per_user() {
        let (_, storage) = storage();
        let profile = UserProfile::new("Ana", vec![Tag::Music], vec![Tag::Cooking]);
        storage.save_profile("ana@example.com", &profile).await.unwrap();

        assert_eq!(
            storage.load_profile("ana@example.com").await.unwrap(),
            Some(profile)
        );
        assert_eq!(storage.load_profile("bo@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_values_read_as_absent() {
        let (store, storage) = storage();
        store.set("skillswap-profile-ana", "{\"name\":").await.unwrap();
        store.set("skillswap-saved-ana", "not a list").await.unwrap();
        store.set("skillswap-auth-user", "[]").await.unwrap();

        assert_eq!(storage.load_profile("ana").await.unwrap(), None);
        assert!(storage.load_saved_clips("ana").await.unwrap().is_empty());
        assert_eq!(storage.load_auth_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn tour_flag_and_theme() {
        let (store, storage) = storage();
        assert!(!storage.tour_completed("ana").await.unwrap());
        storage.mark_tour_completed("ana").await.unwrap();
        assert!(storage.tour_completed("ana").await.unwrap());

        assert_eq!(storage.load_theme().await.unwrap(), None);
        storage.save_theme(Theme::Dark).await.unwrap();
        assert_eq!(storage.load_theme().await.unwrap(), Some(Theme::Dark));
        store.set("skillswap-theme", "sepia").await.unwrap();
        assert_eq!(storage.load_theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn viewer_id_is_stable() {
        let (_, storage) = storage();
        let first = storage.viewer_id().await.unwrap();
        assert_eq!(storage.viewer_id().await.unwrap(), first);
    }
}
