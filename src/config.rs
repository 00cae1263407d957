//! Startup configuration resolved from the environment.
//!
//! Priority for each value: explicit override (CLI flag, which clap also
//! fills from the `SKILLSWAP_*` variable), then the `SKILLSWAP_*` variable,
//! then the legacy `SUPABASE_*` name, then the default.

use crate::error::{Error, Result};
use crate::storage::DEFAULT_STORE_FILE;
use std::path::PathBuf;

pub const BACKEND_URL_VARS: [&str; 2] = ["SKILLSWAP_BACKEND_URL", "SUPABASE_URL"];
pub const BACKEND_KEY_VARS: [&str; 2] = ["SKILLSWAP_BACKEND_KEY", "SUPABASE_ANON_KEY"];
pub const STORE_VAR: &str = "SKILLSWAP_STORE";
pub const LOG_VAR: &str = "SKILLSWAP_LOG";
pub const DEFAULT_LOG_DIRECTIVE: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Set only when both the endpoint and the credential are present
    pub backend: Option<BackendConfig>,
    pub store_path: PathBuf,
    pub log_directive: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(ConfigOverrides::default(), |name| std::env::var(name).ok())
    }

    pub fn with_overrides(overrides: ConfigOverrides) -> Self {
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    /// `lookup` stands in for the process environment.
    pub fn resolve<F>(overrides: ConfigOverrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let url = overrides.backend_url.or_else(|| first_set(&BACKEND_URL_VARS[..]));
        let anon_key = overrides.backend_key.or_else(|| first_set(&BACKEND_KEY_VARS[..]));
        let backend = match (url, anon_key) {
            (Some(url), Some(anon_key)) => Some(BackendConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        let store_path = overrides
            .store_path
            .or_else(|| first_set(&[STORE_VAR][..]).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

        let log_directive =
            first_set(&[LOG_VAR][..]).unwrap_or_else(|| DEFAULT_LOG_DIRECTIVE.to_string());

        Self {
            backend,
            store_path,
            log_directive,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(backend) = &self.backend {
            if !backend.url.starts_with("http://") && !backend.url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "backend url must be http(s), got '{}'",
                    backend.url
                )));
            }
        }
        Ok(())
    }
}
