use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    deck::DEFAULT_SETTLE_DELAY,
    store::BackendConfig,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const BACKEND_URL_ENV: &str = "VOCABOOK_BACKEND_URL";
pub const ANON_KEY_ENV: &str = "VOCABOOK_ANON_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub backend_url: String,
    pub anon_key: String,
    pub last_email: String,
    pub settle_delay_ms: u64,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            last_email: String::new(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
        }
    }
}

impl SettingsData {
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            url: self.backend_url.trim().trim_end_matches('/').to_string(),
            anon_key: self.anon_key.trim().to_string(),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Replaces backend fields with values from `lookup` when present and non-empty.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(BACKEND_URL_ENV) {
            self.backend_url = url;
        }
        if let Some(key) = non_empty(ANON_KEY_ENV) {
            self.anon_key = key;
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}
