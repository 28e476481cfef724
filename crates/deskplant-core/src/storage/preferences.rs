use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::kv::{keys, load_json, save_json, KeyValueStore};
use crate::error::{StorageError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Turkish,
        Language::French,
        Language::German,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
            Language::French => "fr",
            Language::German => "de",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Turkish => "Türkçe",
            Language::French => "Français",
            Language::German => "Deutsch",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "language",
                value: s.to_string(),
            })
    }
}

/// Small user settings, each under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub onboarding_completed: bool,
    pub sound_enabled: bool,
    pub language: Language,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            onboarding_completed: false,
            sound_enabled: true,
            language: Language::English,
        }
    }
}

impl Preferences {
    /// Load each flag independently; a missing or unreadable key keeps its default.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            onboarding_completed: load_json(store, keys::ONBOARDING_COMPLETED)
                .unwrap_or(defaults.onboarding_completed),
            sound_enabled: load_json(store, keys::SOUND_ENABLED).unwrap_or(defaults.sound_enabled),
            language: load_json(store, keys::LANGUAGE).unwrap_or(defaults.language),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, keys::ONBOARDING_COMPLETED, &self.onboarding_completed)?;
        save_json(store, keys::SOUND_ENABLED, &self.sound_enabled)?;
        save_json(store, keys::LANGUAGE, &self.language)?;
        Ok(())
    }
}
