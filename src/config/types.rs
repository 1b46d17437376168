use std::collections::BTreeMap;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use super::matcher::SitePattern;
use super::store::StoreError;
use crate::dictionary::{
    DictionaryError,
    TranslationDictionary,
};

/// Hover delay used when none is configured.
pub const DEFAULT_DELAY_MS: u64 = 300;

/// Longest accepted hover delay.
pub const MAX_DELAY_MS: u64 = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "targetUrls[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid translations: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Settings storage failed: {0}")]
    Store(#[from] StoreError),
}

/// Numbered list of validation errors, one per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-domain behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    /// Highlight every known word on the page, not only the hovered element.
    pub highlight_all_words: bool,
    /// Disable click-to-copy of highlighted words.
    pub disable_copy_on_hover: bool,
}

/// Complete extension settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub translations: TranslationDictionary,

    /// Sites the extension runs on. Empty means every site.
    pub target_urls: Vec<String>,

    pub is_enabled: bool,

    /// Hover delay before the tooltip shows, in milliseconds.
    pub delay: u64,

    /// Keyed by domain.
    pub site_settings: BTreeMap<String, SiteSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            translations: TranslationDictionary::default(),
            target_urls: Vec::new(),
            is_enabled: true,
            delay: DEFAULT_DELAY_MS,
            site_settings: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Switches for `domain`, all off when the domain has no entry.
    #[must_use]
    pub fn site(&self, domain: &str) -> SiteSettings {
        self.site_settings.get(domain).copied().unwrap_or_default()
    }

    #[must_use]
    pub const fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    /// # Errors
    /// - Invalid target URL pattern
    /// - Delay above [`MAX_DELAY_MS`]
    /// - Empty site settings domain
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (index, pattern) in self.target_urls.iter().enumerate() {
            if let Err(e) = SitePattern::parse(pattern) {
                errors.push(ValidationError::new(format!("targetUrls[{index}]"), e.to_string()));
            }
        }

        if self.delay > MAX_DELAY_MS {
            errors.push(ValidationError::new(
                "delay",
                format!("The delay must be at most {MAX_DELAY_MS} ms, got {}", self.delay),
            ));
        }

        for domain in self.site_settings.keys() {
            if domain.trim().is_empty() {
                errors.push(ValidationError::new(
                    "siteSettings",
                    "The domain cannot be empty. Example: \"example.com\"",
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
