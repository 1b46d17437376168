//! Core types used throughout the project.

use serde::{
    Deserialize,
    Serialize,
};

/// A dictionary entry found in observed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationMatch {
    /// Text to display: the value for forward matches, the key for reverse ones.
    pub translation: String,
    /// The dictionary side that was found in the text.
    pub matched_key: String,
    /// `true` when a value matched and the key is displayed.
    pub is_reverse: bool,
    /// Character offset of the match within the normalized query.
    pub position: usize,
}

impl TranslationMatch {
    #[must_use]
    pub fn forward(key: impl Into<String>, translation: impl Into<String>, position: usize) -> Self {
        Self { translation: translation.into(), matched_key: key.into(), is_reverse: false, position }
    }

    #[must_use]
    pub fn reverse(value: impl Into<String>, key: impl Into<String>, position: usize) -> Self {
        Self { translation: key.into(), matched_key: value.into(), is_reverse: true, position }
    }
}

/// Sorts matches by position, keeping discovery order for ties.
pub fn sort_by_position(matches: &mut [TranslationMatch]) {
    matches.sort_by_key(|m| m.position);
}
