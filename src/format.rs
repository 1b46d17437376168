//! Tooltip text generation for a set of matches.

use std::collections::HashSet;

use crate::types::TranslationMatch;

/// Glyph marking translations found through a value (reverse direction).
pub const REVERSE_MARKER: &str = "⏪";

/// Separator between translations and between direction groups.
pub const SEPARATOR: &str = " | ";

/// Render matches into a single display string.
///
/// # Format
/// - One match: its translation, prefixed with [`REVERSE_MARKER`] when reverse.
/// - Several matches: forward translations first, then reverse ones behind the
///   marker. Each group is deduplicated in first-seen order and joined with
///   [`SEPARATOR`]; an empty group contributes nothing.
#[must_use]
pub fn format_matches(matches: &[TranslationMatch]) -> String {
    if let [single] = matches {
        return with_marker(&single.translation, single.is_reverse);
    }

    let forward = unique_translations(matches.iter().filter(|m| !m.is_reverse));
    let reverse = unique_translations(matches.iter().filter(|m| m.is_reverse));

    let mut parts = Vec::with_capacity(2);
    if !forward.is_empty() {
        parts.push(forward.join(SEPARATOR));
    }
    if !reverse.is_empty() {
        parts.push(with_marker(&reverse.join(SEPARATOR), true));
    }

    parts.join(SEPARATOR)
}

/// Text copied to the clipboard when a highlighted span is clicked.
///
/// Same as [`format_matches`] without direction markers.
#[must_use]
pub fn clipboard_text(matches: &[TranslationMatch]) -> String {
    strip_reverse_markers(&format_matches(matches))
}

/// Removes every reverse marker together with the whitespace following it.
#[must_use]
pub fn strip_reverse_markers(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(index) = rest.find(REVERSE_MARKER) {
        let (before, after) = rest.split_at(index);
        result.push_str(before);
        rest = after.trim_start_matches(REVERSE_MARKER).trim_start();
    }
    result.push_str(rest);

    result
}

fn with_marker(text: &str, is_reverse: bool) -> String {
    if is_reverse { format!("{REVERSE_MARKER} {text}") } else { text.to_string() }
}

fn unique_translations<'a>(matches: impl Iterator<Item = &'a TranslationMatch>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    matches
        .map(|m| m.translation.as_str())
        .filter(|translation| seen.insert(*translation))
        .collect()
}
