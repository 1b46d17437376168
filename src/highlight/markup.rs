//! Inline highlight markup generation.

use std::fmt::Write as _;

use regex::RegexBuilder;

use super::HighlightLayer;
use crate::text::escape_html;
use crate::types::{
    TranslationMatch,
    sort_by_position,
};

/// Background/text color pair of a highlight span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub background: &'static str,
    pub text: &'static str,
}

impl Color {
    #[must_use]
    pub const fn new(background: &'static str, text: &'static str) -> Self {
        Self { background, text }
    }
}

/// A claimed byte range of the source text and the match that owns it.
#[derive(Debug, Clone, Copy)]
struct Claim {
    start: usize,
    end: usize,
    match_index: usize,
}

impl Claim {
    const fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// Wraps every case-insensitive occurrence of each matched key in a span.
///
/// Whitespace inside a key matches any whitespace run of the source text,
/// mirroring how both sides are normalized before matching. Matches are
/// processed in position order and colored by their index in
/// that order. An occurrence overlapping text already wrapped for an
/// earlier match is left alone. The returned HTML escapes all source text.
#[must_use]
pub fn render_highlights(
    source_text: &str,
    matches: &[TranslationMatch],
    layer: HighlightLayer,
) -> String {
    let mut sorted = matches.to_vec();
    sort_by_position(&mut sorted);

    let claims = claim_occurrences(source_text, &sorted);

    let mut html = String::with_capacity(source_text.len() * 2);
    let mut cursor = 0;
    for claim in &claims {
        let Some(matched) = sorted.get(claim.match_index) else {
            continue;
        };
        html.push_str(&escape_html(source_text.get(cursor..claim.start).unwrap_or_default()));
        let color = layer.color_for(claim.match_index, matched.is_reverse);
        push_span(
            &mut html,
            layer,
            color,
            matched,
            source_text.get(claim.start..claim.end).unwrap_or_default(),
        );
        cursor = claim.end;
    }
    html.push_str(&escape_html(source_text.get(cursor..).unwrap_or_default()));

    html
}

fn claim_occurrences(source_text: &str, sorted: &[TranslationMatch]) -> Vec<Claim> {
    let mut claims: Vec<Claim> = Vec::new();

    for (match_index, matched) in sorted.iter().enumerate() {
        let words: Vec<String> = matched.matched_key.split_whitespace().map(regex::escape).collect();
        if words.is_empty() {
            continue;
        }

        let pattern = match RegexBuilder::new(&words.join(r"\s+")).case_insensitive(true).build() {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(key = %matched.matched_key, error = %e, "Skipping unhighlightable key");
                continue;
            }
        };

        for found in pattern.find_iter(source_text) {
            let (start, end) = (found.start(), found.end());
            if !claims.iter().any(|claim| claim.overlaps(start, end)) {
                claims.push(Claim { start, end, match_index });
            }
        }
    }

    claims.sort_by_key(|claim| claim.start);
    claims
}

fn push_span(
    html: &mut String,
    layer: HighlightLayer,
    color: Color,
    matched: &TranslationMatch,
    text: &str,
) {
    let weight = if layer.is_bold() { " font-weight: bold;" } else { "" };
    let _ = write!(
        html,
        "<span {marker}=\"true\" data-translation=\"{translation}\" data-is-reverse=\"{reverse}\" \
         style=\"background-color: {background}; color: {foreground}; padding: 1px 2px; \
         border-radius: 2px;{weight} cursor: pointer;\">{text}</span>",
        marker = layer.span_marker(),
        translation = escape_html(&matched.translation),
        reverse = matched.is_reverse,
        background = color.background,
        foreground = color.text,
        text = escape_html(text),
    );
}
