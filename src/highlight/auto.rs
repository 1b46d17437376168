//! Page-wide highlighting of every known word.
//!
//! Enabled per domain through `highlightAllWords`. The first pass runs when
//! the page is ready; later passes are triggered by page mutations and
//! coalesced so that a burst of mutations produces a single pass.

use std::time::{
    Duration,
    Instant,
};

use super::{
    DomHighlighter,
    HighlightLayer,
};
use crate::config::{
    Settings,
    SiteMatcher,
};
use crate::dictionary::TranslationDictionary;
use crate::dom::{
    Dom,
    ElementId,
    is_inside_extension_ui,
    leaf_text,
};
use crate::format::REVERSE_MARKER;
use crate::matcher::{
    find_all,
    is_searchable,
};

/// Delay between a page mutation and the re-highlight pass it triggers.
pub const DEFAULT_MUTATION_DEBOUNCE: Duration = Duration::from_millis(500);

/// Whether the auto layer runs on `domain`.
///
/// Requires the extension to be enabled, the domain to be targeted and its
/// site settings to turn on `highlightAllWords`.
#[must_use]
pub fn auto_highlight_enabled(settings: &Settings, domain: &str) -> bool {
    if !settings.is_enabled || !settings.site(domain).highlight_all_words {
        return false;
    }
    match SiteMatcher::from_settings(settings) {
        Ok(matcher) => matcher.is_active(domain),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid target URL pattern, auto highlighting off");
            false
        }
    }
}

/// Persistent highlighter for the auto layer.
#[derive(Debug)]
pub struct AutoHighlighter {
    /// Auto layer
    highlighter: DomHighlighter,
    /// Quiet period after a mutation before the next pass
    debounce: Duration,
    /// First mutation of the pending pass
    pending_since: Option<Instant>,
    /// Mutations are ignored while false
    enabled: bool,
}

impl Default for AutoHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_MUTATION_DEBOUNCE)
    }
}

impl AutoHighlighter {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            highlighter: DomHighlighter::new(HighlightLayer::Auto),
            debounce,
            pending_since: None,
            enabled: true,
        }
    }

    /// Starts auto highlighting for `domain` when its settings allow it.
    ///
    /// Runs the first pass and returns the number of highlighted elements.
    /// Otherwise restores anything this layer highlighted earlier, stops
    /// reacting to mutations and returns `None`.
    pub fn initialize(&mut self, dom: &mut dyn Dom, settings: &Settings, domain: &str) -> Option<usize> {
        self.enabled = auto_highlight_enabled(settings, domain);
        if !self.enabled {
            let restored = self.destroy(dom);
            tracing::debug!(domain, restored, "Auto highlighting off for site");
            return None;
        }
        Some(self.highlight_page(dom, &settings.translations))
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Highlights every candidate element that contains a known word.
    ///
    /// Candidates are leaf elements with at least two characters of text that
    /// are not part of the extension UI, not marked by any layer and not
    /// inside content a layer rewrote. Returns the number of newly
    /// highlighted elements.
    pub fn highlight_page(&mut self, dom: &mut dyn Dom, dictionary: &TranslationDictionary) -> usize {
        let mut highlighted = 0;

        for element in candidate_elements(dom) {
            let Some(text) = leaf_text(dom, element) else {
                continue;
            };
            let matches = find_all(&text, dictionary);
            if self.highlighter.apply(dom, element, &text, &matches) {
                highlighted += 1;
            }
        }

        tracing::debug!(highlighted, "Auto-highlight pass finished");
        highlighted
    }

    /// Records a page mutation observed at `now`.
    ///
    /// Mutations without added nodes, or seen while disabled, are ignored.
    /// A pass already pending absorbs the new trigger.
    pub fn notify_mutation(&mut self, added_nodes: usize, now: Instant) {
        if !self.enabled || added_nodes == 0 || self.pending_since.is_some() {
            return;
        }
        self.pending_since = Some(now);
    }

    #[must_use]
    pub const fn has_pending_pass(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Runs the pending pass once its debounce window has elapsed.
    pub fn poll(
        &mut self,
        dom: &mut dyn Dom,
        dictionary: &TranslationDictionary,
        now: Instant,
    ) -> Option<usize> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        self.pending_since = None;
        Some(self.highlight_page(dom, dictionary))
    }

    #[must_use]
    pub fn is_highlighted(&self, element: ElementId) -> bool {
        self.highlighter.is_highlighted(element)
    }

    /// Restores every auto-highlighted element and drops any pending pass.
    pub fn destroy(&mut self, dom: &mut dyn Dom) -> usize {
        self.pending_since = None;
        self.highlighter.restore_all(dom)
    }
}

/// Tooltip text for an auto-highlight span.
#[must_use]
pub fn span_tooltip_text(dom: &dyn Dom, span: ElementId) -> Option<String> {
    let translation = dom.attribute(span, "data-translation")?;
    let is_reverse = dom.attribute(span, "data-is-reverse").is_some_and(|value| value == "true");
    Some(if is_reverse { format!("{REVERSE_MARKER} {translation}") } else { translation })
}

fn candidate_elements(dom: &dyn Dom) -> Vec<ElementId> {
    dom.elements()
        .into_iter()
        .filter(|element| {
            !HighlightLayer::any_marks(dom, *element)
                && !HighlightLayer::inside_highlighted_content(dom, *element)
        })
        .filter(|element| !is_inside_extension_ui(dom, *element))
        .filter(|element| leaf_text(dom, *element).is_some_and(|text| is_searchable(&text)))
        .collect()
}
