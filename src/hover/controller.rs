//! Hover event handling.

use std::sync::Arc;

use super::tooltip::{
    DelayedTooltip,
    Point,
    TooltipSurface,
};
use crate::config::{
    Settings,
    SiteMatcher,
    SiteSettings,
};
use crate::dom::{
    Dom,
    ElementId,
    is_inside_extension_ui,
    leaf_text,
};
use crate::format::{
    clipboard_text,
    format_matches,
};
use crate::highlight::{
    DomHighlighter,
    HighlightLayer,
};
use crate::matcher::{
    MIN_QUERY_CHARS,
    find_all,
};
use crate::text::char_len;
use crate::types::TranslationMatch;

/// Hover state of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(ElementId),
}

/// Why a pointer-over event left the page untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Disabled,
    InactiveSite,
    /// Target is a highlight span, lies inside one, or is already marked.
    InsideHighlight,
    ExtensionUi,
    /// Target has child elements or no text.
    NoText,
    TooShort,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverOutcome {
    Ignored(IgnoreReason),
    Translated { element: ElementId, tooltip_text: String, match_count: usize },
}

/// Key event with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: char,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    #[must_use]
    pub const fn new(key: char, ctrl: bool, shift: bool) -> Self {
        Self { key, ctrl, shift }
    }
}

/// Action the host should perform in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverCommand {
    OpenSearch,
}

/// Turns pointer and keyboard events into highlights and tooltips.
///
/// One controller exists per page. It reads an immutable settings snapshot
/// and owns the hover highlight layer.
#[derive(Debug)]
pub struct HoverController<T> {
    /// Current settings snapshot
    settings: Arc<Settings>,
    /// Switches of the current domain
    site: SiteSettings,
    /// `targetUrls` cover the current domain
    site_active: bool,
    /// Hover layer
    highlighter: DomHighlighter,
    /// Delayed tooltip display
    tooltip: DelayedTooltip<T>,
    /// Idle or the hovered element
    state: HoverState,
}

impl<T: TooltipSurface> HoverController<T> {
    pub fn new(settings: Arc<Settings>, domain: &str, surface: T) -> Self {
        let mut controller = Self {
            settings: Arc::clone(&settings),
            site: SiteSettings::default(),
            site_active: false,
            highlighter: DomHighlighter::new(HighlightLayer::Hover),
            tooltip: DelayedTooltip::new(surface),
            state: HoverState::Idle,
        };
        controller.refresh(settings, domain);
        controller
    }

    /// Swaps in a new settings snapshot and re-evaluates the site.
    ///
    /// Patterns that fail to compile deactivate the site.
    pub fn refresh(&mut self, settings: Arc<Settings>, domain: &str) {
        self.site_active = match SiteMatcher::from_settings(&settings) {
            Ok(matcher) => matcher.is_active(domain),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid target URL pattern, extension inactive");
                false
            }
        };
        self.site = settings.site(domain);
        self.settings = settings;

        tracing::debug!(
            domain,
            active = self.site_active,
            enabled = self.settings.is_enabled,
            "Hover settings refreshed"
        );
    }

    #[must_use]
    pub const fn state(&self) -> HoverState {
        self.state
    }

    /// Enabled and running on the current site.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.settings.is_enabled && self.site_active
    }

    #[must_use]
    pub const fn site_settings(&self) -> SiteSettings {
        self.site
    }

    #[must_use]
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub const fn tooltip(&self) -> &DelayedTooltip<T> {
        &self.tooltip
    }

    /// Handles the pointer entering `target`.
    ///
    /// On a match the previous hover highlight is released, `target` is
    /// highlighted and the tooltip is scheduled after the configured delay.
    pub fn pointer_over(&mut self, dom: &mut dyn Dom, target: ElementId, anchor: Point) -> HoverOutcome {
        let (text, matches) = match self.lookup_target(dom, target) {
            Ok(found) => found,
            Err(reason) => {
                tracing::trace!(element = target.0, ?reason, "Hover ignored");
                return HoverOutcome::Ignored(reason);
            }
        };

        self.release_highlight(dom);
        self.highlighter.apply(dom, target, &text, &matches);
        self.state = HoverState::Hovering(target);

        let tooltip_text = format_matches(&matches);
        self.tooltip.schedule(tooltip_text.clone(), anchor, self.settings.hover_delay());

        tracing::debug!(element = target.0, matches = matches.len(), "Hovering");
        HoverOutcome::Translated { element: target, tooltip_text, match_count: matches.len() }
    }

    /// Handles the pointer leaving `target` for `related`.
    ///
    /// Moves inside the hovered element's subtree and moves out of a
    /// highlight span are ignored. Returns true if the hover was released.
    pub async fn pointer_out(
        &mut self,
        dom: &mut dyn Dom,
        target: ElementId,
        related: Option<ElementId>,
    ) -> bool {
        if HighlightLayer::inside_any_span(dom, target) {
            return false;
        }
        if let HoverState::Hovering(hovered) = self.state
            && related.is_some_and(|related| dom.is_inclusive_descendant(related, hovered))
        {
            return false;
        }

        self.tooltip.hide().await;
        self.release_highlight(dom);
        self.state = HoverState::Idle;
        true
    }

    /// Keeps a visible tooltip next to the cursor.
    pub async fn pointer_move(&self, anchor: Point) {
        self.tooltip.reposition(anchor).await;
    }

    /// Ctrl+Shift+F opens the page search on an active site.
    #[must_use]
    pub fn key_down(&self, key: KeyPress) -> Option<HoverCommand> {
        (key.ctrl && key.shift && key.key.eq_ignore_ascii_case(&'f') && self.site_active)
            .then_some(HoverCommand::OpenSearch)
    }

    /// Text to copy when a highlight span is clicked.
    ///
    /// Returns `None` when `target` is not a hover or auto span, copying is
    /// disabled for the site, or the span text has no translation.
    #[must_use]
    pub fn click(&self, dom: &dyn Dom, target: ElementId) -> Option<String> {
        let is_span = [HighlightLayer::Hover, HighlightLayer::Auto]
            .iter()
            .any(|layer| dom.has_attribute(target, layer.span_marker()));
        if !is_span || self.site.disable_copy_on_hover {
            return None;
        }

        let text = dom.text_content(target)?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let matches = find_all(text, &self.settings.translations);
        if matches.is_empty() {
            return None;
        }
        Some(clipboard_text(&matches))
    }

    /// Hides the tooltip and restores the page.
    pub async fn reset(&mut self, dom: &mut dyn Dom) {
        self.tooltip.hide().await;
        self.release_highlight(dom);
        self.state = HoverState::Idle;
    }

    fn lookup_target(
        &self,
        dom: &dyn Dom,
        target: ElementId,
    ) -> Result<(String, Vec<TranslationMatch>), IgnoreReason> {
        if !self.settings.is_enabled {
            return Err(IgnoreReason::Disabled);
        }
        if !self.site_active {
            return Err(IgnoreReason::InactiveSite);
        }
        if HighlightLayer::any_marks(dom, target) || HighlightLayer::inside_highlighted_content(dom, target) {
            return Err(IgnoreReason::InsideHighlight);
        }
        if is_inside_extension_ui(dom, target) {
            return Err(IgnoreReason::ExtensionUi);
        }

        let text = leaf_text(dom, target).ok_or(IgnoreReason::NoText)?;
        if char_len(&text) < MIN_QUERY_CHARS {
            return Err(IgnoreReason::TooShort);
        }

        let matches = find_all(&text, &self.settings.translations);
        if matches.is_empty() {
            return Err(IgnoreReason::NoMatch);
        }
        Ok((text, matches))
    }

    /// Restores the hovered element and sweeps stray hover markers.
    fn release_highlight(&mut self, dom: &mut dyn Dom) {
        if let HoverState::Hovering(previous) = self.state {
            self.highlighter.restore(dom, previous);
        }
        self.highlighter.restore_all(dom);
    }
}
