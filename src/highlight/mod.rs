//! Reversible inline highlighting of matched text.
//!
//! A [`DomHighlighter`] owns the snapshots of every element it marked, keyed
//! by element identity. Each element is either unmarked or highlighted:
//! `apply` moves it to highlighted and `restore` puts back the exact content
//! it had before. Several highlighters coexist, one per [`HighlightLayer`],
//! and an element marked by one layer is never touched by another.

pub mod auto;
mod markup;

use std::collections::HashMap;

pub use auto::AutoHighlighter;
pub use markup::{
    Color,
    render_highlights,
};

use crate::dom::{
    Dom,
    ElementId,
};
use crate::types::TranslationMatch;

const HOVER_PALETTE: [Color; 5] = [
    Color::new("#ffeb3b", "#000"),
    Color::new("#4caf50", "#fff"),
    Color::new("#ff9800", "#fff"),
    Color::new("#e91e63", "#fff"),
    Color::new("#9c27b0", "#fff"),
];

const AUTO_PALETTE: [Color; 5] = [
    Color::new("#ffeb3b80", "#000"),
    Color::new("#4caf5080", "#000"),
    Color::new("#ff980080", "#000"),
    Color::new("#e91e6380", "#fff"),
    Color::new("#9c27b080", "#fff"),
];

const SEARCH_FORWARD: Color = Color::new("#4caf50", "#fff");
const SEARCH_REVERSE: Color = Color::new("#ff9800", "#fff");

/// Independent highlighting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightLayer {
    /// Transient highlight of the hovered element.
    Hover,
    /// Persistent page-wide highlight of every known word.
    Auto,
    /// Results of an in-page search.
    Search,
}

impl HighlightLayer {
    pub const ALL: [Self; 3] = [Self::Hover, Self::Auto, Self::Search];

    /// Attribute set on an element while this layer highlights it.
    #[must_use]
    pub const fn element_marker(self) -> &'static str {
        match self {
            Self::Hover => "data-hover-translator-border",
            Self::Auto => "data-auto-highlighted",
            Self::Search => "data-search-highlighted",
        }
    }

    /// Attribute carried by the inline spans of this layer.
    #[must_use]
    pub const fn span_marker(self) -> &'static str {
        match self {
            Self::Hover => "data-hover-translator-highlight",
            Self::Auto => "data-auto-highlight",
            Self::Search => "data-search-result",
        }
    }

    #[must_use]
    pub const fn palette(self) -> &'static [Color] {
        match self {
            Self::Hover => &HOVER_PALETTE,
            Self::Auto => &AUTO_PALETTE,
            Self::Search => &[SEARCH_FORWARD, SEARCH_REVERSE],
        }
    }

    /// Color of the `index`-th match in position order.
    ///
    /// Search results are colored by direction; other layers cycle through
    /// their palette.
    #[must_use]
    pub fn color_for(self, index: usize, is_reverse: bool) -> Color {
        match self {
            Self::Search if is_reverse => SEARCH_REVERSE,
            Self::Search => SEARCH_FORWARD,
            Self::Hover | Self::Auto => {
                let palette = self.palette();
                palette.get(index % palette.len()).copied().unwrap_or(SEARCH_FORWARD)
            }
        }
    }

    const fn is_bold(self) -> bool {
        matches!(self, Self::Hover | Self::Search)
    }

    /// Whether `element` is marked by any layer.
    #[must_use]
    pub fn any_marks(dom: &dyn Dom, element: ElementId) -> bool {
        Self::ALL.iter().any(|layer| dom.has_attribute(element, layer.element_marker()))
    }

    /// Whether `element` is a highlight span of any layer or lies inside one.
    #[must_use]
    pub fn inside_any_span(dom: &dyn Dom, element: ElementId) -> bool {
        Self::ALL.iter().any(|layer| dom.closest_with_attribute(element, layer.span_marker()).is_some())
    }

    /// Whether `element` belongs to content rewritten by a layer: a highlight
    /// span, anything inside one, or any descendant of a marked element.
    #[must_use]
    pub fn inside_highlighted_content(dom: &dyn Dom, element: ElementId) -> bool {
        Self::inside_any_span(dom, element)
            || dom.parent(element).is_some_and(|parent| {
                Self::ALL
                    .iter()
                    .any(|layer| dom.closest_with_attribute(parent, layer.element_marker()).is_some())
            })
    }
}

/// Snapshot of an element taken before it was highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRecord {
    pub original_html: String,
}

/// Applies and reverts one layer of highlights.
#[derive(Debug)]
pub struct DomHighlighter {
    layer: HighlightLayer,
    records: HashMap<ElementId, HighlightRecord>,
}

impl DomHighlighter {
    #[must_use]
    pub fn new(layer: HighlightLayer) -> Self {
        Self { layer, records: HashMap::new() }
    }

    #[must_use]
    pub const fn layer(&self) -> HighlightLayer {
        self.layer
    }

    #[must_use]
    pub fn is_highlighted(&self, element: ElementId) -> bool {
        self.records.contains_key(&element)
    }

    /// Elements currently highlighted by this layer, in id order.
    #[must_use]
    pub fn highlighted_elements(&self) -> Vec<ElementId> {
        let mut elements: Vec<_> = self.records.keys().copied().collect();
        elements.sort_unstable();
        elements
    }

    /// Replaces the content of `element` with `source_text` where every
    /// matched key is wrapped in a colored span.
    ///
    /// Returns `false` without touching the document when there is nothing
    /// to highlight, the element is gone, any layer already marks it, or it
    /// lies inside highlighted content.
    pub fn apply(
        &mut self,
        dom: &mut dyn Dom,
        element: ElementId,
        source_text: &str,
        matches: &[TranslationMatch],
    ) -> bool {
        if matches.is_empty()
            || self.records.contains_key(&element)
            || HighlightLayer::any_marks(dom, element)
            || HighlightLayer::inside_highlighted_content(dom, element)
        {
            return false;
        }
        let Some(original_html) = dom.inner_html(element) else {
            return false;
        };

        let highlighted = render_highlights(source_text, matches, self.layer);

        self.records.insert(element, HighlightRecord { original_html });
        dom.set_inner_html(element, &highlighted);
        dom.set_attribute(element, self.layer.element_marker(), "true");

        tracing::debug!(layer = ?self.layer, element = element.0, matches = matches.len(), "Highlight applied");
        true
    }

    /// Puts back the content `element` had before [`Self::apply`].
    ///
    /// Returns `false` when this layer holds no snapshot for the element.
    pub fn restore(&mut self, dom: &mut dyn Dom, element: ElementId) -> bool {
        let Some(record) = self.records.remove(&element) else {
            return false;
        };

        dom.set_inner_html(element, &record.original_html);
        dom.remove_attribute(element, self.layer.element_marker());

        tracing::debug!(layer = ?self.layer, element = element.0, "Highlight restored");
        true
    }

    /// Restores every element of this layer.
    ///
    /// Hover and search sweeps leave auto-highlighted elements untouched.
    /// Markers left on elements without a snapshot are removed. Returns the
    /// number of restored elements.
    pub fn restore_all(&mut self, dom: &mut dyn Dom) -> usize {
        let mut restored = 0;

        for element in self.highlighted_elements() {
            if !dom.contains_element(element) {
                self.records.remove(&element);
                continue;
            }
            if self.layer != HighlightLayer::Auto
                && dom.has_attribute(element, HighlightLayer::Auto.element_marker())
            {
                tracing::warn!(element = element.0, "Dropping snapshot of auto-highlighted element");
                self.records.remove(&element);
                continue;
            }
            if self.restore(dom, element) {
                restored += 1;
            }
        }

        for stray in dom.elements_with_attribute(self.layer.element_marker()) {
            tracing::warn!(layer = ?self.layer, element = stray.0, "Removing marker without snapshot");
            dom.remove_attribute(stray, self.layer.element_marker());
        }

        restored
    }
}
