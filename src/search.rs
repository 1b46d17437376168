//! In-page search of translated terms.

use crate::dictionary::TranslationDictionary;
use crate::dom::{
    Dom,
    ElementId,
    is_inside_extension_ui,
    leaf_text,
};
use crate::highlight::{
    DomHighlighter,
    HighlightLayer,
};
use crate::matcher::{
    MIN_QUERY_CHARS,
    find_all,
    is_searchable,
};
use crate::text::char_len;
use crate::types::TranslationMatch;

/// One translated term found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Element whose text contains the term
    pub element: ElementId,
    /// Trimmed text of that element
    pub text: String,
    pub translation: String,
    pub is_reverse: bool,
}

/// Result of [`PageSearch::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    QueryTooShort,
    NoResults,
    Found(Vec<SearchMatch>),
}

/// Search overlay state: the highlights of the latest search.
#[derive(Debug)]
pub struct PageSearch {
    /// Search layer highlighter
    highlighter: DomHighlighter,
}

impl Default for PageSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSearch {
    #[must_use]
    pub fn new() -> Self {
        Self { highlighter: DomHighlighter::new(HighlightLayer::Search) }
    }

    /// Finds every page element holding a dictionary term related to `query`.
    ///
    /// A match is kept when its matched key or its translation contains the
    /// lowercased query. Previous search highlights are cleared first; each
    /// element with kept matches is highlighted with the search layer.
    ///
    /// Elements highlighted by another layer are searched through their
    /// whole text and reported but left as they are. Their spans are never
    /// searched on their own.
    pub fn search(
        &mut self,
        dom: &mut dyn Dom,
        dictionary: &TranslationDictionary,
        query: &str,
    ) -> SearchOutcome {
        let query = query.trim().to_lowercase();
        if char_len(&query) < MIN_QUERY_CHARS {
            return SearchOutcome::QueryTooShort;
        }

        self.clear(dom);

        let mut found = Vec::new();
        for element in dom.elements() {
            if is_inside_extension_ui(dom, element)
                || HighlightLayer::inside_highlighted_content(dom, element)
            {
                continue;
            }
            let text = if HighlightLayer::any_marks(dom, element) {
                dom.text_content(element).map(|text| text.trim().to_string())
            } else {
                leaf_text(dom, element)
            };
            let Some(text) = text.filter(|text| is_searchable(text)) else {
                continue;
            };

            let kept: Vec<TranslationMatch> = find_all(&text, dictionary)
                .into_iter()
                .filter(|candidate| {
                    candidate.matched_key.to_lowercase().contains(&query)
                        || candidate.translation.to_lowercase().contains(&query)
                })
                .collect();
            if kept.is_empty() {
                continue;
            }

            found.extend(kept.iter().map(|matched| SearchMatch {
                element,
                text: text.clone(),
                translation: matched.translation.clone(),
                is_reverse: matched.is_reverse,
            }));
            self.highlighter.apply(dom, element, &text, &kept);
        }

        tracing::debug!(query = %query, results = found.len(), "Page search finished");

        if found.is_empty() { SearchOutcome::NoResults } else { SearchOutcome::Found(found) }
    }

    /// Removes every search highlight.
    pub fn clear(&mut self, dom: &mut dyn Dom) -> usize {
        self.highlighter.restore_all(dom)
    }

    #[must_use]
    pub fn is_highlighted(&self, element: ElementId) -> bool {
        self.highlighter.is_highlighted(element)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::dom::{
        MemoryDom,
        SEARCH_OVERLAY_ID,
    };
    use crate::highlight::AutoHighlighter;
    use crate::test_utils::dictionary;

    fn animals() -> TranslationDictionary {
        dictionary(r#"{"cat": "chat", "dog": "chien", "bird": "oiseau"}"#)
    }

    #[rstest]
    #[case::empty("")]
    #[case::one_char("c")]
    #[case::padded("  c  ")]
    fn short_queries_are_rejected(#[case] query: &str) {
        let mut dom = MemoryDom::from_lines("the cat");
        let mut search = PageSearch::new();

        assert_that!(search.search(&mut dom, &animals(), query), eq(&SearchOutcome::QueryTooShort));
    }

    #[googletest::test]
    fn finds_terms_by_key_or_translation() {
        let mut dom = MemoryDom::from_lines("the cat\na dog\nle chien");
        let mut search = PageSearch::new();

        let outcome = search.search(&mut dom, &animals(), "CHIEN");

        let results = match outcome {
            SearchOutcome::Found(results) => results,
            other => panic!("expected results, got {other:?}"),
        };
        expect_that!(
            results,
            elements_are![
                all![field!(SearchMatch.text, eq("a dog")), field!(SearchMatch.translation, eq("chien"))],
                all![field!(SearchMatch.text, eq("le chien")), field!(SearchMatch.translation, eq("dog"))]
            ]
        );
        let directions: Vec<bool> = results.iter().map(|result| result.is_reverse).collect();
        expect_that!(directions, eq(&vec![false, true]));
        expect_that!(dom.elements_with_attribute("data-search-highlighted").len(), eq(2));
        expect_that!(dom.to_html(), contains_substring("<p>the cat</p>"));
    }

    #[googletest::test]
    fn no_results() {
        let mut dom = MemoryDom::from_lines("the cat");
        let mut search = PageSearch::new();

        expect_that!(search.search(&mut dom, &animals(), "oiseau"), eq(&SearchOutcome::NoResults));
    }

    #[googletest::test]
    fn new_search_clears_previous_results() {
        let mut dom = MemoryDom::from_lines("the cat\na dog");
        let mut search = PageSearch::new();

        search.search(&mut dom, &animals(), "cat");
        search.search(&mut dom, &animals(), "dog");

        expect_that!(dom.to_html(), contains_substring("<p>the cat</p>"));
        expect_that!(dom.elements_with_attribute("data-search-highlighted").len(), eq(1));
    }

    #[googletest::test]
    fn clear_restores_page() {
        let mut dom = MemoryDom::from_lines("the cat\na dog");
        let before = dom.to_html();
        let mut search = PageSearch::new();
        search.search(&mut dom, &animals(), "cat");

        expect_that!(search.clear(&mut dom), eq(1));
        expect_that!(dom.to_html(), eq(&before));
    }

    #[googletest::test]
    fn overlay_and_auto_highlights_are_left_alone() {
        let mut dom = MemoryDom::from_lines("the cat");
        let paragraph = dom.elements()[1];
        let root = dom.root();
        let overlay = dom.append_element(root, "div");
        dom.set_attribute(overlay, "id", SEARCH_OVERLAY_ID);
        dom.append_text_element(overlay, "span", "cat");
        let mut auto = AutoHighlighter::default();
        auto.highlight_page(&mut dom, &animals());
        let highlighted = dom.to_html();
        let mut search = PageSearch::new();

        let outcome = search.search(&mut dom, &animals(), "cat");

        let results = match outcome {
            SearchOutcome::Found(results) => results,
            other => panic!("expected results, got {other:?}"),
        };
        expect_that!(
            results,
            elements_are![all![
                field!(SearchMatch.element, eq(&paragraph)),
                field!(SearchMatch.text, eq("the cat"))
            ]]
        );
        expect_that!(dom.to_html(), eq(&highlighted));
        expect_that!(dom.elements_with_attribute("data-search-highlighted"), is_empty());
    }

    #[googletest::test]
    fn spans_inside_highlighted_elements_are_not_searched() {
        let mut dom = MemoryDom::from_html(
            r#"<p data-auto-highlighted="true"><span data-auto-highlight="true">cat</span></p>"#,
        );
        let html = dom.to_html();
        let span = dom.elements_with_attribute("data-auto-highlight")[0];
        let mut search = PageSearch::new();

        let outcome = search.search(&mut dom, &animals(), "cat");

        let results = match outcome {
            SearchOutcome::Found(results) => results,
            other => panic!("expected results, got {other:?}"),
        };
        expect_that!(results.len(), eq(1));
        expect_that!(search.is_highlighted(span), eq(false));
        expect_that!(dom.has_attribute(span, "data-search-highlighted"), eq(false));
        expect_that!(dom.to_html(), eq(&html));
    }
}
