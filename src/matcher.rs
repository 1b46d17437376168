//! Dictionary matching against observed text.
//!
//! # Rules
//! Every key/value pair is checked against the normalized query with four
//! independent rules:
//! 1. exact forward (key equals query)
//! 2. exact reverse (string value equals query)
//! 3. partial forward (query contains key, key longer than 2 characters)
//! 4. partial reverse (query contains string value, same floor)
//!
//! Rules are not exclusive, so one pair may produce several matches. Nested
//! dictionaries are searched with the same query and contribute to the same
//! flat result.

use crate::dictionary::{
    Entry,
    TranslationDictionary,
};
use crate::text::{
    char_index_of,
    char_len,
    normalize,
};
use crate::types::{
    TranslationMatch,
    sort_by_position,
};

/// Keys or values at most this many characters long only match exactly.
pub const PARTIAL_MATCH_MIN_EXCLUSIVE: usize = 2;

/// Queries shorter than this are rejected by callers before matching.
pub const MIN_QUERY_CHARS: usize = 2;

/// Finds every dictionary match in `text`, ordered left to right.
///
/// Matches are sorted by their position in the normalized text; equal
/// positions keep discovery order (depth-first, sorted keys per level).
/// Never fails: no match is an empty list.
///
/// # Examples
/// ```
/// use hover_translator::dictionary::TranslationDictionary;
/// use hover_translator::matcher::find_all;
///
/// let dictionary = TranslationDictionary::from_json_str(r#"{"hello": "bonjour"}"#).unwrap();
/// let matches = find_all("Hello there", &dictionary);
///
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].translation, "bonjour");
/// ```
#[must_use]
pub fn find_all(text: &str, dictionary: &TranslationDictionary) -> Vec<TranslationMatch> {
    let query = normalize(text);
    let mut matches = Vec::new();

    collect_matches(dictionary, &query, &mut matches);
    sort_by_position(&mut matches);

    tracing::debug!(query = %query, count = matches.len(), "Dictionary lookup finished");
    matches
}

fn collect_matches(
    dictionary: &TranslationDictionary,
    query: &str,
    matches: &mut Vec<TranslationMatch>,
) {
    for (key, entry) in dictionary.iter() {
        let normalized_key = normalize(key);

        if normalized_key == query {
            matches.push(TranslationMatch::forward(key, entry.display_text(), 0));
        }

        if let Entry::Leaf(value) = entry
            && normalize(value) == query
        {
            matches.push(TranslationMatch::reverse(value, key, 0));
        }

        if let Some(position) = partial_position(query, &normalized_key) {
            matches.push(TranslationMatch::forward(key, entry.display_text(), position));
        }

        match entry {
            Entry::Leaf(value) => {
                if let Some(position) = partial_position(query, &normalize(value)) {
                    matches.push(TranslationMatch::reverse(value, key, position));
                }
            }
            Entry::Branch(nested) => collect_matches(nested, query, matches),
        }
    }
}

/// Position of `needle` inside `query` when it is long enough to count.
fn partial_position(query: &str, needle: &str) -> Option<usize> {
    if char_len(needle) <= PARTIAL_MATCH_MIN_EXCLUSIVE {
        return None;
    }
    char_index_of(query, needle)
}

/// Returns true when `text` is long enough to be looked up.
#[must_use]
pub fn is_searchable(text: &str) -> bool {
    char_len(text.trim()) >= MIN_QUERY_CHARS
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::dictionary;

    #[googletest::test]
    fn forward_partial_match() {
        let dict = dictionary(r#"{"hello": "bonjour"}"#);

        let matches = find_all("Hello there", &dict);

        assert_that!(matches.len(), eq(1));
        expect_that!(matches[0].matched_key, eq("hello"));
        expect_that!(matches[0].translation, eq("bonjour"));
        expect_that!(matches[0].is_reverse, eq(false));
        expect_that!(matches[0].position, eq(0));
    }

    #[googletest::test]
    fn reverse_partial_match() {
        let dict = dictionary(r#"{"hello": "bonjour"}"#);

        let matches = find_all("je dis bonjour", &dict);

        assert_that!(matches.len(), eq(1));
        expect_that!(matches[0].matched_key, eq("bonjour"));
        expect_that!(matches[0].translation, eq("hello"));
        expect_that!(matches[0].is_reverse, eq(true));
        expect_that!(matches[0].position, eq(7));
    }

    #[googletest::test]
    fn exact_match_also_fires_partial_rule() {
        let dict = dictionary(r#"{"cat": "chat"}"#);

        let matches = find_all("  CAT ", &dict);

        // exact forward + partial forward
        assert_that!(matches.len(), eq(2));
        expect_that!(matches.iter().all(|m| m.translation == "chat" && !m.is_reverse), eq(true));
    }

    #[googletest::test]
    fn short_keys_only_match_exactly() {
        let dict = dictionary(r#"{"a": "x", "to": "y"}"#);

        expect_that!(find_all("cat", &dict), is_empty());

        let exact = find_all("To", &dict);
        assert_that!(exact.len(), eq(1));
        expect_that!(exact[0].translation, eq("y"));
    }

    #[googletest::test]
    fn short_values_only_match_exactly() {
        let dict = dictionary(r#"{"water": "eau"}"#);

        expect_that!(find_all("beau temps", &dict).len(), eq(1));

        let dict = dictionary(r#"{"yes": "si"}"#);
        expect_that!(find_all("simple", &dict), is_empty());
        expect_that!(find_all("Si", &dict).len(), eq(1));
    }

    #[googletest::test]
    fn matches_are_ordered_by_position() {
        let dict = dictionary(r#"{"cat": "chat", "dog": "chien"}"#);

        let matches = find_all("the dog and cat", &dict);

        let keys: Vec<_> = matches.iter().map(|m| m.matched_key.as_str()).collect();
        expect_that!(keys, elements_are![eq(&"dog"), eq(&"cat")]);
        expect_that!(matches[0].position, eq(4));
        expect_that!(matches[1].position, eq(12));
    }

    #[googletest::test]
    fn nested_dictionary_matches_like_flat() {
        let nested = dictionary(r#"{"greetings": {"hello": "bonjour"}}"#);
        let flat = dictionary(r#"{"hello": "bonjour"}"#);

        expect_that!(find_all("hello world", &nested), eq(&find_all("hello world", &flat)));
    }

    #[googletest::test]
    fn branch_key_translates_to_serialized_branch() {
        let dict = dictionary(r#"{"greetings": {"hello": "bonjour"}}"#);

        let matches = find_all("greetings", &dict);

        // exact + partial on the branch key
        assert_that!(matches.len(), eq(2));
        expect_that!(matches[0].translation, eq(r#"{"hello":"bonjour"}"#));
    }

    #[googletest::test]
    fn position_counts_characters_of_normalized_text() {
        let dict = dictionary(r#"{"noir": "black"}"#);

        let matches = find_all("Café    Noir", &dict);

        assert_that!(matches.len(), eq(1));
        expect_that!(matches[0].position, eq(5));
    }

    #[googletest::test]
    fn keys_with_irregular_whitespace_are_normalized() {
        let dict = dictionary(r#"{"  Good   Morning ": "bonjour"}"#);

        let matches = find_all("good morning everyone", &dict);

        assert_that!(matches.len(), eq(1));
        expect_that!(matches[0].matched_key, eq("  Good   Morning "));
    }

    #[googletest::test]
    fn empty_dictionary_yields_nothing() {
        expect_that!(find_all("anything", &dictionary("{}")), is_empty());
    }

    #[rstest]
    #[case("a", false)]
    #[case("  b  ", false)]
    #[case("ab", true)]
    #[case("é!", true)]
    fn is_searchable_cases(#[case] text: &str, #[case] expected: bool) {
        assert_that!(is_searchable(text), eq(expected));
    }
}
