//! Text normalization shared by dictionary entries and observed page text.

/// Canonicalize text for comparison.
///
/// Lowercases, trims both ends and collapses every whitespace run into a
/// single ASCII space. Applied identically to dictionary keys, dictionary
/// values and queried text so comparisons are symmetric.
///
/// # Examples
/// ```
/// use hover_translator::text::normalize;
///
/// assert_eq!(normalize("  Hello \n\t World "), "hello world");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut result = String::with_capacity(lowered.len());

    for word in lowered.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    result
}

/// Number of characters (Unicode scalar values) in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Character offset of the first occurrence of `needle` in `haystack`.
#[must_use]
pub fn char_index_of(haystack: &str, needle: &str) -> Option<usize> {
    let byte_index = haystack.find(needle)?;
    haystack.get(..byte_index).map(|prefix| prefix.chars().count())
}

/// Escape text for use in HTML content or a double-quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
