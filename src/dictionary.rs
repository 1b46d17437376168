//! Translation dictionary snapshot.
//!
//! The dictionary is a tree: every key maps either to a string or to a
//! nested dictionary. Nesting is organizational only; matching treats all
//! levels as one flat pool of entries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
    Serializer,
};
use serde_json::Value;

/// Errors raised while building a dictionary snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Dictionary root must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Failed to parse dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse dictionary file: {0}")]
    Jsonc(String),

    #[error("Failed to read dictionary file: {0}")]
    Io(#[from] std::io::Error),
}

/// A dictionary value: a translation string or a nested dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Leaf(String),
    Branch(TranslationDictionary),
}

impl Entry {
    /// Text shown when this entry is the forward translation of its key.
    ///
    /// Branches render as their compact JSON form.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Leaf(text) => text.clone(),
            Self::Branch(dictionary) => dictionary.to_json_string(),
        }
    }
}

/// Immutable key → entry mapping, iterated in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct TranslationDictionary {
    entries: BTreeMap<String, Entry>,
}

impl TranslationDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from a parsed JSON value.
    ///
    /// Strings become leaves, objects become branches, arrays become
    /// branches keyed by index, numbers and booleans keep their JSON text and
    /// `null` values are dropped.
    ///
    /// # Errors
    /// Returns [`DictionaryError::NotAnObject`] when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, DictionaryError> {
        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(DictionaryError::NotAnObject { found: json_type_name(&other) }),
        }
    }

    /// Parses strict JSON text.
    ///
    /// # Errors
    /// Returns an error for invalid JSON or a non-object root.
    pub fn from_json_str(text: &str) -> Result<Self, DictionaryError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parses JSON that may contain comments and trailing commas.
    ///
    /// An empty document yields an empty dictionary.
    ///
    /// # Errors
    /// Returns an error for unparsable text or a non-object root.
    pub fn from_jsonc_str(text: &str) -> Result<Self, DictionaryError> {
        let value = parse_jsonc(text)?;
        value.map_or_else(|| Ok(Self::new()), Self::from_value)
    }

    /// Loads a JSON/JSONC dictionary file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self, DictionaryError> {
        tracing::debug!(path = %path.display(), "Loading dictionary file");
        let content = std::fs::read_to_string(path)?;
        Self::from_jsonc_str(&content)
    }

    fn from_object(map: serde_json::Map<String, Value>) -> Self {
        let entries = map
            .into_iter()
            .filter_map(|(key, value)| Self::entry_from_value(value).map(|entry| (key, entry)))
            .collect();
        Self { entries }
    }

    fn entry_from_value(value: Value) -> Option<Entry> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Entry::Leaf(text)),
            Value::Object(map) => Some(Entry::Branch(Self::from_object(map))),
            Value::Array(items) => {
                let entries = items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        Self::entry_from_value(item).map(|entry| (index.to_string(), entry))
                    })
                    .collect();
                Some(Entry::Branch(Self { entries }))
            }
            scalar @ (Value::Bool(_) | Value::Number(_)) => Some(Entry::Leaf(scalar.to_string())),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) {
        self.entries.insert(key.into(), entry);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaf translations across every nesting level.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                Entry::Leaf(_) => 1,
                Entry::Branch(nested) => nested.leaf_count(),
            })
            .sum()
    }

    /// Shallow merge: top-level keys of `other` overwrite ours.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Splits into single-entry dictionaries, one per top-level key.
    pub fn into_top_level_entries(self) -> impl Iterator<Item = Self> {
        self.entries.into_iter().map(|(key, entry)| {
            let mut single = Self::new();
            single.insert(key, entry);
            single
        })
    }

    /// Compact JSON text of this dictionary.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for TranslationDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl TryFrom<Value> for TranslationDictionary {
    type Error = DictionaryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Entry)> for TranslationDictionary {
    fn from_iter<I: IntoIterator<Item = (K, Entry)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(key, entry)| (key.into(), entry)).collect() }
    }
}

/// Parses JSONC text into a JSON value.
pub(crate) fn parse_jsonc(text: &str) -> Result<Option<Value>, DictionaryError> {
    jsonc_parser::parse_to_serde_value(text, &jsonc_parser::ParseOptions::default())
        .map_err(|e| DictionaryError::Jsonc(e.to_string()))
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
