//! Settings persistence over a size-limited key-value store.
//!
//! Browser sync storage caps the size of each item, so a large dictionary
//! is saved as several parts:
//!
//! ```text
//! translationPartsCount = 3
//! translationPart_0     = { "apple": ..., "banana": ... }
//! translationPart_1     = { "cherry": ... }
//! translationPart_2     = { "durian": ... }
//! ```
//!
//! Loading merges the parts back in order, later keys winning.

use std::collections::HashMap;

use serde_json::Value;

use super::{
    ConfigError,
    Settings,
    SiteSettings,
};
use super::types::DEFAULT_DELAY_MS;
use crate::dictionary::TranslationDictionary;

/// Largest serialized dictionary (or dictionary part) stored as one item.
pub const MAX_CHUNK_BYTES: usize = 6000;

const TRANSLATIONS_KEY: &str = "translations";
const PARTS_COUNT_KEY: &str = "translationPartsCount";
const TARGET_URLS_KEY: &str = "targetUrls";
const IS_ENABLED_KEY: &str = "isEnabled";
const DELAY_KEY: &str = "delay";
const SITE_SETTINGS_KEY: &str = "siteSettings";

fn part_key(index: usize) -> String {
    format!("translationPart_{index}")
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item '{key}' is {size} bytes, above the {quota} byte quota")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// External key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`] with an optional per-item byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Stored items
    items: HashMap<String, Value>,
    /// Maximum serialized size of one item
    item_quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_item_quota(quota: usize) -> Self {
        Self { items: HashMap::new(), item_quota: Some(quota) }
    }

    /// Builds a store holding every field of a JSON object.
    #[must_use]
    pub fn from_object(object: serde_json::Map<String, Value>) -> Self {
        Self { items: object.into_iter().collect(), item_quota: None }
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        if let Some(quota) = self.item_quota {
            let size = json_size(&value);
            if size > quota {
                return Err(StoreError::QuotaExceeded { key: key.to_string(), size, quota });
            }
        }
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Reads and writes [`Settings`] through a [`KeyValueStore`].
#[derive(Debug)]
pub struct SettingsStore<S> {
    /// Backing store
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Loads settings, reassembling a chunked dictionary.
    ///
    /// Missing fields take their defaults: enabled unless stored as `false`,
    /// and a delay of 300 ms when missing or zero.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let parts_count = self.get_as::<usize>(PARTS_COUNT_KEY)?.unwrap_or(0);

        let translations = if parts_count > 0 {
            let mut merged = TranslationDictionary::new();
            for index in 0..parts_count {
                match self.store.get(&part_key(index))? {
                    Some(part) => merged.merge(TranslationDictionary::from_value(part)?),
                    None => tracing::warn!(index, "Missing translation part"),
                }
            }
            tracing::debug!(parts = parts_count, entries = merged.len(), "Reassembled translations");
            merged
        } else {
            self.get_as::<TranslationDictionary>(TRANSLATIONS_KEY)?.unwrap_or_default()
        };

        Ok(Settings {
            translations,
            target_urls: self.get_as(TARGET_URLS_KEY)?.unwrap_or_default(),
            is_enabled: self.get_as::<bool>(IS_ENABLED_KEY)?.unwrap_or(true),
            delay: self
                .get_as::<u64>(DELAY_KEY)?
                .filter(|delay| *delay > 0)
                .unwrap_or(DEFAULT_DELAY_MS),
            site_settings: self
                .get_as::<std::collections::BTreeMap<String, SiteSettings>>(SITE_SETTINGS_KEY)?
                .unwrap_or_default(),
        })
    }

    /// Saves settings, splitting the dictionary when it is too large for one
    /// item.
    ///
    /// The new dictionary is written before anything of the previous one is
    /// removed, with the parts count last. When a write fails the keys
    /// already written get their previous values back, so the store still
    /// loads the previous dictionary.
    pub fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        let previous_parts = self.get_as::<usize>(PARTS_COUNT_KEY)?.unwrap_or(0);

        let translations = serde_json::to_value(&settings.translations)?;
        let (items, parts_count) = if json_size(&translations) > MAX_CHUNK_BYTES {
            let parts = split_translations(&settings.translations, MAX_CHUNK_BYTES);
            tracing::debug!(parts = parts.len(), "Saving translations in parts");

            let mut items = parts
                .iter()
                .enumerate()
                .map(|(index, part)| Ok((part_key(index), serde_json::to_value(part)?)))
                .collect::<Result<Vec<_>, ConfigError>>()?;
            items.push((PARTS_COUNT_KEY.to_string(), Value::from(parts.len())));
            (items, parts.len())
        } else {
            (vec![(TRANSLATIONS_KEY.to_string(), translations)], 0)
        };
        self.write_all(items)?;

        if parts_count == 0 {
            self.store.remove(PARTS_COUNT_KEY)?;
        } else {
            self.store.remove(TRANSLATIONS_KEY)?;
        }
        for index in parts_count..previous_parts {
            self.store.remove(&part_key(index))?;
        }

        self.store.set(TARGET_URLS_KEY, serde_json::to_value(&settings.target_urls)?)?;
        self.store.set(IS_ENABLED_KEY, Value::Bool(settings.is_enabled))?;
        self.store.set(DELAY_KEY, Value::from(settings.delay))?;
        self.store.set(SITE_SETTINGS_KEY, serde_json::to_value(&settings.site_settings)?)?;

        Ok(())
    }

    /// Writes every item in order, or none of them.
    fn write_all(&mut self, items: Vec<(String, Value)>) -> Result<(), ConfigError> {
        let mut written = Vec::with_capacity(items.len());

        for (key, value) in items {
            let previous = self.store.get(&key)?;
            if let Err(e) = self.store.set(&key, value) {
                tracing::warn!(key = %key, error = %e, "Save failed, restoring previous values");
                self.roll_back(written);
                return Err(e.into());
            }
            written.push((key, previous));
        }

        Ok(())
    }

    /// Puts back the values `write_all` replaced, newest first.
    fn roll_back(&mut self, written: Vec<(String, Option<Value>)>) {
        for (key, previous) in written.into_iter().rev() {
            let result = match previous {
                Some(value) => self.store.set(&key, value),
                None => self.store.remove(&key),
            };
            if let Err(e) = result {
                tracing::error!(key = %key, error = %e, "Failed to restore previous value");
            }
        }
    }

    fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}

/// Splits a dictionary into top-level-entry parts of at most `max_bytes`
/// serialized bytes each. An entry larger than `max_bytes` gets a part of
/// its own.
#[must_use]
pub fn split_translations(
    translations: &TranslationDictionary,
    max_bytes: usize,
) -> Vec<TranslationDictionary> {
    let mut parts = Vec::new();
    let mut current = TranslationDictionary::new();
    let mut current_size = 0;

    for single in translations.clone().into_top_level_entries() {
        let item_size = single.to_json_string().len();

        if item_size > max_bytes {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                current_size = 0;
            }
            parts.push(single);
            continue;
        }

        if current_size + item_size > max_bytes && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_size = 0;
        }

        current.merge(single);
        current_size += item_size;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn json_size(value: &Value) -> usize {
    serde_json::to_string(value).map_or(0, |json| json.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::dictionary::Entry;

    fn large_dictionary(entries: usize) -> TranslationDictionary {
        (0..entries)
            .map(|i| (format!("word number {i:04}"), Entry::Leaf(format!("translation {i} {}", "x".repeat(40)))))
            .collect()
    }

    #[rstest]
    fn load_empty_store_gives_defaults() {
        let store = SettingsStore::new(MemoryStore::new());

        let settings = store.load().unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[rstest]
    #[case::missing(None, 300)]
    #[case::zero(Some(0), 300)]
    #[case::set(Some(120), 120)]
    fn load_delay_defaults(#[case] stored: Option<u64>, #[case] expected: u64) {
        let mut inner = MemoryStore::new();
        if let Some(delay) = stored {
            inner.set(DELAY_KEY, json!(delay)).unwrap();
        }

        let settings = SettingsStore::new(inner).load().unwrap();

        assert_that!(settings.delay, eq(expected));
    }

    #[rstest]
    fn load_disabled_only_when_false() {
        let mut inner = MemoryStore::new();
        inner.set(IS_ENABLED_KEY, json!(false)).unwrap();

        let settings = SettingsStore::new(inner).load().unwrap();

        assert_that!(settings.is_enabled, eq(false));
    }

    #[rstest]
    fn small_dictionary_is_saved_whole() {
        let settings = Settings {
            translations: TranslationDictionary::from_json_str(r#"{"hello": "bonjour"}"#).unwrap(),
            ..Settings::default()
        };
        let mut store = SettingsStore::new(MemoryStore::with_item_quota(MAX_CHUNK_BYTES));

        store.save(&settings).unwrap();

        assert!(store.inner().contains_key(TRANSLATIONS_KEY));
        assert!(!store.inner().contains_key(PARTS_COUNT_KEY));
        assert_eq!(store.load().unwrap(), settings);
    }

    #[rstest]
    fn large_dictionary_is_chunked_and_reassembled() {
        let settings = Settings { translations: large_dictionary(300), ..Settings::default() };
        let mut store = SettingsStore::new(MemoryStore::with_item_quota(MAX_CHUNK_BYTES));

        store.save(&settings).unwrap();

        let count: usize =
            serde_json::from_value(store.inner().get(PARTS_COUNT_KEY).unwrap().unwrap()).unwrap();
        assert!(count > 1);
        assert!(!store.inner().contains_key(TRANSLATIONS_KEY));
        assert_eq!(store.load().unwrap(), settings);
    }

    #[rstest]
    fn resave_removes_stale_parts() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.save(&Settings { translations: large_dictionary(300), ..Settings::default() }).unwrap();

        let small = Settings {
            translations: TranslationDictionary::from_json_str(r#"{"cat": "chat"}"#).unwrap(),
            ..Settings::default()
        };
        store.save(&small).unwrap();

        assert!(!store.inner().contains_key(&part_key(0)));
        assert!(!store.inner().contains_key(PARTS_COUNT_KEY));
        assert_eq!(store.load().unwrap(), small);
    }

    #[rstest]
    fn chunked_save_keeps_whole_dictionary_until_parts_are_written() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.save(&Settings { translations: large_dictionary(300), ..Settings::default() }).unwrap();
        let first: usize =
            serde_json::from_value(store.inner().get(PARTS_COUNT_KEY).unwrap().unwrap()).unwrap();

        let fewer = Settings { translations: large_dictionary(150), ..Settings::default() };
        store.save(&fewer).unwrap();

        let second: usize =
            serde_json::from_value(store.inner().get(PARTS_COUNT_KEY).unwrap().unwrap()).unwrap();
        assert!(second < first);
        assert!(!store.inner().contains_key(&part_key(second)));
        assert_eq!(store.load().unwrap(), fewer);
    }

    #[rstest]
    fn failed_save_keeps_previous_dictionary() {
        let previous = Settings {
            translations: TranslationDictionary::from_json_str(r#"{"cat": "chat"}"#).unwrap(),
            ..Settings::default()
        };
        let mut store = SettingsStore::new(MemoryStore::with_item_quota(MAX_CHUNK_BYTES));
        store.save(&previous).unwrap();

        let mut oversized = TranslationDictionary::new();
        oversized.insert("huge", Entry::Leaf("x".repeat(7000)));
        let result = store.save(&Settings { translations: oversized, ..Settings::default() });

        assert!(matches!(result, Err(ConfigError::Store(StoreError::QuotaExceeded { .. }))));
        assert!(!store.inner().contains_key(PARTS_COUNT_KEY));
        assert_eq!(store.load().unwrap(), previous);
    }

    #[rstest]
    fn failed_chunked_save_restores_overwritten_parts() {
        let previous = Settings { translations: large_dictionary(300), ..Settings::default() };
        let mut store = SettingsStore::new(MemoryStore::with_item_quota(MAX_CHUNK_BYTES));
        store.save(&previous).unwrap();
        let items_before = store.inner().len();

        let mut translations = large_dictionary(300);
        translations.insert("zzz last entry", Entry::Leaf("x".repeat(7000)));
        let result = store.save(&Settings { translations, delay: 50, ..Settings::default() });

        assert!(result.is_err());
        assert_eq!(store.inner().len(), items_before);
        assert_eq!(store.load().unwrap(), previous);
    }

    #[rstest]
    fn later_parts_overwrite_earlier_keys() {
        let mut inner = MemoryStore::new();
        inner.set(PARTS_COUNT_KEY, json!(2)).unwrap();
        inner.set(&part_key(0), json!({"cat": "chat", "dog": "chien"})).unwrap();
        inner.set(&part_key(1), json!({"cat": "gato"})).unwrap();

        let settings = SettingsStore::new(inner).load().unwrap();

        assert_eq!(
            settings.translations,
            TranslationDictionary::from_json_str(r#"{"cat": "gato", "dog": "chien"}"#).unwrap()
        );
    }

    #[rstest]
    fn split_keeps_parts_under_limit() {
        let dictionary = large_dictionary(200);

        let parts = split_translations(&dictionary, 1000);

        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.to_json_string().len() <= 1000);
        }
        assert_eq!(parts.iter().map(TranslationDictionary::len).sum::<usize>(), 200);
    }

    #[rstest]
    fn split_isolates_oversized_entry() {
        let mut dictionary = TranslationDictionary::from_json_str(r#"{"a": "1", "c": "3"}"#).unwrap();
        dictionary.insert("b", Entry::Leaf("y".repeat(100)));

        let parts = split_translations(&dictionary, 50);

        assert_eq!(parts.len(), 3);
        assert!(parts[1].get("b").is_some());
        assert_eq!(parts[1].len(), 1);
    }

    #[rstest]
    fn quota_is_enforced() {
        let mut store = MemoryStore::with_item_quota(10);

        let result = store.set("big", json!("a very long string value"));

        assert!(matches!(result, Err(StoreError::QuotaExceeded { quota: 10, .. })));
    }
}
