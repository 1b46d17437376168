//! hover-translator
//!
//! Dictionary-driven hover translation for web pages: text normalization,
//! bidirectional dictionary matching, tooltip formatting and reversible
//! inline highlighting over a host document.
//!
//! ```
//! use hover_translator::dictionary::TranslationDictionary;
//! use hover_translator::format::format_matches;
//! use hover_translator::matcher::find_all;
//!
//! let dictionary =
//!     TranslationDictionary::from_json_str(r#"{"good morning": "bonjour", "cat": "chat"}"#).unwrap();
//!
//! let matches = find_all("Good  morning, CAT", &dictionary);
//! assert_eq!(format_matches(&matches), "bonjour | chat");
//! ```

pub mod config;
pub mod dictionary;
pub mod dom;
pub mod format;
pub mod highlight;
pub mod hover;
pub mod matcher;
pub mod search;
pub mod text;
pub mod types;

mod test_utils;
