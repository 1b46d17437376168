//! 設定ファイルの読み込み関数

use std::path::Path;

use serde_json::Value;

use super::{
    ConfigError,
    MemoryStore,
    Settings,
    SettingsStore,
};
use crate::dictionary::parse_jsonc;

/// 設定ファイルを読み込む
///
/// JSONC (コメント・末尾カンマ付き JSON) を受け付ける。内容は通常の設定
/// オブジェクトでも、分割保存されたレコード (`translationPartsCount` と
/// `translationPart_{i}`) でもよい。
///
/// # Arguments
/// * `path` - 設定ファイルのパス
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    let object = match parse_jsonc(&content)? {
        None => return Ok(Settings::default()),
        Some(Value::Object(object)) => object,
        Some(other) => {
            return Err(ConfigError::ParseError(serde::de::Error::custom(format!(
                "expected a settings object, found {other}"
            ))));
        }
    };

    SettingsStore::new(MemoryStore::from_object(object)).load()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn write_settings(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    /// `load_from_file`: 通常の設定ファイル
    #[rstest]
    fn test_load_plain_settings() {
        let (_dir, path) = write_settings(
            r#"{
                // comments are allowed
                "translations": {"hello": "bonjour"},
                "targetUrls": ["example.com"],
                "delay": 100,
            }"#,
        );

        let settings = load_from_file(&path).unwrap();

        assert_eq!(settings.translations.len(), 1);
        assert_eq!(settings.target_urls, vec!["example.com".to_string()]);
        assert_eq!(settings.delay, 100);
        assert!(settings.is_enabled);
    }

    /// `load_from_file`: 分割保存されたレコード
    #[rstest]
    fn test_load_chunked_settings() {
        let (_dir, path) = write_settings(
            r#"{
                "translationPartsCount": 2,
                "translationPart_0": {"cat": "chat"},
                "translationPart_1": {"dog": "chien"}
            }"#,
        );

        let settings = load_from_file(&path).unwrap();

        assert_eq!(settings.translations.len(), 2);
        assert!(settings.translations.get("dog").is_some());
    }

    /// `load_from_file`: 空ファイルはデフォルト値
    #[rstest]
    fn test_load_empty_file() {
        let (_dir, path) = write_settings("");

        let settings = load_from_file(&path).unwrap();

        assert_eq!(settings.delay, 300);
    }

    /// `load_from_file`: ファイルが存在しない
    #[rstest]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_file(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    /// `load_from_file`: JSON パースエラー
    #[rstest]
    #[case::invalid("invalid json")]
    #[case::array("[1, 2]")]
    fn test_load_invalid(#[case] content: &str) {
        let (_dir, path) = write_settings(content);

        let result = load_from_file(&path);

        assert!(result.is_err());
    }
}
