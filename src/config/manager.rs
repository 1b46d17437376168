//! 設定管理を行うモジュール

use std::sync::Arc;

use super::{
    ConfigError,
    KeyValueStore,
    Settings,
    SettingsStore,
};

/// 設定のスナップショットを管理する
///
/// 読み込みと更新はバリデーションを通過した場合のみ反映され、失敗時は
/// 直前のスナップショットが残る。
#[derive(Default, Debug, Clone)]
pub struct SettingsManager {
    /// 現在の設定
    current_settings: Arc<Settings>,
}

impl SettingsManager {
    /// デフォルト設定で作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: Arc::new(Settings::default()) }
    }

    /// ストアから設定を読み込む
    ///
    /// # Errors
    /// - ストアの読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load<S: KeyValueStore>(&mut self, store: &SettingsStore<S>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from store");

        let settings = store.load()?;
        self.update(settings)
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// - バリデーションエラー (以前の設定は維持される)
    pub fn update(&mut self, new_settings: Settings) -> Result<(), ConfigError> {
        if let Err(errors) = new_settings.validate() {
            tracing::warn!(count = errors.len(), "Rejected invalid settings");
            return Err(ConfigError::ValidationErrors(errors));
        }

        self.current_settings = Arc::new(new_settings);
        tracing::debug!(
            entries = self.current_settings.translations.leaf_count(),
            enabled = self.current_settings.is_enabled,
            "Settings updated successfully"
        );

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.current_settings)
    }
}
