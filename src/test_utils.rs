//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::dictionary::TranslationDictionary;
use crate::hover::{
    Point,
    TooltipSurface,
};

/// テスト用の辞書を JSON から作成する
///
/// # Panics
/// JSON が不正な場合
#[allow(clippy::expect_used)]
pub(crate) fn dictionary(json: &str) -> TranslationDictionary {
    TranslationDictionary::from_json_str(json).expect("valid dictionary JSON")
}

/// ツールチップへの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TooltipEvent {
    Show(String, Point),
    Hide,
    Move(Point),
}

/// 操作を記録するツールチップ
#[derive(Debug, Default)]
pub(crate) struct RecordingTooltip {
    /// 記録された操作
    pub(crate) events: Vec<TooltipEvent>,
    /// 表示中のテキスト
    pub(crate) visible: Option<String>,
}

impl TooltipSurface for RecordingTooltip {
    fn show(&mut self, text: &str, anchor: Point) {
        self.visible = Some(text.to_string());
        self.events.push(TooltipEvent::Show(text.to_string(), anchor));
    }

    fn hide(&mut self) {
        self.visible = None;
        self.events.push(TooltipEvent::Hide);
    }

    fn reposition(&mut self, anchor: Point) {
        self.events.push(TooltipEvent::Move(anchor));
    }

    fn is_visible(&self) -> bool {
        self.visible.is_some()
    }
}
