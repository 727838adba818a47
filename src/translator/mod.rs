//! 翻译器 - 把已接受的通知转换为岛屿显示 payload
//!
//! 每种 [`NotificationType`] 对应一个翻译函数，通过 [`translator_for`]
//! 查表分发。所有翻译函数只依赖 [`TranslateContext`] 中的共享资源工具。
//!
//! # 使用示例
//! ```ignore
//! use island_bridge::translator::{translate, TranslateContext};
//!
//! let payload = translate(NotificationType::Call, &ctx)?;
//! println!("{}", payload.param_json()?);
//! ```

pub mod call;
pub mod navigation;
pub mod payload;
pub mod progress;
pub mod resources;
pub mod standard;
pub mod timer;

pub use payload::{DisplayPayload, IslandBuilder, IslandParam};
pub use resources::{BridgeAction, DirIconSource, IconSource, NoIcons, ResourceKit, HIDDEN_PIXEL_KEY};

use anyhow::Result;

use crate::config::{BridgeConfig, DisplayOptions};
use crate::notification::{NotificationEvent, NotificationType};

/// 岛屿显示文案
pub mod msg {
    // Call
    pub const UNKNOWN_CALLER: &str = "Unknown caller";
    pub const INCOMING_CALL: &str = "Incoming call";

    // Timer
    pub const TIMER: &str = "Timer";
    pub const ACTIVE: &str = "Active";

    // Media / progress
    pub const NOW_PLAYING: &str = "Now Playing";
    pub const DOWNLOAD_COMPLETE: &str = "Download Complete";
    pub const FINISHED: &str = "Finished";

    /// 文本与副文本的分隔符
    pub const SEPARATOR: &str = " • ";
}

/// 一次翻译所需的全部输入
pub struct TranslateContext<'a> {
    pub event: &'a NotificationEvent,
    pub slot_id: i32,
    pub options: DisplayOptions,
    pub config: &'a BridgeConfig,
    pub kit: ResourceKit<'a>,
    pub now_millis: i64,
}

impl<'a> TranslateContext<'a> {
    /// 主图标资源键
    pub fn pic_key(&self) -> String {
        format!("pic_{}", self.slot_id)
    }

    /// 标题，为空时回退到来源标识
    pub fn display_title(&self) -> String {
        let title = self.event.title_str().trim();
        if title.is_empty() {
            self.event.source_id.clone()
        } else {
            title.to_string()
        }
    }

    /// 带有公共字段（business、显示选项、点击动作）的构建器
    pub fn builder(&self, ticker: &str) -> IslandBuilder {
        IslandBuilder::new(format!("bridge_{}", self.event.source_id), ticker)
            .display_options(self.options)
            .tap_action(self.event.content_intent.clone())
    }

    /// 提取操作按钮，返回按钮及其键列表
    pub fn actions(&self) -> (Vec<BridgeAction>, Vec<String>) {
        let actions = self.kit.extract_actions(self.event, self.slot_id);
        let keys = actions.iter().map(|a| a.key.clone()).collect();
        (actions, keys)
    }
}

/// 翻译函数
pub type TranslateFn = fn(&TranslateContext<'_>) -> Result<DisplayPayload>;

/// 按类型查找翻译函数（MEDIA 与 STANDARD 共用）
pub fn translator_for(kind: NotificationType) -> TranslateFn {
    match kind {
        NotificationType::Standard | NotificationType::Media => standard::translate,
        NotificationType::Progress => progress::translate,
        NotificationType::Navigation => navigation::translate,
        NotificationType::Call => call::translate,
        NotificationType::Timer => timer::translate,
    }
}

/// 翻译一个事件
pub fn translate(kind: NotificationType, ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    translator_for(kind)(ctx)
}

/// 两段文字用分隔符拼接，任一为空时只取另一段
pub(crate) fn join_non_empty(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (false, false) => format!("{}{}{}", first, msg::SEPARATOR, second),
        (true, false) => second.to_string(),
        _ => first.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationEventBuilder;

    #[test]
    fn test_join_non_empty() {
        assert_eq!(join_non_empty("a", "b"), "a • b");
        assert_eq!(join_non_empty("", "b"), "b");
        assert_eq!(join_non_empty("a", ""), "a");
        assert_eq!(join_non_empty("", ""), "");
    }

    #[test]
    fn test_every_type_translates() {
        let event = NotificationEventBuilder::new()
            .key("k")
            .source_id("com.app")
            .when(1_000)
            .title("Title")
            .text("Text")
            .progress(1, 2)
            .build()
            .unwrap();
        let config = BridgeConfig::default();

        for kind in NotificationType::ALL {
            let payload = test_support::run(kind, &event, &config, 2_000);
            assert_eq!(payload.param.business, "bridge_com.app");
            // slot_id_for("k") == 107
            assert!(payload.resource("pic_107").is_some(), "{:?} has no main icon", kind);
        }
    }

    #[test]
    fn test_display_options_applied() {
        let event = NotificationEvent::new("k", "com.app");
        let mut config = BridgeConfig::default();
        config.global_display.timeout = Some(0);

        let payload = test_support::run(NotificationType::Standard, &event, &config, 0);
        assert_eq!(payload.param.timeout, 0);
        assert!(!payload.param.enable_float);
        assert!(payload.param.show_notification);
    }

    #[test]
    fn test_empty_title_falls_back_to_source() {
        let event = NotificationEvent::new("k", "com.app");
        let payload = test_support::run(NotificationType::Standard, &event, &BridgeConfig::default(), 0);
        assert_eq!(payload.param.ticker, "com.app");
    }
}
