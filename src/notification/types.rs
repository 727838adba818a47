//! 通知类型 - 桥接层的六种语义分类

use serde::{Deserialize, Serialize};

/// 通知语义类型
///
/// 每个事件恰好对应一种类型，由 [`crate::notification::classify`] 决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Standard,
    Progress,
    Media,
    Navigation,
    Call,
    Timer,
}

impl NotificationType {
    /// 全部类型（按声明顺序）
    pub const ALL: [NotificationType; 6] = [
        NotificationType::Standard,
        NotificationType::Progress,
        NotificationType::Media,
        NotificationType::Navigation,
        NotificationType::Call,
        NotificationType::Timer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Standard => "STANDARD",
            NotificationType::Progress => "PROGRESS",
            NotificationType::Media => "MEDIA",
            NotificationType::Navigation => "NAVIGATION",
            NotificationType::Call => "CALL",
            NotificationType::Timer => "TIMER",
        }
    }

    /// 面向用户的分组名称
    pub fn label(&self) -> &'static str {
        match self {
            NotificationType::Standard => "Messages & General",
            NotificationType::Progress => "Downloads & Progress",
            NotificationType::Media => "Music & Media",
            NotificationType::Navigation => "Maps & GPS",
            NotificationType::Call => "Calls",
            NotificationType::Timer => "Timers & Alarms",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
