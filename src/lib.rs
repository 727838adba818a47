//! Island Bridge - 把系统通知桥接到岛屿显示面
//!
//! 流水线：允许列表 → 健全性过滤 → 分类 → 限流 → 槽位管理 → 翻译 → 输出

pub mod bridge;
pub mod cli;
pub mod clock;
pub mod config;
pub mod notification;
pub mod slots;
pub mod translator;

pub use bridge::{EventRouter, IslandBridge, IslandBridgeBuilder, IslandSink, MemorySink, PassOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{config_channel, BridgeConfig, ConfigPublisher, ConfigStore, DisplayOptions, IslandConfig};
pub use notification::{
    classify, Category, NotificationAction, NotificationEvent, NotificationEventBuilder, NotificationType,
    PlatformEvent,
};
pub use slots::{ActiveSlot, EvictionPolicy, SlotTable, MAX_SLOTS};
pub use translator::{DisplayPayload, IconSource, NoIcons};
