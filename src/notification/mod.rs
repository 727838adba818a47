//! 通知输入层 - 事件模型、健全性过滤、分类、限流与内容哈希
//!
//! # 使用示例
//! ```ignore
//! use island_bridge::notification::{classify, NotificationEventBuilder, NotificationType};
//!
//! let event = NotificationEventBuilder::new()
//!     .key("0|com.whatsapp|1")
//!     .source_id("com.whatsapp")
//!     .title("Alice")
//!     .text("See you at 5")
//!     .build()?;
//! assert_eq!(classify(&event), NotificationType::Standard);
//! ```

pub mod classifier;
pub mod dedup_key;
pub mod event;
pub mod sanity;
pub mod throttle;
pub mod types;

pub use classifier::{classify, is_navigation_source};
pub use dedup_key::content_hash;
pub use event::{Category, NotificationAction, NotificationEvent, NotificationEventBuilder, PlatformEvent};
pub use sanity::{is_junk, DisplayNameResolver, NoDisplayNames};
pub use throttle::{ThrottleDecision, UpdateThrottle, UPDATE_INTERVAL};
pub use types::NotificationType;
