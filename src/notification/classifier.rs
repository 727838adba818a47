//! 类型分类器 - 将通知映射到六种语义类型
//!
//! 优先级固定：CALL → NAVIGATION → TIMER → PROGRESS → MEDIA → STANDARD。
//! 带进度条的来电仍然是来电。

use super::event::{Category, NotificationEvent};
use super::sanity::MEDIA_TEMPLATE_TOKEN;
use super::types::NotificationType;

/// 地图/导航类来源关键词
const NAVIGATION_SOURCE_TOKENS: &[&str] = &["maps", "waze"];

/// 来源是否属于导航应用
pub fn is_navigation_source(source_id: &str) -> bool {
    let lower = source_id.to_ascii_lowercase();
    NAVIGATION_SOURCE_TOKENS
        .iter()
        .any(|token| lower.contains(token))
}

/// 分类（全函数，结果确定）
pub fn classify(event: &NotificationEvent) -> NotificationType {
    if event.category == Category::Call {
        return NotificationType::Call;
    }

    if event.category == Category::Navigation || is_navigation_source(&event.source_id) {
        return NotificationType::Navigation;
    }

    let timer_like = event.shows_elapsed_timer
        || matches!(event.category, Category::Alarm | Category::Stopwatch);
    if timer_like && event.posted_at_when > 0 {
        return NotificationType::Timer;
    }

    if event.has_progress() {
        return NotificationType::Progress;
    }

    if event.template_str().contains(MEDIA_TEMPLATE_TOKEN) {
        return NotificationType::Media;
    }

    NotificationType::Standard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::event::NotificationEventBuilder;

    fn base() -> NotificationEventBuilder {
        NotificationEventBuilder::new()
            .key("k")
            .source_id("com.example")
            .title("t")
    }

    #[test]
    fn test_call_wins_over_progress() {
        let event = base()
            .category(Category::Call)
            .progress(50, 100)
            .elapsed_timer(true)
            .when(1_000)
            .build()
            .unwrap();
        assert_eq!(classify(&event), NotificationType::Call);
    }

    #[test]
    fn test_navigation_by_category_or_source() {
        let by_category = base().category(Category::Navigation).build().unwrap();
        assert_eq!(classify(&by_category), NotificationType::Navigation);

        let by_source = NotificationEventBuilder::new()
            .key("k")
            .source_id("com.google.android.apps.maps")
            .progress(1, 2)
            .build()
            .unwrap();
        assert_eq!(classify(&by_source), NotificationType::Navigation);

        let waze = NotificationEventBuilder::new()
            .key("k")
            .source_id("com.Waze")
            .build()
            .unwrap();
        assert_eq!(classify(&waze), NotificationType::Navigation);
    }

    #[test]
    fn test_timer_requires_positive_reference() {
        let timer = base().elapsed_timer(true).when(1_700_000_000_000).build().unwrap();
        assert_eq!(classify(&timer), NotificationType::Timer);

        let alarm = base().category(Category::Alarm).when(5).build().unwrap();
        assert_eq!(classify(&alarm), NotificationType::Timer);

        // 没有参考时间戳则不是计时器
        let no_base = base().category(Category::Stopwatch).build().unwrap();
        assert_eq!(classify(&no_base), NotificationType::Standard);
    }

    #[test]
    fn test_progress_before_media() {
        let event = base()
            .indeterminate(true)
            .template("android.app.Notification$MediaStyle")
            .build()
            .unwrap();
        assert_eq!(classify(&event), NotificationType::Progress);
    }

    #[test]
    fn test_media_and_default() {
        let media = base()
            .template("android.app.Notification$MediaStyle")
            .build()
            .unwrap();
        assert_eq!(classify(&media), NotificationType::Media);

        let plain = base().category(Category::Transport).build().unwrap();
        assert_eq!(classify(&plain), NotificationType::Standard);
    }
}
