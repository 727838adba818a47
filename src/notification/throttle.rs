//! 更新限流 - 抑制同一通知键过于频繁的重绘
//!
//! ## 规则
//! 1. 该键还没有槽位：总是接受（首次渲染）
//! 2. 标题/正文/副文本有变化：总是接受（内容变化不受限流）
//! 3. 否则距上次发出不足更新间隔（默认 200ms）则拒绝
//!
//! 被拒绝时不修改任何槽位状态。内容哈希去重在翻译之后由槽位表完成。

use std::time::Duration;
use tracing::debug;

use super::event::NotificationEvent;
use crate::slots::ActiveSlot;

/// 默认更新间隔
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// 限流判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// 首次渲染
    FirstRender,
    /// 文本内容变化
    ContentChanged,
    /// 已超过更新间隔
    IntervalElapsed,
    /// 间隔内的重复更新
    Throttled,
}

impl ThrottleDecision {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ThrottleDecision::Throttled)
    }
}

/// 更新限流器
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    interval: Duration,
}

impl UpdateThrottle {
    /// 创建默认间隔的限流器
    pub fn new() -> Self {
        Self {
            interval: UPDATE_INTERVAL,
        }
    }

    /// 创建自定义间隔的限流器
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 判定本次更新是否放行
    pub fn check(
        &self,
        event: &NotificationEvent,
        existing: Option<&ActiveSlot>,
        now_millis: i64,
    ) -> ThrottleDecision {
        let Some(slot) = existing else {
            return ThrottleDecision::FirstRender;
        };

        if event.title_str() != slot.title
            || event.text_str() != slot.text
            || event.sub_text_str() != slot.sub_text
        {
            return ThrottleDecision::ContentChanged;
        }

        let elapsed = now_millis.saturating_sub(slot.last_update_time);
        if elapsed < self.interval.as_millis() as i64 {
            debug!(
                key = %event.key,
                elapsed_ms = elapsed,
                "Update throttled (same content within interval)"
            );
            return ThrottleDecision::Throttled;
        }

        ThrottleDecision::IntervalElapsed
    }

    /// 是否放行
    pub fn should_accept(
        &self,
        event: &NotificationEvent,
        existing: Option<&ActiveSlot>,
        now_millis: i64,
    ) -> bool {
        self.check(event, existing, now_millis).is_accepted()
    }
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new()
    }
}
