//! 计时器通知
//!
//! 参考时间在未来 → 倒计时；否则 → 正计时。只看时间戳，不看任何标志位。

use anyhow::Result;

use super::payload::{ChatInfo, DisplayPayload, ImageTextInfo, TimerInfo, TIMER_COUNTDOWN, TIMER_STOPWATCH};
use super::resources::{transparent_pixel, HIDDEN_PIXEL_KEY};
use super::{msg, TranslateContext};

/// 根据参考时间与当前时间生成计时信息
pub fn timer_info(base: i64, now: i64) -> TimerInfo {
    if base > now {
        TimerInfo {
            timer_type: TIMER_COUNTDOWN,
            timer_when: base,
            offset: base - now,
            system_current: now,
        }
    } else {
        TimerInfo {
            timer_type: TIMER_STOPWATCH,
            timer_when: base,
            offset: now - base,
            system_current: now,
        }
    }
}

pub fn translate(ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    let event = ctx.event;
    let title = match event.title_str().trim() {
        "" => msg::TIMER.to_string(),
        t => t.to_string(),
    };
    let timer = timer_info(event.posted_at_when, ctx.now_millis);

    let pic_key = ctx.pic_key();
    let (actions, action_keys) = ctx.actions();

    let builder = ctx
        .builder(&title)
        .picture(&pic_key, ctx.kit.resolve_icon(event))
        .chat_info(ChatInfo {
            title: title.clone(),
            content: None,
            pic_key: pic_key.clone(),
            action_keys,
            timer: Some(timer),
        })
        .small_island_icon(&pic_key)
        .actions(actions);

    let builder = if timer.timer_type == TIMER_COUNTDOWN {
        builder.big_island_countdown(timer.timer_when, &pic_key)
    } else {
        builder.picture(HIDDEN_PIXEL_KEY, transparent_pixel()).big_island(
            Some(ImageTextInfo::with_icon(&pic_key, "", None)),
            Some(ImageTextInfo::with_icon(
                HIDDEN_PIXEL_KEY,
                &title,
                Some(msg::ACTIVE.to_string()),
            )),
        )
    };

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::notification::{Category, NotificationEventBuilder, NotificationType};
    use crate::translator::test_support::run;

    const NOW: i64 = 1_700_000_000_000;

    fn timer_event(when: i64) -> crate::notification::NotificationEvent {
        NotificationEventBuilder::new()
            .key("timer")
            .source_id("com.android.deskclock")
            .category(Category::Stopwatch)
            .when(when)
            .build()
            .unwrap()
    }

    #[test]
    fn test_future_reference_is_countdown() {
        let payload = run(NotificationType::Timer, &timer_event(NOW + 10_000), &BridgeConfig::default(), NOW);

        let timer = payload.param.chat_info.as_ref().unwrap().timer.unwrap();
        assert_eq!(timer.timer_type, TIMER_COUNTDOWN);
        assert_eq!(timer.offset, 10_000);

        let big = payload.param.big_island.as_ref().unwrap();
        assert_eq!(big.countdown.as_ref().unwrap().timer_when, NOW + 10_000);
        assert!(big.right.is_none());
    }

    #[test]
    fn test_past_reference_is_stopwatch() {
        let payload = run(NotificationType::Timer, &timer_event(NOW - 10_000), &BridgeConfig::default(), NOW);

        let chat = payload.param.chat_info.as_ref().unwrap();
        assert_eq!(chat.title, "Timer");
        let timer = chat.timer.unwrap();
        assert_eq!(timer.timer_type, TIMER_STOPWATCH);
        assert_eq!(timer.offset, 10_000);

        let big = payload.param.big_island.as_ref().unwrap();
        assert!(big.countdown.is_none());
        assert_eq!(big.right.as_ref().unwrap().text.content.as_deref(), Some("Active"));
    }

    #[test]
    fn test_tick_does_not_change_hash() {
        let event = timer_event(NOW - 10_000);
        let config = BridgeConfig::default();
        let a = run(NotificationType::Timer, &event, &config, NOW);
        let b = run(NotificationType::Timer, &event, &config, NOW + 1_000);
        assert_eq!(a.content_hash(), b.content_hash());
    }
}
