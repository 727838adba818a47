//! 来电通知

use anyhow::Result;

use super::payload::{DisplayPayload, ImageTextInfo};
use super::resources::{transparent_pixel, HIDDEN_PIXEL_KEY};
use super::{msg, TranslateContext};

pub fn translate(ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    let event = ctx.event;
    let caller = non_empty_or(event.title_str(), msg::UNKNOWN_CALLER);
    let status = non_empty_or(event.text_str(), msg::INCOMING_CALL);

    let pic_key = ctx.pic_key();
    let (actions, action_keys) = ctx.actions();

    ctx.builder(&caller)
        .picture(&pic_key, ctx.kit.resolve_icon(event))
        .picture(HIDDEN_PIXEL_KEY, transparent_pixel())
        .base_info(&caller, &status, &pic_key, action_keys)
        .big_island(
            Some(ImageTextInfo::with_icon(&pic_key, "", None)),
            Some(ImageTextInfo::with_icon(HIDDEN_PIXEL_KEY, &caller, Some(status.clone()))),
        )
        .small_island_icon(&pic_key)
        .actions(actions)
        .build()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BridgeConfig;
    use crate::notification::{Category, NotificationAction, NotificationEventBuilder, NotificationType};
    use crate::translator::test_support::run;

    #[test]
    fn test_caller_and_status() {
        let event = NotificationEventBuilder::new()
            .key("call")
            .source_id("com.android.dialer")
            .category(Category::Call)
            .title("Mom")
            .text("Ongoing call")
            .action(NotificationAction::new("Hang up"))
            .build()
            .unwrap();

        let payload = run(NotificationType::Call, &event, &BridgeConfig::default(), 0);
        let base = payload.param.base_info.as_ref().unwrap();
        assert_eq!(base.title, "Mom");
        assert_eq!(base.content, "Ongoing call");

        let right = payload.param.big_island.as_ref().unwrap().right.as_ref().unwrap();
        assert_eq!(right.text.title, "Mom");
        assert_eq!(right.text.content.as_deref(), Some("Ongoing call"));
        assert_eq!(payload.param.actions.len(), 1);
    }

    #[test]
    fn test_unknown_caller_fallback() {
        let event = NotificationEventBuilder::new()
            .key("call")
            .source_id("com.android.dialer")
            .category(Category::Call)
            .build()
            .unwrap();

        let payload = run(NotificationType::Call, &event, &BridgeConfig::default(), 0);
        let base = payload.param.base_info.as_ref().unwrap();
        assert_eq!(base.title, "Unknown caller");
        assert_eq!(base.content, "Incoming call");
    }
}
