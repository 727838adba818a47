//! 导航通知
//!
//! 标题与正文中较长的一段视为行驶指引，另一段视为距离；副文本为 ETA。
//! 大岛左右两侧显示什么由 [`NavLayout`] 决定。

use anyhow::Result;

use super::payload::{DisplayPayload, ImageTextInfo};
use super::{msg, TranslateContext};
use crate::config::{NavContent, NavLayout};

/// 拆分后的导航文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavParts {
    pub instruction: String,
    pub distance: String,
    pub eta: String,
}

impl NavParts {
    pub fn split(title: &str, text: &str, sub_text: &str) -> Self {
        let (title, text) = (title.trim(), text.trim());
        let (instruction, distance) = match (title.is_empty(), text.is_empty()) {
            (false, false) if text.chars().count() > title.chars().count() => (text, title),
            (false, false) => (title, text),
            (true, _) => (text, ""),
            (false, true) => (title, ""),
        };
        Self {
            instruction: instruction.to_string(),
            distance: distance.to_string(),
            eta: sub_text.trim().to_string(),
        }
    }

    /// 折叠态内容：`距离 • ETA` 或仅距离
    pub fn content(&self) -> String {
        if self.eta.is_empty() {
            self.distance.clone()
        } else {
            format!("{}{}{}", self.distance, msg::SEPARATOR, self.eta)
        }
    }

    /// 某一侧的主/副文字；`None` 表示该侧不显示
    fn region_text(&self, content: NavContent) -> Option<(String, Option<String>)> {
        match content {
            NavContent::Instruction => Some((self.instruction.clone(), None)),
            NavContent::Distance => Some((self.distance.clone(), None)),
            NavContent::Eta => Some((self.eta.clone(), None)),
            NavContent::DistanceEta => Some((
                self.distance.clone(),
                Some(self.eta.clone()).filter(|eta| !eta.is_empty()),
            )),
            NavContent::None => None,
        }
    }
}

pub fn translate(ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    let event = ctx.event;
    let parts = NavParts::split(event.title_str(), event.text_str(), event.sub_text_str());
    let title = if parts.instruction.is_empty() {
        ctx.display_title()
    } else {
        parts.instruction.clone()
    };
    let content = parts.content();
    let layout: NavLayout = ctx.config.nav_layout(&event.source_id);

    let pic_key = ctx.pic_key();
    let (actions, action_keys) = ctx.actions();

    // 左侧始终带图标
    let (left_title, left_content) = parts.region_text(layout.left).unwrap_or_default();
    let left = ImageTextInfo::with_icon(&pic_key, left_title, left_content);
    let right = parts
        .region_text(layout.right)
        .map(|(primary, secondary)| ImageTextInfo::text_only(primary, secondary));

    ctx.builder(&title)
        .picture(&pic_key, ctx.kit.resolve_icon(event))
        .base_info(&title, &content, &pic_key, action_keys)
        .big_island(Some(left), right)
        .small_island_icon(&pic_key)
        .actions(actions)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::notification::{NotificationEventBuilder, NotificationType};
    use crate::translator::test_support::run;

    #[test]
    fn test_longer_string_is_instruction() {
        let parts = NavParts::split("200 m", "Turn left onto Main St", "5 min");
        assert_eq!(parts.instruction, "Turn left onto Main St");
        assert_eq!(parts.distance, "200 m");
        assert_eq!(parts.content(), "200 m • 5 min");

        let parts = NavParts::split("Turn right", "1 km", "");
        assert_eq!(parts.instruction, "Turn right");
        assert_eq!(parts.content(), "1 km");
    }

    #[test]
    fn test_single_field() {
        let parts = NavParts::split("", "Continue straight", "");
        assert_eq!(parts.instruction, "Continue straight");
        assert_eq!(parts.distance, "");
    }

    #[test]
    fn test_default_layout() {
        let event = NotificationEventBuilder::new()
            .key("nav")
            .source_id("com.google.android.apps.maps")
            .title("300 m")
            .text("Head north on Elm St")
            .sub_text("12:05 ETA")
            .build()
            .unwrap();

        let payload = run(NotificationType::Navigation, &event, &BridgeConfig::default(), 0);
        let base = payload.param.base_info.as_ref().unwrap();
        assert_eq!(base.title, "Head north on Elm St");
        assert_eq!(base.content, "300 m • 12:05 ETA");

        let big = payload.param.big_island.as_ref().unwrap();
        let left = big.left.as_ref().unwrap();
        assert_eq!(left.text.title, "300 m");
        assert_eq!(left.text.content.as_deref(), Some("12:05 ETA"));
        assert_eq!(big.right.as_ref().unwrap().text.title, "Head north on Elm St");
    }

    #[test]
    fn test_custom_layout_hides_right() {
        let event = NotificationEventBuilder::new()
            .key("nav")
            .source_id("com.waze")
            .title("2 km")
            .text("Take exit 14")
            .build()
            .unwrap();

        let mut config = BridgeConfig::default();
        config.nav_layouts.insert(
            "com.waze".to_string(),
            NavLayout {
                left: NavContent::Instruction,
                right: NavContent::None,
            },
        );

        let payload = run(NotificationType::Navigation, &event, &config, 0);
        let big = payload.param.big_island.as_ref().unwrap();
        assert_eq!(big.left.as_ref().unwrap().text.title, "Take exit 14");
        assert!(big.right.is_none());
    }
}
