//! 岛屿显示 payload - 结构化描述 + 图片资源
//!
//! 描述部分用 serde 序列化为 JSON（字段为 camelCase），资源部分是按键存放的
//! RGBA 图片。[`IslandBuilder::build`] 会检查描述中引用的每个图片键都已提供，
//! 并计算内容哈希。
//!
//! 进度与计时器类型用 [`ChatInfo`] 作为基础视图，其余类型用 [`BaseInfo`]。

use anyhow::{anyhow, bail, Context, Result};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Cursor;

use super::resources::BridgeAction;
use crate::config::DisplayOptions;
use crate::notification::dedup_key;

/// 大岛区域类型：图标 + 文字
pub const REGION_ICON_TEXT: u8 = 1;
/// 大岛区域类型：纯文字
pub const REGION_TEXT: u8 = 2;

/// 计时器类型：倒计时
pub const TIMER_COUNTDOWN: i8 = -1;
/// 计时器类型：正计时
pub const TIMER_STOPWATCH: i8 = 1;

/// 结构化描述（顶层）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandParam {
    pub business: String,
    pub ticker: String,
    pub timeout: u64,
    pub enable_float: bool,
    pub show_notification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_info: Option<BaseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_info: Option<ChatInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_bar: Option<ProgressBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_island: Option<BigIsland>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_island: Option<SmallIsland>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<String>,
}

/// 折叠态视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfo {
    pub title: String,
    pub content: String,
    pub pic_key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub action_keys: Vec<String>,
}

/// 会话式视图（计时器、进度使用）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub pic_key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub action_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerInfo {
    pub timer_type: i8,
    pub timer_when: i64,
    pub offset: i64,
    pub system_current: i64,
}

/// 线性进度条
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBar {
    pub progress: u8,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic_forward_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// 大岛的一侧区域
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTextInfo {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic_key: Option<String>,
    pub text: TextInfo,
}

impl ImageTextInfo {
    /// 图标 + 文字区域
    pub fn with_icon(pic_key: impl Into<String>, title: impl Into<String>, content: Option<String>) -> Self {
        Self {
            kind: REGION_ICON_TEXT,
            pic_key: Some(pic_key.into()),
            text: TextInfo {
                title: title.into(),
                content,
            },
        }
    }

    /// 纯文字区域
    pub fn text_only(title: impl Into<String>, content: Option<String>) -> Self {
        Self {
            kind: REGION_TEXT,
            pic_key: None,
            text: TextInfo {
                title: title.into(),
                content,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCircle {
    pub pic_key: String,
    pub progress: u8,
    pub color: String,
    pub clockwise: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub timer_when: i64,
    pub pic_key: String,
}

/// 展开态视图：左右区域，或进度/倒计时变体
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BigIsland {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<ImageTextInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<ImageTextInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_circle: Option<ProgressCircle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Countdown>,
}

/// 紧凑指示器
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SmallIsland {
    Icon {
        pic_key: String,
    },
    CircularProgress {
        pic_key: String,
        progress: u8,
        color: String,
        clockwise: bool,
    },
}

impl SmallIsland {
    pub fn pic_key(&self) -> &str {
        match self {
            SmallIsland::Icon { pic_key } | SmallIsland::CircularProgress { pic_key, .. } => pic_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInfo {
    pub key: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<String>,
}

/// 翻译器的最终产物
#[derive(Debug, Clone)]
pub struct DisplayPayload {
    pub param: IslandParam,
    resources: BTreeMap<String, RgbaImage>,
    content_hash: u64,
}

impl DisplayPayload {
    /// 结构化描述的 JSON 文本
    pub fn param_json(&self) -> Result<String> {
        serde_json::to_string(&self.param).context("Failed to serialize island param")
    }

    /// 去掉易变时钟字段后的内容哈希
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    pub fn resource(&self, key: &str) -> Option<&RgbaImage> {
        self.resources.get(key)
    }

    pub fn resource_keys(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// 把某个资源编码为 PNG
    pub fn encode_png(&self, key: &str) -> Result<Vec<u8>> {
        let img = self
            .resources
            .get(key)
            .ok_or_else(|| anyhow!("No resource named {}", key))?;
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png)
            .with_context(|| format!("Failed to encode {} as PNG", key))?;
        Ok(bytes.into_inner())
    }
}

/// payload 构建器
#[derive(Debug)]
pub struct IslandBuilder {
    param: IslandParam,
    resources: BTreeMap<String, RgbaImage>,
}

impl IslandBuilder {
    pub fn new(business: impl Into<String>, ticker: impl Into<String>) -> Self {
        let defaults = DisplayOptions::default();
        Self {
            param: IslandParam {
                business: business.into(),
                ticker: ticker.into(),
                timeout: defaults.timeout_ms,
                enable_float: defaults.enable_float,
                show_notification: defaults.show_shade,
                base_info: None,
                chat_info: None,
                progress_bar: None,
                big_island: None,
                small_island: None,
                actions: Vec::new(),
                tap_action: None,
            },
            resources: BTreeMap::new(),
        }
    }

    pub fn display_options(mut self, options: DisplayOptions) -> Self {
        self.param.timeout = options.timeout_ms;
        self.param.enable_float = options.enable_float;
        self.param.show_notification = options.show_shade;
        self
    }

    pub fn picture(mut self, key: impl Into<String>, img: RgbaImage) -> Self {
        self.resources.insert(key.into(), img);
        self
    }

    pub fn base_info(
        mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        pic_key: impl Into<String>,
        action_keys: Vec<String>,
    ) -> Self {
        self.param.base_info = Some(BaseInfo {
            title: title.into(),
            content: content.into(),
            pic_key: pic_key.into(),
            action_keys,
        });
        self
    }

    pub fn chat_info(mut self, chat: ChatInfo) -> Self {
        self.param.chat_info = Some(chat);
        self
    }

    pub fn progress_bar(mut self, progress: u8, color: impl Into<String>, pic_forward_key: Option<String>) -> Self {
        self.param.progress_bar = Some(ProgressBar {
            progress,
            color: color.into(),
            pic_forward_key,
        });
        self
    }

    /// 大岛左右区域
    pub fn big_island(mut self, left: Option<ImageTextInfo>, right: Option<ImageTextInfo>) -> Self {
        let big = self.param.big_island.get_or_insert_with(BigIsland::default);
        big.left = left;
        big.right = right;
        self
    }

    pub fn big_island_progress(mut self, pic_key: impl Into<String>, progress: u8, color: impl Into<String>) -> Self {
        let big = self.param.big_island.get_or_insert_with(BigIsland::default);
        big.progress_circle = Some(ProgressCircle {
            pic_key: pic_key.into(),
            progress,
            color: color.into(),
            clockwise: true,
        });
        self
    }

    pub fn big_island_countdown(mut self, timer_when: i64, pic_key: impl Into<String>) -> Self {
        let big = self.param.big_island.get_or_insert_with(BigIsland::default);
        big.countdown = Some(Countdown {
            timer_when,
            pic_key: pic_key.into(),
        });
        self
    }

    pub fn small_island_icon(mut self, pic_key: impl Into<String>) -> Self {
        self.param.small_island = Some(SmallIsland::Icon {
            pic_key: pic_key.into(),
        });
        self
    }

    pub fn small_island_progress(mut self, pic_key: impl Into<String>, progress: u8, color: impl Into<String>) -> Self {
        self.param.small_island = Some(SmallIsland::CircularProgress {
            pic_key: pic_key.into(),
            progress,
            color: color.into(),
            clockwise: true,
        });
        self
    }

    /// 追加操作按钮（有图标时一并注册图标资源）
    pub fn actions(mut self, actions: Vec<BridgeAction>) -> Self {
        for action in actions {
            let icon_key = action.icon_key();
            if let (Some(key), Some(icon)) = (&icon_key, action.icon) {
                self.resources.insert(key.clone(), icon);
            }
            self.param.actions.push(ActionInfo {
                key: action.key,
                title: action.title,
                icon_key,
                invocation: action.invocation,
            });
        }
        self
    }

    pub fn tap_action(mut self, invocation: Option<String>) -> Self {
        self.param.tap_action = invocation;
        self
    }

    fn referenced_pictures(&self) -> Vec<&str> {
        let p = &self.param;
        let mut keys: Vec<&str> = Vec::new();
        if let Some(base) = &p.base_info {
            keys.push(&base.pic_key);
        }
        if let Some(chat) = &p.chat_info {
            keys.push(&chat.pic_key);
        }
        if let Some(key) = p.progress_bar.as_ref().and_then(|b| b.pic_forward_key.as_deref()) {
            keys.push(key);
        }
        if let Some(big) = &p.big_island {
            keys.extend(big.left.iter().chain(big.right.iter()).filter_map(|r| r.pic_key.as_deref()));
            keys.extend(big.progress_circle.iter().map(|c| c.pic_key.as_str()));
            keys.extend(big.countdown.iter().map(|c| c.pic_key.as_str()));
        }
        if let Some(small) = &p.small_island {
            keys.push(small.pic_key());
        }
        keys.extend(p.actions.iter().filter_map(|a| a.icon_key.as_deref()));
        keys
    }

    /// 校验图片引用并计算内容哈希
    pub fn build(self) -> Result<DisplayPayload> {
        if let Some(missing) = self
            .referenced_pictures()
            .into_iter()
            .find(|key| !self.resources.contains_key(*key))
        {
            bail!("Picture {} is referenced but not provided", missing);
        }

        let description = serde_json::to_value(&self.param).context("Failed to serialize island param")?;
        let content_hash = dedup_key::content_hash(&description);

        Ok(DisplayPayload {
            param: self.param,
            resources: self.resources,
            content_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::resources::transparent_pixel;

    fn minimal() -> IslandBuilder {
        IslandBuilder::new("bridge_com.app", "Hello")
            .picture("pic_1", transparent_pixel())
            .base_info("Hello", "world", "pic_1", Vec::new())
            .small_island_icon("pic_1")
    }

    #[test]
    fn test_build_rejects_missing_picture() {
        let result = IslandBuilder::new("bridge_com.app", "Hello")
            .base_info("Hello", "", "pic_missing", Vec::new())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_param_json_is_camel_case() {
        let payload = minimal()
            .display_options(DisplayOptions {
                timeout_ms: 0,
                enable_float: false,
                show_shade: true,
            })
            .build()
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&payload.param_json().unwrap()).unwrap();
        assert_eq!(json["business"], "bridge_com.app");
        assert_eq!(json["enableFloat"], false);
        assert_eq!(json["baseInfo"]["picKey"], "pic_1");
        assert_eq!(json["smallIsland"]["style"], "icon");
        assert_eq!(json["smallIsland"]["picKey"], "pic_1");
        // 空字段不输出
        assert!(json.get("progressBar").is_none());
    }

    #[test]
    fn test_actions_register_icons() {
        let payload = minimal()
            .actions(vec![
                BridgeAction {
                    key: "act_1_0".into(),
                    title: "Reply".into(),
                    invocation: None,
                    icon: Some(transparent_pixel()),
                },
                BridgeAction {
                    key: "act_1_1".into(),
                    title: "Dismiss".into(),
                    invocation: Some("intent:dismiss".into()),
                    icon: None,
                },
            ])
            .build()
            .unwrap();

        assert!(payload.resource("act_1_0_icon").is_some());
        assert_eq!(payload.param.actions.len(), 2);
        assert_eq!(payload.param.actions[1].icon_key, None);
    }

    #[test]
    fn test_hash_ignores_timer_clock() {
        let chat = |now: i64| ChatInfo {
            title: "Timer".into(),
            content: None,
            pic_key: "pic_1".into(),
            action_keys: Vec::new(),
            timer: Some(TimerInfo {
                timer_type: TIMER_STOPWATCH,
                timer_when: 1_000,
                offset: now - 1_000,
                system_current: now,
            }),
        };

        let a = minimal().chat_info(chat(5_000)).build().unwrap();
        let b = minimal().chat_info(chat(9_000)).build().unwrap();
        assert_eq!(a.content_hash(), b.content_hash());

        let c = minimal().base_info("Other", "world", "pic_1", Vec::new()).build().unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn test_encode_png() {
        let payload = minimal().build().unwrap();
        let png = payload.encode_png("pic_1").unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(payload.encode_png("nope").is_err());
    }
}
