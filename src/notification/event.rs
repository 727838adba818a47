//! 平台通知事件结构
//!
//! 宿主平台投递的原始通知，经过过滤、分类、限流后进入岛屿槽位。
//! 字段全部可选或有默认值，缺失字段在翻译阶段回退，而不是报错。

use serde::{Deserialize, Serialize};

/// 平台通知类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Call,
    Navigation,
    Alarm,
    Stopwatch,
    Transport,
    Other,
    #[default]
    None,
}

/// 通知上的操作按钮
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationAction {
    /// 按钮文字
    pub title: String,
    /// 图标引用（由宿主解析）
    pub icon: Option<String>,
    /// 点击时的调用引用
    pub invocation: Option<String>,
}

impl NotificationAction {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_invocation(mut self, invocation: impl Into<String>) -> Self {
        self.invocation = Some(invocation.into());
        self
    }
}

/// 一条平台通知（一次流水线处理期间由分发器持有）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationEvent {
    /// 逻辑通知的稳定键
    pub key: String,
    /// 来源标识（包名）
    pub source_id: String,
    /// 平台参考时间戳（毫秒，倒计时场景可能在未来）
    pub posted_at_when: i64,
    pub title: Option<String>,
    pub text: Option<String>,
    pub sub_text: Option<String>,
    pub category: Category,
    pub progress_max: i32,
    pub progress_current: i32,
    pub progress_indeterminate: bool,
    /// 是否显示计时器
    pub shows_elapsed_timer: bool,
    /// 模板提示（用于识别媒体样式）
    pub template_hint: Option<String>,
    pub actions: Vec<NotificationAction>,
    pub is_group_summary: bool,
    /// 大图标引用
    pub large_icon: Option<String>,
    /// 小图标引用
    pub small_icon: Option<String>,
    /// 点击通知本体时的调用引用
    pub content_intent: Option<String>,
}

impl NotificationEvent {
    /// 创建新的事件
    pub fn new(key: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn sub_text_str(&self) -> &str {
        self.sub_text.as_deref().unwrap_or("")
    }

    pub fn template_str(&self) -> &str {
        self.template_hint.as_deref().unwrap_or("")
    }

    /// 是否带进度条（确定或不确定）
    pub fn has_progress(&self) -> bool {
        self.progress_max > 0 || self.progress_indeterminate
    }
}

/// 宿主平台投递的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// 通知发布或更新
    Posted(NotificationEvent),
    /// 通知被移除
    Removed { key: String },
}

impl PlatformEvent {
    /// 事件对应的通知键
    pub fn key(&self) -> &str {
        match self {
            PlatformEvent::Posted(event) => &event.key,
            PlatformEvent::Removed { key } => key,
        }
    }
}

/// 事件构建器
#[derive(Debug, Default)]
pub struct NotificationEventBuilder {
    key: Option<String>,
    source_id: Option<String>,
    event: NotificationEvent,
}

impl NotificationEventBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn when(mut self, posted_at_when: i64) -> Self {
        self.event.posted_at_when = posted_at_when;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.event.title = Some(title.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.event.text = Some(text.into());
        self
    }

    pub fn sub_text(mut self, sub_text: impl Into<String>) -> Self {
        self.event.sub_text = Some(sub_text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.event.category = category;
        self
    }

    /// 设置确定进度
    pub fn progress(mut self, current: i32, max: i32) -> Self {
        self.event.progress_current = current;
        self.event.progress_max = max;
        self
    }

    pub fn indeterminate(mut self, indeterminate: bool) -> Self {
        self.event.progress_indeterminate = indeterminate;
        self
    }

    pub fn elapsed_timer(mut self, shows: bool) -> Self {
        self.event.shows_elapsed_timer = shows;
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.event.template_hint = Some(template.into());
        self
    }

    pub fn action(mut self, action: NotificationAction) -> Self {
        self.event.actions.push(action);
        self
    }

    pub fn group_summary(mut self, is_summary: bool) -> Self {
        self.event.is_group_summary = is_summary;
        self
    }

    pub fn large_icon(mut self, icon: impl Into<String>) -> Self {
        self.event.large_icon = Some(icon.into());
        self
    }

    pub fn small_icon(mut self, icon: impl Into<String>) -> Self {
        self.event.small_icon = Some(icon.into());
        self
    }

    pub fn content_intent(mut self, intent: impl Into<String>) -> Self {
        self.event.content_intent = Some(intent.into());
        self
    }

    /// 构建事件
    pub fn build(self) -> Result<NotificationEvent, &'static str> {
        let key = self.key.ok_or("key is required")?;
        let source_id = self.source_id.ok_or("source_id is required")?;

        Ok(NotificationEvent {
            key,
            source_id,
            ..self.event
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_key_and_source() {
        assert_eq!(
            NotificationEventBuilder::new().source_id("pkg").build(),
            Err("key is required")
        );
        assert_eq!(
            NotificationEventBuilder::new().key("k").build(),
            Err("source_id is required")
        );
    }

    #[test]
    fn test_builder_sets_fields() {
        let event = NotificationEventBuilder::new()
            .key("0|com.example|1")
            .source_id("com.example")
            .title("Title")
            .text("Body")
            .progress(3, 10)
            .action(NotificationAction::new("Reply").with_icon("ic_reply"))
            .build()
            .unwrap();

        assert_eq!(event.title_str(), "Title");
        assert_eq!(event.sub_text_str(), "");
        assert!(event.has_progress());
        assert_eq!(event.actions.len(), 1);
        assert_eq!(event.actions[0].icon.as_deref(), Some("ic_reply"));
    }

    #[test]
    fn test_platform_event_json() {
        let posted: PlatformEvent = serde_json::from_str(
            r#"{"event":"posted","key":"k1","source_id":"com.app","title":"Hi","category":"call"}"#,
        )
        .unwrap();
        match &posted {
            PlatformEvent::Posted(event) => {
                assert_eq!(event.key, "k1");
                assert_eq!(event.category, Category::Call);
                assert_eq!(event.progress_max, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(posted.key(), "k1");

        let removed: PlatformEvent =
            serde_json::from_str(r#"{"event":"removed","key":"k1"}"#).unwrap();
        assert_eq!(removed, PlatformEvent::Removed { key: "k1".to_string() });
    }
}
