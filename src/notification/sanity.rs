//! 内容健全性过滤 - 拒绝无信息量或泄露包名的通知
//!
//! ## 过滤规则（按顺序）
//! 1. 标题、正文、副文本全部为空
//! 2. 任一字段等于来源包名，或包含平台命名空间泄露标记
//! 3. 字段命中系统样板文案（后台运行、点击查看详情等）
//! 4. 分组摘要通知
//! 5. 标题等于应用显示名且无正文（通话/导航/交通/媒体不受此条限制）

use regex::RegexSet;
use std::sync::OnceLock;
use tracing::debug;

use super::event::{Category, NotificationEvent};

/// 平台命名空间泄露标记
const PLATFORM_LEAK_TOKENS: &[&str] = &["com.google.android"];

/// 系统样板文案
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"(?i)running in background",
    r"(?i)tap for more info",
    r"(?i)displaying over other apps",
];

/// 媒体样式模板标记
pub const MEDIA_TEMPLATE_TOKEN: &str = "MediaStyle";

/// 应用显示名解析（由宿主提供，尽力而为）
pub trait DisplayNameResolver: Send + Sync {
    fn display_name(&self, source_id: &str) -> anyhow::Result<String>;
}

/// 不提供显示名的解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplayNames;

impl DisplayNameResolver for NoDisplayNames {
    fn display_name(&self, _source_id: &str) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

impl<F> DisplayNameResolver for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn display_name(&self, source_id: &str) -> anyhow::Result<String> {
        self(source_id)
    }
}

/// 解析显示名，失败时返回空字符串
pub fn resolve_display_name(resolver: &dyn DisplayNameResolver, source_id: &str) -> String {
    match resolver.display_name(source_id) {
        Ok(name) => name,
        Err(e) => {
            debug!(source = %source_id, error = %e, "Display name lookup failed");
            String::new()
        }
    }
}

fn boilerplate() -> Option<&'static RegexSet> {
    static SET: OnceLock<Option<RegexSet>> = OnceLock::new();
    SET.get_or_init(|| RegexSet::new(BOILERPLATE_PATTERNS).ok())
        .as_ref()
}

/// 是否为"特殊"通知（通话、导航、交通、媒体）
pub fn is_special(event: &NotificationEvent) -> bool {
    matches!(
        event.category,
        Category::Call | Category::Navigation | Category::Transport
    ) || event.template_str().contains(MEDIA_TEMPLATE_TOKEN)
}

/// 判断通知是否为垃圾通知
///
/// 返回 `true` 表示应丢弃。进度条或媒体标记不能豁免空内容和包名泄露。
pub fn is_junk(event: &NotificationEvent, resolver: &dyn DisplayNameResolver) -> bool {
    let title = event.title_str().trim();
    let text = event.text_str().trim();
    let sub_text = event.sub_text_str().trim();
    let fields = [title, text, sub_text];

    // 1. 完全为空
    if fields.iter().all(|f| f.is_empty()) {
        return true;
    }

    // 2. 包名泄露
    let source = event.source_id.as_str();
    if !source.is_empty() && fields.iter().any(|f| f.eq_ignore_ascii_case(source)) {
        return true;
    }
    if fields.iter().any(|f| {
        let lower = f.to_lowercase();
        PLATFORM_LEAK_TOKENS.iter().any(|token| lower.contains(token))
    }) {
        return true;
    }

    // 3. 系统样板
    if boilerplate().is_some_and(|set| set.is_match(title) || set.is_match(text)) {
        return true;
    }

    // 4. 分组摘要
    if event.is_group_summary {
        return true;
    }

    if is_special(event) {
        return false;
    }

    // 5. 仅有应用名的占位通知
    if text.is_empty() && sub_text.is_empty() {
        let app_name = resolve_display_name(resolver, source);
        if !app_name.is_empty() && title == app_name.trim() {
            return true;
        }
    }

    false
}
