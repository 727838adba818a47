//! 桥接配置 - 允许列表、类型过滤、显示选项、淘汰策略
//!
//! 配置以不可变快照的形式注入流水线：每次处理开始时读取一次，
//! 处理过程中的配置变更在下一个事件才生效。

pub mod display;
pub mod store;

pub use display::{DisplayOptions, IslandConfig, NavContent, NavLayout, DEFAULT_TIMEOUT_MS};
pub use store::{config_channel, ConfigPublisher, ConfigStore};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::notification::NotificationType;
use crate::slots::EvictionPolicy;

/// 平台自身的系统来源，永不桥接
const SYSTEM_SOURCES: &[&str] = &["android", "com.android.systemui"];

/// 包含此标记的来源是宿主自己的岛屿通知
const HOST_ISLAND_TOKEN: &str = "miui.notification";

/// 默认的进度完成关键词
pub fn default_finish_keywords() -> Vec<String> {
    ["finished", "complete", "completed", "done", "downloaded", "success"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 桥接配置快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// 桥接程序自身的来源标识
    pub self_source: Option<String>,
    /// 允许桥接的来源
    pub allowed_sources: BTreeSet<String>,
    /// 每个来源启用的类型（缺省表示全部启用）
    pub type_filters: HashMap<String, BTreeSet<NotificationType>>,
    /// 每个来源的显示配置
    pub app_display: HashMap<String, IslandConfig>,
    /// 全局显示配置
    pub global_display: IslandConfig,
    /// 槽位淘汰策略
    pub eviction_policy: EvictionPolicy,
    /// 来源优先级（越靠前越优先）
    pub priority_list: Vec<String>,
    /// 进度完成关键词（不区分大小写的子串匹配）
    pub finish_keywords: Vec<String>,
    /// 每个来源的导航布局
    pub nav_layouts: HashMap<String, NavLayout>,
    /// 全局导航布局
    pub global_nav_layout: Option<NavLayout>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            self_source: None,
            allowed_sources: BTreeSet::new(),
            type_filters: HashMap::new(),
            app_display: HashMap::new(),
            global_display: IslandConfig::default(),
            eviction_policy: EvictionPolicy::default(),
            priority_list: Vec::new(),
            finish_keywords: default_finish_keywords(),
            nav_layouts: HashMap::new(),
            global_nav_layout: None,
        }
    }
}

impl BridgeConfig {
    /// 默认配置文件路径: `<config_dir>/island-bridge/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("island-bridge").join("config.json"))
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: BridgeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!(
            path = %path.display(),
            sources = config.allowed_sources.len(),
            policy = %config.eviction_policy,
            "Loaded bridge config"
        );
        Ok(config)
    }

    /// 加载配置，文件不存在时返回默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// 添加允许的来源
    pub fn allow(mut self, source_id: impl Into<String>) -> Self {
        self.allowed_sources.insert(source_id.into());
        self
    }

    /// 设置淘汰策略
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// 设置优先级列表
    pub fn with_priority<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_list = sources.into_iter().map(Into::into).collect();
        self
    }

    /// 是否为永不桥接的来源（自身、系统、宿主岛屿）
    pub fn is_ignored(&self, source_id: &str) -> bool {
        self.self_source.as_deref() == Some(source_id)
            || SYSTEM_SOURCES.contains(&source_id)
            || source_id.contains(HOST_ISLAND_TOKEN)
    }

    pub fn is_source_allowed(&self, source_id: &str) -> bool {
        self.allowed_sources.contains(source_id)
    }

    /// 该来源是否启用了此类型
    pub fn is_type_enabled(&self, source_id: &str, kind: NotificationType) -> bool {
        self.type_filters
            .get(source_id)
            .map_or(true, |types| types.contains(&kind))
    }

    /// 合并后的显示选项
    pub fn display_options(&self, source_id: &str) -> DisplayOptions {
        self.app_display
            .get(source_id)
            .copied()
            .unwrap_or_default()
            .merge_with(&self.global_display)
            .resolve()
    }

    /// 生效的导航布局
    pub fn nav_layout(&self, source_id: &str) -> NavLayout {
        self.nav_layouts
            .get(source_id)
            .copied()
            .or(self.global_nav_layout)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_ignored_sources() {
        let config = BridgeConfig {
            self_source: Some("com.bridge".to_string()),
            ..BridgeConfig::default()
        };
        assert!(config.is_ignored("com.bridge"));
        assert!(config.is_ignored("android"));
        assert!(config.is_ignored("com.android.systemui"));
        assert!(config.is_ignored("com.miui.notification.island"));
        assert!(!config.is_ignored("com.whatsapp"));
    }

    #[test]
    fn test_type_filter_defaults_to_all() {
        let mut config = BridgeConfig::default();
        assert!(config.is_type_enabled("com.app", NotificationType::Media));

        config.type_filters.insert(
            "com.app".to_string(),
            [NotificationType::Call].into_iter().collect(),
        );
        assert!(config.is_type_enabled("com.app", NotificationType::Call));
        assert!(!config.is_type_enabled("com.app", NotificationType::Media));
        assert!(config.is_type_enabled("com.other", NotificationType::Media));
    }

    #[test]
    fn test_display_options_merge() {
        let mut config = BridgeConfig::default();
        config.global_display.timeout = Some(0);
        config.app_display.insert(
            "com.fast".to_string(),
            IslandConfig {
                timeout: Some(2000),
                ..IslandConfig::default()
            },
        );

        assert!(!config.display_options("com.other").enable_float);
        let fast = config.display_options("com.fast");
        assert_eq!(fast.timeout_ms, 2000);
        assert!(fast.enable_float);
    }

    #[test]
    fn test_nav_layout_fallback() {
        let mut config = BridgeConfig::default();
        assert_eq!(config.nav_layout("maps"), NavLayout::default());

        let global = NavLayout {
            left: NavContent::Instruction,
            right: NavContent::Eta,
        };
        config.global_nav_layout = Some(global);
        assert_eq!(config.nav_layout("maps"), global);

        let app = NavLayout {
            left: NavContent::Distance,
            right: NavContent::None,
        };
        config.nav_layouts.insert("maps".to_string(), app);
        assert_eq!(config.nav_layout("maps"), app);
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "allowed_sources": ["com.whatsapp"],
                "eviction_policy": "PRIORITY",
                "priority_list": ["com.whatsapp", "com.spotify.music"],
                "type_filters": {{"com.whatsapp": ["STANDARD", "CALL"]}}
            }}"#
        )
        .unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert!(config.is_source_allowed("com.whatsapp"));
        assert_eq!(config.eviction_policy, EvictionPolicy::Priority);
        assert_eq!(config.priority_list.len(), 2);
        assert!(!config.is_type_enabled("com.whatsapp", NotificationType::Timer));
        // 未给出的字段取默认值
        assert_eq!(config.finish_keywords, default_finish_keywords());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load_or_default(Some(&dir.path().join("missing.json"))).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(BridgeConfig::load(file.path()).is_err());
    }
}
