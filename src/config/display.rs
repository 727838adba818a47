//! 显示配置 - 单应用配置与全局配置的合并

use serde::{Deserialize, Serialize};

/// 默认浮窗停留时间（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// 岛屿显示配置（字段未设置时回退到全局配置，再回退到默认值）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// 浮窗停留时间（毫秒）
    pub timeout: Option<u64>,
    /// 是否弹出浮窗
    pub is_float: Option<bool>,
    /// 是否在通知栏显示
    pub is_show_shade: Option<bool>,
}

impl IslandConfig {
    /// 以 `self` 为准，未设置的字段取 `global`
    pub fn merge_with(&self, global: &IslandConfig) -> IslandConfig {
        IslandConfig {
            timeout: self.timeout.or(global.timeout),
            is_float: self.is_float.or(global.is_float),
            is_show_shade: self.is_show_shade.or(global.is_show_shade),
        }
    }

    /// 填充默认值得到最终显示选项
    pub fn resolve(&self) -> DisplayOptions {
        let timeout_ms = self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);
        // 超时为 0 时不弹浮窗
        let enable_float = if timeout_ms == 0 {
            false
        } else {
            self.is_float.unwrap_or(true)
        };

        DisplayOptions {
            timeout_ms,
            enable_float,
            show_shade: self.is_show_shade.unwrap_or(true),
        }
    }
}

/// 最终显示选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    pub timeout_ms: u64,
    pub enable_float: bool,
    pub show_shade: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        IslandConfig::default().resolve()
    }
}

/// 导航岛屿某一侧显示的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavContent {
    Instruction,
    Distance,
    Eta,
    /// 主文字距离，副文字 ETA
    DistanceEta,
    None,
}

/// 导航岛屿左右布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLayout {
    pub left: NavContent,
    pub right: NavContent,
}

impl Default for NavLayout {
    fn default() -> Self {
        Self {
            left: NavContent::DistanceEta,
            right: NavContent::Instruction,
        }
    }
}
