//! 资源解析工具 - 图标回退、透明占位、着色勾号、操作按钮提取
//!
//! 图标解析顺序：大图标 → 小图标 → 来源应用图标 → 内置占位图。
//! 任何加载失败都在本地回退，不会向上传播。

use anyhow::{bail, Context, Result};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use tracing::debug;

use crate::notification::NotificationEvent;

/// 透明占位像素的资源键
pub const HIDDEN_PIXEL_KEY: &str = "hidden_pixel";

/// 内置图标边长
pub const BUILTIN_ICON_SIZE: u32 = 48;

/// 图标来源（由宿主平台实现）
pub trait IconSource: Send + Sync {
    /// 按引用加载图标
    fn load_icon(&self, icon_ref: &str) -> Result<RgbaImage>;

    /// 加载来源应用自身的图标
    fn app_icon(&self, source_id: &str) -> Result<RgbaImage>;
}

/// 没有任何图标的来源（总是回退到占位图）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconSource for NoIcons {
    fn load_icon(&self, icon_ref: &str) -> Result<RgbaImage> {
        bail!("no icon source for {}", icon_ref)
    }

    fn app_icon(&self, source_id: &str) -> Result<RgbaImage> {
        bail!("no app icon for {}", source_id)
    }
}

/// 基于目录的图标来源
///
/// 图标引用是相对目录的图片路径；应用图标为 `<dir>/<source_id>.png`。
#[derive(Debug, Clone)]
pub struct DirIconSource {
    root: PathBuf,
}

impl DirIconSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn open(&self, relative: &str) -> Result<RgbaImage> {
        let path = self.root.join(relative);
        let img = image::open(&path)
            .with_context(|| format!("Failed to decode icon {}", path.display()))?;
        Ok(img.to_rgba8())
    }
}

impl IconSource for DirIconSource {
    fn load_icon(&self, icon_ref: &str) -> Result<RgbaImage> {
        self.open(icon_ref)
    }

    fn app_icon(&self, source_id: &str) -> Result<RgbaImage> {
        self.open(&format!("{}.png", source_id))
    }
}

/// 1×1 全透明像素，用作布局占位
pub fn transparent_pixel() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))
}

/// 内置占位图标：灰色圆形
pub fn placeholder_icon() -> RgbaImage {
    let size = BUILTIN_ICON_SIZE;
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0 - 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([0x8E, 0x8E, 0x93, 0xFF])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// 解析 `#RRGGBB` 或 `#AARRGGBB`
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>> {
    let digits = hex.trim().trim_start_matches('#');
    let value = u32::from_str_radix(digits, 16)
        .with_context(|| format!("Invalid color {}", hex))?;
    match digits.len() {
        6 => Ok(Rgba([(value >> 16) as u8, (value >> 8) as u8, value as u8, 0xFF])),
        8 => Ok(Rgba([
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
            (value >> 24) as u8,
        ])),
        _ => bail!("Invalid color {}", hex),
    }
}

/// 按指定颜色绘制勾号
pub fn tinted_checkmark(color_hex: &str) -> Result<RgbaImage> {
    let color = parse_hex_color(color_hex)?;
    let size = BUILTIN_ICON_SIZE as f32;
    let stroke = size / 14.0;
    let a = (size * 0.20, size * 0.52);
    let b = (size * 0.42, size * 0.72);
    let c = (size * 0.80, size * 0.30);

    Ok(RgbaImage::from_fn(BUILTIN_ICON_SIZE, BUILTIN_ICON_SIZE, |x, y| {
        let p = (x as f32 + 0.5, y as f32 + 0.5);
        if distance_to_segment(p, a, b) <= stroke || distance_to_segment(p, b, c) <= stroke {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// 提取出的操作按钮
#[derive(Debug, Clone)]
pub struct BridgeAction {
    pub key: String,
    pub title: String,
    pub invocation: Option<String>,
    pub icon: Option<RgbaImage>,
}

impl BridgeAction {
    /// 图标资源键（有图标时）
    pub fn icon_key(&self) -> Option<String> {
        self.icon.as_ref().map(|_| format!("{}_icon", self.key))
    }
}

/// 各翻译器共享的资源工具
#[derive(Clone, Copy)]
pub struct ResourceKit<'a> {
    icons: &'a dyn IconSource,
}

impl<'a> ResourceKit<'a> {
    pub fn new(icons: &'a dyn IconSource) -> Self {
        Self { icons }
    }

    fn try_load(&self, icon_ref: &str) -> Option<RgbaImage> {
        match self.icons.load_icon(icon_ref) {
            Ok(img) => Some(img),
            Err(e) => {
                debug!(icon = %icon_ref, error = %e, "Icon load failed");
                None
            }
        }
    }

    /// 解析主图标（永不失败）
    pub fn resolve_icon(&self, event: &NotificationEvent) -> RgbaImage {
        event
            .large_icon
            .as_deref()
            .and_then(|r| self.try_load(r))
            .or_else(|| event.small_icon.as_deref().and_then(|r| self.try_load(r)))
            .or_else(|| match self.icons.app_icon(&event.source_id) {
                Ok(img) => Some(img),
                Err(e) => {
                    debug!(source = %event.source_id, error = %e, "App icon load failed");
                    None
                }
            })
            .unwrap_or_else(placeholder_icon)
    }

    /// 按平台顺序提取操作按钮，跳过无标题的
    pub fn extract_actions(&self, event: &NotificationEvent, slot_id: i32) -> Vec<BridgeAction> {
        event
            .actions
            .iter()
            .enumerate()
            .filter(|(_, action)| !action.title.is_empty())
            .map(|(index, action)| BridgeAction {
                key: format!("act_{}_{}", slot_id, index),
                title: action.title.clone(),
                invocation: action.invocation.clone(),
                icon: action.icon.as_deref().and_then(|r| self.try_load(r)),
            })
            .collect()
    }
}
