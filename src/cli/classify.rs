//! `island-bridge classify` 命令 - 查看每个事件的过滤与分类结果

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::input::read_events;
use super::output::format_output;
use crate::config::BridgeConfig;
use crate::notification::sanity::{is_junk, NoDisplayNames};
use crate::notification::{classify, NotificationEvent, NotificationType, PlatformEvent};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// 事件文件（JSONL）
    pub events: PathBuf,

    /// 配置文件（用于显示允许列表与类型开关）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 单个事件的判定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub key: String,
    pub source_id: String,
    pub kind: NotificationType,
    /// 面向用户的分组名称
    pub group: &'static str,
    pub junk: bool,
    pub ignored: bool,
    pub allowed: bool,
    pub type_enabled: bool,
}

impl Verdict {
    pub fn of(event: &NotificationEvent, config: &BridgeConfig) -> Self {
        let kind = classify(event);
        Self {
            key: event.key.clone(),
            source_id: event.source_id.clone(),
            kind,
            group: kind.label(),
            junk: is_junk(event, &NoDisplayNames),
            ignored: config.is_ignored(&event.source_id),
            allowed: config.is_source_allowed(&event.source_id),
            type_enabled: config.is_type_enabled(&event.source_id, kind),
        }
    }

    /// 是否会进入限流与槽位阶段
    pub fn passes(&self) -> bool {
        !self.junk && !self.ignored && self.allowed && self.type_enabled
    }
}

/// 处理 classify 命令
pub fn handle_classify(args: ClassifyArgs) -> Result<()> {
    let config = BridgeConfig::load_or_default(args.config.as_deref())?;
    let verdicts: Vec<Verdict> = read_events(&args.events)?
        .iter()
        .filter_map(|event| match event {
            PlatformEvent::Posted(event) => Some(Verdict::of(event, &config)),
            PlatformEvent::Removed { .. } => None,
        })
        .collect();

    if args.json {
        println!("{}", format_output(&verdicts, true));
        return Ok(());
    }

    for v in &verdicts {
        let status = if v.passes() {
            "pass"
        } else if v.ignored {
            "ignored"
        } else if v.junk {
            "junk"
        } else if !v.allowed {
            "not allowed"
        } else {
            "type disabled"
        };
        println!(
            "{:<11} {:<21} {:<13} {:<28} {}",
            v.kind.as_str(),
            v.group,
            status,
            v.source_id,
            v.key
        );
    }
    Ok(())
}
