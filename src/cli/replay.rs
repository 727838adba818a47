//! `island-bridge replay` 命令 - 把事件文件送入桥接流水线
//!
//! 使用手动时钟：从 `--start-ms` 开始，每个事件前进 `--step-ms`，
//! 因此限流与计时器行为可以复现。

use anyhow::Result;
use clap::Args;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::input::read_events;
use super::output::{format_output, format_slots};
use crate::bridge::router::RoutedOutcome;
use crate::bridge::{EventRouter, IslandBridge, IslandSink, JsonLinesSink};
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::config::{BridgeConfig, ConfigStore};
use crate::translator::{DirIconSource, DisplayPayload, IconSource, NoIcons};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// 事件文件（JSONL，每行一个 posted/removed 事件）
    pub events: PathBuf,

    /// 配置文件（默认 <config_dir>/island-bridge/config.json）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 图标目录（图标引用为相对路径，应用图标为 <source_id>.png）
    #[arg(long)]
    pub icons: Option<PathBuf>,

    /// 起始时间（Unix 毫秒，默认当前时间）
    #[arg(long)]
    pub start_ms: Option<i64>,

    /// 每个事件之间前进的毫秒数
    #[arg(long, default_value = "250")]
    pub step_ms: i64,

    /// 并发分片数（1 表示严格按文件顺序处理）
    #[arg(long, default_value = "1")]
    pub shards: usize,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 人类可读的输出端
struct TextSink {
    out: Mutex<Stdout>,
}

impl TextSink {
    fn write_line(&self, line: String) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("stdout poisoned"))?;
        writeln!(out, "{}", line)?;
        Ok(())
    }
}

impl IslandSink for TextSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn emit(&self, slot_id: i32, payload: &DisplayPayload) -> Result<()> {
        let content = payload
            .param
            .base_info
            .as_ref()
            .map(|b| b.content.clone())
            .or_else(|| payload.param.chat_info.as_ref().and_then(|c| c.content.clone()))
            .unwrap_or_default();
        self.write_line(format!(
            "▲ [{}] {} | {} ({} resources)",
            slot_id,
            payload.param.ticker,
            content,
            payload.resource_keys().count()
        ))
    }

    fn retract(&self, slot_id: i32) -> Result<()> {
        self.write_line(format!("▼ [{}]", slot_id))
    }
}

/// 处理 replay 命令
pub async fn handle_replay(args: ReplayArgs) -> Result<()> {
    let config = BridgeConfig::load_or_default(args.config.as_deref())?;
    let events = read_events(&args.events)?;

    let start = args.start_ms.unwrap_or_else(|| SystemClock.now_millis());
    let clock = Arc::new(ManualClock::new(start));
    let sink: Arc<dyn IslandSink> = if args.json {
        Arc::new(JsonLinesSink::new(io::stdout()))
    } else {
        Arc::new(TextSink {
            out: Mutex::new(io::stdout()),
        })
    };
    let icons: Arc<dyn IconSource> = match &args.icons {
        Some(dir) => Arc::new(DirIconSource::new(dir)),
        None => Arc::new(NoIcons),
    };

    let bridge = Arc::new(
        IslandBridge::builder()
            .config(ConfigStore::fixed(config))
            .sink(sink)
            .icons(icons)
            .clock(clock.clone())
            .build()?,
    );

    info!(events = events.len(), shards = args.shards, "Replaying events");

    if args.shards <= 1 {
        for event in events {
            let key = event.key().to_string();
            let outcome = bridge.handle(event).await;
            if !args.json && !outcome.reached_sink() {
                println!("· {} ({})", key, outcome);
            }
            clock.advance(args.step_ms);
        }
    } else {
        let (tx, mut rx) = mpsc::unbounded_channel::<RoutedOutcome>();
        let router = EventRouter::spawn_reporting(bridge.clone(), args.shards, tx);
        for event in events {
            router.dispatch(event).await?;
            clock.advance(args.step_ms);
            // 让分片按时钟节奏消费
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        router.shutdown().await?;
        while let Ok(routed) = rx.try_recv() {
            if !args.json && !routed.outcome.reached_sink() {
                println!("· {} ({})", routed.key, routed.outcome);
            }
        }
    }

    let slots = bridge.active_slots();
    if args.json {
        println!("{}", format_output(&slots, true));
    } else {
        println!("{}", format_slots(&slots));
    }
    Ok(())
}
