//! 分片事件路由
//!
//! 事件按通知键哈希到固定分片，每个分片一个顺序执行的 worker，
//! 因此同一键的事件按到达顺序处理，不同分片之间并发。

use anyhow::{anyhow, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{IslandBridge, PassOutcome};
use crate::notification::PlatformEvent;

/// 每个分片的队列长度
const SHARD_QUEUE: usize = 256;

/// 路由后的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedOutcome {
    pub key: String,
    pub outcome: PassOutcome,
}

pub struct EventRouter {
    shards: Vec<mpsc::Sender<PlatformEvent>>,
    workers: Vec<JoinHandle<()>>,
}

impl EventRouter {
    /// 启动 `shards` 个 worker
    pub fn spawn(bridge: Arc<IslandBridge>, shards: usize) -> Self {
        Self::spawn_inner(bridge, shards, None)
    }

    /// 启动 worker，并把每个事件的处理结果发送到 `report`
    pub fn spawn_reporting(
        bridge: Arc<IslandBridge>,
        shards: usize,
        report: mpsc::UnboundedSender<RoutedOutcome>,
    ) -> Self {
        Self::spawn_inner(bridge, shards, Some(report))
    }

    fn spawn_inner(
        bridge: Arc<IslandBridge>,
        shards: usize,
        report: Option<mpsc::UnboundedSender<RoutedOutcome>>,
    ) -> Self {
        let shards = shards.max(1);
        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);

        for shard in 0..shards {
            let (tx, mut rx) = mpsc::channel::<PlatformEvent>(SHARD_QUEUE);
            let bridge = bridge.clone();
            let report = report.clone();

            workers.push(tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    let key = event.key().to_string();
                    let outcome = bridge.handle(event).await;
                    if let Some(report) = &report {
                        // 接收端已关闭时忽略
                        let _ = report.send(RoutedOutcome { key, outcome });
                    }
                }
                debug!(shard, "Router shard stopped");
            }));
            senders.push(tx);
        }

        Self {
            shards: senders,
            workers,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// 某个键所属的分片
    pub fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// 投递一个事件（分片队列满时等待）
    pub async fn dispatch(&self, event: PlatformEvent) -> Result<()> {
        let shard = self.shard_for(event.key());
        self.shards[shard]
            .send(event)
            .await
            .map_err(|_| anyhow!("router shard {} is closed", shard))
    }

    /// 关闭所有分片并等待队列中的事件处理完
    pub async fn shutdown(self) -> Result<()> {
        drop(self.shards);
        for worker in self.workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Router worker panicked");
            }
        }
        Ok(())
    }
}
