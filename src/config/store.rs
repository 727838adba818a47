//! 配置快照通道
//!
//! 外部偏好存储以 [`ConfigPublisher`] 推送新配置；流水线通过 [`ConfigStore`]
//! 在每次处理开始时取一份 `Arc` 快照。推送端关闭或后台刷新出错时，
//! 继续使用最后一次成功推送的配置。

use anyhow::Result;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{BridgeConfig, IslandConfig, NavLayout};
use crate::notification::NotificationType;
use crate::slots::EvictionPolicy;

/// 创建一对配置发布端/读取端
pub fn config_channel(initial: BridgeConfig) -> (ConfigPublisher, ConfigStore) {
    let (tx, rx) = watch::channel(Arc::new(initial));
    (ConfigPublisher { tx }, ConfigStore { rx })
}

/// 配置读取端（可克隆）
#[derive(Debug, Clone)]
pub struct ConfigStore {
    rx: watch::Receiver<Arc<BridgeConfig>>,
}

impl ConfigStore {
    /// 固定配置（没有发布端）
    pub fn fixed(config: BridgeConfig) -> Self {
        config_channel(config).1
    }

    /// 当前配置快照
    pub fn snapshot(&self) -> Arc<BridgeConfig> {
        self.rx.borrow().clone()
    }

    /// 等待下一次配置变更；发布端已关闭时返回错误
    pub async fn changed(&mut self) -> Result<Arc<BridgeConfig>> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

/// 配置发布端
#[derive(Debug)]
pub struct ConfigPublisher {
    tx: watch::Sender<Arc<BridgeConfig>>,
}

impl ConfigPublisher {
    /// 替换整个配置
    pub fn publish(&self, config: BridgeConfig) {
        self.tx.send_replace(Arc::new(config));
    }

    /// 修改配置的一部分
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut BridgeConfig),
    {
        self.tx.send_modify(|current| f(Arc::make_mut(current)));
    }

    pub fn set_allowed_sources(&self, sources: HashSet<String>) {
        self.update(|c| c.allowed_sources = sources.into_iter().collect());
    }

    /// 设置某来源启用的类型；`None` 表示恢复为全部启用
    pub fn set_type_filter(&self, source_id: &str, types: Option<BTreeSet<NotificationType>>) {
        self.update(|c| match types {
            Some(types) => {
                c.type_filters.insert(source_id.to_string(), types);
            }
            None => {
                c.type_filters.remove(source_id);
            }
        });
    }

    pub fn set_app_display(&self, source_id: &str, config: IslandConfig) {
        self.update(|c| {
            c.app_display.insert(source_id.to_string(), config);
        });
    }

    pub fn set_global_display(&self, config: IslandConfig) {
        self.update(|c| c.global_display = config);
    }

    pub fn set_eviction_policy(&self, policy: EvictionPolicy) {
        self.update(|c| c.eviction_policy = policy);
    }

    pub fn set_priority_list(&self, priority_list: Vec<String>) {
        self.update(|c| c.priority_list = priority_list);
    }

    pub fn set_nav_layout(&self, source_id: &str, layout: NavLayout) {
        self.update(|c| {
            c.nav_layouts.insert(source_id.to_string(), layout);
        });
    }

    /// 新建一个读取端
    pub fn subscribe(&self) -> ConfigStore {
        ConfigStore {
            rx: self.tx.subscribe(),
        }
    }

    /// 后台跟随外部配置流：成功的值发布，失败的值记录后忽略
    pub fn follow(self, mut updates: mpsc::Receiver<Result<BridgeConfig>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                match update {
                    Ok(config) => {
                        debug!(policy = %config.eviction_policy, "Config refreshed");
                        self.publish(config);
                    }
                    Err(e) => {
                        warn!(error = %e, "Config refresh failed, keeping last known-good");
                    }
                }
            }
            debug!("Config stream closed");
        })
    }
}
