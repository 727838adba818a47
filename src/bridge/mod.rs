//! 岛屿桥接流水线
//!
//! 一次处理（pass）的顺序：
//! 允许列表 → 健全性过滤 → 分类 → 类型开关 → 限流 → 翻译 → 去重/准入/写入 → 输出
//!
//! 同一通知键的处理由 [`KeyLocks`] 串行化；槽位表的修改与对应的
//! `emit`/`retract` 在同一把表锁内完成，因此输出顺序与槽位状态一致。
//! 任何单个事件的失败都只丢弃该事件，不影响流水线。
//!
//! 输出端在表锁内被调用，慢输出端会阻塞所有键的写入阶段（翻译不受影响）。

pub mod locks;
pub mod router;
pub mod sink;

pub use locks::KeyLocks;
pub use router::EventRouter;
pub use sink::{IslandSink, JsonLinesSink, MemorySink, SinkCall};

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BridgeConfig, ConfigStore};
use crate::notification::sanity::{is_junk, DisplayNameResolver, NoDisplayNames};
use crate::notification::throttle::UpdateThrottle;
use crate::notification::{classify, NotificationEvent, NotificationType, PlatformEvent};
use crate::slots::{slot_id_for, ActiveSlot, CommitOutcome, SlotTable, SlotUpdate, MAX_SLOTS};
use crate::translator::{translator_for, IconSource, NoIcons, ResourceKit, TranslateContext, TranslateFn};

/// 一次处理的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// 自身/系统/宿主来源
    Ignored,
    /// 不在允许列表中
    NotAllowed,
    /// 被健全性过滤拒绝
    Junk,
    /// 该来源关闭了此类型
    TypeDisabled,
    /// 限流
    Throttled,
    /// 容量不足
    Rejected,
    /// 内容哈希未变
    Unchanged,
    /// 翻译或输出失败，原槽位保持不变
    Failed,
    /// 已输出
    Emitted { slot_id: i32, created: bool },
    /// 已撤下
    Retracted { slot_id: i32 },
    /// 移除的键本来就不存在
    Absent,
}

impl PassOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassOutcome::Ignored => "ignored",
            PassOutcome::NotAllowed => "not_allowed",
            PassOutcome::Junk => "junk",
            PassOutcome::TypeDisabled => "type_disabled",
            PassOutcome::Throttled => "throttled",
            PassOutcome::Rejected => "rejected",
            PassOutcome::Unchanged => "unchanged",
            PassOutcome::Failed => "failed",
            PassOutcome::Emitted { created: true, .. } => "created",
            PassOutcome::Emitted { created: false, .. } => "updated",
            PassOutcome::Retracted { .. } => "retracted",
            PassOutcome::Absent => "absent",
        }
    }

    /// 是否调用了输出端
    pub fn reached_sink(&self) -> bool {
        matches!(self, PassOutcome::Emitted { .. } | PassOutcome::Retracted { .. })
    }
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 桥接器构建器
pub struct IslandBridgeBuilder {
    config: Option<ConfigStore>,
    sink: Option<Arc<dyn IslandSink>>,
    names: Arc<dyn DisplayNameResolver>,
    icons: Arc<dyn IconSource>,
    clock: Arc<dyn Clock>,
    throttle: UpdateThrottle,
    capacity: usize,
    translators: HashMap<NotificationType, TranslateFn>,
}

impl IslandBridgeBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            sink: None,
            names: Arc::new(NoDisplayNames),
            icons: Arc::new(NoIcons),
            clock: Arc::new(SystemClock),
            throttle: UpdateThrottle::new(),
            capacity: MAX_SLOTS,
            translators: HashMap::new(),
        }
    }

    /// 配置来源（默认为固定的默认配置）
    pub fn config(mut self, config: ConfigStore) -> Self {
        self.config = Some(config);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn IslandSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn display_names(mut self, names: Arc<dyn DisplayNameResolver>) -> Self {
        self.names = names;
        self
    }

    pub fn icons(mut self, icons: Arc<dyn IconSource>) -> Self {
        self.icons = icons;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 更新间隔（默认 200ms）
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.throttle = UpdateThrottle::with_interval(interval);
        self
    }

    /// 槽位容量（默认 9，取值限制在 1..=9）
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.clamp(1, MAX_SLOTS);
        self
    }

    /// 替换某个类型的翻译函数
    pub fn translator(mut self, kind: NotificationType, translate: TranslateFn) -> Self {
        self.translators.insert(kind, translate);
        self
    }

    pub fn build(self) -> Result<IslandBridge> {
        let sink = self.sink.ok_or_else(|| anyhow!("island sink is required"))?;
        let config = self
            .config
            .unwrap_or_else(|| ConfigStore::fixed(BridgeConfig::default()));

        info!(sink = sink.name(), capacity = self.capacity, "Island bridge ready");

        Ok(IslandBridge {
            config,
            sink,
            names: self.names,
            icons: self.icons,
            clock: self.clock,
            throttle: self.throttle,
            slots: Mutex::new(SlotTable::with_capacity(self.capacity)),
            locks: KeyLocks::new(),
            translators: self.translators,
        })
    }
}

impl Default for IslandBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 岛屿桥接器
pub struct IslandBridge {
    config: ConfigStore,
    sink: Arc<dyn IslandSink>,
    names: Arc<dyn DisplayNameResolver>,
    icons: Arc<dyn IconSource>,
    clock: Arc<dyn Clock>,
    throttle: UpdateThrottle,
    slots: Mutex<SlotTable>,
    locks: KeyLocks,
    translators: HashMap<NotificationType, TranslateFn>,
}

impl IslandBridge {
    pub fn builder() -> IslandBridgeBuilder {
        IslandBridgeBuilder::new()
    }

    /// 处理一个平台事件
    pub async fn handle(&self, event: PlatformEvent) -> PassOutcome {
        match event {
            PlatformEvent::Posted(event) => self.on_posted(event).await,
            PlatformEvent::Removed { key } => self.on_removed(&key).await,
        }
    }

    /// 通知发布或更新
    pub async fn on_posted(&self, event: NotificationEvent) -> PassOutcome {
        // 配置在处理开始时读取一次
        let config = self.config.snapshot();

        if config.is_ignored(&event.source_id) {
            return PassOutcome::Ignored;
        }
        if !config.is_source_allowed(&event.source_id) {
            debug!(source = %event.source_id, "Source not in allow-list");
            return PassOutcome::NotAllowed;
        }

        let _guard = self.locks.lock(&event.key).await;
        self.process_posted(&event, &config)
    }

    /// 通知被移除（幂等）
    pub async fn on_removed(&self, key: &str) -> PassOutcome {
        let _guard = self.locks.lock(key).await;
        let mut table = self.table();

        let Some(slot) = table.remove(key) else {
            return PassOutcome::Absent;
        };

        if let Err(e) = self.sink.retract(slot.slot_id) {
            warn!(key = %key, slot_id = slot.slot_id, error = %e, "Retract failed");
        }
        info!(key = %key, slot_id = slot.slot_id, source = %slot.source_id, "Island retracted");
        PassOutcome::Retracted { slot_id: slot.slot_id }
    }

    /// 当前活跃槽位的一致性快照
    pub fn active_slots(&self) -> Vec<ActiveSlot> {
        self.table().snapshot()
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    fn table(&self) -> MutexGuard<'_, SlotTable> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 持有键锁时执行的主体
    fn process_posted(&self, event: &NotificationEvent, config: &BridgeConfig) -> PassOutcome {
        if is_junk(event, self.names.as_ref()) {
            debug!(key = %event.key, source = %event.source_id, "Dropped junk notification");
            return PassOutcome::Junk;
        }

        let kind = classify(event);
        if !config.is_type_enabled(&event.source_id, kind) {
            debug!(key = %event.key, kind = %kind, "Type disabled for source");
            return PassOutcome::TypeDisabled;
        }

        let now = self.clock.now_millis();
        let existing = self.table().get(&event.key).cloned();
        if !self.throttle.should_accept(event, existing.as_ref(), now) {
            return PassOutcome::Throttled;
        }

        let slot_id = existing
            .as_ref()
            .map_or_else(|| slot_id_for(&event.key), |slot| slot.slot_id);
        let ctx = TranslateContext {
            event,
            slot_id,
            options: config.display_options(&event.source_id),
            config,
            kit: ResourceKit::new(self.icons.as_ref()),
            now_millis: now,
        };

        let translate = self
            .translators
            .get(&kind)
            .copied()
            .unwrap_or_else(|| translator_for(kind));
        let payload = match translate(&ctx) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %event.key, kind = %kind, error = %e, "Translation failed, event dropped");
                return PassOutcome::Failed;
            }
        };

        let update = SlotUpdate {
            key: event.key.clone(),
            kind,
            source_id: event.source_id.clone(),
            title: event.title_str().to_string(),
            text: event.text_str().to_string(),
            sub_text: event.sub_text_str().to_string(),
            content_hash: payload.content_hash(),
            now,
        };

        let mut table = self.table();
        let previous = table.get(&event.key).cloned();

        let (slot_id, created) = match table.commit(update, config.eviction_policy, &config.priority_list) {
            CommitOutcome::Unchanged { slot_id } => {
                debug!(key = %event.key, slot_id, "Payload unchanged, render skipped");
                return PassOutcome::Unchanged;
            }
            CommitOutcome::Rejected => return PassOutcome::Rejected,
            CommitOutcome::Updated { slot_id } => (slot_id, false),
            CommitOutcome::Created { slot_id, evicted } => {
                if let Some(victim) = evicted {
                    if let Err(e) = self.sink.retract(victim.slot_id) {
                        warn!(key = %victim.key, slot_id = victim.slot_id, error = %e, "Retract of evicted island failed");
                    }
                }
                (slot_id, true)
            }
        };

        if let Err(e) = self.sink.emit(slot_id, &payload) {
            warn!(key = %event.key, slot_id, error = %e, "Emit failed, slot rolled back");
            table.rollback(&event.key, previous);
            return PassOutcome::Failed;
        }

        if created {
            info!(key = %event.key, slot_id, kind = %kind, source = %event.source_id, "Island created");
        } else {
            debug!(key = %event.key, slot_id, "Island updated");
        }
        PassOutcome::Emitted { slot_id, created }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notification::NotificationEventBuilder;
    use crate::translator::DisplayPayload;

    fn bridge(sink: Arc<dyn IslandSink>, clock: Arc<ManualClock>) -> IslandBridge {
        IslandBridge::builder()
            .config(ConfigStore::fixed(BridgeConfig::default().allow("com.chat")))
            .sink(sink)
            .clock(clock)
            .build()
            .unwrap()
    }

    fn message(key: &str, text: &str) -> NotificationEvent {
        NotificationEventBuilder::new()
            .key(key)
            .source_id("com.chat")
            .title("Alice")
            .text(text)
            .build()
            .unwrap()
    }

    /// emit 总是失败的输出端
    struct BrokenSink;

    impl IslandSink for BrokenSink {
        fn name(&self) -> &str {
            "broken"
        }

        fn emit(&self, _slot_id: i32, _payload: &DisplayPayload) -> Result<()> {
            Err(anyhow!("surface unavailable"))
        }

        fn retract(&self, _slot_id: i32) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_requires_sink() {
        assert!(IslandBridge::builder().build().is_err());
    }

    #[tokio::test]
    async fn test_post_update_remove() {
        let sink = Arc::new(MemorySink::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let bridge = bridge(sink.clone(), clock.clone());

        let outcome = bridge.on_posted(message("k", "hi")).await;
        let slot_id = slot_id_for("k");
        assert_eq!(outcome, PassOutcome::Emitted { slot_id, created: true });

        clock.advance(10);
        let outcome = bridge.on_posted(message("k", "hi again")).await;
        assert_eq!(outcome, PassOutcome::Emitted { slot_id, created: false });

        assert_eq!(bridge.on_removed("k").await, PassOutcome::Retracted { slot_id });
        assert_eq!(bridge.on_removed("k").await, PassOutcome::Absent);
        assert!(bridge.active_slots().is_empty());
        assert_eq!(sink.emit_count(), 2);
    }

    #[tokio::test]
    async fn test_filters() {
        let sink = Arc::new(MemorySink::new());
        let bridge = bridge(sink.clone(), Arc::new(ManualClock::new(0)));

        let mut other = message("k", "hi");
        other.source_id = "com.other".to_string();
        assert_eq!(bridge.on_posted(other).await, PassOutcome::NotAllowed);

        let mut system = message("k", "hi");
        system.source_id = "android".to_string();
        assert_eq!(bridge.on_posted(system).await, PassOutcome::Ignored);

        let empty = NotificationEvent::new("k", "com.chat");
        assert_eq!(bridge.on_posted(empty).await, PassOutcome::Junk);

        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_emit_failure_keeps_table_clean() {
        let bridge = bridge(Arc::new(BrokenSink), Arc::new(ManualClock::new(0)));
        assert_eq!(bridge.on_posted(message("k", "hi")).await, PassOutcome::Failed);
        assert!(bridge.active_slots().is_empty());
    }

    #[test]
    fn test_capacity_is_clamped() {
        let build = |capacity| {
            IslandBridge::builder()
                .sink(Arc::new(MemorySink::new()))
                .capacity(capacity)
                .build()
                .unwrap()
        };
        assert_eq!(build(50).table().capacity(), MAX_SLOTS);
        assert_eq!(build(0).table().capacity(), 1);
        assert_eq!(build(4).table().capacity(), 4);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(PassOutcome::Emitted { slot_id: 1, created: true }.to_string(), "created");
        assert_eq!(PassOutcome::Emitted { slot_id: 1, created: false }.as_str(), "updated");
        assert!(PassOutcome::Retracted { slot_id: 1 }.reached_sink());
        assert!(!PassOutcome::Throttled.reached_sink());
    }
}
