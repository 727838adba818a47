//! 槽位管理 - 有界的活跃岛屿表
//!
//! 每个通知键的生命周期只有 `absent → active → absent` 两个状态，
//! 更新在原地修改。表的大小永远不超过容量（默认 [`MAX_SLOTS`]）。
//! 只有本模块修改槽位表；内容哈希只在真正发出 payload 时写入。

pub mod eviction;

pub use eviction::{choose_victim, priority_rank, EvictionPolicy, UNLISTED_RANK};

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::notification::NotificationType;

/// 同时显示的岛屿上限
pub const MAX_SLOTS: usize = 9;

/// 由通知键派生稳定的数字 id（与 JVM `String.hashCode` 一致）
pub fn slot_id_for(key: &str) -> i32 {
    key.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// 活跃槽位
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSlot {
    pub key: String,
    pub slot_id: i32,
    pub kind: NotificationType,
    pub source_id: String,
    pub title: String,
    pub text: String,
    pub sub_text: String,
    /// 槽位创建时间（用于 MOST_RECENT 淘汰）
    pub post_time: i64,
    /// 上次发出时间（用于限流）
    pub last_update_time: i64,
    /// 上次发出的 payload 哈希（用于去重）
    pub last_content_hash: u64,
}

/// 准入结果
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// 允许进入，可能附带一个被淘汰的槽位
    Admitted { evicted: Option<ActiveSlot> },
    /// 容量不足且策略不腾位置
    Rejected,
}

/// 一次已翻译渲染的提交内容
#[derive(Debug, Clone)]
pub struct SlotUpdate {
    pub key: String,
    pub kind: NotificationType,
    pub source_id: String,
    pub title: String,
    pub text: String,
    pub sub_text: String,
    pub content_hash: u64,
    pub now: i64,
}

/// 提交结果
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// 新建槽位
    Created {
        slot_id: i32,
        evicted: Option<ActiveSlot>,
    },
    /// 原地更新
    Updated { slot_id: i32 },
    /// 内容哈希未变，不需要重新渲染
    Unchanged { slot_id: i32 },
    /// 容量不足，丢弃
    Rejected,
}

/// 槽位表
#[derive(Debug)]
pub struct SlotTable {
    slots: HashMap<String, ActiveSlot>,
    capacity: usize,
}

impl SlotTable {
    /// 创建默认容量的槽位表
    pub fn new() -> Self {
        Self::with_capacity(MAX_SLOTS)
    }

    /// 创建指定容量的槽位表
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn get(&self, key: &str) -> Option<&ActiveSlot> {
        self.slots.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// 一致性快照（按创建时间排序）
    pub fn snapshot(&self) -> Vec<ActiveSlot> {
        let mut slots: Vec<ActiveSlot> = self.slots.values().cloned().collect();
        slots.sort_by(|a, b| a.post_time.cmp(&b.post_time).then_with(|| a.key.cmp(&b.key)));
        slots
    }

    /// 准入检查：已存在的键直接通过；满员时按策略淘汰
    pub fn admit(
        &mut self,
        key: &str,
        source_id: &str,
        policy: EvictionPolicy,
        priority_list: &[String],
    ) -> Admission {
        if self.slots.contains_key(key) || !self.is_full() {
            return Admission::Admitted { evicted: None };
        }

        let evicted = choose_victim(policy, self.slots.values(), source_id, priority_list)
            .and_then(|victim| self.slots.remove(&victim));

        if let Some(slot) = &evicted {
            info!(
                policy = %policy,
                evicted_key = %slot.key,
                evicted_source = %slot.source_id,
                incoming = %key,
                "Evicted island to make room"
            );
        }

        // 策略没有腾出位置
        if self.is_full() {
            debug!(policy = %policy, key = %key, "Slot table full, incoming rejected");
            return Admission::Rejected;
        }

        Admission::Admitted { evicted }
    }

    /// 提交一次渲染：去重、准入、写入
    pub fn commit(
        &mut self,
        update: SlotUpdate,
        policy: EvictionPolicy,
        priority_list: &[String],
    ) -> CommitOutcome {
        if let Some(slot) = self.slots.get_mut(&update.key) {
            if slot.last_content_hash == update.content_hash {
                return CommitOutcome::Unchanged {
                    slot_id: slot.slot_id,
                };
            }
            slot.kind = update.kind;
            slot.title = update.title;
            slot.text = update.text;
            slot.sub_text = update.sub_text;
            slot.last_update_time = update.now;
            slot.last_content_hash = update.content_hash;
            return CommitOutcome::Updated {
                slot_id: slot.slot_id,
            };
        }

        let evicted = match self.admit(&update.key, &update.source_id, policy, priority_list) {
            Admission::Admitted { evicted } => evicted,
            Admission::Rejected => return CommitOutcome::Rejected,
        };

        let slot_id = slot_id_for(&update.key);
        self.slots.insert(
            update.key.clone(),
            ActiveSlot {
                key: update.key,
                slot_id,
                kind: update.kind,
                source_id: update.source_id,
                title: update.title,
                text: update.text,
                sub_text: update.sub_text,
                post_time: update.now,
                last_update_time: update.now,
                last_content_hash: update.content_hash,
            },
        );

        CommitOutcome::Created { slot_id, evicted }
    }

    /// 移除槽位（幂等）
    pub fn remove(&mut self, key: &str) -> Option<ActiveSlot> {
        self.slots.remove(key)
    }

    /// 撤销一次提交：恢复为提交前的槽位，原来不存在则移除
    pub fn rollback(&mut self, key: &str, previous: Option<ActiveSlot>) {
        match previous {
            Some(slot) => {
                self.slots.insert(key.to_string(), slot);
            }
            None => {
                self.slots.remove(key);
            }
        }
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}
