//! 按通知键的互斥锁
//!
//! 同一键的处理串行执行，不同键互不阻塞。没有持有者也没有等待者的条目
//! 会在释放时从表中移除。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Entry = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub struct KeyLocks {
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取某个键的锁（异步等待）
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(key.to_string()).or_default().clone()
        };
        let guard = entry.lock_owned().await;
        KeyGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// 当前表中的键数量
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 键锁守卫，drop 时释放
#[derive(Debug)]
pub struct KeyGuard<'a> {
    owner: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.owner.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // 只剩表自身的引用时清理
        if entries
            .get(&self.key)
            .map_or(false, |entry| Arc::strong_count(entry) == 1)
        {
            entries.remove(&self.key);
        }
    }
}
