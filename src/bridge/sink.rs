//! 岛屿输出端 trait 定义

use anyhow::Result;
use std::io::Write;
use std::sync::Mutex;

use crate::translator::DisplayPayload;

/// 下游渲染面
///
/// `emit`/`retract` 在槽位表锁内调用：实现应尽快返回，耗时的工作交给
/// 自己的队列；不得在回调中再调用 [`crate::IslandBridge`] 的方法
/// （例如 `active_slots`），否则会死锁。
pub trait IslandSink: Send + Sync {
    /// 输出端名称
    fn name(&self) -> &str;

    /// 显示或更新某个槽位
    fn emit(&self, slot_id: i32, payload: &DisplayPayload) -> Result<()>;

    /// 撤下某个槽位
    fn retract(&self, slot_id: i32) -> Result<()>;
}

/// 输出端收到的调用
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Emit { slot_id: i32, content_hash: u64, ticker: String },
    Retract { slot_id: i32 },
}

/// 记录所有调用的内存输出端
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<SinkCall>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 到目前为止的调用记录
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn emit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SinkCall::Emit { .. }))
            .count()
    }

    fn record(&self, call: SinkCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl IslandSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&self, slot_id: i32, payload: &DisplayPayload) -> Result<()> {
        self.record(SinkCall::Emit {
            slot_id,
            content_hash: payload.content_hash(),
            ticker: payload.param.ticker.clone(),
        });
        Ok(())
    }

    fn retract(&self, slot_id: i32) -> Result<()> {
        self.record(SinkCall::Retract { slot_id });
        Ok(())
    }
}

/// 把每次调用写成一行 JSON 的输出端
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn write_line(&self, line: serde_json::Value) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("sink writer poisoned"))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> IslandSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn emit(&self, slot_id: i32, payload: &DisplayPayload) -> Result<()> {
        self.write_line(serde_json::json!({
            "op": "emit",
            "slot_id": slot_id,
            "param": payload.param,
            "resources": payload.resource_keys().collect::<Vec<_>>(),
        }))
    }

    fn retract(&self, slot_id: i32) -> Result<()> {
        self.write_line(serde_json::json!({
            "op": "retract",
            "slot_id": slot_id,
        }))
    }
}
