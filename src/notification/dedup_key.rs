//! Content hash for render deduplication
//!
//! Generates a deterministic hash of a translated island description by:
//! 1. Dropping volatile clock fields (timer "current time" and offset)
//! 2. Serializing the remaining JSON (object keys are sorted)
//! 3. Hashing the canonical string
//!
//! Two renders that only differ in a ticking clock hash the same, so the
//! slot table treats them as unchanged.

use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fields that change on every render without changing what is shown
pub const VOLATILE_FIELDS: &[&str] = &["systemCurrent", "offset"];

/// Hash a structured island description
pub fn content_hash(description: &Value) -> u64 {
    let normalized = strip_volatile(description);
    hash_content(&normalized.to_string())
}

/// Remove volatile fields at any depth
pub fn strip_volatile(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !VOLATILE_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), strip_volatile(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_volatile).collect()),
        other => other.clone(),
    }
}

fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
