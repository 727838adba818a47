//! 事件文件读取 - 每行一个 `PlatformEvent`（JSONL）

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::notification::PlatformEvent;

/// 读取事件文件，跳过空行和 `#` 开头的注释行
pub fn read_events(path: &Path) -> Result<Vec<PlatformEvent>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut events = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: PlatformEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("{}:{}: invalid event", path.display(), index + 1))?;
        events.push(event);
    }

    debug!(path = %path.display(), count = events.len(), "Loaded events");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_events() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# sample").unwrap();
        writeln!(file, r#"{{"event":"posted","key":"k","source_id":"com.chat","title":"Hi"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"event":"removed","key":"k"}}"#).unwrap();

        let events = read_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], PlatformEvent::Posted(e) if e.title_str() == "Hi"));
        assert_eq!(events[1].key(), "k");
    }

    #[test]
    fn test_bad_line_reports_position() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"event":"removed","key":"k"}}"#).unwrap();
        writeln!(file, "oops").unwrap();

        let err = read_events(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(":2: invalid event"));
    }
}
