//! Output formatting for CLI commands

use serde::Serialize;

use crate::slots::ActiveSlot;

/// Format output as pretty JSON or compact JSON based on --json flag
pub fn format_output<T: Serialize>(data: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    rendered.unwrap_or_else(|_| "{}".to_string())
}

/// Render active slots as a table
pub fn format_slots(slots: &[ActiveSlot]) -> String {
    if slots.is_empty() {
        return "No active islands".to_string();
    }

    let mut out = format!("Active islands: {}\n", slots.len());
    out.push_str(&format!("{:<12} {:<11} {:<28} {}\n", "SLOT", "TYPE", "SOURCE", "TITLE"));
    for slot in slots {
        out.push_str(&format!(
            "{:<12} {:<11} {:<28} {}\n",
            slot.slot_id,
            slot.kind.as_str(),
            slot.source_id,
            slot.title
        ));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationType;

    #[test]
    fn test_format_slots() {
        assert_eq!(format_slots(&[]), "No active islands");

        let slot = ActiveSlot {
            key: "k".into(),
            slot_id: 107,
            kind: NotificationType::Call,
            source_id: "com.dialer".into(),
            title: "Bob".into(),
            text: String::new(),
            sub_text: String::new(),
            post_time: 0,
            last_update_time: 0,
            last_content_hash: 0,
        };
        let table = format_slots(&[slot]);
        assert!(table.starts_with("Active islands: 1"));
        assert!(table.contains("com.dialer"));
        assert!(table.contains("Bob"));
    }

    #[test]
    fn test_format_output_compact() {
        assert_eq!(format_output(&vec![1, 2], false), "[1,2]");
    }
}
