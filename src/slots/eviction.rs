//! 淘汰策略 - 槽位满时决定牺牲哪个岛屿

use serde::{Deserialize, Serialize};

use super::ActiveSlot;

/// 未在优先级列表中的来源的排名（最低优先级）
pub const UNLISTED_RANK: usize = 9999;

/// 槽位淘汰策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvictionPolicy {
    /// 先到先得：满了就拒绝新来的
    FirstCome,
    /// 最近优先：淘汰最早创建的槽位
    #[default]
    MostRecent,
    /// 按来源优先级：仅当新来源严格更高优先级时淘汰最低者
    Priority,
}

impl EvictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::FirstCome => "FIRST_COME",
            EvictionPolicy::MostRecent => "MOST_RECENT",
            EvictionPolicy::Priority => "PRIORITY",
        }
    }
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 来源在优先级列表中的排名，越小越优先
pub fn priority_rank(priority_list: &[String], source_id: &str) -> usize {
    priority_list
        .iter()
        .position(|s| s == source_id)
        .unwrap_or(UNLISTED_RANK)
}

/// 选出需要淘汰的槽位键；`None` 表示不腾位置
pub fn choose_victim<'a, I>(
    policy: EvictionPolicy,
    slots: I,
    incoming_source: &str,
    priority_list: &[String],
) -> Option<String>
where
    I: IntoIterator<Item = &'a ActiveSlot>,
{
    match policy {
        EvictionPolicy::FirstCome => None,
        EvictionPolicy::MostRecent => slots
            .into_iter()
            .min_by(|a, b| a.post_time.cmp(&b.post_time).then_with(|| a.key.cmp(&b.key)))
            .map(|slot| slot.key.clone()),
        EvictionPolicy::Priority => {
            let incoming_rank = priority_rank(priority_list, incoming_source);
            // 排名最大（优先级最低）者；同排名时淘汰最早的
            let lowest = slots.into_iter().max_by(|a, b| {
                priority_rank(priority_list, &a.source_id)
                    .cmp(&priority_rank(priority_list, &b.source_id))
                    .then_with(|| b.post_time.cmp(&a.post_time))
                    .then_with(|| b.key.cmp(&a.key))
            })?;
            let lowest_rank = priority_rank(priority_list, &lowest.source_id);
            if incoming_rank < lowest_rank {
                Some(lowest.key.clone())
            } else {
                None
            }
        }
    }
}
