//! 进度通知
//!
//! 完成判定：百分比 ≥ 100，或正文包含任一完成关键词（不区分大小写）。
//! 先看百分比，再看关键词。

use anyhow::Result;

use super::payload::{ChatInfo, DisplayPayload, ImageTextInfo};
use super::resources::{tinted_checkmark, transparent_pixel, HIDDEN_PIXEL_KEY};
use super::{msg, TranslateContext};

/// 完成时的勾号颜色
pub const FINISHED_COLOR: &str = "#34C759";
/// 进度条颜色
pub const PROGRESS_COLOR: &str = "#007AFF";

/// `floor(current / max * 100)`，`max <= 0` 时为 0
pub fn progress_percent(current: i32, max: i32) -> i64 {
    if max <= 0 {
        return 0;
    }
    (current as i64 * 100).div_euclid(max as i64)
}

pub fn is_finished(percent: i64, text: &str, keywords: &[String]) -> bool {
    if percent >= 100 {
        return true;
    }
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| text.contains(&k.to_lowercase()))
}

pub fn translate(ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    let event = ctx.event;
    let title = ctx.display_title();
    let text = event.text_str().trim();
    let percent = progress_percent(event.progress_current, event.progress_max);
    let finished = is_finished(percent, text, &ctx.config.finish_keywords);
    let shown = percent.clamp(0, 100) as u8;

    let pic_key = ctx.pic_key();
    let tick_key = format!("{}_tick", pic_key);
    let (actions, action_keys) = ctx.actions();

    let content = if finished { msg::DOWNLOAD_COMPLETE } else { text };

    let builder = ctx
        .builder(&title)
        .picture(&pic_key, ctx.kit.resolve_icon(event))
        .picture(HIDDEN_PIXEL_KEY, transparent_pixel())
        .chat_info(ChatInfo {
            title: title.clone(),
            content: Some(content.to_string()),
            pic_key: pic_key.clone(),
            action_keys,
            timer: None,
        })
        .actions(actions);

    let builder = if finished {
        builder
            .picture(&tick_key, tinted_checkmark(FINISHED_COLOR)?)
            .big_island(
                Some(ImageTextInfo::with_icon(HIDDEN_PIXEL_KEY, "", None)),
                Some(ImageTextInfo::with_icon(&tick_key, msg::FINISHED, Some(title.clone()))),
            )
            .small_island_icon(&tick_key)
    } else if event.progress_indeterminate {
        builder
            .big_island(
                Some(ImageTextInfo::with_icon(&pic_key, "", None)),
                Some(ImageTextInfo::with_icon(HIDDEN_PIXEL_KEY, &title, None)),
            )
            .small_island_icon(&pic_key)
    } else {
        builder
            .progress_bar(shown, PROGRESS_COLOR, Some(pic_key.clone()))
            .big_island(
                Some(ImageTextInfo::with_icon(&pic_key, "", None)),
                Some(ImageTextInfo::with_icon(HIDDEN_PIXEL_KEY, &title, Some(format!("{}%", shown)))),
            )
            .big_island_progress(&pic_key, shown, PROGRESS_COLOR)
            .small_island_progress(&pic_key, shown, PROGRESS_COLOR)
    };

    builder.build()
}
