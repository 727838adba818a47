//! 普通 / 媒体通知

use anyhow::Result;

use super::payload::{DisplayPayload, ImageTextInfo};
use super::resources::{transparent_pixel, HIDDEN_PIXEL_KEY};
use super::{join_non_empty, msg, TranslateContext};
use crate::notification::sanity::MEDIA_TEMPLATE_TOKEN;

pub fn translate(ctx: &TranslateContext<'_>) -> Result<DisplayPayload> {
    let event = ctx.event;
    let title = ctx.display_title();
    let is_media = event.template_str().contains(MEDIA_TEMPLATE_TOKEN);

    let content = if is_media {
        msg::NOW_PLAYING.to_string()
    } else {
        join_non_empty(event.text_str().trim(), event.sub_text_str().trim())
    };

    let pic_key = ctx.pic_key();
    let (actions, action_keys) = ctx.actions();

    let builder = ctx
        .builder(&title)
        .picture(&pic_key, ctx.kit.resolve_icon(event))
        .base_info(&title, &content, &pic_key, action_keys)
        .small_island_icon(&pic_key)
        .actions(actions);

    let builder = if is_media {
        // 媒体只显示大图封面
        builder.big_island(Some(ImageTextInfo::with_icon(&pic_key, "", None)), None)
    } else {
        builder.picture(HIDDEN_PIXEL_KEY, transparent_pixel()).big_island(
            Some(ImageTextInfo::with_icon(&pic_key, "", None)),
            Some(ImageTextInfo::with_icon(HIDDEN_PIXEL_KEY, &title, Some(content.clone()))),
        )
    };

    builder.build()
}
