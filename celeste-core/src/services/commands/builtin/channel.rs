use tracing::info;

use crate::Error;
use crate::eventbus::BotEvent;
use super::NativeContext;

/// `!category <name>`
pub async fn handle_category(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let name = ctx.command.message.trim();
    if name.is_empty() {
        return Err(Error::Parse("a category name is required".into()));
    }
    let platform = &ctx.dispatch.platform;
    let category_id = platform
        .find_category(name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category '{name}'")))?;
    platform
        .set_category(&ctx.dispatch.settings.broadcaster_id, &category_id)
        .await?;
    ctx.publish(BotEvent::SystemMessage(format!("Stream category changed to \"{name}\""))).await;
    Ok(())
}

/// `!title <text>`
pub async fn handle_title(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let title = ctx.command.message.trim();
    if title.is_empty() {
        return Err(Error::Parse("a title is required".into()));
    }
    ctx.dispatch
        .platform
        .set_title(&ctx.dispatch.settings.broadcaster_id, title)
        .await?;
    ctx.publish(BotEvent::SystemMessage(format!("Stream title changed to \"{title}\""))).await;
    Ok(())
}

/// `!emote` flips emote-only mode.
pub async fn handle_emote_only(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let broadcaster_id = &ctx.dispatch.settings.broadcaster_id;
    let enabled = ctx.dispatch.platform.emote_mode(broadcaster_id).await?;
    ctx.dispatch.platform.set_emote_mode(broadcaster_id, !enabled).await?;
    info!("Emote only mode toggled by {}", ctx.viewer.display_name);
    Ok(())
}
