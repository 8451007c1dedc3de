use crate::Error;
use crate::eventbus::BotEvent;
use super::NativeContext;

/// `!so @name`
pub async fn handle_shoutout(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let target = ctx.command.message.replace('@', "");
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::Parse("nobody to shout out".into()));
    }
    let streamer = ctx.dispatch.resolver.resolve_viewer(target).await?;
    ctx.publish(BotEvent::Shoutout {
        display_name: streamer.display_name,
        description: streamer.description,
        profile_image_url: streamer.profile_image_url,
    })
    .await;
    Ok(())
}
