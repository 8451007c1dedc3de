use tracing::info;

use crate::Error;
use crate::eventbus::BotEvent;
use crate::utils::time::{elapsed_since, years_months_days};
use super::NativeContext;

/// The `!followage` command: how long the invoker has followed the channel.
pub async fn handle_followage(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let viewer = ctx.viewer;
    info!("Handling followage for '{}' (id={})", viewer.login, viewer.id);

    let followed_at = ctx
        .dispatch
        .platform
        .follow_date(&viewer.id, &ctx.dispatch.settings.broadcaster_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} does not follow the channel", viewer.display_name)))?;

    let (years, months, days) = years_months_days(elapsed_since(followed_at));
    ctx.publish(BotEvent::FollowAge {
        display_name: viewer.display_name.clone(),
        years,
        months,
        days,
    })
    .await;
    Ok(())
}
