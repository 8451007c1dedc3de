use chrono::Duration;

use crate::Error;
use crate::eventbus::BotEvent;
use crate::utils::time::{elapsed_since, hours_minutes_seconds};
use super::NativeContext;

/// `!uptime`, or `!totaltime` when `total` is set, which adds the minutes
/// streamed before the bot kept count.
pub async fn handle_uptime(ctx: &NativeContext<'_>, total: bool) -> Result<(), Error> {
    let settings = &ctx.dispatch.settings;
    let started_at = ctx
        .dispatch
        .platform
        .stream_started_at(&settings.broadcaster)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} is not live", settings.broadcaster)))?;

    let mut duration = elapsed_since(started_at);
    if total {
        duration += Duration::minutes(settings.uptime_history_minutes);
    }
    let (hours, minutes, seconds) = hours_minutes_seconds(duration);
    ctx.publish(BotEvent::Uptime {
        hours,
        minutes,
        seconds,
        total,
    })
    .await;
    Ok(())
}
