use chrono::{DateTime, Local};

use crate::Error;
use crate::eventbus::{BotEvent, EventBus};
use crate::settings::BotSettings;
use super::NativeContext;

pub const PANIC_NAME_PLACEHOLDER: &str = "%1";
const PANIC_DATE_FORMAT: &str = "%a %-d %H:%M:%S";

/// Fills in `template` and stamps every line with `now`.
pub fn render_panic(template: &str, display_name: &str, now: DateTime<Local>) -> String {
    let date = now.format(PANIC_DATE_FORMAT).to_string();
    let text = template.replace(PANIC_NAME_PLACEHOLDER, display_name);
    let stamped = text
        .split('\n')
        .collect::<Vec<_>>()
        .join(&format!("\n{date} "));
    format!("{date}\n{stamped}")
}

pub async fn handle_panic(ctx: &NativeContext<'_>) -> Result<(), Error> {
    dispatch_panic(&ctx.dispatch.settings, &ctx.dispatch.event_bus, &ctx.viewer.display_name).await
}

/// Renders `panic.txt` for `display_name` and publishes it.
pub async fn dispatch_panic(settings: &BotSettings, event_bus: &EventBus, display_name: &str) -> Result<(), Error> {
    let template = tokio::fs::read_to_string(settings.panic_path()).await?;
    let text = render_panic(&template, display_name, Local::now());
    event_bus.publish(BotEvent::Panic(text)).await;
    Ok(())
}
