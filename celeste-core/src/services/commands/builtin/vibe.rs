use std::time::Duration;
use tracing::info;

use crate::Error;
use super::NativeContext;

pub fn handle_vibe_toggle(ctx: &NativeContext<'_>) {
    let vibe = &ctx.dispatch.vibe;
    if vibe.is_playing() {
        info!("Pausing the vibes...");
        vibe.stop();
    } else {
        vibe.start();
    }
}

/// Parses `<target volume> <seconds>`.
pub fn parse_volume_arguments(arguments: &str) -> Result<(u32, Duration), Error> {
    let mut parts = arguments.split_whitespace();
    let target = parts
        .next()
        .ok_or_else(|| Error::Parse("Target volume is missing".into()))?
        .parse::<u32>()
        .map_err(|e| Error::Parse(format!("Target volume: {e}")))?;
    let seconds = parts
        .next()
        .ok_or_else(|| Error::Parse("Duration for volume change is missing".into()))?
        .parse::<u64>()
        .map_err(|e| Error::Parse(format!("Duration for volume change: {e}")))?;
    Ok((target, Duration::from_secs(seconds)))
}

pub fn handle_volume(ctx: &NativeContext<'_>) -> Result<(), Error> {
    let (target, over) = parse_volume_arguments(&ctx.command.message)
        .map_err(|e| Error::Parse(format!("Failed to adjust volume: {e}")))?;
    ctx.dispatch.vibe.set_volume(target, over);
    Ok(())
}
