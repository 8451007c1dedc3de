// File: celeste-core/src/services/commands/builtin/mod.rs
//! Routines behind the native commands. Each family lives in its own file;
//! `handle_native` is the single entry point the dispatcher calls.

pub mod channel;
pub mod followage;
pub mod panic;
pub mod shoutout;
pub mod uptime;
pub mod vibe;

use celeste_common::models::{ChatEvent, Command, CommandInvocation, NativeCommandFlag, Viewer};

use crate::Error;
use crate::eventbus::BotEvent;
use crate::services::commands::dispatcher::DispatchContext;
use crate::utils::time::local_timezone_name;

/// Inputs of one native command run. `command.message` already holds the
/// invocation's arguments when any were given.
pub struct NativeContext<'a> {
    pub dispatch: &'a DispatchContext,
    pub command: &'a Command,
    /// The resolved invoker.
    pub viewer: &'a Viewer,
    pub invocation: &'a CommandInvocation,
    pub chat: &'a ChatEvent,
}

impl NativeContext<'_> {
    pub async fn publish(&self, event: BotEvent) {
        self.dispatch.event_bus.publish(event).await;
    }
}

pub async fn handle_native(flag: NativeCommandFlag, ctx: &NativeContext<'_>) -> Result<(), Error> {
    match flag {
        NativeCommandFlag::Agenda => {
            ctx.publish(BotEvent::SetAgenda(ctx.command.message.clone())).await;
        }
        NativeCommandFlag::Category => channel::handle_category(ctx).await?,
        NativeCommandFlag::Title => channel::handle_title(ctx).await?,
        NativeCommandFlag::EmoteOnly => channel::handle_emote_only(ctx).await?,
        NativeCommandFlag::Commands => {
            let listing = ctx.dispatch.registry.read().listing();
            ctx.publish(BotEvent::CommandList(listing)).await;
        }
        NativeCommandFlag::Followage => followage::handle_followage(ctx).await?,
        NativeCommandFlag::Html => {
            let echo = ChatEvent {
                text: ctx.invocation.arguments.clone(),
                emotes: Vec::new(),
                ..ctx.chat.clone()
            };
            ctx.publish(BotEvent::ChatMessage(echo)).await;
        }
        NativeCommandFlag::Panic => panic::handle_panic(ctx).await?,
        NativeCommandFlag::Shoutout => shoutout::handle_shoutout(ctx).await?,
        NativeCommandFlag::Song => {
            let song = ctx.dispatch.vibe.now_playing();
            ctx.publish(BotEvent::CurrentSong(song)).await;
        }
        NativeCommandFlag::Timezone => {
            ctx.publish(BotEvent::Timezone(local_timezone_name())).await;
        }
        NativeCommandFlag::TotalTime => uptime::handle_uptime(ctx, true).await?,
        NativeCommandFlag::Uptime => uptime::handle_uptime(ctx, false).await?,
        NativeCommandFlag::Vibe => vibe::handle_vibe_toggle(ctx),
        NativeCommandFlag::Volume => vibe::handle_volume(ctx)?,
    }
    Ok(())
}
