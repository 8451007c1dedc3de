// File: celeste-core/src/services/commands/dispatcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use celeste_common::models::{ChatEvent, Command, CommandInvocation, CommandType, NativeCommandFlag, Viewer};
use celeste_common::traits::{FileLister, PlatformApi, VibeKeeper, ViewerResolver};

use crate::Error;
use crate::eventbus::{BotEvent, EventBus};
use crate::services::commands::builtin::{handle_native, NativeContext};
use crate::services::commands::registry::CommandRegistry;
use crate::services::media::random_file;
use crate::settings::BotSettings;

pub const VIDEO_EXTENSION: &str = "mp4";

/// Everything a dispatched command may touch. Cheap to clone; spawned
/// handlers carry their own copy.
#[derive(Clone)]
pub struct DispatchContext {
    pub registry: Arc<RwLock<CommandRegistry>>,
    pub event_bus: Arc<EventBus>,
    pub resolver: Arc<dyn ViewerResolver>,
    pub platform: Arc<dyn PlatformApi>,
    pub files: Arc<dyn FileLister>,
    pub vibe: Arc<dyn VibeKeeper>,
    pub settings: Arc<BotSettings>,
}

/// What became of a command invocation.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// No command by that name; the line is ordinary chat.
    NotFound,
    /// Protected command from an unprivileged viewer.
    Denied,
    /// The command runs on this task once the invoker is resolved.
    Accepted(JoinHandle<()>),
}

impl DispatchOutcome {
    /// Whether the line was consumed as a command.
    pub fn is_handled(&self) -> bool {
        !matches!(self, DispatchOutcome::NotFound)
    }
}

pub struct CommandDispatcher {
    ctx: DispatchContext,
}

impl CommandDispatcher {
    pub fn new(ctx: DispatchContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &DispatchContext {
        &self.ctx
    }

    pub fn registry(&self) -> &Arc<RwLock<CommandRegistry>> {
        &self.ctx.registry
    }

    pub async fn dispatch(&self, invocation: &CommandInvocation, chat: &ChatEvent) -> DispatchOutcome {
        let (command, flag) = {
            let registry = self.ctx.registry.read();
            let Some(found) = registry.lookup(&invocation.name) else {
                debug!("'!{}' is not a command", invocation.name);
                return DispatchOutcome::NotFound;
            };
            let command = if invocation.arguments.is_empty() {
                found.clone()
            } else {
                found.with_message(&invocation.arguments)
            };
            (command, registry.native_flag(&invocation.name))
        };

        if command.protected && !invocation.privilege.is_privileged() {
            let video = self.denial_video();
            info!(
                "The command \"!{}\" is protected but requester '{}' is not authorized",
                command.name, invocation.login
            );
            self.ctx
                .event_bus
                .publish(BotEvent::CommandDenied {
                    command: command.name.clone(),
                    video,
                })
                .await;
            return DispatchOutcome::Denied;
        }

        let ctx = self.ctx.clone();
        let invocation = invocation.clone();
        let chat = chat.clone();
        DispatchOutcome::Accepted(tokio::spawn(async move {
            let viewer = match ctx.resolver.resolve_viewer(&invocation.login).await {
                Ok(viewer) => viewer,
                Err(e) => {
                    warn!("Could not resolve '{}' for '!{}': {}", invocation.login, command.name, e);
                    return;
                }
            };
            if let Err(e) = execute(&ctx, &command, flag, &viewer, &invocation, &chat).await {
                warn!("Command '!{}' failed: {}", command.name, e);
            }
        }))
    }

    fn denial_video(&self) -> Option<PathBuf> {
        let directory = &self.ctx.settings.denied_command_video;
        if directory.is_empty() {
            return None;
        }
        random_file(self.ctx.files.as_ref(), Path::new(directory), None)
    }
}

async fn execute(
    ctx: &DispatchContext,
    command: &Command,
    flag: Option<NativeCommandFlag>,
    viewer: &Viewer,
    invocation: &CommandInvocation,
    chat: &ChatEvent,
) -> Result<(), Error> {
    match command.command_type {
        CommandType::Video => {
            let video = if command.random {
                random_file(ctx.files.as_ref(), Path::new(&command.path), Some(VIDEO_EXTENSION))
                    .ok_or_else(|| Error::NotFound(format!("No videos found in {}", command.path)))?
            } else {
                PathBuf::from(&command.path)
            };
            ctx.event_bus.publish(BotEvent::PlayVideo(video)).await;
        }
        CommandType::Audio => {
            ctx.event_bus
                .publish(BotEvent::PlayAudio {
                    viewer: viewer.display_name.clone(),
                    message: command.message.clone(),
                    path: command.path.clone(),
                })
                .await;
        }
        CommandType::Pulse => {
            ctx.event_bus.publish(BotEvent::Pulse(command.message.clone())).await;
        }
        CommandType::Native => {
            let flag = flag.ok_or_else(|| Error::NotFound(format!("native routine for '{}'", command.name)))?;
            let native = NativeContext {
                dispatch: ctx,
                command,
                viewer,
                invocation,
                chat,
            };
            handle_native(flag, &native).await?;
        }
    }
    Ok(())
}
