// File: celeste-core/src/services/chat/chat_service.rs

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::eventbus::{BotEvent, EventBus};
use crate::services::chat::parser::{ChatLineParser, Notification, ParsedLine};
use crate::services::commands::builtin::panic::dispatch_panic;
use crate::services::commands::{CommandDispatcher, DispatchOutcome};
use crate::services::viewer_service::ViewerService;
use crate::settings::BotSettings;
use crate::tasks::ActivityClock;

/// Reward that crashes the bot on purpose.
pub const CRASH_REWARD_TITLE: &str = "Crash Celeste";

/// What happened to one incoming line.
#[derive(Debug)]
pub enum LineOutcome {
    /// The line could not be attributed to a sender and was dropped.
    Rejected,
    Notification,
    /// A command consumed the line.
    Command(DispatchOutcome),
    /// Shown in chat. `arrival` is the greeting started for the sender, if any.
    Displayed {
        wall_of_text: bool,
        arrival: Option<JoinHandle<()>>,
    },
}

/// Routes every chat line: notifications, commands, arrivals and display.
pub struct ChatService {
    parser: ChatLineParser,
    dispatcher: Arc<CommandDispatcher>,
    viewers: Arc<ViewerService>,
    event_bus: Arc<EventBus>,
    activity: Arc<ActivityClock>,
    host_sound: String,
    text_wall_sound: String,
}

impl ChatService {
    pub fn new(
        parser: ChatLineParser,
        dispatcher: Arc<CommandDispatcher>,
        viewers: Arc<ViewerService>,
        event_bus: Arc<EventBus>,
        activity: Arc<ActivityClock>,
        settings: &BotSettings,
    ) -> Self {
        Self {
            parser,
            dispatcher,
            viewers,
            event_bus,
            activity,
            host_sound: settings.host_sound.clone(),
            text_wall_sound: settings.text_wall_sound.clone(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        &self.dispatcher
    }

    pub async fn handle_line(&self, raw: &str) -> LineOutcome {
        trace!("chat line => {}", raw);
        let pending = match self.parser.parse(raw) {
            Ok(ParsedLine::Chat(pending)) => pending,
            Ok(ParsedLine::Notification(Notification::Host { host })) => {
                debug!("{} is hosting the channel", host);
                self.event_bus
                    .publish(BotEvent::Host {
                        host,
                        sound: self.host_sound.clone(),
                    })
                    .await;
                return LineOutcome::Notification;
            }
            Err(e) => {
                warn!("Dropping chat line: {}", e);
                return LineOutcome::Rejected;
            }
        };

        let attributes = self.viewers.store().observe(&pending.login);
        if let Some(invocation) = &pending.invocation {
            if attributes.commands {
                let outcome = self.dispatcher.dispatch(invocation, &pending.event).await;
                if outcome.is_handled() {
                    return LineOutcome::Command(outcome);
                }
            } else {
                debug!("'{}' may not use commands", pending.login);
            }
        }

        let arrival = if pending.event.broadcaster {
            None
        } else {
            self.viewers.dispatch_arrival(&pending.login)
        };

        let finalized = self.parser.finalize(pending);
        if finalized.wall_of_text {
            self.event_bus
                .publish(BotEvent::TextWall {
                    message: finalized.raw_text.clone(),
                    sound: self.text_wall_sound.clone(),
                })
                .await;
        }
        self.event_bus.publish(BotEvent::ChatMessage(finalized.event)).await;
        self.activity.reset();

        LineOutcome::Displayed {
            wall_of_text: finalized.wall_of_text,
            arrival,
        }
    }
}

/// Channel events that arrive outside of chat: rewards, subs, raids, cheers
/// and requests to get the music out of the way.
impl ChatService {
    fn settings(&self) -> &BotSettings {
        &self.dispatcher.context().settings
    }

    pub async fn redemption(&self, viewer: &str, reward: &str, message: &str) {
        if reward == CRASH_REWARD_TITLE {
            if let Err(e) = dispatch_panic(self.settings(), &self.event_bus, viewer).await {
                warn!("Panic for '{}' failed: {}", viewer, e);
            }
            self.dispatcher.context().vibe.stop();
            return;
        }
        self.event_bus
            .publish(BotEvent::Redemption {
                viewer: viewer.to_string(),
                reward: reward.to_string(),
                message: message.to_string(),
            })
            .await;
    }

    pub async fn subscription(&self, viewer: &str) {
        let sound = self.settings().subscription_sound.clone();
        if sound.is_empty() {
            self.event_bus.publish_status("No audio path set for subscriptions").await;
            return;
        }
        self.event_bus
            .publish(BotEvent::Subscription {
                viewer: viewer.to_string(),
                sound,
            })
            .await;
    }

    /// Also quiets arrival announcements for the raid interrupt period.
    pub async fn raid(&self, viewer: &str, viewers: u32) {
        self.viewers.note_raid();
        debug!("{} raided with {} viewers", viewer, viewers);
        self.event_bus
            .publish(BotEvent::Raid {
                viewer: viewer.to_string(),
                viewers,
                sound: self.settings().raid_sound.clone(),
            })
            .await;
    }

    pub async fn cheer(&self, viewer: &str, count: u32, message: &str) {
        let video = self.settings().cheer_video.clone();
        if video.is_empty() {
            self.event_bus.publish_status("No video path set for cheers").await;
            return;
        }
        self.event_bus
            .publish(BotEvent::Cheer {
                viewer: viewer.to_string(),
                count,
                message: message.to_string(),
                video,
            })
            .await;
    }

    pub fn suppress_music(&self) {
        self.dispatcher.context().vibe.duck_volume(true);
    }

    pub fn restore_music(&self) {
        self.dispatcher.context().vibe.duck_volume(false);
    }
}
