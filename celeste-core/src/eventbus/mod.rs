//! src/eventbus/mod.rs
//!
//! Provides an in-process event bus that supports guaranteed delivery
//! to multiple subscribers via bounded MPSC queues. The presentation layer
//! subscribes here for everything the parser and dispatcher produce.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use celeste_common::models::{ChatEvent, CommandListing, SongInfo};

/// Side effects produced by the chat core.
#[derive(Debug, Clone)]
pub enum BotEvent {
    /// A chat line ready for display.
    ChatMessage(ChatEvent),

    /// A badge or emote image finished downloading; redraw the chat.
    RefreshChat,

    CommandList(Vec<CommandListing>),

    /// Periodic hint advertising one of the commands.
    ShowCommand { name: String, description: String },

    /// A protected command was refused.
    CommandDenied { command: String, video: Option<PathBuf> },

    TextWall { message: String, sound: String },

    Arrival { display_name: String, profile_image_url: String, sound: PathBuf },

    Host { host: String, sound: String },

    /// A channel point reward was redeemed.
    Redemption { viewer: String, reward: String, message: String },

    Subscription { viewer: String, sound: String },

    Raid { viewer: String, viewers: u32, sound: String },

    Cheer { viewer: String, count: u32, message: String, video: String },

    FollowAge { display_name: String, years: i64, months: i64, days: i64 },

    /// `total` is set for the all-time figure, which includes past streams.
    Uptime { hours: i64, minutes: i64, seconds: i64, total: bool },

    PlayVideo(PathBuf),

    /// One clip from the roasts playlist.
    PlayRoast(PathBuf),

    PlayAudio { viewer: String, message: String, path: String },

    Pulse(String),

    SetAgenda(String),

    Panic(String),

    Shoutout { display_name: String, description: String, profile_image_url: String },

    CurrentSong(SongInfo),

    Timezone(String),

    /// Free-form status text for the status pane.
    SystemMessage(String),
}

impl BotEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            BotEvent::ChatMessage(_) => "chat_message",
            BotEvent::RefreshChat => "refresh_chat",
            BotEvent::CommandList(_) => "command_list",
            BotEvent::ShowCommand { .. } => "show_command",
            BotEvent::CommandDenied { .. } => "command_denied",
            BotEvent::TextWall { .. } => "text_wall",
            BotEvent::Arrival { .. } => "arrival",
            BotEvent::Host { .. } => "host",
            BotEvent::Redemption { .. } => "redemption",
            BotEvent::Subscription { .. } => "subscription",
            BotEvent::Raid { .. } => "raid",
            BotEvent::Cheer { .. } => "cheer",
            BotEvent::FollowAge { .. } => "follow_age",
            BotEvent::Uptime { .. } => "uptime",
            BotEvent::PlayVideo(_) => "play_video",
            BotEvent::PlayRoast(_) => "play_roast",
            BotEvent::PlayAudio { .. } => "play_audio",
            BotEvent::Pulse(_) => "pulse",
            BotEvent::SetAgenda(_) => "set_agenda",
            BotEvent::Panic(_) => "panic",
            BotEvent::Shoutout { .. } => "shoutout",
            BotEvent::CurrentSong(_) => "current_song",
            BotEvent::Timezone(_) => "timezone",
            BotEvent::SystemMessage(_) => "system_message",
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<BotEvent>` for guaranteed delivery.
///
/// - If the subscriber’s channel buffer fills, `publish` will await
///   until there's space (backpressure).
/// - If the subscriber has dropped the `Receiver`, the channel is closed
///   and that subscriber is skipped.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BotEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber’s buffer.
const DEFAULT_BUFFER_SIZE: usize = 10000;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new, empty event bus.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BotEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: BotEvent) {
        let senders = {
            let mut subs = self.subscribers.lock().await;
            subs.retain(|s| !s.is_closed());
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }

    /// Convenience method: publish a `SystemMessage` event.
    pub async fn publish_status(&self, text: &str) {
        self.publish(BotEvent::SystemMessage(text.to_string())).await;
    }
}
