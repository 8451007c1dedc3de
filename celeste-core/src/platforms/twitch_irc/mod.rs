pub mod client;
pub mod message;

pub use client::{IrcIncomingEvent, TwitchIrcClient};
pub use message::IrcLine;
