// File: celeste-common/src/models/mod.rs
pub mod chat;
pub mod command;
pub mod viewer;

pub use chat::{ChatEvent, CommandInvocation, Emote, Privilege};
pub use command::{Command, CommandListing, CommandRecord, CommandType, NativeCommandFlag};
pub use viewer::{SongInfo, Viewer, ViewerAttributes};
