pub mod chat_service;
pub mod parser;

pub use chat_service::{ChatService, LineOutcome, CRASH_REWARD_TITLE};
pub use parser::{ChatLineParser, FinalizedChat, Notification, ParsedLine, PendingChat};
