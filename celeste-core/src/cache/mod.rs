pub mod icon_cache;

pub use icon_cache::{IconCache, TWITCH_EMOTE_URL_TEMPLATE};
