pub mod badges;
pub mod channel;
pub mod chat_settings;
pub mod follow;
pub mod stream;
pub mod users;

pub use badges::BadgeUrlTable;
