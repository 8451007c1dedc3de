//! Narrow interfaces to the collaborators the chat core depends on but does
//! not implement itself: the platform API, viewer lookups, icon caching,
//! file listing for random media, and the music player.

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::error::Error;
use crate::models::{SongInfo, Viewer};

/// Resolves a login to the platform's view of that user.
#[async_trait]
pub trait ViewerResolver: Send + Sync {
    async fn resolve_viewer(&self, login: &str) -> Result<Viewer, Error>;
}

/// Maps badges and emotes to cached local image files.
///
/// Both calls return immediately. A missing file is fetched in the
/// background, so the returned path may not exist yet.
pub trait IconResolver: Send + Sync {
    /// `None` when the badge/version pair isn't known to the platform.
    fn badge_icon(&self, badge: &str, version: &str) -> Option<PathBuf>;
    fn emote_icon(&self, emote_id: &str) -> PathBuf;
}

/// Channel, stream and chat-settings calls used by the built-in commands.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Start of the current broadcast, `None` when offline.
    async fn stream_started_at(&self, login: &str) -> Result<Option<DateTime<Utc>>, Error>;
    /// When `viewer_id` started following `broadcaster_id`, `None` when not following.
    async fn follow_date(&self, viewer_id: &str, broadcaster_id: &str) -> Result<Option<DateTime<Utc>>, Error>;
    async fn emote_mode(&self, broadcaster_id: &str) -> Result<bool, Error>;
    async fn set_emote_mode(&self, broadcaster_id: &str, enabled: bool) -> Result<(), Error>;
    async fn set_title(&self, broadcaster_id: &str, title: &str) -> Result<(), Error>;
    /// Category (game) id for a category name.
    async fn find_category(&self, name: &str) -> Result<Option<String>, Error>;
    async fn set_category(&self, broadcaster_id: &str, category_id: &str) -> Result<(), Error>;
}

pub trait FileLister: Send + Sync {
    /// Files directly inside `directory`, optionally filtered by extension.
    fn list_files(&self, directory: &Path, extension: Option<&str>) -> Vec<PathBuf>;
}

/// Background music player ("vibe keeper").
pub trait VibeKeeper: Send + Sync {
    fn is_playing(&self) -> bool;
    fn start(&self);
    fn stop(&self);
    fn set_volume(&self, target: u32, over: Duration);
    /// Lowers the music while something else is speaking; `false` restores it.
    fn duck_volume(&self, duck: bool);
    fn now_playing(&self) -> SongInfo;
}
