use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Identity of a viewer as reported by the platform's user lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub login: String,
    pub id: String,
    pub display_name: String,
    pub profile_image_url: String,
    pub description: String,
}

fn default_true() -> bool {
    true
}

/// Per-viewer flags persisted between runs, keyed by login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerAttributes {
    /// Whether the viewer may trigger commands.
    #[serde(default = "default_true")]
    pub commands: bool,
    #[serde(default)]
    pub welcomed: bool,
    /// Known bot accounts never get arrival announcements.
    #[serde(default)]
    pub bot: bool,
}

impl Default for ViewerAttributes {
    fn default() -> Self {
        Self {
            commands: true,
            welcomed: false,
            bot: false,
        }
    }
}

/// What the music player reports about the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongInfo {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub cover_art: Option<PathBuf>,
}
