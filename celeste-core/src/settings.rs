// File: celeste-core/src/settings.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use celeste_common::models::NativeCommandFlag;
use crate::Error;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const COMMANDS_LIST_FILENAME: &str = "commands.json";
pub const VIEWER_ATTRIBUTES_FILENAME: &str = "viewers.json";
pub const PANIC_FILENAME: &str = "panic.txt";

/// Everything the bot reads from its settings file.
///
/// Every field has a default, so a partial (or missing) file is fine.
/// Credentials can also come from the environment, see [`BotSettings::apply_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Login of the channel owner; the bot joins this channel.
    pub broadcaster: String,
    pub broadcaster_id: String,
    pub client_id: String,
    pub oauth_token: String,

    /// Non-emote characters a line may carry before it counts as a wall of text.
    pub text_wall_threshold: usize,
    pub text_wall_sound: String,
    /// File or directory of files; empty turns arrival announcements off.
    pub arrival_sound: String,
    pub host_sound: String,
    /// Directory of videos played when a protected command is refused.
    pub denied_command_video: String,
    /// Minutes streamed before this bot kept track, added to `!totaltime`.
    pub uptime_history_minutes: i64,
    pub inactivity_cooldown_ms: u64,
    pub help_cooldown_ms: u64,
    pub portrait_video: String,
    /// Playlist file or directory of clips played when chat goes quiet.
    pub roasts: String,
    pub cheer_video: String,
    pub subscription_sound: String,
    pub raid_sound: String,
    /// How long after a raid arrivals stay quiet.
    pub raid_interrupt_ms: u64,

    /// Renames for native commands, keyed by their default name.
    pub command_names: BTreeMap<String, String>,

    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(skip)]
    pub cache_dir: PathBuf,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            broadcaster: String::new(),
            broadcaster_id: String::new(),
            client_id: String::new(),
            oauth_token: String::new(),
            text_wall_threshold: 400,
            text_wall_sound: String::new(),
            arrival_sound: String::new(),
            host_sound: String::new(),
            denied_command_video: String::new(),
            uptime_history_minutes: 0,
            inactivity_cooldown_ms: 1_800_000,
            help_cooldown_ms: 300_000,
            portrait_video: String::new(),
            roasts: String::new(),
            cheer_video: String::new(),
            subscription_sound: String::new(),
            raid_sound: String::new(),
            raid_interrupt_ms: 60_000,
            command_names: BTreeMap::new(),
            data_dir: Self::default_data_dir(),
            cache_dir: std::env::temp_dir(),
        }
    }
}

impl BotSettings {
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("celeste")
    }

    /// Reads `settings.json` from `data_dir`; a missing file yields defaults.
    pub fn load(data_dir: &Path) -> Result<Self, Error> {
        let path = data_dir.join(SETTINGS_FILENAME);
        let mut settings = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Self::default()
            } else {
                serde_json::from_str::<Self>(&data)?
            }
        } else {
            info!("No settings file at {}; using defaults", path.display());
            Self::default()
        };
        settings.data_dir = data_dir.to_path_buf();
        settings.apply_env();
        Ok(settings)
    }

    /// Overrides credentials from `CELESTE_*` environment variables when set.
    pub fn apply_env(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("CELESTE_BROADCASTER", &mut self.broadcaster),
            ("CELESTE_BROADCASTER_ID", &mut self.broadcaster_id),
            ("CELESTE_CLIENT_ID", &mut self.client_id),
            ("CELESTE_OAUTH_TOKEN", &mut self.oauth_token),
        ];
        for (key, field) in overrides {
            if let Ok(value) = std::env::var(key) {
                if !value.trim().is_empty() {
                    debug!("settings: {} taken from environment", key);
                    *field = value.trim().to_string();
                }
            }
        }
    }

    /// Chat name of a native command, honoring renames.
    pub fn native_command_name(&self, flag: NativeCommandFlag) -> String {
        self.command_names
            .get(flag.default_name())
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| flag.default_name().to_string())
    }

    pub fn commands_path(&self) -> PathBuf {
        self.data_dir.join(COMMANDS_LIST_FILENAME)
    }

    pub fn viewers_path(&self) -> PathBuf {
        self.data_dir.join(VIEWER_ATTRIBUTES_FILENAME)
    }

    pub fn panic_path(&self) -> PathBuf {
        self.data_dir.join(PANIC_FILENAME)
    }

    pub fn inactivity_cooldown(&self) -> Duration {
        Duration::from_millis(self.inactivity_cooldown_ms)
    }

    pub fn help_cooldown(&self) -> Duration {
        Duration::from_millis(self.help_cooldown_ms)
    }

    pub fn raid_interrupt(&self) -> Duration {
        Duration::from_millis(self.raid_interrupt_ms)
    }
}
