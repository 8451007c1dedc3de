// File: celeste-core/src/platforms/twitch/requests/chat_settings.rs

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

#[derive(Debug, Deserialize)]
pub struct ChatSettingsResponse {
    pub data: Vec<ChatSettingsData>,
}

#[derive(Debug, Deserialize)]
pub struct ChatSettingsData {
    pub broadcaster_id: String,
    #[serde(default)]
    pub emote_mode: bool,
}

impl TwitchHelixClient {
    pub async fn fetch_emote_mode(&self, broadcaster_id: &str) -> Result<bool, Error> {
        let request = self.get("chat/settings").query("broadcaster_id", broadcaster_id);
        let response = self.send_checked(request, "fetch_emote_mode").await?;

        let parsed: ChatSettingsResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /chat/settings JSON: {e}")))?;

        parsed
            .data
            .first()
            .map(|settings| settings.emote_mode)
            .ok_or_else(|| Error::NotFound(format!("No chat settings for broadcaster {broadcaster_id}")))
    }

    /// The broadcaster acts as their own moderator here.
    pub async fn update_emote_mode(&self, broadcaster_id: &str, enabled: bool) -> Result<(), Error> {
        let request = self
            .patch("chat/settings")
            .query("broadcaster_id", broadcaster_id)
            .query("moderator_id", broadcaster_id)
            .json_body(&json!({ "emote_mode": enabled }));
        self.send_checked(request, "update_emote_mode").await?;
        info!("Emote only mode {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}
