// File: celeste-core/src/platforms/twitch/requests/channel.rs

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// Response from "Get Games" endpoint.
#[derive(Debug, Deserialize)]
pub struct GamesResponse {
    pub data: Vec<GameData>,
}

#[derive(Debug, Deserialize)]
pub struct GameData {
    pub id: String,
    pub name: String,
}

impl TwitchHelixClient {
    /// Category (game) id for an exact category name.
    pub async fn fetch_game_id(&self, name: &str) -> Result<Option<String>, Error> {
        let request = self.get("games").query("name", name);
        let response = self.send_checked(request, "fetch_game_id").await?;

        let parsed: GamesResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /games JSON: {e}")))?;

        Ok(parsed.data.into_iter().next().map(|game| game.id))
    }

    pub async fn update_channel_title(&self, broadcaster_id: &str, title: &str) -> Result<(), Error> {
        self.modify_channel(broadcaster_id, json!({ "title": title })).await?;
        info!("Stream title changed to '{}'", title);
        Ok(())
    }

    pub async fn update_channel_category(&self, broadcaster_id: &str, category_id: &str) -> Result<(), Error> {
        self.modify_channel(broadcaster_id, json!({ "game_id": category_id })).await?;
        info!("Stream category changed to id {}", category_id);
        Ok(())
    }

    /// `PATCH /channels`; Helix answers 204 on success.
    async fn modify_channel(&self, broadcaster_id: &str, body: serde_json::Value) -> Result<(), Error> {
        let request = self
            .patch("channels")
            .query("broadcaster_id", broadcaster_id)
            .json_body(&body);
        self.send_checked(request, "modify_channel").await?;
        Ok(())
    }
}
