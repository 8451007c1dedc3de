// ========================================================
// File: celeste-core/src/platforms/twitch/requests/stream.rs
// ========================================================
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// Response from "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single stream data record. Only the fields the bot reads.
#[derive(Debug, Deserialize)]
pub struct StreamData {
    pub user_login: String,
    #[serde(default)]
    pub title: String,
    pub started_at: String,
}

impl TwitchHelixClient {
    /// Start of the live broadcast of `login`, or `None` when the channel is offline.
    pub async fn fetch_stream_started_at(&self, login: &str) -> Result<Option<DateTime<Utc>>, Error> {
        let request = self.get("streams").query("user_login", login);
        let response = self.send_checked(request, "fetch_stream_started_at").await?;

        let parsed: StreamsResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /streams JSON: {e}")))?;

        let Some(stream) = parsed.data.first() else {
            debug!("fetch_stream_started_at: '{}' is offline", login);
            return Ok(None);
        };

        let started_at = DateTime::parse_from_rfc3339(&stream.started_at)
            .map_err(|e| Error::Platform(format!("Failed to parse started_at: {e}")))?
            .with_timezone(&Utc);
        Ok(Some(started_at))
    }
}
