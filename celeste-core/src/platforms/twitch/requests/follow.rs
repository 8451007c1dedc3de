// File: celeste-core/src/platforms/twitch/requests/follow.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// Response from `GET /helix/channels/followers`.
#[derive(Debug, Deserialize)]
pub struct ChannelFollowersResponse {
    pub data: Vec<FollowerData>,
}

#[derive(Debug, Deserialize)]
pub struct FollowerData {
    /// The UTC timestamp when the user started following the broadcaster.
    pub followed_at: String,
    pub user_id: String,
    pub user_login: String,
}

impl TwitchHelixClient {
    /// Checks whether `viewer_id` follows `broadcaster_id`.
    ///
    /// If so, returns the `followed_at` timestamp. If not following, returns `Ok(None)`.
    /// Needs a token with `moderator:read:followers` from the broadcaster or one of their moderators.
    pub async fn fetch_follow_date(
        &self,
        viewer_id: &str,
        broadcaster_id: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        if viewer_id.is_empty() || broadcaster_id.is_empty() {
            warn!("fetch_follow_date called with empty viewer_id or broadcaster_id");
            return Ok(None);
        }

        let request = self
            .get("channels/followers")
            .query("broadcaster_id", broadcaster_id)
            .query("user_id", viewer_id);
        let response = self.send_checked(request, "fetch_follow_date").await?;

        let parsed: ChannelFollowersResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /channels/followers JSON: {e}")))?;

        let Some(first) = parsed.data.first() else {
            return Ok(None);
        };
        let followed_at = DateTime::parse_from_rfc3339(&first.followed_at)
            .map_err(|e| Error::Platform(format!("Failed to parse followed_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Some(followed_at))
    }
}
