// File: celeste-core/src/platforms/twitch/requests/badges.rs

use std::collections::HashMap;
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// `set_id -> version id -> image url`
pub type BadgeUrlTable = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Deserialize)]
pub struct BadgeSetsResponse {
    pub data: Vec<BadgeSet>,
}

#[derive(Debug, Deserialize)]
pub struct BadgeSet {
    pub set_id: String,
    pub versions: Vec<BadgeVersion>,
}

#[derive(Debug, Deserialize)]
pub struct BadgeVersion {
    pub id: String,
    pub image_url_1x: String,
}

impl BadgeSetsResponse {
    pub fn into_table(self) -> BadgeUrlTable {
        self.data
            .into_iter()
            .map(|set| {
                let versions = set
                    .versions
                    .into_iter()
                    .map(|version| (version.id, version.image_url_1x))
                    .collect();
                (set.set_id, versions)
            })
            .collect()
    }
}

impl TwitchHelixClient {
    /// Image URLs of every global chat badge.
    pub async fn fetch_global_badges(&self) -> Result<BadgeUrlTable, Error> {
        let response = self.send_checked(self.get("chat/badges/global"), "fetch_global_badges").await?;

        let parsed: BadgeSetsResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /chat/badges/global JSON: {e}")))?;

        let table = parsed.into_table();
        debug!("fetch_global_badges: {} badge sets", table.len());
        Ok(table)
    }
}
