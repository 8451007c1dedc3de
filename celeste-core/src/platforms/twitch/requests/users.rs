// File: celeste-core/src/platforms/twitch/requests/users.rs

use serde::Deserialize;

use celeste_common::models::Viewer;
use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// Response from "Get Users" endpoint.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<UserData>,
}

#[derive(Debug, Deserialize)]
pub struct UserData {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub description: String,
}

impl From<UserData> for Viewer {
    fn from(user: UserData) -> Self {
        Viewer {
            login: user.login,
            id: user.id,
            display_name: user.display_name,
            profile_image_url: user.profile_image_url,
            description: user.description,
        }
    }
}

impl TwitchHelixClient {
    /// Looks up one user by login. An unknown login is `Error::NotFound`.
    pub async fn fetch_user(&self, login: &str) -> Result<Viewer, Error> {
        let request = self.get("users").query("login", &login.to_lowercase());
        let response = self.send_checked(request, "fetch_user").await?;

        let parsed: UsersResponse = response
            .json()
            .map_err(|e| Error::Platform(format!("Error parsing /users JSON: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(Viewer::from)
            .ok_or_else(|| Error::NotFound(format!("No user with login '{login}'")))
    }
}
