// File: celeste-core/src/platforms/twitch/client.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use celeste_common::models::Viewer;
use celeste_common::traits::{PlatformApi, ViewerResolver};

use crate::Error;
use crate::http::{HttpResponse, OutboundRequest, RequestSequencer};

pub const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Entry point for all Helix calls.
///
/// Every request carries the bearer token and client id and goes through the
/// shared [`RequestSequencer`], so lookups are answered in the order they were
/// asked while channel updates go out immediately. The individual endpoints
/// live in `requests::*`.
#[derive(Clone)]
pub struct TwitchHelixClient {
    sequencer: RequestSequencer,
    bearer_token: String,
    client_id: String,
    base_url: String,
}

impl TwitchHelixClient {
    pub fn new(sequencer: RequestSequencer, bearer_token: &str, client_id: &str) -> Self {
        Self {
            sequencer,
            bearer_token: bearer_token.trim_start_matches("oauth:").to_string(),
            client_id: client_id.to_string(),
            base_url: HELIX_BASE_URL.to_string(),
        }
    }

    /// Points the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    fn authorize(&self, request: OutboundRequest) -> OutboundRequest {
        request
            .header("Authorization", &format!("Bearer {}", self.bearer_token))
            .header("Client-Id", &self.client_id)
    }

    pub(crate) fn get(&self, endpoint: &str) -> OutboundRequest {
        self.authorize(OutboundRequest::get(&format!("{}/{}", self.base_url, endpoint)))
    }

    pub(crate) fn patch(&self, endpoint: &str) -> OutboundRequest {
        self.authorize(OutboundRequest::patch(&format!("{}/{}", self.base_url, endpoint)))
    }

    /// Sends `request` and turns a non-2xx status into `Error::Platform`.
    pub(crate) async fn send_checked(&self, request: OutboundRequest, context: &str) -> Result<HttpResponse, Error> {
        let response = self.sequencer.send(request).await?;
        if !response.is_success() {
            let body_text = response.text();
            warn!("{} => status={} body={}", context, response.status, body_text);
            return Err(Error::Platform(format!(
                "{}: HTTP {} => {}",
                context, response.status, body_text
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ViewerResolver for TwitchHelixClient {
    async fn resolve_viewer(&self, login: &str) -> Result<Viewer, Error> {
        self.fetch_user(login).await
    }
}

#[async_trait]
impl PlatformApi for TwitchHelixClient {
    async fn stream_started_at(&self, login: &str) -> Result<Option<DateTime<Utc>>, Error> {
        self.fetch_stream_started_at(login).await
    }

    async fn follow_date(&self, viewer_id: &str, broadcaster_id: &str) -> Result<Option<DateTime<Utc>>, Error> {
        self.fetch_follow_date(viewer_id, broadcaster_id).await
    }

    async fn emote_mode(&self, broadcaster_id: &str) -> Result<bool, Error> {
        self.fetch_emote_mode(broadcaster_id).await
    }

    async fn set_emote_mode(&self, broadcaster_id: &str, enabled: bool) -> Result<(), Error> {
        self.update_emote_mode(broadcaster_id, enabled).await
    }

    async fn set_title(&self, broadcaster_id: &str, title: &str) -> Result<(), Error> {
        self.update_channel_title(broadcaster_id, title).await
    }

    async fn find_category(&self, name: &str) -> Result<Option<String>, Error> {
        self.fetch_game_id(name).await
    }

    async fn set_category(&self, broadcaster_id: &str, category_id: &str) -> Result<(), Error> {
        self.update_channel_category(broadcaster_id, category_id).await
    }
}
