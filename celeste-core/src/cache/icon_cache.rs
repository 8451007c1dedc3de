// File: celeste-core/src/cache/icon_cache.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use celeste_common::traits::IconResolver;

use crate::Error;
use crate::eventbus::{BotEvent, EventBus};
use crate::http::{OutboundRequest, RequestSequencer};
use crate::platforms::twitch::TwitchHelixClient;
use crate::platforms::twitch::requests::BadgeUrlTable;

/// `{id}` is replaced with the emote id.
pub const TWITCH_EMOTE_URL_TEMPLATE: &str = "https://static-cdn.jtvnw.net/emoticons/v1/{id}/1.0";

/// Local copies of badge and emote images.
///
/// Created once at startup and shared. Lookups answer with the local path
/// right away; a file that isn't on disk yet is fetched in the background and
/// the chat is told to redraw once it lands.
pub struct IconCache {
    cache_dir: PathBuf,
    badge_urls: RwLock<BadgeUrlTable>,
    in_flight: Arc<DashSet<PathBuf>>,
    sequencer: RequestSequencer,
    event_bus: Arc<EventBus>,
}

impl IconCache {
    pub fn new(cache_dir: &Path, sequencer: RequestSequencer, event_bus: Arc<EventBus>) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            badge_urls: RwLock::new(BadgeUrlTable::new()),
            in_flight: Arc::new(DashSet::new()),
            sequencer,
            event_bus,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn set_badge_urls(&self, table: BadgeUrlTable) {
        *self.badge_urls.write() = table;
    }

    /// Fetches the global badge table; returns the number of badge sets known afterwards.
    pub async fn load_badge_urls(&self, helix: &TwitchHelixClient) -> Result<usize, Error> {
        let table = helix.fetch_global_badges().await?;
        let count = table.len();
        self.set_badge_urls(table);
        info!("IconCache: {} badge sets available", count);
        Ok(count)
    }

    /// Number of downloads currently running.
    pub fn downloads_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Starts fetching `url` into `path` unless the file exists or is already on its way.
    fn ensure_cached(&self, url: String, path: PathBuf) {
        if path.exists() || !self.in_flight.insert(path.clone()) {
            return;
        }
        debug!("IconCache: downloading {} => {}", url, path.display());

        let sequencer = self.sequencer.clone();
        let event_bus = self.event_bus.clone();
        let in_flight = self.in_flight.clone();
        tokio::spawn(async move {
            match Self::download(&sequencer, &url, &path).await {
                Ok(()) => event_bus.publish(BotEvent::RefreshChat).await,
                Err(e) => warn!("IconCache: failed to download {}: {}", url, e),
            }
            in_flight.remove(&path);
        });
    }

    async fn download(sequencer: &RequestSequencer, url: &str, path: &Path) -> Result<(), Error> {
        let response = sequencer.send(OutboundRequest::get(url)).await?;
        if !response.is_success() {
            return Err(Error::Platform(format!("HTTP {}", response.status)));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &response.body).await?;
        Ok(())
    }
}

impl IconResolver for IconCache {
    fn badge_icon(&self, badge: &str, version: &str) -> Option<PathBuf> {
        let url = self
            .badge_urls
            .read()
            .get(badge)
            .and_then(|versions| versions.get(version))
            .cloned()?;
        let path = self.cache_dir.join(format!("{badge}_{version}.png"));
        self.ensure_cached(url, path.clone());
        Some(path)
    }

    fn emote_icon(&self, emote_id: &str) -> PathBuf {
        let path = self.cache_dir.join(format!("{emote_id}.png"));
        self.ensure_cached(TWITCH_EMOTE_URL_TEMPLATE.replace("{id}", emote_id), path.clone());
        path
    }
}
