// File: celeste-core/src/services/viewer_service.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use celeste_common::models::ViewerAttributes;
use celeste_common::traits::{FileLister, ViewerResolver};

use crate::Error;
use crate::eventbus::{BotEvent, EventBus};
use crate::services::media::file_or_random;

/// Per-viewer flags, persisted as a JSON object keyed by login.
#[derive(Debug)]
pub struct ViewerAttributeStore {
    path: PathBuf,
    viewers: RwLock<BTreeMap<String, ViewerAttributes>>,
}

impl ViewerAttributeStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            viewers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Reads the document at `path`. Missing or empty files give an empty table.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let store = Self::new(path);
        if !path.exists() {
            return Ok(store);
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(store);
        }
        let viewers: BTreeMap<String, ViewerAttributes> = serde_json::from_str(&data)
            .map_err(|e| Error::ViewerDocument(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded attributes of {} viewers", viewers.len());
        *store.viewers.write() = viewers;
        Ok(store)
    }

    /// Writes the table back. `reset_welcomes` clears every `welcomed` flag in
    /// the written document, so the next session greets everyone again.
    pub fn save(&self, reset_welcomes: bool) -> Result<(), Error> {
        let mut viewers = self.viewers.read().clone();
        if reset_welcomes {
            viewers.values_mut().for_each(|attributes| attributes.welcomed = false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&viewers)?)?;
        Ok(())
    }

    /// Attributes of `login`, creating the default entry on first sight.
    pub fn observe(&self, login: &str) -> ViewerAttributes {
        *self.viewers.write().entry(login.to_string()).or_default()
    }

    pub fn get(&self, login: &str) -> Option<ViewerAttributes> {
        self.viewers.read().get(login).copied()
    }

    pub fn set(&self, login: &str, attributes: ViewerAttributes) {
        self.viewers.write().insert(login.to_string(), attributes);
    }

    pub fn mark_welcomed(&self, login: &str) {
        self.viewers.write().entry(login.to_string()).or_default().welcomed = true;
    }

    pub fn len(&self) -> usize {
        self.viewers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.read().is_empty()
    }
}

/// Greets viewers the first time they speak.
pub struct ViewerService {
    store: Arc<ViewerAttributeStore>,
    resolver: Arc<dyn ViewerResolver>,
    files: Arc<dyn FileLister>,
    event_bus: Arc<EventBus>,
    broadcaster: String,
    /// File, or directory to pick from. Empty turns arrivals off.
    arrival_sound: String,
    pending: Arc<DashSet<String>>,
    /// Arrivals stay quiet for this long after a raid.
    raid_interrupt: Duration,
    last_raid: Arc<Mutex<Option<Instant>>>,
}

impl ViewerService {
    pub fn new(
        store: Arc<ViewerAttributeStore>,
        resolver: Arc<dyn ViewerResolver>,
        files: Arc<dyn FileLister>,
        event_bus: Arc<EventBus>,
        broadcaster: &str,
        arrival_sound: &str,
    ) -> Self {
        Self {
            store,
            resolver,
            files,
            event_bus,
            broadcaster: broadcaster.to_lowercase(),
            arrival_sound: arrival_sound.to_string(),
            pending: Arc::new(DashSet::new()),
            raid_interrupt: Duration::ZERO,
            last_raid: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_raid_interrupt(mut self, raid_interrupt: Duration) -> Self {
        self.raid_interrupt = raid_interrupt;
        self
    }

    /// Starts the quiet period that follows a raid.
    pub fn note_raid(&self) {
        *self.last_raid.lock() = Some(Instant::now());
    }

    pub fn store(&self) -> &Arc<ViewerAttributeStore> {
        &self.store
    }

    /// Announces `login` unless they are a bot, were already welcomed, or a
    /// greeting for them is already underway.
    pub fn dispatch_arrival(&self, login: &str) -> Option<JoinHandle<()>> {
        let attributes = self.store.observe(login);
        if attributes.bot || attributes.welcomed {
            return None;
        }
        if self.arrival_sound.is_empty() {
            return None;
        }
        if !self.pending.insert(login.to_string()) {
            return None;
        }

        let login = login.to_string();
        let store = self.store.clone();
        let resolver = self.resolver.clone();
        let files = self.files.clone();
        let event_bus = self.event_bus.clone();
        let broadcaster = self.broadcaster.clone();
        let arrival_sound = self.arrival_sound.clone();
        let pending = self.pending.clone();
        let last_raid = self.last_raid.clone();
        let raid_interrupt = self.raid_interrupt;

        Some(tokio::spawn(async move {
            let result = async {
                let viewer = resolver.resolve_viewer(&login).await?;
                if viewer.login.eq_ignore_ascii_case(&broadcaster) {
                    return Ok::<(), Error>(());
                }
                if raid_window_open(&last_raid, raid_interrupt) {
                    debug!("Raid in progress; not announcing {}", viewer.display_name);
                    return Ok(());
                }
                let Some(sound) = file_or_random(files.as_ref(), &arrival_sound) else {
                    warn!("No arrival sound found in {}", arrival_sound);
                    return Ok(());
                };
                event_bus
                    .publish(BotEvent::Arrival {
                        display_name: viewer.display_name.clone(),
                        profile_image_url: viewer.profile_image_url.clone(),
                        sound,
                    })
                    .await;
                info!("Welcomed {}", viewer.display_name);
                store.mark_welcomed(&login);
                store.save(false)
            }
            .await;

            if let Err(e) = result {
                warn!("Arrival of '{}' not announced: {}", login, e);
            }
            pending.remove(&login);
        }))
    }
}

fn raid_window_open(last_raid: &Mutex<Option<Instant>>, raid_interrupt: Duration) -> bool {
    last_raid
        .lock()
        .is_some_and(|raided_at| raided_at.elapsed() < raid_interrupt)
}
