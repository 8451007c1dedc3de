// File: celeste-core/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use celeste_common::models::{SongInfo, Viewer};
use celeste_common::traits::{FileLister, IconResolver, VibeKeeper, ViewerResolver};
use celeste_core::Error;
use celeste_core::eventbus::BotEvent;

/// Icon resolver that knows a fixed set of badges and records emote lookups.
#[derive(Default)]
pub struct FakeIcons {
    pub known_badges: Vec<(String, String)>,
    pub emote_requests: Mutex<Vec<String>>,
}

impl FakeIcons {
    pub fn with_badges(badges: &[(&str, &str)]) -> Self {
        Self {
            known_badges: badges.iter().map(|(b, v)| (b.to_string(), v.to_string())).collect(),
            emote_requests: Mutex::new(Vec::new()),
        }
    }
}

impl IconResolver for FakeIcons {
    fn badge_icon(&self, badge: &str, version: &str) -> Option<PathBuf> {
        self.known_badges
            .iter()
            .any(|(b, v)| b == badge && v == version)
            .then(|| PathBuf::from(format!("/cache/{badge}_{version}.png")))
    }

    fn emote_icon(&self, emote_id: &str) -> PathBuf {
        self.emote_requests.lock().push(emote_id.to_string());
        PathBuf::from(format!("/cache/{emote_id}.png"))
    }
}

/// Resolves only the logins it was given.
#[derive(Default)]
pub struct FakeResolver {
    viewers: HashMap<String, Viewer>,
}

impl FakeResolver {
    pub fn with_viewers(logins: &[&str]) -> Self {
        let viewers = logins
            .iter()
            .enumerate()
            .map(|(i, login)| (login.to_string(), viewer(login, &(1000 + i).to_string())))
            .collect();
        Self { viewers }
    }
}

#[async_trait]
impl ViewerResolver for FakeResolver {
    async fn resolve_viewer(&self, login: &str) -> Result<Viewer, Error> {
        self.viewers
            .get(&login.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("viewer '{login}'")))
    }
}

pub fn viewer(login: &str, id: &str) -> Viewer {
    let mut display_name = login.to_string();
    if let Some(first) = display_name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Viewer {
        login: login.to_string(),
        id: id.to_string(),
        display_name,
        profile_image_url: format!("https://img.test/{login}.png"),
        description: format!("{login} streams things"),
    }
}

/// Directory listing backed by a map instead of the filesystem.
#[derive(Default)]
pub struct FakeFiles {
    pub directories: RwLock<HashMap<PathBuf, Vec<PathBuf>>>,
}

impl FakeFiles {
    pub fn with_directory(directory: &str, files: &[&str]) -> Self {
        let lister = Self::default();
        lister.directories.write().insert(
            PathBuf::from(directory),
            files.iter().map(|f| Path::new(directory).join(f)).collect(),
        );
        lister
    }
}

impl FileLister for FakeFiles {
    fn list_files(&self, directory: &Path, extension: Option<&str>) -> Vec<PathBuf> {
        self.directories
            .read()
            .get(directory)
            .map(|files| {
                files
                    .iter()
                    .filter(|f| extension.is_none_or(|ext| f.extension().is_some_and(|e| e == ext)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Vibe keeper that records every call.
#[derive(Default)]
pub struct RecordingVibeKeeper {
    pub playing: Mutex<bool>,
    pub volume_calls: Mutex<Vec<(u32, Duration)>>,
    pub ducked: Mutex<Vec<bool>>,
}

impl VibeKeeper for RecordingVibeKeeper {
    fn is_playing(&self) -> bool {
        *self.playing.lock()
    }

    fn start(&self) {
        *self.playing.lock() = true;
    }

    fn stop(&self) {
        *self.playing.lock() = false;
    }

    fn set_volume(&self, target: u32, over: Duration) {
        self.volume_calls.lock().push((target, over));
    }

    fn duck_volume(&self, duck: bool) {
        self.ducked.lock().push(duck);
    }

    fn now_playing(&self) -> SongInfo {
        SongInfo {
            title: "Night Drive".into(),
            album: "Neon".into(),
            artist: "Synth Cat".into(),
            cover_art: None,
        }
    }
}

/// Waits briefly for the next event on `rx`.
pub async fn next_event(rx: &mut mpsc::Receiver<BotEvent>) -> BotEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event bus closed")
}

/// Asserts nothing was published.
pub fn assert_no_event(rx: &mut mpsc::Receiver<BotEvent>) {
    if let Ok(event) = rx.try_recv() {
        panic!("unexpected event: {:?}", event);
    }
}

pub fn tag_line(tags: &str, login: &str, text: &str) -> String {
    format!("@{tags} :{login}!{login}@{login}.tmi.twitch.tv PRIVMSG #channel :{text}")
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
