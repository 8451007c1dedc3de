// File: celeste-core/src/services/media.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use celeste_common::models::SongInfo;
use celeste_common::traits::{FileLister, VibeKeeper};

use crate::Error;

/// Lists files straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryLister;

impl FileLister for DirectoryLister {
    fn list_files(&self, directory: &Path, extension: Option<&str>) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {}: {}", directory.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| match extension {
                Some(wanted) => path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.'))),
                None => true,
            })
            .collect();
        files.sort();
        files
    }
}

/// Picks one file from `directory` at random.
pub fn random_file(lister: &dyn FileLister, directory: &Path, extension: Option<&str>) -> Option<PathBuf> {
    let files = lister.list_files(directory, extension);
    let choice = files.choose(&mut rand::rng()).cloned();
    if choice.is_none() {
        debug!("No files to choose from in {}", directory.display());
    }
    choice
}

/// `path` itself, or a random file inside it when it names a directory.
pub fn file_or_random(lister: &dyn FileLister, path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    if path.is_dir() {
        random_file(lister, path, None)
    } else {
        Some(path.to_path_buf())
    }
}

/// Music player stand-in for headless runs. It only remembers whether it is
/// "playing" and logs what it was asked to do.
#[derive(Debug, Default)]
pub struct SilentVibeKeeper {
    playing: AtomicBool,
    ducked: AtomicBool,
}

impl VibeKeeper for SilentVibeKeeper {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn start(&self) {
        self.playing.store(true, Ordering::SeqCst);
        info!("Vibe keeper started");
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
        info!("Vibe keeper stopped");
    }

    fn set_volume(&self, target: u32, over: Duration) {
        info!("Vibe keeper volume => {}% over {:?}", target, over);
    }

    fn duck_volume(&self, duck: bool) {
        self.ducked.store(duck, Ordering::SeqCst);
        debug!("Vibe keeper ducked: {}", duck);
    }

    fn now_playing(&self) -> SongInfo {
        SongInfo::default()
    }
}

impl SilentVibeKeeper {
    pub fn is_ducked(&self) -> bool {
        self.ducked.load(Ordering::SeqCst)
    }
}

/// Audio clips for the roaster. `path` is either a directory of clips or a
/// playlist file with one entry per line; `#` lines are comments and
/// relative entries are taken from the playlist's directory.
pub fn load_roasts(lister: &dyn FileLister, path: &Path) -> Result<Vec<PathBuf>, Error> {
    if path.is_dir() {
        return Ok(lister.list_files(path, None));
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let playlist = std::fs::read_to_string(path)?;
    Ok(playlist
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|entry| base.join(entry))
        .collect())
}
