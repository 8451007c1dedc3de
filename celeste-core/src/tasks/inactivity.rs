// celeste-core/src/tasks/inactivity.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::eventbus::{BotEvent, EventBus};

/// When chat last showed a line.
#[derive(Debug)]
pub struct ActivityClock {
    last_activity: Mutex<Instant>,
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self {
            last_activity: Mutex::new(Instant::now()),
        }
    }
}

impl ActivityClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    fn deadline(&self, cooldown: Duration) -> Instant {
        *self.last_activity.lock() + cooldown
    }
}

/// What to play once chat has gone quiet.
#[derive(Debug, Clone, Default)]
pub struct InactivityMedia {
    pub portrait_video: Option<PathBuf>,
    /// Clips for the roaster; one is picked at random each time.
    pub roasts: Vec<PathBuf>,
}

impl InactivityMedia {
    pub fn is_empty(&self) -> bool {
        self.portrait_video.is_none() && self.roasts.is_empty()
    }
}

/// Plays the portrait video and a roast each time chat has been quiet for
/// `cooldown`. The clock restarts after every playback.
pub fn spawn_inactivity_task(
    clock: Arc<ActivityClock>,
    event_bus: Arc<EventBus>,
    media: InactivityMedia,
    cooldown: Duration,
) -> JoinHandle<()> {
    let mut shutdown_rx = event_bus.shutdown_rx.clone();
    tokio::spawn(async move {
        loop {
            let deadline = clock.deadline(cooldown);
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown_rx.changed() => break,
            }
            if clock.idle_for() < cooldown {
                continue;
            }
            debug!("chat idle for {:?}", cooldown);
            if let Some(video) = &media.portrait_video {
                event_bus.publish(BotEvent::PlayVideo(video.clone())).await;
            }
            let roast = media.roasts.choose(&mut rand::rng()).cloned();
            if let Some(roast) = roast {
                event_bus.publish(BotEvent::PlayRoast(roast)).await;
            }
            clock.reset();
        }
        debug!("inactivity task stopped");
    })
}
