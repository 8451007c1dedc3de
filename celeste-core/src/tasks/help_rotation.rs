// celeste-core/src/tasks/help_rotation.rs

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::eventbus::{BotEvent, EventBus};
use crate::services::commands::CommandRegistry;

/// Spawns a background task that advertises a random command every `interval`
/// until the event bus shuts down.
pub fn spawn_help_rotation_task(
    registry: Arc<RwLock<CommandRegistry>>,
    event_bus: Arc<EventBus>,
    interval: Duration,
) -> JoinHandle<()> {
    let mut shutdown_rx = event_bus.shutdown_rx.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown_rx.changed() => break,
            }

            let pick = registry
                .read()
                .random_command()
                .map(|command| (command.name.clone(), command.description.clone()));
            if let Some((name, description)) = pick {
                debug!("help rotation => !{}", name);
                event_bus.publish(BotEvent::ShowCommand { name, description }).await;
            }
        }
        debug!("help rotation task stopped");
    })
}
