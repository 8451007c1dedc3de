use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use celeste_common::models::NativeCommandFlag;
use celeste_core::cache::IconCache;
use celeste_core::eventbus::{BotEvent, EventBus};
use celeste_core::http::{DefaultHttpClient, RequestSequencer};
use celeste_core::platforms::twitch::TwitchHelixClient;
use celeste_core::platforms::twitch_irc::TwitchIrcClient;
use celeste_core::services::chat::{ChatLineParser, ChatService};
use celeste_core::services::commands::registry::{load_document, save_document};
use celeste_core::services::commands::{CommandDispatcher, CommandRegistry, DispatchContext};
use celeste_core::services::media::{load_roasts, DirectoryLister, SilentVibeKeeper};
use celeste_core::services::viewer_service::{ViewerAttributeStore, ViewerService};
use celeste_core::settings::BotSettings;
use celeste_core::tasks::{spawn_help_rotation_task, spawn_inactivity_task, ActivityClock, InactivityMedia};

#[derive(Parser, Debug, Clone)]
#[command(name = "celeste")]
#[command(author, version, about = "Celeste - chat companion bot for a single Twitch channel")]
struct Args {
    /// Directory holding settings.json, commands.json and viewers.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Feed raw chat lines from this file instead of connecting to chat.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Channel to join; defaults to the broadcaster from the settings.
    #[arg(long)]
    channel: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("celeste=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

/// Natives first, then the command list document, which is written back so
/// a fresh install gets a document listing every native command.
fn build_registry(settings: &BotSettings) -> anyhow::Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    for flag in NativeCommandFlag::ALL {
        registry.declare_native(
            &settings.native_command_name(flag),
            flag.description(),
            flag,
            flag.protected_by_default(),
        )?;
    }

    let path = settings.commands_path();
    let records = load_document(&path)
        .with_context(|| format!("reading command list {}", path.display()))?;
    registry.load_dynamic(records);
    save_document(&path, &registry.serialize())
        .with_context(|| format!("writing command list {}", path.display()))?;

    info!("Registered {} commands", registry.len());
    Ok(registry)
}

fn inactivity_media(settings: &BotSettings, files: &DirectoryLister) -> InactivityMedia {
    let portrait_video = (!settings.portrait_video.is_empty()).then(|| PathBuf::from(&settings.portrait_video));
    let roasts = if settings.roasts.is_empty() {
        Vec::new()
    } else {
        match load_roasts(files, Path::new(&settings.roasts)) {
            Ok(roasts) => {
                info!("Roasts loaded! ({} clips)", roasts.len());
                roasts
            }
            Err(e) => {
                warn!("Failed to load roasts from {}: {}", settings.roasts, e);
                Vec::new()
            }
        }
    };
    InactivityMedia { portrait_video, roasts }
}

/// Stand-in for the presentation layer: every event is logged.
fn spawn_event_logger(mut rx: mpsc::Receiver<BotEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                BotEvent::ChatMessage(chat) => info!("[chat] {}: {}", chat.sender, chat.text),
                BotEvent::SystemMessage(text) => info!("[status] {}", text),
                BotEvent::RefreshChat => debug!("[refresh_chat]"),
                other => info!("[{}] {:?}", other.event_type(), other),
            }
        }
    })
}

async fn replay_file(path: &Path, chat: &ChatService) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening replay file {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        chat.handle_line(&line).await;
    }
    info!("Replay of {} finished", path.display());
    Ok(())
}

async fn run_chat(settings: &BotSettings, channel: &str, chat: &ChatService) -> anyhow::Result<()> {
    let mut irc = TwitchIrcClient::connect(&settings.broadcaster, &settings.oauth_token).await?;
    irc.join_channel(channel);
    info!("Joined #{}", channel.trim_start_matches('#'));

    let mut incoming = irc
        .incoming
        .take()
        .context("chat connection has no incoming stream")?;

    loop {
        tokio::select! {
            msg = incoming.recv() => {
                let Some(msg) = msg else {
                    warn!("Chat connection closed");
                    break;
                };
                chat.handle_line(&msg.raw_line).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; leaving chat");
                break;
            }
        }
    }

    irc.shutdown();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(BotSettings::default_data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let mut settings = BotSettings::load(&data_dir)?;
    settings.cache_dir = std::env::temp_dir().join("celeste");
    let settings = Arc::new(settings);

    let event_bus = Arc::new(EventBus::new());
    let logger = spawn_event_logger(event_bus.subscribe(None).await);

    let registry = Arc::new(parking_lot::RwLock::new(build_registry(&settings)?));
    let store = Arc::new(ViewerAttributeStore::load(&settings.viewers_path())?);

    let sequencer = RequestSequencer::new(Arc::new(DefaultHttpClient::new()));
    let helix = Arc::new(TwitchHelixClient::new(
        sequencer.clone(),
        &settings.oauth_token,
        &settings.client_id,
    ));
    let icons = Arc::new(IconCache::new(&settings.cache_dir, sequencer, event_bus.clone()));
    match icons.load_badge_urls(&helix).await {
        Ok(count) => info!("Loaded {} badge sets", count),
        Err(e) => warn!("Badge lookup failed; chat badges will be missing: {}", e),
    }

    let files = Arc::new(DirectoryLister);
    let dispatcher = Arc::new(CommandDispatcher::new(DispatchContext {
        registry: registry.clone(),
        event_bus: event_bus.clone(),
        resolver: helix.clone(),
        platform: helix.clone(),
        files: files.clone(),
        vibe: Arc::new(SilentVibeKeeper::default()),
        settings: settings.clone(),
    }));
    let viewers = Arc::new(
        ViewerService::new(
            store.clone(),
            helix.clone(),
            files.clone(),
            event_bus.clone(),
            &settings.broadcaster,
            &settings.arrival_sound,
        )
        .with_raid_interrupt(settings.raid_interrupt()),
    );
    let activity = Arc::new(ActivityClock::new());
    let chat = ChatService::new(
        ChatLineParser::new(icons, settings.text_wall_threshold),
        dispatcher,
        viewers,
        event_bus.clone(),
        activity.clone(),
        &settings,
    );

    let mut tasks = vec![spawn_help_rotation_task(
        registry,
        event_bus.clone(),
        settings.help_cooldown(),
    )];
    let media = inactivity_media(&settings, files.as_ref());
    if media.is_empty() {
        debug!("No portrait video or roasts configured; inactivity playback disabled");
    } else {
        tasks.push(spawn_inactivity_task(
            activity,
            event_bus.clone(),
            media,
            settings.inactivity_cooldown(),
        ));
    }

    let result = match &args.replay {
        Some(path) => replay_file(path, &chat).await,
        None => {
            let channel = args.channel.clone().unwrap_or_else(|| settings.broadcaster.clone());
            if channel.is_empty() {
                Err(anyhow::anyhow!("no channel to join; set a broadcaster or pass --channel"))
            } else {
                run_chat(&settings, &channel, &chat).await
            }
        }
    };

    if let Err(e) = store.save(true) {
        error!("Could not save viewer attributes: {}", e);
    }
    event_bus.shutdown();
    for task in tasks {
        let _ = task.await;
    }
    drop(chat);
    logger.abort();
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Celeste starting. data_dir={:?}, replay={:?}", args.data_dir, args.replay);

    if let Err(e) = run(args).await {
        error!("Celeste stopped: {:?}", e);
        return Err(e);
    }
    Ok(())
}
