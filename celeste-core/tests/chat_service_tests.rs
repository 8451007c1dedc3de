// tests/chat_service_tests.rs

mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use celeste_common::models::{NativeCommandFlag, ViewerAttributes};
use celeste_core::eventbus::{BotEvent, EventBus};
use celeste_core::services::chat::{ChatLineParser, ChatService, LineOutcome, CRASH_REWARD_TITLE};
use celeste_core::services::commands::{CommandDispatcher, CommandRegistry, DispatchContext, DispatchOutcome};
use celeste_core::services::viewer_service::{ViewerAttributeStore, ViewerService};
use celeste_core::settings::BotSettings;
use celeste_core::tasks::ActivityClock;
use test_utils::{assert_no_event, next_event, tag_line, FakeFiles, FakeIcons, FakeResolver, RecordingVibeKeeper};

struct NoPlatform;

#[async_trait::async_trait]
impl celeste_common::traits::PlatformApi for NoPlatform {
    async fn stream_started_at(&self, _: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>, celeste_core::Error> {
        Ok(None)
    }
    async fn follow_date(&self, _: &str, _: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>, celeste_core::Error> {
        Ok(None)
    }
    async fn emote_mode(&self, _: &str) -> Result<bool, celeste_core::Error> {
        Ok(false)
    }
    async fn set_emote_mode(&self, _: &str, _: bool) -> Result<(), celeste_core::Error> {
        Ok(())
    }
    async fn set_title(&self, _: &str, _: &str) -> Result<(), celeste_core::Error> {
        Ok(())
    }
    async fn find_category(&self, _: &str) -> Result<Option<String>, celeste_core::Error> {
        Ok(None)
    }
    async fn set_category(&self, _: &str, _: &str) -> Result<(), celeste_core::Error> {
        Ok(())
    }
}

struct Harness {
    service: ChatService,
    store: Arc<ViewerAttributeStore>,
    vibe: Arc<RecordingVibeKeeper>,
    rx: mpsc::Receiver<BotEvent>,
    dir: tempfile::TempDir,
}

async fn harness(arrival_sound: &str, text_wall_threshold: usize) -> Harness {
    harness_with(|settings| {
        settings.arrival_sound = arrival_sound.into();
        settings.text_wall_threshold = text_wall_threshold;
    })
    .await
}

async fn harness_with(configure: impl FnOnce(&mut BotSettings)) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = BotSettings {
        broadcaster: "streamer".into(),
        broadcaster_id: "42".into(),
        host_sound: "host.wav".into(),
        text_wall_sound: "wall.wav".into(),
        data_dir: dir.path().to_path_buf(),
        ..BotSettings::default()
    };
    configure(&mut settings);

    let mut registry = CommandRegistry::new();
    for flag in [NativeCommandFlag::Agenda, NativeCommandFlag::Song] {
        registry
            .declare_native(flag.default_name(), flag.description(), flag, flag.protected_by_default())
            .unwrap();
    }

    let event_bus = Arc::new(EventBus::new());
    let rx = event_bus.subscribe(Some(32)).await;
    let resolver = Arc::new(FakeResolver::with_viewers(&["ada", "bob", "streamer"]));
    let files = Arc::new(FakeFiles::default());
    let store = Arc::new(ViewerAttributeStore::new(&settings.viewers_path()));
    let vibe = Arc::new(RecordingVibeKeeper::default());

    let dispatcher = Arc::new(CommandDispatcher::new(DispatchContext {
        registry: Arc::new(RwLock::new(registry)),
        event_bus: event_bus.clone(),
        resolver: resolver.clone(),
        platform: Arc::new(NoPlatform),
        files: files.clone(),
        vibe: vibe.clone(),
        settings: Arc::new(settings.clone()),
    }));
    let viewers = Arc::new(
        ViewerService::new(
            store.clone(),
            resolver,
            files,
            event_bus.clone(),
            &settings.broadcaster,
            &settings.arrival_sound,
        )
        .with_raid_interrupt(settings.raid_interrupt()),
    );
    let parser = ChatLineParser::new(
        Arc::new(FakeIcons::with_badges(&[("moderator", "1"), ("broadcaster", "1")])),
        settings.text_wall_threshold,
    );
    let service = ChatService::new(parser, dispatcher, viewers, event_bus, Arc::new(ActivityClock::new()), &settings);

    Harness { service, store, vibe, rx, dir }
}

#[tokio::test]
async fn test_command_line_is_consumed() {
    let mut h = harness("", 400).await;
    let line = tag_line("display-name=Ada;color=#FF0000;badges=moderator/1", "ada", "!agenda Launch day");

    match h.service.handle_line(&line).await {
        LineOutcome::Command(DispatchOutcome::Accepted(handle)) => handle.await.unwrap(),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::SetAgenda(a) if a == "Launch day"));
    assert_no_event(&mut h.rx);
}

#[tokio::test]
async fn test_unknown_command_is_shown_as_chat() {
    let mut h = harness("", 400).await;
    let outcome = h.service.handle_line(&tag_line("display-name=Ada", "ada", "!nothing here")).await;
    assert!(matches!(outcome, LineOutcome::Displayed { wall_of_text: false, .. }));
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::ChatMessage(e) if e.text == "!nothing here"));
}

#[tokio::test]
async fn test_viewer_without_command_rights_is_shown_as_chat() {
    let mut h = harness("", 400).await;
    h.store.set("bob", ViewerAttributes { commands: false, ..ViewerAttributes::default() });

    let outcome = h.service.handle_line(&tag_line("display-name=Bob", "bob", "!song")).await;
    assert!(matches!(outcome, LineOutcome::Displayed { .. }));
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::ChatMessage(_)));
}

#[tokio::test]
async fn test_line_without_hostmask_is_dropped() {
    let mut h = harness("", 400).await;
    assert!(matches!(h.service.handle_line("@badges= badtag text").await, LineOutcome::Rejected));
    assert_no_event(&mut h.rx);
}

#[tokio::test]
async fn test_host_notification_is_announced() {
    let mut h = harness("", 400).await;
    let line = ":jtv!jtv@jtv.tmi.twitch.tv PRIVMSG #channel :Raider is now hosting you.";
    assert!(matches!(h.service.handle_line(line).await, LineOutcome::Notification));
    match next_event(&mut h.rx).await {
        BotEvent::Host { host, sound } => {
            assert_eq!(host, "Raider");
            assert_eq!(sound, "host.wav");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_wall_of_text_is_announced_before_the_message() {
    let mut h = harness("", 5).await;
    h.service.handle_line(&tag_line("display-name=Ada", "ada", "this is far too long")).await;

    match next_event(&mut h.rx).await {
        BotEvent::TextWall { message, sound } => {
            assert_eq!(message, "this is far too long");
            assert_eq!(sound, "wall.wav");
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::ChatMessage(_)));
}

#[tokio::test]
async fn test_first_message_triggers_one_arrival() {
    let mut h = harness("arrive.wav", 400).await;

    let arrival = match h.service.handle_line(&tag_line("display-name=Ada", "ada", "hello")).await {
        LineOutcome::Displayed { arrival: Some(handle), .. } => handle,
        other => panic!("unexpected outcome {:?}", other),
    };
    arrival.await.unwrap();

    let mut arrivals = 0;
    let mut chats = 0;
    for _ in 0..2 {
        match next_event(&mut h.rx).await {
            BotEvent::Arrival { display_name, sound, .. } => {
                assert_eq!(display_name, "Ada");
                assert_eq!(sound, PathBuf::from("arrive.wav"));
                arrivals += 1;
            }
            BotEvent::ChatMessage(_) => chats += 1,
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!((arrivals, chats), (1, 1));
    assert!(h.store.get("ada").unwrap().welcomed);

    let again = h.service.handle_line(&tag_line("display-name=Ada", "ada", "me again")).await;
    assert!(matches!(again, LineOutcome::Displayed { arrival: None, .. }));
}

#[tokio::test]
async fn test_broadcaster_is_never_welcomed() {
    let h = harness("arrive.wav", 400).await;
    let outcome = h
        .service
        .handle_line(&tag_line("display-name=Streamer;badges=broadcaster/1", "streamer", "hi chat"))
        .await;
    assert!(matches!(outcome, LineOutcome::Displayed { arrival: None, .. }));
}

#[tokio::test]
async fn test_crash_reward_panics_and_stops_music() {
    let mut h = harness("", 400).await;
    std::fs::write(h.dir.path().join("panic.txt"), "taken down by %1").unwrap();
    *h.vibe.playing.lock() = true;

    h.service.redemption("Ada", CRASH_REWARD_TITLE, "").await;

    match next_event(&mut h.rx).await {
        BotEvent::Panic(text) => assert!(text.ends_with("taken down by Ada")),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(!*h.vibe.playing.lock());
}

#[tokio::test]
async fn test_other_rewards_are_announced() {
    let mut h = harness("", 400).await;
    *h.vibe.playing.lock() = true;

    h.service.redemption("Ada", "Hydrate", "drink water").await;

    match next_event(&mut h.rx).await {
        BotEvent::Redemption { viewer, reward, message } => {
            assert_eq!((viewer.as_str(), reward.as_str(), message.as_str()), ("Ada", "Hydrate", "drink water"));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(*h.vibe.playing.lock());
}

#[tokio::test]
async fn test_subscription_needs_a_sound() {
    let mut h = harness("", 400).await;
    h.service.subscription("Ada").await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::SystemMessage(_)));

    let mut h = harness_with(|s| s.subscription_sound = "sub.wav".into()).await;
    h.service.subscription("Ada").await;
    match next_event(&mut h.rx).await {
        BotEvent::Subscription { viewer, sound } => {
            assert_eq!(viewer, "Ada");
            assert_eq!(sound, "sub.wav");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_cheer_needs_a_video() {
    let mut h = harness("", 400).await;
    h.service.cheer("Ada", 100, "cheer100 nice").await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::SystemMessage(_)));

    let mut h = harness_with(|s| s.cheer_video = "cheer.mp4".into()).await;
    h.service.cheer("Ada", 100, "cheer100 nice").await;
    match next_event(&mut h.rx).await {
        BotEvent::Cheer { viewer, count, message, video } => {
            assert_eq!(viewer, "Ada");
            assert_eq!(count, 100);
            assert_eq!(message, "cheer100 nice");
            assert_eq!(video, "cheer.mp4");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_raid_quiets_arrivals_for_the_interrupt_period() {
    let mut h = harness_with(|s| {
        s.arrival_sound = "arrive.wav".into();
        s.raid_sound = "raid.wav".into();
        s.raid_interrupt_ms = 60_000;
    })
    .await;

    h.service.raid("Raider", 12).await;
    match next_event(&mut h.rx).await {
        BotEvent::Raid { viewer, viewers, sound } => {
            assert_eq!((viewer.as_str(), viewers, sound.as_str()), ("Raider", 12, "raid.wav"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    let arrival = match h.service.handle_line(&tag_line("display-name=Ada", "ada", "hi raiders")).await {
        LineOutcome::Displayed { arrival: Some(handle), .. } => handle,
        other => panic!("unexpected outcome {:?}", other),
    };
    arrival.await.unwrap();
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::ChatMessage(_)));
    assert_no_event(&mut h.rx);
    assert!(!h.store.get("ada").unwrap().welcomed);

    tokio::time::advance(std::time::Duration::from_secs(61)).await;

    let arrival = match h.service.handle_line(&tag_line("display-name=Ada", "ada", "still here")).await {
        LineOutcome::Displayed { arrival: Some(handle), .. } => handle,
        other => panic!("unexpected outcome {:?}", other),
    };
    arrival.await.unwrap();
    let mut arrived = false;
    for _ in 0..2 {
        if let BotEvent::Arrival { display_name, .. } = next_event(&mut h.rx).await {
            assert_eq!(display_name, "Ada");
            arrived = true;
        }
    }
    assert!(arrived);
    assert!(h.store.get("ada").unwrap().welcomed);
}

#[tokio::test]
async fn test_music_ducks_and_restores() {
    let h = harness("", 400).await;
    h.service.suppress_music();
    h.service.restore_music();
    assert_eq!(*h.vibe.ducked.lock(), vec![true, false]);
}

