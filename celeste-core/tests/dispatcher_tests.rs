// tests/dispatcher_tests.rs

mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use mockall::predicate::eq;
use parking_lot::RwLock;

use celeste_common::models::{ChatEvent, CommandInvocation, CommandRecord, NativeCommandFlag, Privilege};
use celeste_common::traits::PlatformApi;
use celeste_core::Error;
use celeste_core::eventbus::{BotEvent, EventBus};
use celeste_core::services::commands::{CommandDispatcher, CommandRegistry, DispatchContext, DispatchOutcome};
use celeste_core::settings::BotSettings;
use test_utils::{assert_no_event, next_event, FakeFiles, FakeResolver, RecordingVibeKeeper};

mock! {
    Platform {}
    #[async_trait]
    impl PlatformApi for Platform {
        async fn stream_started_at(&self, login: &str) -> Result<Option<DateTime<Utc>>, Error>;
        async fn follow_date(&self, viewer_id: &str, broadcaster_id: &str) -> Result<Option<DateTime<Utc>>, Error>;
        async fn emote_mode(&self, broadcaster_id: &str) -> Result<bool, Error>;
        async fn set_emote_mode(&self, broadcaster_id: &str, enabled: bool) -> Result<(), Error>;
        async fn set_title(&self, broadcaster_id: &str, title: &str) -> Result<(), Error>;
        async fn find_category(&self, name: &str) -> Result<Option<String>, Error>;
        async fn set_category(&self, broadcaster_id: &str, category_id: &str) -> Result<(), Error>;
    }
}

const DOCUMENT: &str = r#"[
    {"command":"intro","type":"announce","path":"intro.wav","message":"hello everyone","aliases":["hi"]},
    {"command":"clip","type":"video","path":"/videos","random":true},
    {"command":"boom","type":"pulsar","message":"flash","protected":true},
    {"command":"uptime","aliases":["up"]}
]"#;

struct Harness {
    dispatcher: CommandDispatcher,
    vibe: Arc<RecordingVibeKeeper>,
    rx: tokio::sync::mpsc::Receiver<BotEvent>,
}

async fn harness(platform: MockPlatform, settings: BotSettings) -> Harness {
    let mut registry = CommandRegistry::new();
    for flag in NativeCommandFlag::ALL {
        registry
            .declare_native(flag.default_name(), flag.description(), flag, flag.protected_by_default())
            .unwrap();
    }
    registry.load_dynamic(serde_json::from_str::<Vec<CommandRecord>>(DOCUMENT).unwrap());

    let event_bus = Arc::new(EventBus::new());
    let rx = event_bus.subscribe(Some(16)).await;
    let vibe = Arc::new(RecordingVibeKeeper::default());
    let files = FakeFiles::with_directory("/videos", &["a.mp4", "notes.txt"]);
    files.directories.write().insert(PathBuf::from("/denied"), vec![PathBuf::from("/denied/nope.mp4")]);

    let ctx = DispatchContext {
        registry: Arc::new(RwLock::new(registry)),
        event_bus,
        resolver: Arc::new(FakeResolver::with_viewers(&["ada", "mod", "streamer", "friend"])),
        platform: Arc::new(platform),
        files: Arc::new(files),
        vibe: vibe.clone(),
        settings: Arc::new(settings),
    };
    Harness {
        dispatcher: CommandDispatcher::new(ctx),
        vibe,
        rx,
    }
}

fn settings() -> BotSettings {
    BotSettings {
        broadcaster: "streamer".into(),
        broadcaster_id: "42".into(),
        denied_command_video: "/denied".into(),
        uptime_history_minutes: 120,
        ..BotSettings::default()
    }
}

fn invocation(name: &str, arguments: &str, login: &str, privilege: Privilege) -> CommandInvocation {
    CommandInvocation {
        name: name.into(),
        arguments: arguments.into(),
        login: login.into(),
        privilege,
    }
}

fn moderator() -> Privilege {
    Privilege { broadcaster: false, moderator: true }
}

async fn run(h: &Harness, invocation: &CommandInvocation) {
    match h.dispatcher.dispatch(invocation, &ChatEvent::default()).await {
        DispatchOutcome::Accepted(handle) => handle.await.unwrap(),
        other => panic!("expected an accepted command, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_command_is_not_handled() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    let outcome = h.dispatcher.dispatch(&invocation("nope", "", "ada", Privilege::default()), &ChatEvent::default()).await;
    assert!(matches!(outcome, DispatchOutcome::NotFound));
    assert!(!outcome.is_handled());
    assert_no_event(&mut h.rx);
}

#[tokio::test]
async fn test_protected_command_denied_for_regular_viewer() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    let outcome = h.dispatcher.dispatch(&invocation("boom", "", "ada", Privilege::default()), &ChatEvent::default()).await;
    assert!(matches!(outcome, DispatchOutcome::Denied));
    assert!(outcome.is_handled());

    match next_event(&mut h.rx).await {
        BotEvent::CommandDenied { command, video } => {
            assert_eq!(command, "boom");
            assert_eq!(video, Some(PathBuf::from("/denied/nope.mp4")));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_no_event(&mut h.rx);
}

#[tokio::test]
async fn test_protected_command_runs_for_moderator_with_argument_message() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("boom", "strobe", "mod", moderator())).await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::Pulse(m) if m == "strobe"));
}

#[tokio::test]
async fn test_alias_behaves_like_parent() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("hi", "", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::PlayAudio { viewer, message, path } => {
            assert_eq!(viewer, "Ada");
            assert_eq!(message, "hello everyone");
            assert_eq!(path, "intro.wav");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_random_video_picks_an_mp4() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("clip", "", "ada", Privilege::default())).await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::PlayVideo(p) if p == PathBuf::from("/videos/a.mp4")));
}

#[tokio::test]
async fn test_unresolved_invoker_has_no_effect() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("intro", "", "stranger", Privilege::default())).await;
    assert_no_event(&mut h.rx);
}

#[tokio::test]
async fn test_agenda_uses_arguments() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("agenda", "Launch day", "mod", moderator())).await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::SetAgenda(a) if a == "Launch day"));
}

#[tokio::test]
async fn test_native_alias_runs_native_routine() {
    let started = Utc::now() - chrono::Duration::seconds(3 * 3600 + 5 * 60 + 30);
    let mut platform = MockPlatform::new();
    platform
        .expect_stream_started_at()
        .with(eq("streamer"))
        .times(1)
        .returning(move |_| Ok(Some(started)));

    let mut h = harness(platform, settings()).await;
    run(&h, &invocation("up", "", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::Uptime { hours, minutes, total, .. } => {
            assert_eq!((hours, minutes), (3, 5));
            assert!(!total);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_totaltime_adds_history() {
    let started = Utc::now() - chrono::Duration::minutes(30);
    let mut platform = MockPlatform::new();
    platform.expect_stream_started_at().returning(move |_| Ok(Some(started)));

    let mut h = harness(platform, settings()).await;
    run(&h, &invocation("totaltime", "", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::Uptime { hours, minutes, total, .. } => {
            assert_eq!((hours, minutes), (2, 30));
            assert!(total);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_followage_reports_duration() {
    let followed = Utc::now() - chrono::Duration::days(400);
    let mut platform = MockPlatform::new();
    platform
        .expect_follow_date()
        .with(eq("1000"), eq("42"))
        .returning(move |_, _| Ok(Some(followed)));

    let mut h = harness(platform, settings()).await;
    run(&h, &invocation("followage", "", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::FollowAge { display_name, years, months, .. } => {
            assert_eq!(display_name, "Ada");
            assert_eq!(years, 1);
            assert_eq!(months, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_emote_toggle_flips_current_mode() {
    let mut platform = MockPlatform::new();
    platform.expect_emote_mode().with(eq("42")).returning(|_| Ok(true));
    platform
        .expect_set_emote_mode()
        .with(eq("42"), eq(false))
        .times(1)
        .returning(|_, _| Ok(()));

    let h = harness(platform, settings()).await;
    run(&h, &invocation("emote", "", "streamer", Privilege { broadcaster: true, moderator: false })).await;
}

#[tokio::test]
async fn test_category_looks_up_then_sets() {
    let mut platform = MockPlatform::new();
    platform
        .expect_find_category()
        .with(eq("Just Chatting"))
        .returning(|_| Ok(Some("509658".into())));
    platform
        .expect_set_category()
        .with(eq("42"), eq("509658"))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut h = harness(platform, settings()).await;
    run(&h, &invocation("category", "Just Chatting", "mod", moderator())).await;
    assert!(matches!(next_event(&mut h.rx).await, BotEvent::SystemMessage(_)));
}

#[tokio::test]
async fn test_shoutout_strips_at_sign() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("so", "@friend", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::Shoutout { display_name, description, profile_image_url } => {
            assert_eq!(display_name, "Friend");
            assert_eq!(description, "friend streams things");
            assert_eq!(profile_image_url, "https://img.test/friend.png");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_vibe_and_volume() {
    let h = harness(MockPlatform::new(), settings()).await;
    let broadcaster = Privilege { broadcaster: true, moderator: false };

    run(&h, &invocation("vibe", "", "streamer", broadcaster)).await;
    assert!(*h.vibe.playing.lock());
    run(&h, &invocation("vibe", "", "streamer", broadcaster)).await;
    assert!(!*h.vibe.playing.lock());

    run(&h, &invocation("volume", "30 5", "streamer", broadcaster)).await;
    run(&h, &invocation("volume", "loud", "streamer", broadcaster)).await;
    assert_eq!(*h.vibe.volume_calls.lock(), vec![(30, Duration::from_secs(5))]);
}

#[tokio::test]
async fn test_commands_lists_public_commands() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    run(&h, &invocation("commands", "", "ada", Privilege::default())).await;
    match next_event(&mut h.rx).await {
        BotEvent::CommandList(listing) => {
            let names: Vec<&str> = listing.iter().map(|l| l.name.as_str()).collect();
            assert!(names.contains(&"intro"));
            assert!(names.contains(&"uptime"));
            assert!(!names.contains(&"boom"));
            assert!(!names.contains(&"agenda"));
            assert!(!names.contains(&"hi"));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_html_echoes_raw_arguments() {
    let mut h = harness(MockPlatform::new(), settings()).await;
    let chat = ChatEvent {
        sender: "Ada".into(),
        color: "#FF0000".into(),
        ..ChatEvent::default()
    };
    let outcome = h.dispatcher.dispatch(&invocation("html", "<b>bold</b>", "ada", Privilege::default()), &chat).await;
    let DispatchOutcome::Accepted(handle) = outcome else { panic!("expected accepted") };
    handle.await.unwrap();

    match next_event(&mut h.rx).await {
        BotEvent::ChatMessage(event) => {
            assert_eq!(event.text, "<b>bold</b>");
            assert_eq!(event.sender, "Ada");
            assert_eq!(event.color, "#FF0000");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_panic_reads_template_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("panic.txt"), "%1 broke it").unwrap();
    let settings = BotSettings {
        data_dir: dir.path().to_path_buf(),
        ..settings()
    };

    let mut h = harness(MockPlatform::new(), settings).await;
    run(&h, &invocation("panic", "", "streamer", Privilege { broadcaster: true, moderator: false })).await;
    match next_event(&mut h.rx).await {
        BotEvent::Panic(text) => {
            assert!(text.ends_with("\nStreamer broke it"));
        }
        other => panic!("unexpected event {:?}", other),
    }
}
