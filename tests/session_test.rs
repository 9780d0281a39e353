//! Chat Session Tests
//!
//! End-to-end flows through `App::handle_line`: chat text in, status
//! messages out, with the sink and resolver mocked.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use clap::Parser;
use guildplay::app::{App, LineResult};
use guildplay::cli::{Cli, Command};
use guildplay::commands::ChatCommand;
use guildplay::{
    AudioSink, ChannelContext, Connection, GuildId, MediaResolver, Notifier, Player,
    PlaylistRegistry, QualityHint, ResolveError, ResolvedMedia, SinkError, StreamHandle,
    UserContext, VoiceContext, VoiceContextProvider,
};

// =============================================================================
// Test Doubles
// =============================================================================

struct Track {
    done: watch::Sender<bool>,
}

#[async_trait]
impl StreamHandle for Track {
    async fn ended(&self) {
        let _ = self.done.subscribe().wait_for(|d| *d).await;
    }

    fn dispose(&self) {
        self.done.send_replace(true);
    }
}

#[derive(Default)]
struct Speaker {
    tracks: Mutex<Vec<Arc<Track>>>,
    disconnects: AtomicUsize,
}

impl Speaker {
    fn end_track(&self, index: usize) {
        self.tracks.lock().unwrap()[index].done.send_replace(true);
    }
}

#[async_trait]
impl Connection for Speaker {
    async fn play(&self, _url: &str, _q: QualityHint) -> Result<Arc<dyn StreamHandle>, SinkError> {
        let track = Arc::new(Track {
            done: watch::channel(false).0,
        });
        self.tracks.lock().unwrap().push(track.clone());
        Ok(track)
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

struct SpeakerSink(Arc<Speaker>);

#[async_trait]
impl AudioSink for SpeakerSink {
    async fn acquire_connection(&self, _v: &VoiceContext) -> Result<Arc<dyn Connection>, SinkError> {
        Ok(self.0.clone())
    }
}

struct InLounge(Arc<Speaker>);

impl VoiceContextProvider for InLounge {
    fn current_voice_channel(&self, user: &UserContext) -> Option<VoiceContext> {
        (user.user != "lurker").then(|| VoiceContext::new(user.guild().clone(), "Lounge"))
    }

    fn active_connections(&self, _guild: &GuildId) -> Vec<Arc<dyn Connection>> {
        vec![self.0.clone()]
    }
}

struct Titles;

#[async_trait]
impl MediaResolver for Titles {
    async fn resolve(&self, locator: &str) -> Result<ResolvedMedia, ResolveError> {
        match locator {
            "rick" => Ok(ResolvedMedia {
                title: "Never Gonna Give You Up".into(),
                canonical_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
            }),
            "psy" => Ok(ResolvedMedia {
                title: "Gangnam Style".into(),
                canonical_url: "https://www.youtube.com/watch?v=9bZkp7q19f0".into(),
            }),
            other => Err(ResolveError::NotFound(other.to_string())),
        }
    }
}

#[derive(Default)]
struct Chat {
    lines: Mutex<Vec<String>>,
}

impl Chat {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Notifier for Chat {
    fn send(&self, _channel: &ChannelContext, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

fn session(user: &str) -> (App, Arc<Speaker>, Arc<Chat>) {
    let speaker = Arc::new(Speaker::default());
    let chat = Arc::new(Chat::default());
    let player = Player::new(
        Arc::new(PlaylistRegistry::new()),
        Arc::new(Titles),
        Arc::new(SpeakerSink(speaker.clone())),
        Arc::new(InLounge(speaker.clone())),
        chat.clone(),
    );
    let user = UserContext::new(user, ChannelContext::new("home", "music"));
    (App::with_player(player, chat.clone(), user), speaker, chat)
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_play_queue_finish_flow() {
    let (mut app, speaker, chat) = session("alice");

    app.handle_line("play rick").await;
    app.handle_line("p psy").await;
    app.handle_line("queue").await;

    speaker.end_track(0);
    tokio::time::sleep(Duration::from_secs(4)).await;
    speaker.end_track(1);
    tokio::time::sleep(Duration::from_secs(4)).await;

    assert_eq!(
        chat.lines(),
        vec![
            "Now playing: \"Never Gonna Give You Up\".",
            "Added to queue: \"Gangnam Style\"",
            "=======================\n1 Never Gonna Give You Up\n=======================\n2: Gangnam Style",
            "\"Never Gonna Give You Up\" has finished.",
            "Now playing: \"Gangnam Style\".",
            "\"Gangnam Style\" has finished.",
        ]
    );
    assert_eq!(speaker.disconnects.load(Ordering::SeqCst), 1);
    assert!(app.player().snapshot(app.guild()).await.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_stop_alias_clears_queue() {
    let (mut app, speaker, chat) = session("alice");

    app.handle_line("p rick").await;
    app.handle_line("p psy").await;
    app.handle_line("s").await;
    app.handle_line("queue").await;

    assert_eq!(chat.lines().last().map(String::as_str), Some("The queue is empty."));
    assert_eq!(speaker.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_user_outside_voice_channel() {
    let (mut app, speaker, chat) = session("lurker");

    app.handle_line("play rick").await;

    assert_eq!(
        chat.lines(),
        vec!["You need to be in a voice channel to use this command."]
    );
    assert!(speaker.tracks.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_locator_is_reported() {
    let (mut app, _speaker, chat) = session("alice");

    app.handle_line("play nothing-here").await;

    assert_eq!(
        chat.lines(),
        vec!["Could not find anything to play for \"nothing-here\"."]
    );
}

#[tokio::test(start_paused = true)]
async fn test_bad_command_gets_usage_reply() {
    let (mut app, _speaker, chat) = session("alice");

    assert_eq!(app.handle_line("skip").await, LineResult::Continue);
    assert_eq!(app.handle_line("").await, LineResult::Continue);

    let lines = chat.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("skip"));
}

#[tokio::test(start_paused = true)]
async fn test_guild_switch_keeps_queues_apart() {
    let (mut app, _speaker, _chat) = session("alice");

    app.handle_line("play rick").await;
    app.handle_line("guild away").await;
    app.handle_line("play psy").await;

    let home = app.player().snapshot(&GuildId::new("home")).await;
    let away = app.player().snapshot(&GuildId::new("away")).await;
    assert_eq!(home.songs.len(), 1);
    assert_eq!(away.songs.len(), 1);
    assert_eq!(away.songs[0].title, "Gangnam Style");
    assert_eq!(app.handle_line("exit").await, LineResult::Quit);
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_chat_verbs() {
    assert_eq!(
        ChatCommand::parse_line("p rick").unwrap(),
        Some(ChatCommand::Play {
            locator: "rick".into()
        })
    );
    assert_eq!(ChatCommand::parse_line("queue").unwrap(), Some(ChatCommand::Queue));
    assert!(ChatCommand::parse_line("volume 11").is_err());
}

#[test]
fn test_cli_defaults_to_repl() {
    let cli = Cli::parse_from(["guildplay", "-g", "home"]);
    assert!(cli.command.is_none());
    let cli = Cli::parse_from(["guildplay", "resolve", "rick"]);
    assert!(matches!(cli.command, Some(Command::Resolve(_))));
}
