//! Session state and wiring
//!
//! Builds the `Player` with its local collaborators from config and CLI
//! flags, and tracks which guild the terminal user is currently acting in.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::{MediaResolver, OEmbedResolver};
use crate::commands::{self, ChatCommand};
use crate::config::Config;
use crate::models::{ChannelContext, GuildId, UserContext};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::player::Player;
use crate::registry::PlaylistRegistry;
use crate::stream::{LocalPlayer, LocalSink, PlayerType};
use crate::voice::SessionVoice;

/// Effective settings after merging CLI flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub guild: String,
    pub text_channel: String,
    pub user: String,
    pub voice_channel: Option<String>,
    pub player: PlayerType,
    pub grace_delay: Duration,
    pub resolver_url: String,
    pub json: bool,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            guild: config.guild().to_string(),
            text_channel: config.text_channel().to_string(),
            user: config.user(),
            voice_channel: config.voice_channel.clone(),
            player: config.player_type(),
            grace_delay: config.grace_delay(),
            resolver_url: config.resolver_url().to_string(),
            json: false,
        }
    }
}

/// What the session should do after a line was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineResult {
    Continue,
    Quit,
}

/// An interactive session: one user, one active guild at a time
pub struct App {
    player: Player,
    notifier: Arc<dyn Notifier>,
    user: UserContext,
}

impl App {
    /// Wire the player with the local resolver, sink and voice presence
    pub fn new(settings: &Settings) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new(settings.json));
        let sink = Arc::new(LocalSink::new(LocalPlayer::new(settings.player)));
        let voice = Arc::new(SessionVoice::new(settings.voice_channel.clone(), sink.clone()));
        let resolver: Arc<dyn MediaResolver> =
            Arc::new(OEmbedResolver::with_base_url(settings.resolver_url.clone()));

        let player = Player::new(
            Arc::new(PlaylistRegistry::new()),
            resolver,
            sink,
            voice,
            notifier.clone(),
        )
        .with_grace_delay(settings.grace_delay);

        let user = UserContext::new(
            settings.user.clone(),
            ChannelContext::new(settings.guild.as_str(), settings.text_channel.clone()),
        );
        Self::with_player(player, notifier, user)
    }

    /// Session over an already wired player
    pub fn with_player(player: Player, notifier: Arc<dyn Notifier>, user: UserContext) -> Self {
        Self {
            player,
            notifier,
            user,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn guild(&self) -> &GuildId {
        self.user.guild()
    }

    /// Act in another guild from now on. Playback elsewhere continues.
    pub fn switch_guild(&mut self, guild: impl Into<GuildId>) {
        self.user.channel.guild = guild.into();
        debug!(guild = %self.user.channel.guild, "switched guild");
    }

    /// Handle one line of input: session verbs first, then chat commands
    pub async fn handle_line(&mut self, line: &str) -> LineResult {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("quit" | "exit"), None, _) => return LineResult::Quit,
            (Some("guild"), Some(guild), None) => {
                self.switch_guild(guild);
                return LineResult::Continue;
            }
            _ => {}
        }

        match ChatCommand::parse_line(line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                if let Err(e) = commands::dispatch(&self.player, &self.user, command).await {
                    if let Some(msg) = commands::failure_message(&e) {
                        self.notifier.send(&self.user.channel, &msg);
                    }
                }
            }
            Err(e) => {
                let msg = e.render().to_string();
                self.notifier.send(&self.user.channel, msg.trim_end());
            }
        }
        LineResult::Continue
    }
}
