//! Configuration management for guildplay
//!
//! Config is stored at ~/.config/guildplay/config.toml. Every field is
//! optional; command line flags take precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::oembed::DEFAULT_BASE_URL;
use crate::player::GRACE_DELAY;
use crate::stream::PlayerType;

pub const DEFAULT_GUILD: &str = "local";
pub const DEFAULT_TEXT_CHANNEL: &str = "general";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Guild the session acts in
    pub guild: Option<String>,
    /// Voice channel the session user is in
    pub voice_channel: Option<String>,
    /// Text channel notifications are addressed to
    pub text_channel: Option<String>,
    /// Session user name
    pub user: Option<String>,
    /// Local player (mpv, vlc)
    pub player: Option<String>,
    /// Pause between tracks, in seconds
    pub grace_delay_secs: Option<u64>,
    /// Base URL of the oEmbed endpoint
    pub resolver_url: Option<String>,
    /// Log filter
    pub log_level: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/guildplay/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("guildplay").join("config.toml"))
    }

    /// Load config from the default location, or defaults if not found
    pub fn load() -> Self {
        Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    /// Load config from `path`, or defaults if missing or unparsable
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn guild(&self) -> &str {
        self.guild.as_deref().unwrap_or(DEFAULT_GUILD)
    }

    pub fn text_channel(&self) -> &str {
        self.text_channel.as_deref().unwrap_or(DEFAULT_TEXT_CHANNEL)
    }

    /// Session user name, falling back to $USER
    pub fn user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "listener".to_string())
    }

    /// Configured player, mpv if unset or unknown
    pub fn player_type(&self) -> PlayerType {
        self.player
            .as_deref()
            .and_then(PlayerType::from_name)
            .unwrap_or_default()
    }

    pub fn grace_delay(&self) -> Duration {
        self.grace_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(GRACE_DELAY)
    }

    pub fn resolver_url(&self) -> &str {
        self.resolver_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
