//! Local Player - VLC/mpv audio playback
//!
//! Launches a headless VLC or mpv process for one stream URL.

use std::process::Stdio;
use tokio::process::{Child, Command};

use super::SinkError;
use crate::models::QualityHint;

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv media player (default)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Parse a player name as written in config or on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mpv" => Some(PlayerType::Mpv),
            "vlc" | "cvlc" => Some(PlayerType::Vlc),
            _ => None,
        }
    }

    /// Arguments for headless audio-only playback of `url`
    pub fn args(&self, url: &str, quality: QualityHint) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            PlayerType::Mpv => {
                args.push("--no-video".to_string());
                args.push("--really-quiet".to_string());
                if quality == QualityHint::Highest {
                    args.push("--ytdl-format=bestaudio/best".to_string());
                }
            }
            PlayerType::Vlc => {
                args.push("--intf=dummy".to_string());
                args.push("--play-and-exit".to_string());
                args.push("--no-video".to_string());
                if quality == QualityHint::Highest {
                    args.push("--preferred-resolution=-1".to_string());
                }
            }
        }
        args.push(url.to_string());
        args
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Local player process launcher
#[derive(Debug, Clone, Copy)]
pub struct LocalPlayer {
    player_type: PlayerType,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self { player_type }
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Start playing `url`. The returned child exits when the track ends.
    pub fn spawn(&self, url: &str, quality: QualityHint) -> Result<Child, SinkError> {
        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.player_type.args(url, quality))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Own process group: a terminal Ctrl-C reaches us, not the player,
        // so shutdown goes through stop() and dispose.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SinkError::PlayerNotFound(self.player_type.command().to_string())
            } else {
                SinkError::StartFailed(e)
            }
        })
    }
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self::new(PlayerType::default())
    }
}
