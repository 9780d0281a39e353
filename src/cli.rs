//! CLI - Command Line Interface for guildplay
//!
//! Without a subcommand guildplay reads chat commands from stdin, one per
//! line, as if they were typed into a guild's text channel.
//!
//! # Examples
//!
//! ```bash
//! # Interactive session in guild "home", listening from voice channel "Lounge"
//! guildplay --guild home --voice-channel Lounge
//! > play https://youtu.be/dQw4w9WgXcQ
//! > queue
//! > stop
//!
//! # Queue several tracks and exit when the queue is finished
//! guildplay play dQw4w9WgXcQ https://youtu.be/9bZkp7q19f0
//!
//! # Resolve a locator without playing it
//! guildplay resolve https://youtu.be/dQw4w9WgXcQ --json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::stream::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    // 2 is clap's usage error
    /// Network error
    NetworkError = 3,
    /// Locator could not be resolved
    NotFound = 4,
    /// Not in a voice channel
    NoVoiceChannel = 5,
    /// Audio output could not be started
    SinkFailed = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// guildplay - per-guild media queue player
///
/// Run without arguments for an interactive chat session.
/// Use subcommands for scripting.
#[derive(Parser, Debug)]
#[command(
    name = "guildplay",
    version,
    about = "Per-guild media queue player",
    long_about = "Queues media per guild and plays it track after track.\n\n\
                  Run without arguments to type chat commands \
                  (play/p, stop/s, queue) on stdin.",
    after_help = "EXAMPLES:\n\
                  guildplay -g home -v Lounge          Interactive session\n\
                  guildplay play dQw4w9WgXcQ           Play until the queue ends\n\
                  guildplay resolve dQw4w9WgXcQ -j     Resolve a locator"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Guild the session acts in
    #[arg(long, short = 'g', global = true)]
    pub guild: Option<String>,

    /// Voice channel the session user is in
    #[arg(long, short = 'v', global = true)]
    pub voice_channel: Option<String>,

    /// Local player used for audio output
    #[arg(long, short = 'p', global = true, value_enum)]
    pub player: Option<PlayerChoice>,

    /// Seconds to pause between tracks
    #[arg(long, global = true)]
    pub grace_delay: Option<u64>,

    /// Log filter (e.g. "debug", "guildplay=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to run (omit for an interactive session)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read chat commands from stdin (default)
    Repl,

    /// Queue locators and play until the queue is finished
    #[command(visible_alias = "p")]
    Play(PlayCmd),

    /// Resolve a locator to its title and canonical URL
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),
}

/// Queue and play one or more locators
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Locators (URLs or video ids), played in order
    #[arg(required = true)]
    pub locators: Vec<String>,
}

/// Resolve a locator without playing it
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Locator (URL or video id)
    #[arg(required = true)]
    pub locator: String,
}

/// Player choice for audio output
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerChoice {
    /// mpv media player (default)
    Mpv,
    /// VLC media player
    Vlc,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Mpv => PlayerType::Mpv,
            PlayerChoice::Vlc => PlayerType::Vlc,
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

/// Envelope for JSON output
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
