//! Chat command handlers
//!
//! Parses chat lines into the three verbs the playback core exposes and
//! dispatches each one to its `Player` operation.
//!
//! | Verb              | Operation      |
//! |-------------------|----------------|
//! | `play <locator>`, `p` | `Player::play`  |
//! | `stop`, `s`       | `Player::stop`  |
//! | `queue`           | `Player::queue` |

use clap::Parser;

use crate::api::ResolveError;
use crate::models::UserContext;
use crate::player::{PlayError, PlayOutcome, Player};

/// A chat command, parsed with the verb as the first word
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(multicall = true, disable_help_subcommand = true)]
pub enum ChatCommand {
    /// Queue a track and start playback if idle
    #[command(visible_alias = "p")]
    Play {
        /// URL or video id
        locator: String,
    },
    /// Stop playback and clear the queue
    #[command(visible_alias = "s")]
    Stop,
    /// Show the queue
    Queue,
}

impl ChatCommand {
    /// Parse a chat line. `Ok(None)` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<Self>, clap::Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        Self::try_parse_from(words).map(Some)
    }
}

/// Run one command on behalf of `user`
pub async fn dispatch(
    player: &Player,
    user: &UserContext,
    command: ChatCommand,
) -> Result<Option<PlayOutcome>, PlayError> {
    match command {
        ChatCommand::Play { locator } => player.play(user, &locator).await.map(Some),
        ChatCommand::Stop => {
            player.stop(user.guild()).await;
            Ok(None)
        }
        ChatCommand::Queue => {
            player.queue(&user.channel).await;
            Ok(None)
        }
    }
}

/// User-facing text for a failed play, or `None` when the player already
/// told the channel.
pub fn failure_message(err: &PlayError) -> Option<String> {
    match err {
        PlayError::NoVoiceChannel => None,
        PlayError::Resolve(ResolveError::NotFound(locator)) => {
            Some(format!("Could not find anything to play for \"{}\".", locator))
        }
        PlayError::Resolve(e) => Some(format!("Lookup failed: {}", e)),
        PlayError::Sink(e) => Some(format!("Could not start playback: {}", e)),
    }
}
