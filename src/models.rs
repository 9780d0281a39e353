//! Data structures shared across guildplay
//!
//! Organized by domain:
//! - **Identity**: guild, user and channel scopes a request arrives from
//! - **Media**: resolved media and the songs queued from it
//! - **Playback**: quality hints and the value published while a track plays

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::stream::StreamHandle;

// =============================================================================
// Identity
// =============================================================================

/// Guild (community/workspace) identifier. Exactly one queue exists per guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(pub String);

impl GuildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuildId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Text channel a request came from; status messages go back here
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelContext {
    pub guild: GuildId,
    pub channel: String,
}

impl ChannelContext {
    pub fn new(guild: impl Into<GuildId>, channel: impl Into<String>) -> Self {
        Self {
            guild: guild.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for ChannelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.guild, self.channel)
    }
}

/// The user issuing a command, and where they issued it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user: String,
    pub channel: ChannelContext,
}

impl UserContext {
    pub fn new(user: impl Into<String>, channel: ChannelContext) -> Self {
        Self {
            user: user.into(),
            channel,
        }
    }

    pub fn guild(&self) -> &GuildId {
        &self.channel.guild
    }
}

/// A voice-capable channel audio can be streamed into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceContext {
    pub guild: GuildId,
    pub channel: String,
}

impl VoiceContext {
    pub fn new(guild: impl Into<GuildId>, channel: impl Into<String>) -> Self {
        Self {
            guild: guild.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for VoiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 🔊{}", self.guild, self.channel)
    }
}

// =============================================================================
// Media
// =============================================================================

/// Result of resolving a user-supplied locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub title: String,
    pub canonical_url: String,
}

/// A queued track. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub url: String,
}

impl Song {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl From<ResolvedMedia> for Song {
    fn from(media: ResolvedMedia) -> Self {
        Self {
            title: media.title,
            url: media.canonical_url,
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.title)
    }
}

// =============================================================================
// Playback
// =============================================================================

/// Quality requested from the sink when starting a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityHint {
    /// Whatever the sink picks
    #[default]
    Default,
    /// Highest available audio quality
    Highest,
}

impl fmt::Display for QualityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityHint::Default => write!(f, "default"),
            QualityHint::Highest => write!(f, "highest"),
        }
    }
}

/// Value held by a playlist's observable while a track is streaming
#[derive(Clone)]
pub struct NowPlaying {
    pub song: Song,
    pub stream: Arc<dyn StreamHandle>,
}

impl fmt::Debug for NowPlaying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NowPlaying")
            .field("song", &self.song)
            .finish_non_exhaustive()
    }
}
