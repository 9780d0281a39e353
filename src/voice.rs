//! Voice channel lookup
//!
//! `VoiceContextProvider` answers two questions for the playback core: which
//! voice channel is the requesting user in, and which connections are open
//! for a guild (so stop can disconnect them).

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{GuildId, UserContext, VoiceContext};
use crate::stream::{Connection, LocalSink};

pub trait VoiceContextProvider: Send + Sync {
    /// Voice channel the user is currently in, if any
    fn current_voice_channel(&self, user: &UserContext) -> Option<VoiceContext>;

    /// Connections currently open for `guild`
    fn active_connections(&self, guild: &GuildId) -> Vec<Arc<dyn Connection>>;
}

/// Voice presence for a terminal session.
///
/// Users sit in a configured voice channel name (the same name in every
/// guild), optionally overridden per user. With no channel configured every
/// request is rejected as coming from outside a voice channel.
pub struct SessionVoice {
    default_channel: Option<String>,
    per_user: HashMap<String, String>,
    sink: Arc<LocalSink>,
}

impl SessionVoice {
    pub fn new(default_channel: Option<String>, sink: Arc<LocalSink>) -> Self {
        Self {
            default_channel,
            per_user: HashMap::new(),
            sink,
        }
    }

    /// Place `user` in `channel` regardless of the default
    pub fn with_user(mut self, user: impl Into<String>, channel: impl Into<String>) -> Self {
        self.per_user.insert(user.into(), channel.into());
        self
    }
}

impl VoiceContextProvider for SessionVoice {
    fn current_voice_channel(&self, user: &UserContext) -> Option<VoiceContext> {
        self.per_user
            .get(&user.user)
            .or(self.default_channel.as_ref())
            .filter(|name| !name.trim().is_empty())
            .map(|name| VoiceContext::new(user.guild().clone(), name.clone()))
    }

    fn active_connections(&self, guild: &GuildId) -> Vec<Arc<dyn Connection>> {
        self.sink.connections(guild)
    }
}
