//! guildplay - per-guild media queue player
//!
//! Tracks an ordered queue of requested tracks per guild, plays them one
//! after another through an audio sink, and advances automatically when a
//! track ends.
//!
//! # Modules
//!
//! - `playlist` - Per-guild queue state machine
//! - `observable` - Single-slot publish/subscribe cell
//! - `registry` - Guild → playlist map
//! - `player` - play/stop/queue and advance-on-completion
//! - `api` - Media resolution (YouTube oEmbed)
//! - `stream` - Audio sink traits and the local mpv/VLC sink
//! - `voice` - Voice channel presence
//! - `notify` - Status message delivery
//! - `commands` - Chat command parsing and dispatch
//! - `app`, `cli`, `config`, `logging` - Binary plumbing

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod notify;
pub mod observable;
pub mod player;
pub mod playlist;
pub mod registry;
pub mod stream;
pub mod voice;

// Re-export commonly used types
pub use models::{
    ChannelContext, GuildId, NowPlaying, QualityHint, ResolvedMedia, Song, UserContext,
    VoiceContext,
};

pub use api::{MediaResolver, OEmbedResolver, ResolveError};
pub use notify::{ConsoleNotifier, Notifier};
pub use observable::Observable;
pub use player::{PlayError, PlayOutcome, Player, PlaylistSnapshot};
pub use playlist::{Advance, EnqueueOutcome, Playlist, PlaylistState};
pub use registry::PlaylistRegistry;
pub use stream::{AudioSink, Connection, SinkError, StreamHandle};
pub use voice::VoiceContextProvider;
