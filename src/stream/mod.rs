//! Audio output
//!
//! - `AudioSink` / `Connection` / `StreamHandle`: what the playback core needs
//!   from whatever carries audio into a voice channel
//! - Player: mpv/VLC subprocess launcher
//! - Sink: local implementation of the traits on top of the player

pub mod player;
pub mod sink;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{QualityHint, VoiceContext};

pub use player::{LocalPlayer, PlayerType};
pub use sink::{LocalConnection, LocalSink, LocalStream};

/// Errors from joining a voice channel or starting a stream
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Cannot join voice channel: {0}")]
    NoAccess(String),
    #[error("Player '{0}' not found. Install it first.")]
    PlayerNotFound(String),
    #[error("Failed to start stream: {0}")]
    StartFailed(#[from] std::io::Error),
}

/// One in-progress audio transmission, whatever the transport
#[async_trait]
pub trait StreamHandle: Send + Sync {
    /// Resolves once the stream has ended, naturally or through `dispose`
    async fn ended(&self);

    /// Stop transmitting and release the stream
    fn dispose(&self);
}

/// A joined voice channel. Carries at most one active stream at a time.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn play(
        &self,
        url: &str,
        quality: QualityHint,
    ) -> Result<Arc<dyn StreamHandle>, SinkError>;

    async fn disconnect(&self);
}

/// Entry point for getting audio into a voice channel
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn acquire_connection(
        &self,
        voice: &VoiceContext,
    ) -> Result<Arc<dyn Connection>, SinkError>;
}
