//! Local audio sink
//!
//! Treats the machine's own audio output as the voice channel: one
//! connection per guild, each stream a player subprocess.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::process::Child;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AudioSink, Connection, LocalPlayer, SinkError, StreamHandle};
use crate::models::{GuildId, QualityHint, VoiceContext};

type ConnectionTable = Arc<Mutex<HashMap<GuildId, Arc<LocalConnection>>>>;

/// A running player process
pub struct LocalStream {
    id: Uuid,
    finished: watch::Receiver<bool>,
    kill: Mutex<Option<oneshot::Sender<()>>>,
}

impl LocalStream {
    /// Supervise `child` until it exits or the stream is disposed
    pub fn spawn(mut child: Child) -> Self {
        let id = Uuid::new_v4();
        let (done_tx, done_rx) = watch::channel(false);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    debug!(stream = %id, ?status, "player exited");
                }
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        warn!(stream = %id, "failed to kill player: {}", e);
                    }
                }
            }
            let _ = done_tx.send(true);
        });

        Self {
            id,
            finished: done_rx,
            kill: Mutex::new(Some(kill_tx)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }
}

#[async_trait]
impl StreamHandle for LocalStream {
    async fn ended(&self) {
        let mut finished = self.finished.clone();
        let _ = finished.wait_for(|done| *done).await;
    }

    fn dispose(&self) {
        let kill = self
            .kill
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(kill) = kill {
            debug!(stream = %self.id, "dispose");
            let _ = kill.send(());
        }
    }
}

/// The local output, joined on behalf of one guild
pub struct LocalConnection {
    voice: VoiceContext,
    player: LocalPlayer,
    streams: Mutex<Vec<Arc<LocalStream>>>,
    table: ConnectionTable,
}

#[async_trait]
impl Connection for LocalConnection {
    async fn play(
        &self,
        url: &str,
        quality: QualityHint,
    ) -> Result<Arc<dyn StreamHandle>, SinkError> {
        let child = self.player.spawn(url, quality)?;
        let stream = Arc::new(LocalStream::spawn(child));
        info!(voice = %self.voice, stream = %stream.id(), %url, %quality, "streaming");

        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        streams.retain(|s| !s.is_finished());
        streams.push(stream.clone());
        Ok(stream)
    }

    async fn disconnect(&self) {
        let streams: Vec<_> = self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for stream in streams {
            stream.dispose();
        }
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.voice.guild);
        info!(voice = %self.voice, "disconnected");
    }
}

/// Audio sink playing through a local mpv/VLC process
pub struct LocalSink {
    player: LocalPlayer,
    connections: ConnectionTable,
}

impl LocalSink {
    pub fn new(player: LocalPlayer) -> Self {
        Self {
            player,
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Connections currently open for `guild`
    pub fn connections(&self, guild: &GuildId) -> Vec<Arc<dyn Connection>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(guild)
            .map(|c| vec![c.clone() as Arc<dyn Connection>])
            .unwrap_or_default()
    }
}

#[async_trait]
impl AudioSink for LocalSink {
    async fn acquire_connection(
        &self,
        voice: &VoiceContext,
    ) -> Result<Arc<dyn Connection>, SinkError> {
        if !self.player.is_available().await {
            return Err(SinkError::PlayerNotFound(
                self.player.player_type().command().to_string(),
            ));
        }

        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let connection = connections
            .entry(voice.guild.clone())
            .or_insert_with(|| {
                info!(%voice, player = %self.player.player_type(), "joined");
                Arc::new(LocalConnection {
                    voice: voice.clone(),
                    player: self.player,
                    streams: Mutex::new(Vec::new()),
                    table: self.connections.clone(),
                })
            })
            .clone();
        Ok(connection)
    }
}
