//! Playback orchestration
//!
//! `Player` wires the per-guild playlists to the outside world: it resolves
//! locators, acquires voice connections, starts streams and advances through
//! the queue when a stream ends.
//!
//! # Flow
//!
//! ```text
//! play ─► voice channel? ─► resolve ─► enqueue ─┬─► Queued: "Added to queue"
//!                                               └─► StartPlayback:
//!                                                     acquire connection
//!                                                     start stream, arm, publish
//!
//! publish ─► "Now playing" ─► watch stream ─► ended ─► grace delay
//!                                               ─► "has finished" ─┬─► next: publish
//!                                                                  └─► last: stop
//! ```
//!
//! Every playlist mutation happens under that guild's lock. A stop bumps the
//! playlist epoch, and any continuation armed under an older epoch gives up
//! when it next takes the lock.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{MediaResolver, ResolveError};
use crate::models::{
    ChannelContext, GuildId, NowPlaying, QualityHint, Song, UserContext,
};
use crate::notify::Notifier;
use crate::playlist::{Advance, EnqueueOutcome, Playlist, PlaylistState};
use crate::registry::PlaylistRegistry;
use crate::stream::{AudioSink, Connection, SinkError, StreamHandle};
use crate::voice::VoiceContextProvider;

/// Pause between the end of one track and the start of the next
pub const GRACE_DELAY: Duration = Duration::from_secs(3);

pub const NO_VOICE_CHANNEL: &str = "You need to be in a voice channel to use this command.";
pub const EMPTY_QUEUE: &str = "The queue is empty.";

/// Errors from `Player::play`
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("{}", NO_VOICE_CHANNEL)]
    NoVoiceChannel,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// What a successful `play` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback was idle; this song is now streaming
    Started(Song),
    /// Appended behind the playing track (1-based position)
    Queued { song: Song, position: usize },
    /// Stopped while the first stream was starting; nothing was published
    Stopped(Song),
}

/// Read-only view of one guild's playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSnapshot {
    pub guild: GuildId,
    pub songs: Vec<Song>,
    pub song_index: usize,
    pub playing: bool,
}

impl PlaylistSnapshot {
    fn of(guild: &GuildId, playlist: &Playlist) -> Self {
        Self {
            guild: guild.clone(),
            songs: playlist.songs().to_vec(),
            song_index: playlist.song_index(),
            playing: playlist.state() == PlaylistState::Playing,
        }
    }

    pub fn current(&self) -> Option<&Song> {
        self.songs.get(self.song_index)
    }

    pub fn is_idle(&self) -> bool {
        !self.playing
    }
}

/// Playback controller shared by all command handlers
#[derive(Clone)]
pub struct Player {
    registry: Arc<PlaylistRegistry>,
    resolver: Arc<dyn MediaResolver>,
    sink: Arc<dyn AudioSink>,
    voice: Arc<dyn VoiceContextProvider>,
    notifier: Arc<dyn Notifier>,
    grace_delay: Duration,
}

impl Player {
    pub fn new(
        registry: Arc<PlaylistRegistry>,
        resolver: Arc<dyn MediaResolver>,
        sink: Arc<dyn AudioSink>,
        voice: Arc<dyn VoiceContextProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            resolver,
            sink,
            voice,
            notifier,
            grace_delay: GRACE_DELAY,
        }
    }

    /// Override the pause inserted between tracks
    pub fn with_grace_delay(mut self, grace_delay: Duration) -> Self {
        self.grace_delay = grace_delay;
        self
    }

    /// Resolve `locator`, queue it, and start playback if the guild was idle
    pub async fn play(&self, user: &UserContext, locator: &str) -> Result<PlayOutcome, PlayError> {
        let channel = &user.channel;
        let guild = user.guild();

        let Some(voice) = self.voice.current_voice_channel(user) else {
            self.notifier.send(channel, NO_VOICE_CHANNEL);
            return Err(PlayError::NoVoiceChannel);
        };

        let song = Song::from(self.resolver.resolve(locator).await.map_err(|e| {
            warn!(%guild, %locator, "resolve failed: {}", e);
            e
        })?);

        let playlist = self.registry.get_or_create(guild);
        let epoch = {
            let mut playlist = playlist.lock().await;
            match playlist.enqueue(song.clone()) {
                EnqueueOutcome::Queued { position } => {
                    self.notifier
                        .send(channel, &format!("Added to queue: \"{}\"", song.title));
                    return Ok(PlayOutcome::Queued { song, position });
                }
                EnqueueOutcome::StartPlayback => playlist.epoch(),
            }
        };

        // The song stays queued if the sink fails; no retry.
        let connection = self.sink.acquire_connection(&voice).await.map_err(|e| {
            warn!(%guild, %voice, "cannot join: {}", e);
            e
        })?;
        let stream = connection
            .play(&song.url, QualityHint::Default)
            .await
            .map_err(|e| {
                warn!(%guild, url = %song.url, "cannot stream: {}", e);
                e
            })?;

        let mut playlist = playlist.lock().await;
        if playlist.epoch() != epoch {
            debug!(%guild, "stopped while starting; discarding stream");
            stream.dispose();
            // The stop ran before this connection existed. Leave it alone if
            // a newer run has already queued songs on it.
            if playlist.is_empty() && playlist.now_playing().is_none() {
                connection.disconnect().await;
            }
            return Ok(PlayOutcome::Stopped(song));
        }

        self.arm(&mut playlist, guild.clone(), channel.clone(), connection, epoch);
        info!(%guild, %voice, title = %song.title, "playback started");
        playlist.publish(NowPlaying {
            song: song.clone(),
            stream,
        });
        Ok(PlayOutcome::Started(song))
    }

    /// Disconnect the guild's voice connection and reset its playlist
    pub async fn stop(&self, guild: &GuildId) {
        let playlist = self.registry.get_or_create(guild);
        let mut playlist = playlist.lock().await;
        self.stop_locked(guild, &mut playlist).await;
    }

    /// Stop every guild that has a playlist
    pub async fn stop_all(&self) {
        for guild in self.registry.guilds() {
            self.stop(&guild).await;
        }
    }

    /// Send the rendered queue to `channel` and return it
    pub async fn queue(&self, channel: &ChannelContext) -> String {
        let playlist = self.registry.get_or_create(&channel.guild);
        let listing = playlist.lock().await.render_queue();
        if listing.is_empty() {
            self.notifier.send(channel, EMPTY_QUEUE);
        } else {
            self.notifier.send(channel, &listing);
        }
        listing
    }

    pub async fn snapshot(&self, guild: &GuildId) -> PlaylistSnapshot {
        let playlist = self.registry.get_or_create(guild);
        let playlist = playlist.lock().await;
        PlaylistSnapshot::of(guild, &playlist)
    }

    /// Install the "now playing" consumer for a playback run.
    ///
    /// Each published track is announced and gets a watcher that advances
    /// the queue once the track's stream ends.
    fn arm(
        &self,
        playlist: &mut Playlist,
        guild: GuildId,
        channel: ChannelContext,
        connection: Arc<dyn Connection>,
        epoch: u64,
    ) {
        let player = self.clone();
        playlist.arm(move |now: &NowPlaying| {
            player
                .notifier
                .send(&channel, &format!("Now playing: \"{}\".", now.song.title));
            tokio::spawn(player.clone().advance_on_completion(
                guild.clone(),
                channel.clone(),
                connection.clone(),
                now.stream.clone(),
                epoch,
            ));
        });
    }

    async fn advance_on_completion(
        self,
        guild: GuildId,
        channel: ChannelContext,
        connection: Arc<dyn Connection>,
        stream: Arc<dyn StreamHandle>,
        epoch: u64,
    ) {
        stream.ended().await;
        tokio::time::sleep(self.grace_delay).await;

        let playlist = self.registry.get_or_create(&guild);
        let mut playlist = playlist.lock().await;
        if playlist.epoch() != epoch {
            debug!(%guild, "playlist stopped during grace delay");
            return;
        }

        if let Some(finished) = playlist.current_song() {
            self.notifier
                .send(&channel, &format!("\"{}\" has finished.", finished.title));
        }

        // Tracks that cannot be started are reported and skipped
        loop {
            match playlist.advance() {
                Advance::Exhausted => {
                    info!(%guild, "queue finished");
                    self.stop_locked(&guild, &mut playlist).await;
                    return;
                }
                Advance::Next(song) => match connection.play(&song.url, QualityHint::Highest).await {
                    Ok(stream) => {
                        debug!(%guild, index = playlist.song_index(), title = %song.title, "advancing");
                        playlist.publish(NowPlaying { song, stream });
                        return;
                    }
                    Err(e) => {
                        warn!(%guild, url = %song.url, "cannot stream next track: {}", e);
                        self.notifier
                            .send(&channel, &format!("Could not play \"{}\": {}", song.title, e));
                    }
                },
            }
        }
    }

    async fn stop_locked(&self, guild: &GuildId, playlist: &mut Playlist) {
        for connection in self.voice.active_connections(guild) {
            connection.disconnect().await;
        }
        playlist.stop();
        info!(%guild, "stopped");
    }
}
