//! Per-guild playlist state machine
//!
//! A playlist is either idle or playing exactly one track. Enqueuing while
//! idle tells the caller to start playback; enqueuing while playing just
//! appends. The state machine never talks to the sink itself: connection
//! and stream acquisition are async and fallible, so the `Player` drives them
//! and feeds the resulting handles back in.

use tracing::debug;

use crate::models::{NowPlaying, Song};
use crate::observable::Observable;

/// What the caller should do after an enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// First song since the playlist went idle; start playback
    StartPlayback,
    /// Appended behind a playing track (1-based queue position)
    Queued { position: usize },
}

/// Result of stepping the cursor after a track finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved; this song should start next
    Next(Song),
    /// The finished track was the last one
    Exhausted,
}

/// Playback state of a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistState {
    Idle,
    Playing,
}

/// Ordered queue, cursor and the currently streaming track of one guild
pub struct Playlist {
    songs: Vec<Song>,
    song_index: usize,
    current: Observable<NowPlaying>,
    /// Bumped on every stop; continuations armed under an older epoch are stale
    epoch: u64,
}

impl Playlist {
    pub fn new() -> Self {
        Self {
            songs: Vec::new(),
            song_index: 0,
            current: Observable::new(),
            epoch: 0,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn song_index(&self) -> usize {
        self.song_index
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> PlaylistState {
        if self.current.is_set() {
            PlaylistState::Playing
        } else {
            PlaylistState::Idle
        }
    }

    /// Song under the cursor
    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.song_index)
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.current.value()
    }

    /// Append a song. Returns `StartPlayback` iff it is the only song queued.
    pub fn enqueue(&mut self, song: Song) -> EnqueueOutcome {
        debug!(title = %song.title, position = self.songs.len() + 1, "enqueue");
        self.songs.push(song);
        if self.songs.len() == 1 {
            EnqueueOutcome::StartPlayback
        } else {
            EnqueueOutcome::Queued {
                position: self.songs.len(),
            }
        }
    }

    /// Install the one consumer of "a new track started" events.
    ///
    /// Any previously armed consumer is dropped first, so at most one is
    /// ever registered.
    pub fn arm<F>(&mut self, consumer: F)
    where
        F: Fn(&NowPlaying) + Send + Sync + 'static,
    {
        self.current.unsubscribe_all();
        self.current.subscribe(consumer);
    }

    /// Make `now` the playing track and notify the armed consumer
    pub fn publish(&mut self, now: NowPlaying) {
        debug!(title = %now.song.title, index = self.song_index, "publish");
        self.current.publish(now);
    }

    /// Move the cursor past the finished track
    pub fn advance(&mut self) -> Advance {
        if self.songs.is_empty() || self.song_index + 1 >= self.songs.len() {
            return Advance::Exhausted;
        }
        self.song_index += 1;
        Advance::Next(self.songs[self.song_index].clone())
    }

    /// Reset to idle: clears songs, cursor and consumer, disposes the stream.
    ///
    /// Safe to call on an idle playlist.
    pub fn stop(&mut self) {
        self.songs.clear();
        self.song_index = 0;
        self.current.unsubscribe_all();
        if let Some(now) = self.current.take() {
            debug!(title = %now.song.title, "disposing stream");
            now.stream.dispose();
        }
        self.epoch += 1;
    }

    /// Listing of every song, with the one under the cursor framed by
    /// separator lines as long as its title.
    pub fn render_queue(&self) -> String {
        // One entry per line, no blank lines between entries
        self.songs
            .iter()
            .enumerate()
            .map(|(index, song)| {
                if index == self.song_index {
                    let rule = "=".repeat(song.title.chars().count());
                    format!("{rule}\n{} {}\n{rule}", index + 1, song.title)
                } else {
                    format!("{}: {}", index + 1, song.title)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamHandle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeStream {
        disposed: AtomicBool,
    }

    #[async_trait]
    impl StreamHandle for FakeStream {
        async fn ended(&self) {}

        fn dispose(&self) {
            self.disposed.store(true, Ordering::SeqCst);
        }
    }

    fn song(title: &str) -> Song {
        Song::new(title, format!("https://example.com/{}", title.to_lowercase()))
    }

    fn assert_cursor_in_bounds(playlist: &Playlist) {
        if !playlist.is_empty() {
            assert!(playlist.song_index() < playlist.len());
        }
    }

    #[test]
    fn test_new_playlist_is_idle_and_empty() {
        let playlist = Playlist::new();
        assert!(playlist.is_empty());
        assert_eq!(playlist.song_index(), 0);
        assert_eq!(playlist.state(), PlaylistState::Idle);
        assert!(playlist.current_song().is_none());
    }

    #[test]
    fn test_only_first_enqueue_starts_playback() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.enqueue(song("A")), EnqueueOutcome::StartPlayback);
        assert_eq!(
            playlist.enqueue(song("B")),
            EnqueueOutcome::Queued { position: 2 }
        );
        assert_eq!(
            playlist.enqueue(song("C")),
            EnqueueOutcome::Queued { position: 3 }
        );

        playlist.stop();
        assert_eq!(playlist.enqueue(song("D")), EnqueueOutcome::StartPlayback);
    }

    #[test]
    fn test_advance_walks_to_end_without_overrun() {
        let mut playlist = Playlist::new();
        for title in ["A", "B", "C"] {
            playlist.enqueue(song(title));
        }

        assert_eq!(playlist.advance(), Advance::Next(song("B")));
        assert_eq!(playlist.advance(), Advance::Next(song("C")));
        assert_eq!(playlist.advance(), Advance::Exhausted);
        assert_eq!(playlist.advance(), Advance::Exhausted);
        assert_eq!(playlist.song_index(), 2);
        assert_cursor_in_bounds(&playlist);
    }

    #[test]
    fn test_advance_on_empty_playlist_is_exhausted() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.advance(), Advance::Exhausted);
        assert_eq!(playlist.song_index(), 0);
    }

    #[test]
    fn test_publish_notifies_armed_consumer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut playlist = Playlist::new();
        playlist.enqueue(song("A"));

        let counter = calls.clone();
        playlist.arm(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        // Re-arming replaces the consumer instead of adding a second one.
        let counter = calls.clone();
        playlist.arm(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        playlist.publish(NowPlaying {
            song: song("A"),
            stream: Arc::new(FakeStream::default()),
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(playlist.state(), PlaylistState::Playing);
    }

    #[test]
    fn test_stop_resets_and_disposes() {
        let stream = Arc::new(FakeStream::default());
        let mut playlist = Playlist::new();
        playlist.enqueue(song("A"));
        playlist.enqueue(song("B"));
        playlist.advance();
        playlist.publish(NowPlaying {
            song: song("B"),
            stream: stream.clone(),
        });
        let epoch = playlist.epoch();

        playlist.stop();

        assert!(stream.disposed.load(Ordering::SeqCst));
        assert!(playlist.is_empty());
        assert_eq!(playlist.song_index(), 0);
        assert_eq!(playlist.state(), PlaylistState::Idle);
        assert_eq!(playlist.epoch(), epoch + 1);
    }

    #[test]
    fn test_stop_twice_is_harmless() {
        let mut playlist = Playlist::new();
        playlist.stop();
        playlist.stop();
        assert!(playlist.is_empty());
        assert_eq!(playlist.song_index(), 0);
        assert_eq!(playlist.state(), PlaylistState::Idle);
    }

    #[test]
    fn test_render_queue_marks_current() {
        let mut playlist = Playlist::new();
        playlist.enqueue(song("Alpha"));
        playlist.enqueue(song("Beta"));
        playlist.advance();

        assert_eq!(playlist.render_queue(), "1: Alpha\n====\n2 Beta\n====");
    }

    #[test]
    fn test_render_queue_counts_characters_not_bytes() {
        let mut playlist = Playlist::new();
        playlist.enqueue(song("Café"));
        assert_eq!(playlist.render_queue(), "====\n1 Café\n====");
    }

    #[test]
    fn test_render_empty_queue() {
        assert_eq!(Playlist::new().render_queue(), "");
    }
}
