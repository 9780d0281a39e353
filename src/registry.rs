//! Guild → playlist registry
//!
//! Constructed once at startup and shared by reference with every command
//! handler. Each guild gets exactly one playlist, created on first access and
//! kept for the life of the process; stop only resets its contents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::models::GuildId;
use crate::playlist::Playlist;

/// Shared handle to one guild's playlist. The lock serializes all mutations.
pub type SharedPlaylist = Arc<AsyncMutex<Playlist>>;

#[derive(Default)]
pub struct PlaylistRegistry {
    playlists: Mutex<HashMap<GuildId, SharedPlaylist>>,
}

impl PlaylistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing playlist for `guild`, or a fresh idle one stored under it
    pub fn get_or_create(&self, guild: &GuildId) -> SharedPlaylist {
        let mut playlists = self
            .playlists
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        playlists
            .entry(guild.clone())
            .or_insert_with(|| {
                debug!(%guild, "creating playlist");
                Arc::new(AsyncMutex::new(Playlist::new()))
            })
            .clone()
    }

    /// Playlist for `guild` without creating one
    pub fn get(&self, guild: &GuildId) -> Option<SharedPlaylist> {
        self.playlists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(guild)
            .cloned()
    }

    /// Every guild that has a playlist, sorted
    pub fn guilds(&self) -> Vec<GuildId> {
        let mut guilds: Vec<GuildId> = self
            .playlists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        guilds.sort();
        guilds
    }

    pub fn len(&self) -> usize {
        self.playlists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Song;

    #[tokio::test]
    async fn test_get_or_create_returns_same_instance() {
        let registry = PlaylistRegistry::new();
        let guild = GuildId::new("g1");

        let first = registry.get_or_create(&guild);
        let second = registry.get_or_create(&guild);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_guilds_are_isolated() {
        let registry = PlaylistRegistry::new();
        let a = registry.get_or_create(&GuildId::new("a"));
        let b = registry.get_or_create(&GuildId::new("b"));

        a.lock().await.enqueue(Song::new("Alpha", "https://example.com/a"));

        assert_eq!(a.lock().await.len(), 1);
        assert!(b.lock().await.is_empty());
        assert_eq!(registry.guilds(), vec![GuildId::new("a"), GuildId::new("b")]);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = PlaylistRegistry::new();
        assert!(registry.get(&GuildId::new("nope")).is_none());
        assert!(registry.is_empty());
    }
}
