//! Media resolution
//!
//! - `MediaResolver`: turns a user-supplied locator into a title + playable URL
//! - `OEmbedResolver`: YouTube implementation backed by the public oEmbed endpoint

pub mod oembed;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ResolvedMedia;

pub use oembed::OEmbedResolver;

/// Media resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No playable media found for '{0}'")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Looks up a locator (URL, id, ...) and returns what should be played.
///
/// Implementations must be safe to call concurrently for different guilds.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, locator: &str) -> Result<ResolvedMedia, ResolveError>;
}
