//! YouTube oEmbed resolver
//!
//! Extracts the video id from a locator, builds the canonical watch URL and
//! fetches the title from `<base>/oembed`. No API key required.

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{MediaResolver, ResolveError};
use crate::models::ResolvedMedia;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// oEmbed response (only the fields we use)
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    #[allow(dead_code)]
    author_name: Option<String>,
}

/// Extract an 11-character video id from a watch/short/embed URL or a bare id
pub fn video_id(locator: &str) -> Option<&str> {
    let locator = locator.trim();
    let bare = Regex::new(r"^[A-Za-z0-9_-]{11}$").ok()?;
    if bare.is_match(locator) {
        return Some(locator);
    }

    let re = Regex::new(
        r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|shorts/|embed/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .ok()?;
    re.captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Canonical watch URL for a video id
pub fn canonical_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Resolver backed by the YouTube oEmbed endpoint
pub struct OEmbedResolver {
    base_url: String,
    client: reqwest::Client,
}

impl OEmbedResolver {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a resolver with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for OEmbedResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaResolver for OEmbedResolver {
    async fn resolve(&self, locator: &str) -> Result<ResolvedMedia, ResolveError> {
        let id = video_id(locator).ok_or_else(|| ResolveError::NotFound(locator.to_string()))?;
        let canonical = canonical_url(id);
        let url = format!(
            "{}/oembed?url={}&format=json",
            self.base_url,
            urlencoding::encode(&canonical)
        );
        debug!(%locator, %url, "resolving");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND => {
                return Err(ResolveError::NotFound(locator.to_string()));
            }
            status if !status.is_success() => {
                return Err(ResolveError::InvalidResponse(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let text = response.text().await?;
        let data: OEmbedResponse = serde_json::from_str(&text)
            .map_err(|e| ResolveError::InvalidResponse(e.to_string()))?;

        Ok(ResolvedMedia {
            title: data.title,
            canonical_url: canonical,
        })
    }
}
