//! Remote video platform client
//!
//! [`VideoPlatform`] wraps every authenticated call against the external
//! platform behind pagination-complete reads and single-shot mutations.
//! The production implementation is [`YouTubeClient`]; pipeline tests use a
//! recording fake.

pub mod youtube;

#[cfg(test)]
pub(crate) mod fake;

pub use youtube::{PlatformConfig, YouTubeClient};

use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by remote platform operations
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The user has no stored credential; surfaced to the caller, never
    /// silently retried
    #[error("no platform credential stored for this user")]
    NotAuthorized,

    /// The platform returned a non-success response; carries the payload's
    /// error message
    #[error("platform returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection failures and per-request deadline overruns
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered with a payload we could not understand
    #[error("unexpected platform response: {0}")]
    Decode(String),

    /// The local credential lookup itself failed (not a missing credential)
    #[error("credential store error: {0}")]
    CredentialStore(#[source] anyhow::Error),
}

/// One page of a paginated listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// A thumbnail set; only the default size is kept locally
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnails {
    pub default: Thumbnail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Raw subscription record as returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct RawSubscription {
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    pub title: String,
    pub resource_id: ChannelResource,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResource {
    pub channel_id: String,
}

/// Raw liked-video record as returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct RawLikedVideo {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
}

/// Raw playlist record as returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylist {
    pub id: String,
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: String,
}

/// Raw playlist item record as returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub resource_id: VideoResource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub video_id: String,
}

/// Authenticated, pagination-complete operations against the external video
/// platform
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// All of the user's channel subscriptions, in the platform's
    /// alphabetical listing order
    async fn fetch_all_subscriptions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RawSubscription>, PlatformError>;

    /// All of the user's liked videos (server-side rating filter)
    async fn fetch_all_liked_videos(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RawLikedVideo>, PlatformError>;

    /// All of the user's playlists
    async fn fetch_all_playlists(&self, user_id: Uuid) -> Result<Vec<RawPlaylist>, PlatformError>;

    /// All items of one playlist
    async fn fetch_all_playlist_items(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>, PlatformError>;

    /// Subscribe the user's platform account to a channel
    async fn subscribe_to_channel(
        &self,
        user_id: Uuid,
        channel_id: &str,
    ) -> Result<(), PlatformError>;

    /// Mark a video as liked on the user's platform account
    async fn rate_video(&self, user_id: Uuid, video_id: &str) -> Result<(), PlatformError>;

    /// Create a playlist on the user's platform account; returns the new
    /// remote playlist id
    async fn create_playlist(
        &self,
        user_id: Uuid,
        title: &str,
        privacy_status: &str,
    ) -> Result<String, PlatformError>;

    /// Append a video to a remote playlist
    async fn add_playlist_video(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError>;
}

/// Accumulate every item of a paginated listing by following the
/// continuation token until the platform stops returning one.
///
/// An explicit loop rather than recursion: result-set size must not grow the
/// call stack.
pub(crate) async fn drain_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, PlatformError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, PlatformError>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        items.extend(page.items);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(items)
}
