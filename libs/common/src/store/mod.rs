//! The record store owning all imported library data
//!
//! [`LibraryStore`] is the persistence seam between the import/export
//! pipelines and the database. All reads and writes are scoped by the owning
//! user id, so cross-user interference is prevented structurally rather than
//! by locking. Two implementations exist: [`PgLibraryStore`] backed by
//! PostgreSQL (production) and [`MemoryStore`] (tests).

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgLibraryStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    LikedVideo, NewLikedVideo, NewPlaylist, NewPlaylistVideo, NewSubscription, Playlist,
    PlaylistVideo, Subscription,
};

/// Per-entity row counts removed by a pruning run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub subscriptions: u64,
    pub liked_videos: u64,
    pub playlists: u64,
}

impl PruneStats {
    /// Total number of rows deleted (playlist videos cascade and are not
    /// counted separately)
    pub fn total(&self) -> u64 {
        self.subscriptions + self.liked_videos + self.playlists
    }
}

/// Typed persistent records for the imported library, with cascade-delete
/// semantics (user -> owned rows, playlist -> playlist videos).
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Batch-insert subscriptions; returns the number of rows written.
    /// No deduplication: re-importing produces duplicate rows by design.
    async fn insert_subscriptions(&self, rows: Vec<NewSubscription>) -> Result<u64>;

    /// Batch-insert liked videos; returns the number of rows written
    async fn insert_liked_videos(&self, rows: Vec<NewLikedVideo>) -> Result<u64>;

    /// Batch-insert playlists; returns the number of rows written
    async fn insert_playlists(&self, rows: Vec<NewPlaylist>) -> Result<u64>;

    /// Batch-insert playlist videos; returns the number of rows written
    async fn insert_playlist_videos(&self, rows: Vec<NewPlaylistVideo>) -> Result<u64>;

    /// Look up one of the user's subscriptions by remote channel id
    async fn subscription_by_channel(
        &self,
        user_id: Uuid,
        channel_id: &str,
    ) -> Result<Option<Subscription>>;

    /// Look up one of the user's liked videos by remote video id
    async fn liked_video_by_video(
        &self,
        user_id: Uuid,
        video_id: &str,
    ) -> Result<Option<LikedVideo>>;

    /// Look up one of the user's playlists by remote playlist id. With
    /// duplicate imports present, the most recently written row wins.
    async fn playlist_by_resource(
        &self,
        user_id: Uuid,
        resource_id: &str,
    ) -> Result<Option<Playlist>>;

    /// All subscriptions owned by the user
    async fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>>;

    /// All liked videos owned by the user
    async fn liked_videos_for_user(&self, user_id: Uuid) -> Result<Vec<LikedVideo>>;

    /// All playlists owned by the user
    async fn playlists_for_user(&self, user_id: Uuid) -> Result<Vec<Playlist>>;

    /// Videos of one playlist, in insertion order
    async fn playlist_videos(&self, playlist_id: Uuid) -> Result<Vec<PlaylistVideo>>;

    /// Delete the user's subscriptions matching the channel id; returns the
    /// number of rows removed (0 is not an error)
    async fn delete_subscription(&self, user_id: Uuid, channel_id: &str) -> Result<u64>;

    /// Delete the user's liked videos matching the video id
    async fn delete_liked_video(&self, user_id: Uuid, video_id: &str) -> Result<u64>;

    /// Delete the user's playlists matching the remote playlist id,
    /// cascading to their playlist videos
    async fn delete_playlist(&self, user_id: Uuid, resource_id: &str) -> Result<u64>;

    /// Delete every subscription, liked video and playlist whose
    /// `expires_at` is at or before the cutoff, across all users. Running
    /// twice with no new imports in between is a no-op the second time.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<PruneStats>;
}
