//! In-memory record store
//!
//! Mirrors the PostgreSQL store's semantics (user scoping, cascade deletes,
//! expiry-based pruning) without a database. Used by the pipeline unit tests;
//! not intended for production deployments.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    LikedVideo, NewLikedVideo, NewPlaylist, NewPlaylistVideo, NewSubscription, Playlist,
    PlaylistVideo, Subscription,
};
use crate::store::{LibraryStore, PruneStats};

#[derive(Default)]
struct Tables {
    subscriptions: Vec<Subscription>,
    liked_videos: Vec<LikedVideo>,
    playlists: Vec<Playlist>,
    playlist_videos: Vec<PlaylistVideo>,
}

/// In-memory implementation of [`LibraryStore`]
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn insert_subscriptions(&self, rows: Vec<NewSubscription>) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let count = rows.len() as u64;
        for row in rows {
            tables.subscriptions.push(Subscription {
                id: Uuid::new_v4(),
                user_id: row.user_id,
                channel_id: row.channel_id,
                title: row.title,
                thumbnail: row.thumbnail,
                expires_at: row.expires_at,
            });
        }
        Ok(count)
    }

    async fn insert_liked_videos(&self, rows: Vec<NewLikedVideo>) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let count = rows.len() as u64;
        for row in rows {
            tables.liked_videos.push(LikedVideo {
                id: Uuid::new_v4(),
                user_id: row.user_id,
                video_id: row.video_id,
                title: row.title,
                channel_title: row.channel_title,
                thumbnail: row.thumbnail,
                expires_at: row.expires_at,
            });
        }
        Ok(count)
    }

    async fn insert_playlists(&self, rows: Vec<NewPlaylist>) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let count = rows.len() as u64;
        for row in rows {
            tables.playlists.push(Playlist {
                id: Uuid::new_v4(),
                user_id: row.user_id,
                resource_id: row.resource_id,
                title: row.title,
                thumbnail: row.thumbnail,
                privacy_status: row.privacy_status,
                expires_at: row.expires_at,
            });
        }
        Ok(count)
    }

    async fn insert_playlist_videos(&self, rows: Vec<NewPlaylistVideo>) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let count = rows.len() as u64;
        for row in rows {
            tables.playlist_videos.push(PlaylistVideo {
                id: Uuid::new_v4(),
                playlist_id: row.playlist_id,
                video_id: row.video_id,
            });
        }
        Ok(count)
    }

    async fn subscription_by_channel(
        &self,
        user_id: Uuid,
        channel_id: &str,
    ) -> Result<Option<Subscription>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.channel_id == channel_id)
            .cloned())
    }

    async fn liked_video_by_video(
        &self,
        user_id: Uuid,
        video_id: &str,
    ) -> Result<Option<LikedVideo>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .liked_videos
            .iter()
            .find(|v| v.user_id == user_id && v.video_id == video_id)
            .cloned())
    }

    async fn playlist_by_resource(
        &self,
        user_id: Uuid,
        resource_id: &str,
    ) -> Result<Option<Playlist>> {
        let tables = self.tables.lock().unwrap();
        // Most recently written row wins, as in the SQL store.
        Ok(tables
            .playlists
            .iter()
            .rev()
            .find(|p| p.user_id == user_id && p.resource_id == resource_id)
            .cloned())
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Subscription> = tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn liked_videos_for_user(&self, user_id: Uuid) -> Result<Vec<LikedVideo>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<LikedVideo> = tables
            .liked_videos
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn playlists_for_user(&self, user_id: Uuid) -> Result<Vec<Playlist>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Playlist> = tables
            .playlists
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn playlist_videos(&self, playlist_id: Uuid) -> Result<Vec<PlaylistVideo>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .playlist_videos
            .iter()
            .filter(|v| v.playlist_id == playlist_id)
            .cloned()
            .collect())
    }

    async fn delete_subscription(&self, user_id: Uuid, channel_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.subscriptions.len();
        tables
            .subscriptions
            .retain(|s| !(s.user_id == user_id && s.channel_id == channel_id));
        Ok((before - tables.subscriptions.len()) as u64)
    }

    async fn delete_liked_video(&self, user_id: Uuid, video_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.liked_videos.len();
        tables
            .liked_videos
            .retain(|v| !(v.user_id == user_id && v.video_id == video_id));
        Ok((before - tables.liked_videos.len()) as u64)
    }

    async fn delete_playlist(&self, user_id: Uuid, resource_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let doomed: Vec<Uuid> = tables
            .playlists
            .iter()
            .filter(|p| p.user_id == user_id && p.resource_id == resource_id)
            .map(|p| p.id)
            .collect();
        tables
            .playlists
            .retain(|p| !(p.user_id == user_id && p.resource_id == resource_id));
        tables
            .playlist_videos
            .retain(|v| !doomed.contains(&v.playlist_id));
        Ok(doomed.len() as u64)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<PruneStats> {
        let mut tables = self.tables.lock().unwrap();

        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|s| s.expires_at > cutoff);
        let subscriptions = (before - tables.subscriptions.len()) as u64;

        let before = tables.liked_videos.len();
        tables.liked_videos.retain(|v| v.expires_at > cutoff);
        let liked_videos = (before - tables.liked_videos.len()) as u64;

        let doomed: Vec<Uuid> = tables
            .playlists
            .iter()
            .filter(|p| p.expires_at <= cutoff)
            .map(|p| p.id)
            .collect();
        tables.playlists.retain(|p| p.expires_at > cutoff);
        tables
            .playlist_videos
            .retain(|v| !doomed.contains(&v.playlist_id));

        Ok(PruneStats {
            subscriptions,
            liked_videos,
            playlists: doomed.len() as u64,
        })
    }
}
