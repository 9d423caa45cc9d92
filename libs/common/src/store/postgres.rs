//! PostgreSQL-backed record store

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    LikedVideo, NewLikedVideo, NewPlaylist, NewPlaylistVideo, NewSubscription, Playlist,
    PlaylistVideo, Subscription,
};
use crate::store::{LibraryStore, PruneStats};

/// PostgreSQL implementation of [`LibraryStore`]. Cascade deletes are
/// enforced by the schema's `ON DELETE CASCADE` foreign keys.
#[derive(Clone)]
pub struct PgLibraryStore {
    pool: PgPool,
}

impl PgLibraryStore {
    /// Create a new store on top of an initialized pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LibraryStore for PgLibraryStore {
    async fn insert_subscriptions(&self, rows: Vec<NewSubscription>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let count = rows.len() as u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO subscriptions (user_id, channel_id, title, thumbnail, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(row.user_id)
            .bind(&row.channel_id)
            .bind(&row.title)
            .bind(&row.thumbnail)
            .bind(row.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Inserted {} subscription rows", count);
        Ok(count)
    }

    async fn insert_liked_videos(&self, rows: Vec<NewLikedVideo>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let count = rows.len() as u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO liked_videos (user_id, video_id, title, channel_title, thumbnail, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.user_id)
            .bind(&row.video_id)
            .bind(&row.title)
            .bind(&row.channel_title)
            .bind(&row.thumbnail)
            .bind(row.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Inserted {} liked video rows", count);
        Ok(count)
    }

    async fn insert_playlists(&self, rows: Vec<NewPlaylist>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let count = rows.len() as u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO playlists (user_id, resource_id, title, thumbnail, privacy_status, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.user_id)
            .bind(&row.resource_id)
            .bind(&row.title)
            .bind(&row.thumbnail)
            .bind(&row.privacy_status)
            .bind(row.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Inserted {} playlist rows", count);
        Ok(count)
    }

    async fn insert_playlist_videos(&self, rows: Vec<NewPlaylistVideo>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let count = rows.len() as u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO playlist_videos (playlist_id, video_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(row.playlist_id)
            .bind(&row.video_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Inserted {} playlist video rows", count);
        Ok(count)
    }

    async fn subscription_by_channel(
        &self,
        user_id: Uuid,
        channel_id: &str,
    ) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, channel_id, title, thumbnail, expires_at
            FROM subscriptions
            WHERE user_id = $1 AND channel_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn liked_video_by_video(
        &self,
        user_id: Uuid,
        video_id: &str,
    ) -> Result<Option<LikedVideo>> {
        let row = sqlx::query_as::<_, LikedVideo>(
            r#"
            SELECT id, user_id, video_id, title, channel_title, thumbnail, expires_at
            FROM liked_videos
            WHERE user_id = $1 AND video_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn playlist_by_resource(
        &self,
        user_id: Uuid,
        resource_id: &str,
    ) -> Result<Option<Playlist>> {
        let row = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, user_id, resource_id, title, thumbnail, privacy_status, expires_at
            FROM playlists
            WHERE user_id = $1 AND resource_id = $2
            ORDER BY expires_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, channel_id, title, thumbnail, expires_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY title
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn liked_videos_for_user(&self, user_id: Uuid) -> Result<Vec<LikedVideo>> {
        let rows = sqlx::query_as::<_, LikedVideo>(
            r#"
            SELECT id, user_id, video_id, title, channel_title, thumbnail, expires_at
            FROM liked_videos
            WHERE user_id = $1
            ORDER BY title
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn playlists_for_user(&self, user_id: Uuid) -> Result<Vec<Playlist>> {
        let rows = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, user_id, resource_id, title, thumbnail, privacy_status, expires_at
            FROM playlists
            WHERE user_id = $1
            ORDER BY title
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn playlist_videos(&self, playlist_id: Uuid) -> Result<Vec<PlaylistVideo>> {
        let rows = sqlx::query_as::<_, PlaylistVideo>(
            r#"
            SELECT id, playlist_id, video_id
            FROM playlist_videos
            WHERE playlist_id = $1
            ORDER BY position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_subscription(&self, user_id: Uuid, channel_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE user_id = $1 AND channel_id = $2
            "#,
        )
        .bind(user_id)
        .bind(channel_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_liked_video(&self, user_id: Uuid, video_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM liked_videos
            WHERE user_id = $1 AND video_id = $2
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_playlist(&self, user_id: Uuid, resource_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM playlists
            WHERE user_id = $1 AND resource_id = $2
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<PruneStats> {
        let subscriptions = sqlx::query("DELETE FROM subscriptions WHERE expires_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let liked_videos = sqlx::query("DELETE FROM liked_videos WHERE expires_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        // Playlist videos go with their playlists via the cascade.
        let playlists = sqlx::query("DELETE FROM playlists WHERE expires_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(PruneStats {
            subscriptions,
            liked_videos,
            playlists,
        })
    }
}
