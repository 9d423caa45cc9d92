//! Domain models for the tubelift record store
//!
//! Every imported entity belongs to exactly one user, except
//! [`PlaylistVideo`] which belongs to its playlist (and transitively to the
//! playlist's owner). Import-derived rows carry an `expires_at` timestamp;
//! once it passes, the pruning job may delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Stored platform tokens for a user. At most one row per user; overwritten
/// in place on re-authorization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

/// An imported channel subscription
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The platform's stable channel identifier (natural key)
    pub channel_id: String,
    pub title: String,
    pub thumbnail: String,
    pub expires_at: DateTime<Utc>,
}

/// Insert payload for [`Subscription`]
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub channel_id: String,
    pub title: String,
    pub thumbnail: String,
    pub expires_at: DateTime<Utc>,
}

/// An imported liked video
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LikedVideo {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The platform's stable video identifier (natural key)
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: String,
    pub expires_at: DateTime<Utc>,
}

/// Insert payload for [`LikedVideo`]
#[derive(Debug, Clone)]
pub struct NewLikedVideo {
    pub user_id: Uuid,
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: String,
    pub expires_at: DateTime<Utc>,
}

/// An imported playlist; owns an insertion-ordered set of [`PlaylistVideo`]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The platform's stable playlist identifier (natural key)
    pub resource_id: String,
    pub title: String,
    pub thumbnail: String,
    pub privacy_status: String,
    pub expires_at: DateTime<Utc>,
}

/// Insert payload for [`Playlist`]
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub user_id: Uuid,
    pub resource_id: String,
    pub title: String,
    pub thumbnail: String,
    pub privacy_status: String,
    pub expires_at: DateTime<Utc>,
}

/// A video entry inside an imported playlist. Deleted automatically with its
/// owning playlist.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaylistVideo {
    pub id: Uuid,
    pub playlist_id: Uuid,
    pub video_id: String,
}

/// Insert payload for [`PlaylistVideo`]
#[derive(Debug, Clone)]
pub struct NewPlaylistVideo {
    pub playlist_id: Uuid,
    pub video_id: String,
}
