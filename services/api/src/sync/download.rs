//! Downloadable export document
//!
//! Builds the JSON document a user can save locally from a selection of
//! their records. Field names are part of the download format and must not
//! change.

use serde::Serialize;
use uuid::Uuid;

use common::store::LibraryStore;

use crate::error::{ApiError, ApiResult};
use crate::sync::selection::{SelectionKey, SelectionKind};

#[derive(Debug, Clone, Serialize)]
pub struct LikedVideoEntry {
    pub channel_title: String,
    pub video_title: String,
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionEntry {
    pub channel_title: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistEntry {
    pub playlist_title: String,
    pub privacy_status: String,
    pub playlist_id: String,
    pub playlist_items: Vec<String>,
}

/// The document served as a JSON attachment
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportDocument {
    pub liked_videos: Vec<LikedVideoEntry>,
    pub subscriptions: Vec<SubscriptionEntry>,
    pub playlists: Vec<PlaylistEntry>,
}

/// Render the selected records into an [`ExportDocument`]. A key that does
/// not resolve to a row owned by the user aborts the request.
pub async fn build_export_document<S>(
    store: &S,
    user_id: Uuid,
    keys: &[SelectionKey],
) -> ApiResult<ExportDocument>
where
    S: LibraryStore + ?Sized,
{
    let mut document = ExportDocument::default();

    for key in keys {
        match key.kind {
            SelectionKind::LikedVideo => {
                let video = store
                    .liked_video_by_video(user_id, &key.natural_key)
                    .await?
                    .ok_or_else(|| {
                        ApiError::LookupFailure(format!("liked video {}", key.natural_key))
                    })?;
                document.liked_videos.push(LikedVideoEntry {
                    channel_title: video.channel_title,
                    video_title: video.title,
                    video_id: video.video_id,
                });
            }
            SelectionKind::Subscription => {
                let subscription = store
                    .subscription_by_channel(user_id, &key.natural_key)
                    .await?
                    .ok_or_else(|| {
                        ApiError::LookupFailure(format!("subscription {}", key.natural_key))
                    })?;
                document.subscriptions.push(SubscriptionEntry {
                    channel_title: subscription.title,
                    channel_id: subscription.channel_id,
                });
            }
            SelectionKind::Playlist => {
                let playlist = store
                    .playlist_by_resource(user_id, &key.natural_key)
                    .await?
                    .ok_or_else(|| {
                        ApiError::LookupFailure(format!("playlist {}", key.natural_key))
                    })?;
                let items = store.playlist_videos(playlist.id).await?;
                document.playlists.push(PlaylistEntry {
                    playlist_title: playlist.title,
                    privacy_status: playlist.privacy_status,
                    playlist_id: playlist.resource_id,
                    playlist_items: items.into_iter().map(|item| item.video_id).collect(),
                });
            }
        }
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use common::models::{NewLikedVideo, NewPlaylist, NewPlaylistVideo, NewSubscription};
    use common::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn document_matches_the_download_format() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();
        let expires_at = Utc::now() + Duration::days(14);

        store
            .insert_liked_videos(vec![NewLikedVideo {
                user_id,
                video_id: "vid-1".to_string(),
                title: "A video".to_string(),
                channel_title: "A channel".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                expires_at,
            }])
            .await
            .unwrap();
        store
            .insert_subscriptions(vec![NewSubscription {
                user_id,
                channel_id: "UC-1".to_string(),
                title: "A channel".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                expires_at,
            }])
            .await
            .unwrap();
        store
            .insert_playlists(vec![NewPlaylist {
                user_id,
                resource_id: "PL-1".to_string(),
                title: "Mix".to_string(),
                thumbnail: "https://example.com/t.jpg".to_string(),
                privacy_status: "public".to_string(),
                expires_at,
            }])
            .await
            .unwrap();
        let playlist = store
            .playlist_by_resource(user_id, "PL-1")
            .await
            .unwrap()
            .unwrap();
        store
            .insert_playlist_videos(vec![
                NewPlaylistVideo {
                    playlist_id: playlist.id,
                    video_id: "v1".to_string(),
                },
                NewPlaylistVideo {
                    playlist_id: playlist.id,
                    video_id: "v2".to_string(),
                },
            ])
            .await
            .unwrap();

        let keys = vec![
            SelectionKey {
                kind: SelectionKind::LikedVideo,
                natural_key: "vid-1".to_string(),
            },
            SelectionKey {
                kind: SelectionKind::Subscription,
                natural_key: "UC-1".to_string(),
            },
            SelectionKey {
                kind: SelectionKind::Playlist,
                natural_key: "PL-1".to_string(),
            },
        ];

        let document = build_export_document(&store, user_id, &keys).await.unwrap();

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "liked_videos": [{
                    "channel_title": "A channel",
                    "video_title": "A video",
                    "video_id": "vid-1",
                }],
                "subscriptions": [{
                    "channel_title": "A channel",
                    "channel_id": "UC-1",
                }],
                "playlists": [{
                    "playlist_title": "Mix",
                    "privacy_status": "public",
                    "playlist_id": "PL-1",
                    "playlist_items": ["v1", "v2"],
                }],
            })
        );
    }

    #[tokio::test]
    async fn unresolved_key_aborts_the_download() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();

        let result = build_export_document(
            &store,
            user_id,
            &[SelectionKey {
                kind: SelectionKind::Playlist,
                natural_key: "PL-unknown".to_string(),
            }],
        )
        .await;

        assert!(matches!(result, Err(ApiError::LookupFailure(_))));
    }
}
