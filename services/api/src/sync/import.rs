//! Import pipeline: pull the user's remote library into the record store
//!
//! Each entry point drains the full paginated listing before writing, stamps
//! every row with the 14-day retention deadline, and batch-inserts. Nothing
//! is deduplicated: re-importing produces duplicate rows. A platform failure
//! aborts the call; rows already committed stay (partial import accepted).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use common::models::{NewLikedVideo, NewPlaylist, NewPlaylistVideo, NewSubscription};
use common::store::LibraryStore;

use crate::error::{ApiError, ApiResult};
use crate::platform::VideoPlatform;

/// Retention period for imported records
const RETENTION_DAYS: i64 = 14;

/// Deadline stamped on every row written by one import call
fn retention_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(RETENTION_DAYS)
}

/// Per-entity row counts written by an import request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub subscriptions: u64,
    pub liked_videos: u64,
    pub playlists: u64,
    pub playlist_videos: u64,
}

/// Import all of the user's channel subscriptions
pub async fn import_subscriptions<P, S>(platform: &P, store: &S, user_id: Uuid) -> ApiResult<u64>
where
    P: VideoPlatform + ?Sized,
    S: LibraryStore + ?Sized,
{
    let raw = platform.fetch_all_subscriptions(user_id).await?;
    let expires_at = retention_deadline();

    let rows = raw
        .into_iter()
        .map(|record| NewSubscription {
            user_id,
            channel_id: record.snippet.resource_id.channel_id,
            title: record.snippet.title,
            thumbnail: record.snippet.thumbnails.default.url,
            expires_at,
        })
        .collect();

    let written = store.insert_subscriptions(rows).await?;
    info!("Imported {} subscriptions for user {}", written, user_id);
    Ok(written)
}

/// Import all of the user's liked videos
pub async fn import_liked_videos<P, S>(platform: &P, store: &S, user_id: Uuid) -> ApiResult<u64>
where
    P: VideoPlatform + ?Sized,
    S: LibraryStore + ?Sized,
{
    let raw = platform.fetch_all_liked_videos(user_id).await?;
    let expires_at = retention_deadline();

    let rows = raw
        .into_iter()
        .map(|record| NewLikedVideo {
            user_id,
            video_id: record.id,
            title: record.snippet.title,
            channel_title: record.snippet.channel_title,
            thumbnail: record.snippet.thumbnails.default.url,
            expires_at,
        })
        .collect();

    let written = store.insert_liked_videos(rows).await?;
    info!("Imported {} liked videos for user {}", written, user_id);
    Ok(written)
}

/// Import all of the user's playlists together with their items.
///
/// Two phases: playlist rows are written first, then each freshly written
/// row is resolved again by its remote id so item rows can carry the local
/// playlist id. Item persistence therefore never starts before its playlist
/// is durable.
pub async fn import_playlists<P, S>(
    platform: &P,
    store: &S,
    user_id: Uuid,
) -> ApiResult<(u64, u64)>
where
    P: VideoPlatform + ?Sized,
    S: LibraryStore + ?Sized,
{
    let raw = platform.fetch_all_playlists(user_id).await?;
    let expires_at = retention_deadline();

    let rows = raw
        .iter()
        .map(|record| NewPlaylist {
            user_id,
            resource_id: record.id.clone(),
            title: record.snippet.title.clone(),
            thumbnail: record.snippet.thumbnails.default.url.clone(),
            privacy_status: record.status.privacy_status.clone(),
            expires_at,
        })
        .collect();

    let playlists_written = store.insert_playlists(rows).await?;

    let mut videos_written = 0;
    for record in &raw {
        let playlist = store
            .playlist_by_resource(user_id, &record.id)
            .await?
            .ok_or_else(|| {
                ApiError::LookupFailure(format!("freshly imported playlist {}", record.id))
            })?;

        let items = platform.fetch_all_playlist_items(user_id, &record.id).await?;
        let rows = items
            .into_iter()
            .map(|item| NewPlaylistVideo {
                playlist_id: playlist.id,
                video_id: item.snippet.resource_id.video_id,
            })
            .collect();

        videos_written += store.insert_playlist_videos(rows).await?;
    }

    info!(
        "Imported {} playlists with {} videos for user {}",
        playlists_written, videos_written, user_id
    );
    Ok((playlists_written, videos_written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{
        FakePlatform, raw_liked_video, raw_playlist, raw_playlist_item, raw_subscription,
    };
    use common::store::MemoryStore;

    #[tokio::test]
    async fn subscriptions_are_persisted_with_the_retention_deadline() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();
        let mut platform = FakePlatform::new();
        platform.subscriptions = vec![
            raw_subscription("UC-a", "Channel A"),
            raw_subscription("UC-b", "Channel B"),
        ];

        let before = retention_deadline();
        let written = import_subscriptions(&platform, &store, user_id).await.unwrap();
        let after = retention_deadline();

        assert_eq!(written, 2);
        let rows = store.subscriptions_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(row.expires_at >= before && row.expires_at <= after);
        }
        assert!(rows.iter().any(|r| r.channel_id == "UC-a"));
    }

    #[tokio::test]
    async fn reimporting_duplicates_rows() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();
        let mut platform = FakePlatform::new();
        platform.liked_videos = vec![raw_liked_video("vid-1", "A video", "A channel")];

        import_liked_videos(&platform, &store, user_id).await.unwrap();
        import_liked_videos(&platform, &store, user_id).await.unwrap();

        let rows = store.liked_videos_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.video_id == "vid-1"));
    }

    #[tokio::test]
    async fn playlist_import_attaches_items_to_the_local_playlist() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();
        let mut platform = FakePlatform::new();
        platform.playlists = vec![
            raw_playlist("PL-1", "First", "public"),
            raw_playlist("PL-2", "Second", "private"),
        ];
        platform.playlist_items.insert(
            "PL-1".to_string(),
            vec![raw_playlist_item("v1"), raw_playlist_item("v2")],
        );
        platform
            .playlist_items
            .insert("PL-2".to_string(), vec![raw_playlist_item("v3")]);

        let (playlists, videos) = import_playlists(&platform, &store, user_id).await.unwrap();
        assert_eq!(playlists, 2);
        assert_eq!(videos, 3);

        let first = store
            .playlist_by_resource(user_id, "PL-1")
            .await
            .unwrap()
            .unwrap();
        let items = store.playlist_videos(first.id).await.unwrap();
        let video_ids: Vec<_> = items.iter().map(|i| i.video_id.as_str()).collect();
        assert_eq!(video_ids, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn item_fetch_failure_aborts_but_keeps_committed_rows() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new();
        let mut platform = FakePlatform::new();
        platform.playlists = vec![
            raw_playlist("PL-ok", "Fetchable", "public"),
            raw_playlist("PL-missing", "Unfetchable", "public"),
        ];
        // No item listing registered for PL-missing, so its fetch fails.
        platform
            .playlist_items
            .insert("PL-ok".to_string(), vec![raw_playlist_item("v1")]);

        let result = import_playlists(&platform, &store, user_id).await;
        assert!(matches!(result, Err(ApiError::Platform(_))));

        // Both playlist rows and the first playlist's items were already
        // committed before the failure.
        let playlists = store.playlists_for_user(user_id).await.unwrap();
        assert_eq!(playlists.len(), 2);
        let ok = store
            .playlist_by_resource(user_id, "PL-ok")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.playlist_videos(ok.id).await.unwrap().len(), 1);
    }
}
