//! Export pipeline: replay selected local records as platform mutations
//!
//! Keys are processed in selection order. A lookup failure always aborts
//! the batch; a platform failure is handled per the kind's
//! [`FailurePolicy`]. Swallowed failures are recorded in the report rather
//! than silently dropped.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use common::store::LibraryStore;

use crate::error::{ApiError, ApiResult};
use crate::platform::VideoPlatform;
use crate::sync::selection::{FailurePolicy, SelectionKey, SelectionKind};

/// A selected key whose platform mutation failed but did not abort the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedExport {
    pub key: SelectionKey,
    pub reason: String,
}

/// Outcome of one export request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub exported: u64,
    pub skipped: Vec<SkippedExport>,
}

/// Export every selected record to the user's platform account
pub async fn export_selection<P, S>(
    platform: &P,
    store: &S,
    user_id: Uuid,
    keys: &[SelectionKey],
) -> ApiResult<ExportReport>
where
    P: VideoPlatform + ?Sized,
    S: LibraryStore + ?Sized,
{
    let mut report = ExportReport::default();

    for key in keys {
        match export_key(platform, store, user_id, key).await {
            Ok(()) => report.exported += 1,
            Err(ApiError::Platform(err))
                if key.kind.failure_policy() == FailurePolicy::ContinueBatch =>
            {
                warn!(
                    "Skipping export of {} {}: {}",
                    kind_name(key.kind),
                    key.natural_key,
                    err
                );
                report.skipped.push(SkippedExport {
                    key: key.clone(),
                    reason: err.to_string(),
                });
            }
            Err(other) => return Err(other),
        }
    }

    info!(
        "Exported {} of {} selected records for user {}",
        report.exported,
        keys.len(),
        user_id
    );
    Ok(report)
}

/// Export one selected record. Lookup failures surface as
/// [`ApiError::LookupFailure`]; platform failures as [`ApiError::Platform`].
async fn export_key<P, S>(
    platform: &P,
    store: &S,
    user_id: Uuid,
    key: &SelectionKey,
) -> ApiResult<()>
where
    P: VideoPlatform + ?Sized,
    S: LibraryStore + ?Sized,
{
    match key.kind {
        SelectionKind::LikedVideo => {
            let video = store
                .liked_video_by_video(user_id, &key.natural_key)
                .await?
                .ok_or_else(|| lookup_failure(key))?;
            platform.rate_video(user_id, &video.video_id).await?;
        }
        SelectionKind::Subscription => {
            let subscription = store
                .subscription_by_channel(user_id, &key.natural_key)
                .await?
                .ok_or_else(|| lookup_failure(key))?;
            platform
                .subscribe_to_channel(user_id, &subscription.channel_id)
                .await?;
        }
        SelectionKind::Playlist => {
            let playlist = store
                .playlist_by_resource(user_id, &key.natural_key)
                .await?
                .ok_or_else(|| lookup_failure(key))?;

            let remote_id = platform
                .create_playlist(user_id, &playlist.title, &playlist.privacy_status)
                .await?;

            // One append per local item, against the freshly created
            // remote playlist.
            let videos = store.playlist_videos(playlist.id).await?;
            for video in &videos {
                platform
                    .add_playlist_video(user_id, &remote_id, &video.video_id)
                    .await?;
            }
        }
    }

    Ok(())
}

fn lookup_failure(key: &SelectionKey) -> ApiError {
    ApiError::LookupFailure(format!("{} {}", kind_name(key.kind), key.natural_key))
}

fn kind_name(kind: SelectionKind) -> &'static str {
    match kind {
        SelectionKind::LikedVideo => "liked video",
        SelectionKind::Subscription => "subscription",
        SelectionKind::Playlist => "playlist",
    }
}
