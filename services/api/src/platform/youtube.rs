//! YouTube Data API v3 implementation of [`VideoPlatform`]
//!
//! Every operation resolves the user's stored credential first; a missing
//! credential is a [`PlatformError::NotAuthorized`]. Listings accumulate
//! pages of 50 through [`drain_pages`]; mutations are single POSTs. Each
//! request carries the configured deadline, so a hung platform call cannot
//! block an import forever.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::env;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::platform::{
    Page, PlatformError, RawLikedVideo, RawPlaylist, RawPlaylistItem, RawSubscription,
    VideoPlatform, drain_pages,
};
use crate::repositories::CredentialRepository;

/// Page size for every paginated listing
const PAGE_SIZE: u32 = 50;

/// Immutable configuration for the platform client
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL of the platform API
    pub api_base: String,
    /// Per-request deadline
    pub request_timeout: Duration,
}

impl PlatformConfig {
    /// Create a new PlatformConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PLATFORM_API_BASE`: API base URL (default: YouTube Data API v3)
    /// - `PLATFORM_REQUEST_TIMEOUT_SECS`: per-request deadline (default: 30)
    pub fn from_env() -> Self {
        let api_base = env::var("PLATFORM_API_BASE")
            .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string());

        let request_timeout = env::var("PLATFORM_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            api_base,
            request_timeout,
        }
    }
}

/// Error payload envelope returned by the platform on non-success responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Response body of a playlist creation call
#[derive(Debug, Deserialize)]
struct CreatedPlaylist {
    id: String,
}

/// Authenticated client for the YouTube Data API v3
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    credentials: CredentialRepository,
    config: PlatformConfig,
}

impl YouTubeClient {
    /// Create a new client with the given configuration
    pub fn new(
        config: PlatformConfig,
        credentials: CredentialRepository,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            credentials,
            config,
        })
    }

    /// Resolve the user's stored access token
    async fn access_token(&self, user_id: Uuid) -> Result<String, PlatformError> {
        let credential = self
            .credentials
            .find_by_user(user_id)
            .await
            .map_err(PlatformError::CredentialStore)?
            .ok_or(PlatformError::NotAuthorized)?;

        Ok(credential.access_token)
    }

    /// Fetch one page of a listing endpoint
    async fn list_page<T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        params: &[(&str, &str)],
        page_token: Option<String>,
    ) -> Result<Page<T>, PlatformError> {
        let mut request = self
            .http
            .get(format!("{}/{}", self.config.api_base, path))
            .bearer_auth(access_token)
            .query(params)
            .query(&[("maxResults", PAGE_SIZE.to_string())]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json::<Page<T>>().await?)
    }

    /// Issue one mutating POST, returning the raw response on success
    async fn mutate(
        &self,
        user_id: Uuid,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, PlatformError> {
        let access_token = self.access_token(user_id).await?;

        let mut request = self
            .http
            .post(format!("{}/{}", self.config.api_base, path))
            .bearer_auth(&access_token)
            .query(params);

        if let Some(body) = body {
            request = request.json(body);
        }

        check_status(request.send().await?).await
    }
}

/// Turn a non-success response into a [`PlatformError::Api`] carrying the
/// platform's own error message where one is present
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

fn api_error(status: u16, body: &str) -> PlatformError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    PlatformError::Api { status, message }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn fetch_all_subscriptions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RawSubscription>, PlatformError> {
        let access_token = self.access_token(user_id).await?;
        let params = [
            ("part", "snippet"),
            ("mine", "true"),
            ("order", "alphabetical"),
        ];

        let items = drain_pages(|page_token| {
            self.list_page(&access_token, "subscriptions", &params, page_token)
        })
        .await?;

        info!("Fetched {} subscriptions from the platform", items.len());
        Ok(items)
    }

    async fn fetch_all_liked_videos(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RawLikedVideo>, PlatformError> {
        let access_token = self.access_token(user_id).await?;
        let params = [("part", "snippet"), ("myRating", "like")];

        let items = drain_pages(|page_token| {
            self.list_page(&access_token, "videos", &params, page_token)
        })
        .await?;

        info!("Fetched {} liked videos from the platform", items.len());
        Ok(items)
    }

    async fn fetch_all_playlists(&self, user_id: Uuid) -> Result<Vec<RawPlaylist>, PlatformError> {
        let access_token = self.access_token(user_id).await?;
        let params = [("part", "snippet,status"), ("mine", "true")];

        let items = drain_pages(|page_token| {
            self.list_page(&access_token, "playlists", &params, page_token)
        })
        .await?;

        info!("Fetched {} playlists from the platform", items.len());
        Ok(items)
    }

    async fn fetch_all_playlist_items(
        &self,
        user_id: Uuid,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>, PlatformError> {
        let access_token = self.access_token(user_id).await?;
        let params = [("part", "snippet"), ("playlistId", playlist_id)];

        let items = drain_pages(|page_token| {
            self.list_page(&access_token, "playlistItems", &params, page_token)
        })
        .await?;

        info!(
            "Fetched {} items for playlist {}",
            items.len(),
            playlist_id
        );
        Ok(items)
    }

    async fn subscribe_to_channel(
        &self,
        user_id: Uuid,
        channel_id: &str,
    ) -> Result<(), PlatformError> {
        let body = json!({
            "snippet": {
                "resourceId": {
                    "kind": "youtube#channel",
                    "channelId": channel_id,
                }
            }
        });

        self.mutate(user_id, "subscriptions", &[("part", "snippet")], Some(&body))
            .await?;
        Ok(())
    }

    async fn rate_video(&self, user_id: Uuid, video_id: &str) -> Result<(), PlatformError> {
        self.mutate(
            user_id,
            "videos/rate",
            &[("id", video_id), ("rating", "like")],
            None,
        )
        .await?;
        Ok(())
    }

    async fn create_playlist(
        &self,
        user_id: Uuid,
        title: &str,
        privacy_status: &str,
    ) -> Result<String, PlatformError> {
        let body = json!({
            "snippet": { "title": title },
            "status": { "privacyStatus": privacy_status },
        });

        let response = self
            .mutate(user_id, "playlists", &[("part", "snippet,status")], Some(&body))
            .await?;

        let created: CreatedPlaylist = response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        Ok(created.id)
    }

    async fn add_playlist_video(
        &self,
        user_id: Uuid,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        let body = json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id,
                }
            }
        });

        self.mutate(user_id, "playlistItems", &[("part", "snippet")], Some(&body))
            .await?;
        Ok(())
    }
}
