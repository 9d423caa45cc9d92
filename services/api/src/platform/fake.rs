//! Recording fake of [`VideoPlatform`] used by the pipeline tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::platform::{
    ChannelResource, PlatformError, PlaylistItemSnippet, PlaylistSnippet, PlaylistStatus,
    RawLikedVideo, RawPlaylist, RawPlaylistItem, RawSubscription, SubscriptionSnippet, Thumbnail,
    Thumbnails, VideoPlatform, VideoResource, VideoSnippet,
};

/// A mutation the fake has been asked to perform, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Subscribe {
        channel_id: String,
    },
    Rate {
        video_id: String,
    },
    CreatePlaylist {
        title: String,
        privacy_status: String,
    },
    AddPlaylistVideo {
        playlist_id: String,
        video_id: String,
    },
}

#[derive(Default)]
pub struct FakePlatform {
    pub subscriptions: Vec<RawSubscription>,
    pub liked_videos: Vec<RawLikedVideo>,
    pub playlists: Vec<RawPlaylist>,
    pub playlist_items: HashMap<String, Vec<RawPlaylistItem>>,
    /// Channel ids whose subscribe call fails (e.g. already subscribed)
    pub failing_channels: HashSet<String>,
    /// Video ids whose rate call fails
    pub failing_videos: HashSet<String>,
    /// Video ids whose playlist insertion fails
    pub failing_playlist_videos: HashSet<String>,
    mutations: Mutex<Vec<Mutation>>,
    created_playlists: Mutex<u32>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutations recorded so far, in call order
    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }

    fn record(&self, mutation: Mutation) {
        self.mutations.lock().unwrap().push(mutation);
    }
}

fn duplicate_error(message: &str) -> PlatformError {
    PlatformError::Api {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn fetch_all_subscriptions(
        &self,
        _user_id: Uuid,
    ) -> Result<Vec<RawSubscription>, PlatformError> {
        Ok(self.subscriptions.clone())
    }

    async fn fetch_all_liked_videos(
        &self,
        _user_id: Uuid,
    ) -> Result<Vec<RawLikedVideo>, PlatformError> {
        Ok(self.liked_videos.clone())
    }

    async fn fetch_all_playlists(&self, _user_id: Uuid) -> Result<Vec<RawPlaylist>, PlatformError> {
        Ok(self.playlists.clone())
    }

    async fn fetch_all_playlist_items(
        &self,
        _user_id: Uuid,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>, PlatformError> {
        match self.playlist_items.get(playlist_id) {
            Some(items) => Ok(items.clone()),
            None => Err(PlatformError::Api {
                status: 404,
                message: "playlistNotFound".to_string(),
            }),
        }
    }

    async fn subscribe_to_channel(
        &self,
        _user_id: Uuid,
        channel_id: &str,
    ) -> Result<(), PlatformError> {
        if self.failing_channels.contains(channel_id) {
            return Err(duplicate_error("subscriptionDuplicate"));
        }
        self.record(Mutation::Subscribe {
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn rate_video(&self, _user_id: Uuid, video_id: &str) -> Result<(), PlatformError> {
        if self.failing_videos.contains(video_id) {
            return Err(duplicate_error("videoRatingDisabled"));
        }
        self.record(Mutation::Rate {
            video_id: video_id.to_string(),
        });
        Ok(())
    }

    async fn create_playlist(
        &self,
        _user_id: Uuid,
        title: &str,
        privacy_status: &str,
    ) -> Result<String, PlatformError> {
        self.record(Mutation::CreatePlaylist {
            title: title.to_string(),
            privacy_status: privacy_status.to_string(),
        });
        let mut counter = self.created_playlists.lock().unwrap();
        *counter += 1;
        Ok(format!("remote-PL-{}", counter))
    }

    async fn add_playlist_video(
        &self,
        _user_id: Uuid,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        if self.failing_playlist_videos.contains(video_id) {
            return Err(duplicate_error("videoNotFound"));
        }
        self.record(Mutation::AddPlaylistVideo {
            playlist_id: playlist_id.to_string(),
            video_id: video_id.to_string(),
        });
        Ok(())
    }
}

fn thumbnails() -> Thumbnails {
    Thumbnails {
        default: Thumbnail {
            url: "https://example.com/thumb.jpg".to_string(),
        },
    }
}

/// Build a raw subscription record
pub fn raw_subscription(channel_id: &str, title: &str) -> RawSubscription {
    RawSubscription {
        snippet: SubscriptionSnippet {
            title: title.to_string(),
            resource_id: ChannelResource {
                channel_id: channel_id.to_string(),
            },
            thumbnails: thumbnails(),
        },
    }
}

/// Build a raw liked-video record
pub fn raw_liked_video(video_id: &str, title: &str, channel_title: &str) -> RawLikedVideo {
    RawLikedVideo {
        id: video_id.to_string(),
        snippet: VideoSnippet {
            title: title.to_string(),
            channel_title: channel_title.to_string(),
            thumbnails: thumbnails(),
        },
    }
}

/// Build a raw playlist record
pub fn raw_playlist(resource_id: &str, title: &str, privacy_status: &str) -> RawPlaylist {
    RawPlaylist {
        id: resource_id.to_string(),
        snippet: PlaylistSnippet {
            title: title.to_string(),
            thumbnails: thumbnails(),
        },
        status: PlaylistStatus {
            privacy_status: privacy_status.to_string(),
        },
    }
}

/// Build a raw playlist item record
pub fn raw_playlist_item(video_id: &str) -> RawPlaylistItem {
    RawPlaylistItem {
        snippet: PlaylistItemSnippet {
            resource_id: VideoResource {
                video_id: video_id.to_string(),
            },
        },
    }
}
