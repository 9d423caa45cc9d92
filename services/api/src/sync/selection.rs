//! Selection parsing and the per-kind export failure policy
//!
//! Delete/download/export forms submit a map of `"<naturalKey><suffix>"`
//! keys, where the trailing tag names the kind of record the natural key
//! refers to. The suffix convention is parsed exactly once, here; the rest
//! of the engine only sees typed [`SelectionKey`] values.

use serde::Serialize;
use std::collections::BTreeMap;

/// Form-key suffix tagging a liked-video selection
const LIKED_VIDEO_SUFFIX: &str = "videoid";
/// Form-key suffix tagging a subscription selection
const SUBSCRIPTION_SUFFIX: &str = "channel";
/// Form-key suffix tagging a playlist selection
const PLAYLIST_SUFFIX: &str = "playlis";

/// The kind of local record a selection key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    LikedVideo,
    Subscription,
    Playlist,
}

/// What a failed platform mutation does to the rest of the export batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the batch and surface the error
    AbortBatch,
    /// Record the failure and move on to the next selected key
    ContinueBatch,
}

impl SelectionKind {
    /// Export failure policy for this kind. Re-subscribing to an already
    /// subscribed channel is expected and not user-actionable, so
    /// subscription failures never abort the batch.
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            SelectionKind::Subscription => FailurePolicy::ContinueBatch,
            SelectionKind::LikedVideo | SelectionKind::Playlist => FailurePolicy::AbortBatch,
        }
    }
}

/// One parsed selection: a kind plus the remote natural key used to look up
/// the local row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionKey {
    pub kind: SelectionKind,
    pub natural_key: String,
}

/// Parse a submitted selection map into typed keys, in the map's order.
/// Keys without a recognized suffix are ignored.
pub fn parse_selection(form: &BTreeMap<String, String>) -> Vec<SelectionKey> {
    let mut keys = Vec::new();

    for raw in form.keys() {
        if let Some(natural_key) = raw.strip_suffix(LIKED_VIDEO_SUFFIX) {
            keys.push(SelectionKey {
                kind: SelectionKind::LikedVideo,
                natural_key: natural_key.to_string(),
            });
        } else if let Some(natural_key) = raw.strip_suffix(SUBSCRIPTION_SUFFIX) {
            keys.push(SelectionKey {
                kind: SelectionKind::Subscription,
                natural_key: natural_key.to_string(),
            });
        } else if let Some(natural_key) = raw.strip_suffix(PLAYLIST_SUFFIX) {
            keys.push(SelectionKey {
                kind: SelectionKind::Playlist,
                natural_key: natural_key.to_string(),
            });
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(entries: &[&str]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|key| (key.to_string(), "on".to_string()))
            .collect()
    }

    #[test]
    fn parses_each_kind_and_strips_its_suffix() {
        let keys = parse_selection(&form(&["UC123channel", "PLabcplaylis", "vid99videoid"]));

        assert_eq!(
            keys,
            vec![
                SelectionKey {
                    kind: SelectionKind::Playlist,
                    natural_key: "PLabc".to_string(),
                },
                SelectionKey {
                    kind: SelectionKind::Subscription,
                    natural_key: "UC123".to_string(),
                },
                SelectionKey {
                    kind: SelectionKind::LikedVideo,
                    natural_key: "vid99".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ignores_keys_without_a_recognized_suffix() {
        let keys = parse_selection(&form(&["csrf_token", "UC123channel"]));
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].natural_key, "UC123");
    }

    #[test]
    fn natural_key_ending_in_another_suffix_keeps_its_tagged_kind() {
        // The tagged suffix sits at the very end, so a natural key that
        // happens to end in a different suffix still parses correctly.
        let keys = parse_selection(&form(&["UCplaylischannel"]));
        assert_eq!(
            keys,
            vec![SelectionKey {
                kind: SelectionKind::Subscription,
                natural_key: "UCplaylis".to_string(),
            }]
        );
    }

    #[test]
    fn unrelated_field_ending_in_a_suffix_is_misread_as_a_selection() {
        // Known fragility of the suffix convention: any form field whose
        // name ends in a suffix is indistinguishable from a selection.
        let keys = parse_selection(&form(&["remember_channel"]));
        assert_eq!(
            keys,
            vec![SelectionKey {
                kind: SelectionKind::Subscription,
                natural_key: "remember_".to_string(),
            }]
        );
    }

    #[test]
    fn subscription_failures_continue_the_batch_while_others_abort() {
        assert_eq!(
            SelectionKind::Subscription.failure_policy(),
            FailurePolicy::ContinueBatch
        );
        assert_eq!(
            SelectionKind::LikedVideo.failure_policy(),
            FailurePolicy::AbortBatch
        );
        assert_eq!(
            SelectionKind::Playlist.failure_policy(),
            FailurePolicy::AbortBatch
        );
    }
}
