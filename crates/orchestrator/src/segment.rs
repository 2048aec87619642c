//! Segment records and the keys they are stored under.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use corelib::NodeId;
use serde::{Deserialize, Serialize};

/// Prefix of the durable storage node registry.
pub const NODE_PREFIX: &str = "/storage/nodes/";

/// Metadata for one stored segment. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSegment {
    pub segment_id: String,
    pub video_id: String,
    pub quality: String,
    /// Position within the video.
    pub sequence: u32,
    pub blob_key: String,
    /// Replica holders in ring-selection order. May name nodes that have
    /// since left the ring.
    pub node_ids: Vec<NodeId>,
    /// Payload size in bytes.
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// A segment upload with optional labels.
///
/// ```
/// use orchestrator::StoreRequest;
///
/// let req = StoreRequest::new("vid-1", "seg-3", vec![0u8; 16])
///     .with_quality("720p")
///     .with_sequence(3);
/// assert_eq!(req.sequence, 3);
/// ```
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub video_id: String,
    pub segment_id: String,
    pub payload: Bytes,
    /// Falls back to the configured default quality.
    pub quality: Option<String>,
    pub sequence: u32,
}

impl StoreRequest {
    pub fn new(
        video_id: impl Into<String>,
        segment_id: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            segment_id: segment_id.into(),
            payload: payload.into(),
            quality: None,
            sequence: 0,
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }
}

pub fn blob_key(video_id: &str, segment_id: &str) -> String {
    format!("segments/{video_id}/{segment_id}")
}

pub fn metadata_key(segment_id: &str) -> String {
    format!("/segments/{segment_id}")
}

pub fn cache_key(segment_id: &str) -> String {
    format!("segment:{segment_id}")
}

pub fn index_key(video_id: &str) -> String {
    format!("video:{video_id}:segments")
}

pub fn node_key(node_id: &str) -> String {
    format!("{NODE_PREFIX}{node_id}")
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(blob_key("vid-7", "seg-42"), "segments/vid-7/seg-42");
        assert_eq!(metadata_key("seg-42"), "/segments/seg-42");
        assert_eq!(cache_key("seg-42"), "segment:seg-42");
        assert_eq!(index_key("vid-7"), "video:vid-7:segments");
        assert_eq!(node_key("node-1"), "/storage/nodes/node-1");
    }

    #[test]
    fn test_record_json_shape() {
        let segment = VideoSegment {
            segment_id: "seg-42".into(),
            video_id: "vid-7".into(),
            quality: "1080p".into(),
            sequence: 0,
            blob_key: blob_key("vid-7", "seg-42"),
            node_ids: vec!["node-1".into()],
            size: 1024,
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["segmentId"], "seg-42");
        assert_eq!(json["blobKey"], "segments/vid-7/seg-42");
        assert_eq!(json["nodeIds"][0], "node-1");

        let back: VideoSegment = serde_json::from_value(json).unwrap();
        assert_eq!(back, segment);
    }
}
