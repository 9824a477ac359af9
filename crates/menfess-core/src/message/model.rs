//! Menfess records and result pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One anonymous message as returned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Unique record id.
    pub id: i64,
    /// Sender name (often a pseudonym).
    #[serde(default)]
    pub sender: String,
    /// Recipient name.
    #[serde(default)]
    pub recipient: String,
    /// Message body.
    #[serde(default)]
    pub message: String,
    /// Creation time.
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    /// Track id at the metadata provider, if the sender attached a song.
    #[serde(
        default,
        alias = "external_track_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_track_id: Option<String>,
}

impl MessageRecord {
    /// Track id worth looking up; blank ids count as absent.
    #[must_use]
    pub fn track_id(&self) -> Option<&str> {
        self.external_track_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Normalized track details from the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    /// Track title.
    pub title: String,
    /// Artist names, comma separated.
    pub artist: String,
    /// Album cover image URL; empty when the provider has none.
    pub cover_image_url: String,
    /// 30 second preview clip, if the provider offers one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// A record plus optional track metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// The record as received.
    #[serde(flatten)]
    pub record: MessageRecord,
    /// Attached track metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackMetadata>,
}

impl EnrichedRecord {
    /// Wraps a record without metadata.
    #[must_use]
    pub const fn plain(record: MessageRecord) -> Self {
        Self {
            record,
            track: None,
        }
    }

    /// Wraps a record with metadata.
    #[must_use]
    pub const fn with_track(record: MessageRecord, track: TrackMetadata) -> Self {
        Self {
            record,
            track: Some(track),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Records in service order.
    pub items: Vec<EnrichedRecord>,
    /// Page that was requested.
    pub current_page: u32,
    /// Total pages reported by the service.
    pub total_pages: u32,
    /// Total matching records reported by the service.
    pub total_items: u64,
}

impl Page {
    /// True when there is a page after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// True when there is a page before this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_record() {
        let json = r#"{
            "id": 7,
            "sender": "anon",
            "recipient": "Dinda",
            "message": "hai",
            "createdAt": "2024-05-01T10:00:00Z",
            "externalTrackId": "4uLU6hMCjMI75M1A2tKUQC"
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.track_id(), Some("4uLU6hMCjMI75M1A2tKUQC"));
    }

    #[test]
    fn test_deserialize_snake_case_aliases() {
        let json = r#"{
            "id": 8,
            "recipient": "Raka",
            "message": "semangat",
            "created_at": "2024-05-01T10:00:00Z",
            "external_track_id": "abc"
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(record.sender.is_empty());
        assert_eq!(record.track_id(), Some("abc"));
    }

    #[test]
    fn test_unknown_track_field_ignored() {
        let json = r#"{
            "id": 9,
            "createdAt": "2024-05-01T10:00:00Z",
            "spotify_id": "abc",
            "track_id": "def"
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(record.track_id().is_none());
    }

    #[test]
    fn test_blank_track_id_is_absent() {
        let json = r#"{"id":1,"createdAt":"2024-05-01T10:00:00Z","externalTrackId":"  "}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(record.track_id().is_none());
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let json = r#"{"id":1,"createdAt":"2024-05-01T10:00:00Z"}"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(EnrichedRecord::plain(record)).unwrap();
        assert_eq!(value["id"], 1);
        assert!(value.get("track").is_none());
        assert!(value.get("externalTrackId").is_none());
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page {
            items: Vec::new(),
            current_page: 1,
            total_pages: 3,
            total_items: 25,
        };
        assert!(page.has_next());
        assert!(!page.has_previous());
    }
}
