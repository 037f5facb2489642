use serde::{Deserialize, Serialize};

/// One entry of the remote playback queue (or of a search page).
///
/// Field names follow the server's JSON (`ID`, `Name`, `IsPlaying`, …);
/// snake_case spellings are accepted too so hand-written fixtures stay short.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct QueueItem {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Artist", alias = "artist")]
    pub artist: String,
    /// Human readable, e.g. "3:05". Display only.
    #[serde(rename = "Duration", alias = "duration")]
    pub duration: String,
    /// Rendered cover. Empty until the asset loader has run, unless the
    /// server already rendered one.
    #[serde(rename = "Ascii", alias = "ascii")]
    pub cover: String,
    #[serde(rename = "URL", alias = "url")]
    pub url: String,
    #[serde(
        rename = "CoverURL",
        alias = "cover_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_url: Option<String>,
    #[serde(rename = "IsPlaying", alias = "is_playing")]
    pub is_playing: bool,
    #[serde(rename = "CurrentSecond", alias = "current_second")]
    pub current_second: u32,
    #[serde(rename = "TotalSeconds", alias = "total_seconds")]
    pub total_seconds: u32,
    #[serde(rename = "Liked", alias = "liked")]
    pub liked: bool,
}

impl QueueItem {
    /// Where the cover image lives. Falls back to the source URL.
    pub fn cover_source(&self) -> Option<&str> {
        self.cover_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| Some(self.url.as_str()).filter(|u| !u.is_empty()))
    }
}

/// Body of `POST /queue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnqueueRequest {
    pub ids: Vec<String>,
}

/// Checks the queue ordering rule: at most one playing item, and only in
/// first position.
pub fn is_well_ordered(queue: &[QueueItem]) -> bool {
    queue
        .iter()
        .enumerate()
        .all(|(i, item)| !item.is_playing || i == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_server_field_names() {
        let json = r#"[{
            "ID": "a1", "Name": "Super Shy", "Artist": "NewJeans",
            "Duration": "2:34", "Ascii": "", "URL": "https://example.com/a1.jpg",
            "IsPlaying": true, "CurrentSecond": 12, "TotalSeconds": 154,
            "Liked": false, "Selected": true
        }]"#;
        let items: Vec<QueueItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "a1");
        assert_eq!(item.artist, "NewJeans");
        assert!(item.is_playing);
        assert_eq!(item.current_second, 12);
        assert_eq!(item.total_seconds, 154);
        assert_eq!(item.cover_source(), Some("https://example.com/a1.jpg"));
    }

    #[test]
    fn test_decode_snake_case_and_missing_fields() {
        let json = r#"{"id": "b", "total_seconds": 180, "cover_url": "http://c/b.png"}"#;
        let item: QueueItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "b");
        assert_eq!(item.total_seconds, 180);
        assert!(!item.is_playing);
        assert!(item.name.is_empty());
        assert_eq!(item.cover_source(), Some("http://c/b.png"));
    }

    #[test]
    fn test_cover_source_absent() {
        let item = QueueItem::default();
        assert_eq!(item.cover_source(), None);
    }

    #[test]
    fn test_enqueue_request_shape() {
        let body = EnqueueRequest {
            ids: vec!["x".into(), "y".into()],
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"ids":["x","y"]}"#);
    }

    #[test]
    fn test_well_ordered() {
        let playing = QueueItem {
            id: "a".into(),
            is_playing: true,
            ..Default::default()
        };
        let idle = QueueItem {
            id: "b".into(),
            ..Default::default()
        };
        assert!(is_well_ordered(&[playing.clone(), idle.clone()]));
        assert!(is_well_ordered(&[idle.clone(), idle.clone()]));
        assert!(!is_well_ordered(&[idle, playing]));
    }
}
