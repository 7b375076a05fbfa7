//! Lightning strike records and feed message parsing.

use crate::error::FeedError;
use serde::{Deserialize, Serialize};

/// A single reported lightning discharge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    pub lat: f64,
    pub lon: f64,
    /// Epoch time in milliseconds
    pub time: i64,
}

impl Strike {
    #[allow(dead_code)]
    pub fn new(lat: f64, lon: f64, time: i64) -> Self {
        Self { lat, lon, time }
    }
}

/// One batched message from the streaming feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(default)]
    pub strokes: Vec<Strike>,
}

impl FeedMessage {
    /// Parses a text frame from the feed.
    pub fn parse(text: &str) -> Result<Self, FeedError> {
        serde_json::from_str(text).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch() {
        let text = r#"{"strokes":[{"lat":35.1,"lon":-97.2,"time":1714564800000},{"lat":36.0,"lon":-96.5,"time":1714564801500}]}"#;
        let message = FeedMessage::parse(text).unwrap();
        assert_eq!(
            message.strokes,
            vec![
                Strike::new(35.1, -97.2, 1714564800000),
                Strike::new(36.0, -96.5, 1714564801500),
            ]
        );
    }

    #[test]
    fn test_missing_strokes_is_empty() {
        let message = FeedMessage::parse(r#"{"type":"heartbeat"}"#).unwrap();
        assert!(message.strokes.is_empty());
    }

    #[test]
    fn test_malformed_message() {
        assert!(matches!(
            FeedMessage::parse("not json"),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            FeedMessage::parse(r#"{"strokes":[{"lat":"north"}]}"#),
            Err(FeedError::Malformed(_))
        ));
    }
}
