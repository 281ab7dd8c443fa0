//! Share-link transport.
//!
//! A shared curriculum is serialized to JSON and encoded as URL-safe
//! base64 without padding, so the payload can sit in a URL path segment.
//! The copy carries no link back to the store it came from.

use base64::prelude::*;

use crate::types::Curriculum;

/// Share payload could not be turned back into a curriculum.
#[derive(Debug, thiserror::Error)]
pub enum ShareDecodeError {
    /// Payload was empty
    #[error("Share link is empty")]
    Empty,

    /// Payload is not valid base64
    #[error("Share link encoding is invalid: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Decoded bytes are not a curriculum
    #[error("Share link content is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a curriculum for sharing.
pub fn encode(course: &Curriculum) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(course)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}

/// Decode a shared payload. Corrupt input fails; partial data is never returned.
pub fn decode(payload: &str) -> Result<Curriculum, ShareDecodeError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ShareDecodeError::Empty);
    }

    let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn course() -> Curriculum {
        let mut done = MicroLesson::new("Traits", "Shared behaviour — “quoted” ✓").with_resources(
            Resources {
                free: Some(vec![ResourceLink::new(
                    "Book",
                    "https://doc.rust-lang.org/book/ch10-02-traits.html?x=1&y=2",
                    "Web",
                )]),
                paid: Some(vec![]),
            },
        );
        done.completed = true;

        Curriculum {
            schema_version: SchemaVersion::NestedWithResources,
            title: "Rust / Ünïcode".to_string(),
            summary: "Line one\nLine two".to_string(),
            is_project_based: true,
            lessons: vec![
                Lesson::new("Generics")
                    .with_description("Types")
                    .with_micro_lessons(vec![done, MicroLesson::new("Bounds", "where")]),
                Lesson::new("Leaf"),
            ],
            final_note: "🎉".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let original = course();
        let payload = encode(&original).unwrap();

        assert!(payload
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&payload).unwrap(), original);
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(decode("  "), Err(ShareDecodeError::Empty)));
    }

    #[test]
    fn test_bad_encoding() {
        assert!(matches!(
            decode("not*base64!"),
            Err(ShareDecodeError::Encoding(_))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let payload = encode(&course()).unwrap();
        let truncated = &payload[..payload.len() / 2];

        assert!(decode(truncated).is_err());
    }

    #[test]
    fn test_wrong_json() {
        let payload = BASE64_URL_SAFE_NO_PAD.encode(br#"{"title": "missing fields"}"#);
        assert!(matches!(decode(&payload), Err(ShareDecodeError::Json(_))));
    }
}
