use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted gallery entry. `id` and `created_at` are assigned at
/// creation time and never change; ordering among entries is user-controlled
/// and independent of `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    pub prompt: String,
    pub content_type: String,
    #[serde(with = "image_bytes")]
    pub image_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedImage {
    /// Filename offered when the raw bytes are downloaded, derived from the
    /// creation timestamp: `ai-generated-2024-01-01T12-00-00.png`.
    pub fn download_filename(&self) -> String {
        format!(
            "ai-generated-{}.png",
            self.created_at.format("%Y-%m-%dT%H-%M-%S")
        )
    }
}

/// A gallery entry accepted from the caller but not yet committed.
#[derive(Debug, Clone)]
pub struct NewGeneratedImage {
    pub prompt: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
}

impl NewGeneratedImage {
    /// Assign identity and timestamp, producing the record to be stored.
    pub fn into_image(self) -> GeneratedImage {
        GeneratedImage {
            id: Uuid::new_v4().to_string(),
            prompt: self.prompt,
            content_type: self.content_type,
            image_data: self.image_data,
            created_at: Utc::now(),
        }
    }
}

/// Decode an image payload submitted as either a `data:` URL or bare base64.
///
/// Returns the content type (taken from the data URL, defaulting to
/// `image/png` for bare base64) and the decoded bytes.
pub fn decode_image_payload(payload: &str) -> Result<(String, Vec<u8>), ImageDecodeError> {
    use base64::Engine;

    let payload = payload.trim();
    let (content_type, encoded) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (content_type, encoded) = rest
                .split_once(";base64,")
                .ok_or(ImageDecodeError::MalformedDataUrl)?;
            (content_type.to_string(), encoded)
        }
        None => ("image/png".to_string(), payload),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| ImageDecodeError::InvalidBase64)?;

    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    Ok((content_type, bytes))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("image data URL is malformed")]
    MalformedDataUrl,
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("image payload is empty")]
    Empty,
}

/// Serialize image bytes as standard base64 so the persisted collection
/// round-trips through a single JSON blob.
mod image_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
