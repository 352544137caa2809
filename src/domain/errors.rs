use thiserror::Error;

/// Failures raised by the durable key-value layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to encode value for key '{key}': {reason}")]
    Serialization { key: String, reason: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn serialization(key: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::Serialization {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        StorageError::Backend(reason.into())
    }
}
