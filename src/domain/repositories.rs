use async_trait::async_trait;

use crate::domain::StorageError;

/// Key under which the serialized image collection is stored.
pub const IMAGES_KEY: &str = "gallery-images";

/// Key under which the serialized favorite-id set is stored.
pub const FAVORITES_KEY: &str = "gallery-favorites";

/// Key under which the user's stored API credential is kept.
pub const CREDENTIAL_KEY: &str = "api-credential";

/// Durable key-value persistence. Values are opaque byte blobs; each logical
/// collection lives under its own key and is written as a whole.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
