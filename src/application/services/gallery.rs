use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::application::errors::AppError;
use crate::domain::images::{GeneratedImage, NewGeneratedImage};
use crate::domain::listing::{SortCriterion, filter_and_sort};
use crate::domain::repositories::{CREDENTIAL_KEY, FAVORITES_KEY, IMAGES_KEY, KeyValueStore};

/// Result of a gallery mutation: the updated value plus whether the durable
/// write succeeded. In-memory state is authoritative either way; a failed
/// write degrades to a warning, never a lost mutation.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: bool,
}

#[derive(Debug)]
pub struct ReorderOutcome {
    pub images: Vec<GeneratedImage>,
    pub changed: bool,
}

#[derive(Default)]
struct GalleryState {
    images: Vec<GeneratedImage>,
    favorites: HashSet<String>,
    credential: Option<String>,
}

/// Ordered, durably persisted gallery of generated images plus the favorites
/// set and the stored API credential.
///
/// All mutations run under one async lock, so each durable write completes
/// before the next mutation begins and no two writes to a key interleave.
#[derive(Clone)]
pub struct GalleryService {
    store: Arc<dyn KeyValueStore>,
    state: Arc<Mutex<GalleryState>>,
}

impl GalleryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(GalleryState::default())),
        }
    }

    /// Restore state from durable storage. Best-effort: a missing or corrupt
    /// blob yields an empty collection and a warning, never an error.
    pub async fn load(&self) {
        let mut state = self.state.lock().await;

        state.images = match self.store.get(IMAGES_KEY).await {
            Ok(Some(blob)) => serde_json::from_slice(&blob).unwrap_or_else(|err| {
                warn!(error = %err, "stored gallery could not be decoded; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read stored gallery; starting empty");
                Vec::new()
            }
        };

        state.favorites = match self.store.get(FAVORITES_KEY).await {
            Ok(Some(blob)) => serde_json::from_slice::<Vec<String>>(&blob)
                .map(HashSet::from_iter)
                .unwrap_or_else(|err| {
                    warn!(error = %err, "stored favorites could not be decoded; starting empty");
                    HashSet::new()
                }),
            Ok(None) => HashSet::new(),
            Err(err) => {
                warn!(error = %err, "failed to read stored favorites; starting empty");
                HashSet::new()
            }
        };

        state.credential = match self.store.get(CREDENTIAL_KEY).await {
            Ok(Some(blob)) => String::from_utf8(blob)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "failed to read stored credential");
                None
            }
        };
    }

    /// Pure read view; never mutates the stored manual order.
    pub async fn list(&self, query: &str, criterion: Option<SortCriterion>) -> Vec<GeneratedImage> {
        let state = self.state.lock().await;
        filter_and_sort(&state.images, &state.favorites, query, criterion)
    }

    /// Snapshot of the favorite-id set, for computing derived view fields.
    pub async fn favorites(&self) -> HashSet<String> {
        self.state.lock().await.favorites.clone()
    }

    pub async fn get(&self, id: &str) -> Option<GeneratedImage> {
        let state = self.state.lock().await;
        state.images.iter().find(|image| image.id == id).cloned()
    }

    /// Commit a new entry at position 0 (most-recent-first default order).
    pub async fn insert(&self, new: NewGeneratedImage) -> Mutation<Vec<GeneratedImage>> {
        let image = new.into_image();
        let mut state = self.state.lock().await;
        state.images.insert(0, image);
        let persisted = self.persist_images(&state).await;
        Mutation {
            value: state.images.clone(),
            persisted,
        }
    }

    /// Remove the entry with the given id. Absent ids are a no-op, not an
    /// error, and skip the durable write.
    pub async fn delete(&self, id: &str) -> Mutation<Vec<GeneratedImage>> {
        let mut state = self.state.lock().await;
        let before = state.images.len();
        state.images.retain(|image| image.id != id);

        let persisted = if state.images.len() == before {
            true
        } else {
            self.persist_images(&state).await
        };

        Mutation {
            value: state.images.clone(),
            persisted,
        }
    }

    /// Replace the manual order with a caller-supplied permutation of the
    /// current id set. An order identical to the current one writes nothing
    /// and reports `changed: false`.
    pub async fn reorder(&self, ids: &[String]) -> Result<Mutation<ReorderOutcome>, AppError> {
        let mut state = self.state.lock().await;

        let current: HashSet<&str> = state.images.iter().map(|i| i.id.as_str()).collect();
        let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if ids.len() != state.images.len() || current != requested {
            return Err(AppError::validation(
                "order must be a permutation of the current gallery ids",
            ));
        }

        let unchanged = state
            .images
            .iter()
            .zip(ids)
            .all(|(image, id)| &image.id == id);
        if unchanged {
            return Ok(Mutation {
                value: ReorderOutcome {
                    images: state.images.clone(),
                    changed: false,
                },
                persisted: true,
            });
        }

        let mut by_id: std::collections::HashMap<String, GeneratedImage> = state
            .images
            .drain(..)
            .map(|image| (image.id.clone(), image))
            .collect();
        state.images = ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        let persisted = self.persist_images(&state).await;
        Ok(Mutation {
            value: ReorderOutcome {
                images: state.images.clone(),
                changed: true,
            },
            persisted,
        })
    }

    /// Invert favorite membership for the given image id. Returns the new
    /// membership state. Applying it twice restores the original set.
    pub async fn toggle_favorite(&self, id: &str) -> Result<Mutation<bool>, AppError> {
        let mut state = self.state.lock().await;

        if !state.images.iter().any(|image| image.id == id) {
            return Err(AppError::not_found("image not found"));
        }

        let is_favorite = if state.favorites.remove(id) {
            false
        } else {
            state.favorites.insert(id.to_string());
            true
        };

        let persisted = self.persist_favorites(&state).await;
        Ok(Mutation {
            value: is_favorite,
            persisted,
        })
    }

    /// Empty the image collection and drop its persisted blob. Favorites are
    /// a separately keyed value and are left untouched.
    pub async fn clear(&self) -> Mutation<Vec<GeneratedImage>> {
        let mut state = self.state.lock().await;
        state.images.clear();

        let persisted = match self.store.remove(IMAGES_KEY).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to remove persisted gallery");
                false
            }
        };

        Mutation {
            value: Vec::new(),
            persisted,
        }
    }

    pub async fn credential(&self) -> Option<String> {
        self.state.lock().await.credential.clone()
    }

    /// Store (or, when empty, clear) the user's API credential.
    pub async fn set_credential(&self, credential: &str) -> Mutation<()> {
        let credential = credential.trim();
        let mut state = self.state.lock().await;

        let persisted = if credential.is_empty() {
            state.credential = None;
            match self.store.remove(CREDENTIAL_KEY).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "failed to remove stored credential");
                    false
                }
            }
        } else {
            state.credential = Some(credential.to_string());
            match self.store.set(CREDENTIAL_KEY, credential.as_bytes()).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "failed to persist credential");
                    false
                }
            }
        };

        Mutation {
            value: (),
            persisted,
        }
    }

    async fn persist_images(&self, state: &GalleryState) -> bool {
        let blob = match serde_json::to_vec(&state.images) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "failed to encode gallery for persistence");
                return false;
            }
        };

        match self.store.set(IMAGES_KEY, &blob).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist gallery images");
                false
            }
        }
    }

    async fn persist_favorites(&self, state: &GalleryState) -> bool {
        // Sort for a deterministic blob
        let mut favorites: Vec<&str> = state.favorites.iter().map(String::as_str).collect();
        favorites.sort_unstable();

        let blob = match serde_json::to_vec(&favorites) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "failed to encode favorites for persistence");
                return false;
            }
        };

        match self.store.set(FAVORITES_KEY, &blob).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist favorites");
                false
            }
        }
    }
}
