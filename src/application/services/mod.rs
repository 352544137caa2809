pub mod gallery;

pub use gallery::{GalleryService, Mutation, ReorderOutcome};
