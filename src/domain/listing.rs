use std::collections::HashSet;

use crate::domain::images::GeneratedImage;

/// Read-view sort criteria for the gallery. `FavoritesOnly` filters rather
/// than sorts; the other two order a copy by creation time. None of them
/// touch the stored manual order.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortCriterion {
    Newest,
    Oldest,
    FavoritesOnly,
}

impl SortCriterion {
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(SortCriterion::Newest),
            "oldest" => Some(SortCriterion::Oldest),
            "favorites" => Some(SortCriterion::FavoritesOnly),
            _ => None,
        }
    }

    pub const fn query_value(self) -> &'static str {
        match self {
            SortCriterion::Newest => "newest",
            SortCriterion::Oldest => "oldest",
            SortCriterion::FavoritesOnly => "favorites",
        }
    }
}

/// Pure read view over the gallery sequence.
///
/// The text query is a case-insensitive substring match against the prompt.
/// When both a query and `FavoritesOnly` are active they compose by
/// conjunction. Without a criterion the manual order is preserved.
pub fn filter_and_sort(
    images: &[GeneratedImage],
    favorites: &HashSet<String>,
    query: &str,
    criterion: Option<SortCriterion>,
) -> Vec<GeneratedImage> {
    let query = query.trim().to_lowercase();
    let favorites_only = matches!(criterion, Some(SortCriterion::FavoritesOnly));

    let mut view: Vec<GeneratedImage> = images
        .iter()
        .filter(|image| query.is_empty() || image.prompt.to_lowercase().contains(&query))
        .filter(|image| !favorites_only || favorites.contains(&image.id))
        .cloned()
        .collect();

    match criterion {
        Some(SortCriterion::Newest) => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Some(SortCriterion::Oldest) => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        Some(SortCriterion::FavoritesOnly) | None => {}
    }

    view
}
