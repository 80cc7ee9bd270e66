//! Ordered item catalog backing index↔title translation.

use crate::errors::{RecommendError, RecommendResult};
use crate::types::Item;

/// Ordered, immutable collection of catalog items.
///
/// Titles are not required to be unique; lookups resolve to the first match.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Build a catalog from titles in catalog order
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = titles
            .into_iter()
            .enumerate()
            .map(|(index, title)| Item { index, title: title.into() })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve a title to its catalog index (first exact match)
    pub fn index_of(&self, title: &str) -> RecommendResult<usize> {
        self.items
            .iter()
            .position(|item| item.title == title)
            .ok_or_else(|| RecommendError::ItemNotFound { title: title.to_string() })
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn title_at(&self, index: usize) -> RecommendResult<&str> {
        self.items
            .get(index)
            .map(|item| item.title.as_str())
            .ok_or(RecommendError::IndexOutOfRange { index, size: self.items.len() })
    }

    pub fn contains(&self, title: &str) -> bool {
        self.items.iter().any(|item| item.title == title)
    }

    /// Titles in catalog order, e.g. for a selection list
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}
