use serde::{Deserialize, Serialize};

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Fixed position in catalog order; also the row/column in the similarity matrix
    pub index: usize,
    /// Externally visible identifier
    pub title: String,
}

/// A scored candidate produced while ranking a single request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub index: usize,
    pub score: f32,
}

/// Descriptive metadata attached to a recommended title.
///
/// Either field may be absent; that is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub title: String,
    /// Poster / image URL
    pub image_ref: Option<String>,
    /// Detail page URL built from the remote identifier
    pub detail_link: Option<String>,
}

impl EnrichmentResult {
    pub fn new(title: impl Into<String>, image_ref: Option<String>, detail_link: Option<String>) -> Self {
        Self {
            title: title.into(),
            image_ref,
            detail_link,
        }
    }

    /// Result with both fields absent, used when a lookup degrades
    pub fn absent(title: impl Into<String>) -> Self {
        Self::new(title, None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.image_ref.is_none() && self.detail_link.is_none()
    }
}
