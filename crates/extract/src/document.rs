use serde::{Deserialize, Serialize};

/// Canonical feature pair extracted from one HTML document.
///
/// The record is immutable once produced. Downstream stages only read the
/// whitespace-delimited tokens of the two text fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Document identity, the file name within its collection.
    pub doc_id: String,
    /// Lowercased visible text with whitespace runs collapsed to one space.
    pub visible_text: String,
    /// Space-joined normalized style blobs, in encounter order.
    pub normalized_style_text: String,
}

impl FeatureRecord {
    /// Whitespace-delimited tokens of the visible text.
    pub fn text_tokens(&self) -> impl Iterator<Item = &str> {
        self.visible_text.split_whitespace()
    }

    /// Whitespace-delimited tokens of the normalized style text.
    pub fn style_tokens(&self) -> impl Iterator<Item = &str> {
        self.normalized_style_text.split_whitespace()
    }

    /// Text tokens followed by style tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text_tokens().chain(self.style_tokens())
    }

    /// True when neither field contributes a single token.
    pub fn is_blank(&self) -> bool {
        self.tokens().next().is_none()
    }
}
