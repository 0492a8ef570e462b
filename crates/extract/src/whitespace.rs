//! Whitespace normalization for extracted text.
//!
//! Text nodes pulled out of a DOM carry the source document's indentation,
//! line breaks and non-breaking spaces. [`collapse_whitespace`] folds all of
//! that into single ASCII spaces so two pages that differ only in formatting
//! produce the same token stream.

/// Collapses runs of Unicode whitespace to a single space and trims both
/// ends.
///
/// # Examples
///
/// ```rust
/// use extract::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  hello \n\t world  "), "hello world");
/// assert_eq!(collapse_whitespace("hello\u{00A0}world"), "hello world");
/// assert_eq!(collapse_whitespace("   "), "");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
