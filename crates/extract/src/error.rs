use thiserror::Error;

/// Errors that can occur during feature extraction.
///
/// Stylesheet fetch failures are deliberately absent: they are reported as
/// [`crate::FetchError`] to the log and never fail a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("feature record requires a non-empty doc_id")]
    MissingDocId,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
