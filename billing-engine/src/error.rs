use thiserror::Error;

/// Engine-level errors.
///
/// Configuration and input errors abort the request before any page is
/// drawn; storage errors abort a commit; a missing logo is NOT an
/// error — rendering degrades to omitting the image.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The page-geometry template could not be fetched. Fatal: there
    /// is nothing to render onto.
    #[error("template '{0}' not found")]
    MissingTemplate(String),

    /// The template bytes were fetched but do not parse.
    #[error("template '{reference}' is malformed: {message}")]
    MalformedTemplate { reference: String, message: String },

    /// Billing profile (bank details, contact) is not configured.
    #[error("billing profile is not configured")]
    MissingBillingProfile,

    /// A new commit without a document id requires an idempotency key.
    #[error("idempotency key is required when committing a new document")]
    MissingIdempotencyKey,

    /// An update commit referenced a document that does not exist.
    #[error("document '{0}' not found")]
    UnknownDocument(String),

    /// The document store or object store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// PDF byte emission failed. Bounded layout makes this unexpected;
    /// there is no safe partial document, so it is fatal.
    #[error("render error: {0}")]
    Render(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Render(err.to_string())
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
