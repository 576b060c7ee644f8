use similarity::SimilarityError;
use thiserror::Error;

/// Errors that abort a whole recommendation request.
///
/// A single candidate that cannot be scored is skipped, not reported here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Reference tag text was empty or whitespace
    #[error("Reference tags are empty")]
    EmptyReferenceTags,

    /// The reference text itself could not be embedded
    #[error("Failed to embed reference tags: {0}")]
    Provider(#[from] SimilarityError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
