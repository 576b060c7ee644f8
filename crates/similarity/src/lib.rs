//! Text similarity for recommendation scoring.
//!
//! This crate provides:
//! - The [`SimilarityProvider`] trait the recommendation engine scores with
//! - [`Representation`], the vector form of a piece of text
//! - `SentenceEmbeddingProvider` (feature `sentence-embeddings`), semantic
//!   similarity from a pretrained sentence embedding model
//! - [`TermVectorProvider`], an offline deterministic provider built on
//!   hashed term vectors, used for tests and when no model is available
//!
//! A provider is built once at startup and shared read-only (`Arc<P>`)
//! between every request, so implementations must be `Send + Sync` and must
//! not mutate themselves while scoring.

#[cfg(feature = "sentence-embeddings")]
pub mod sentence;
pub mod term_vector;

#[cfg(feature = "sentence-embeddings")]
pub use sentence::SentenceEmbeddingProvider;
pub use term_vector::TermVectorProvider;

use thiserror::Error;

/// Errors a provider can report for a single text or pair
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityError {
    #[error("Text has no content to embed: {0:?}")]
    DegenerateText(String),

    #[error("Representation dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Similarity backend failed: {0}")]
    Backend(String),
}

/// Vector form of a text produced by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    vector: Vec<f32>,
}

impl Representation {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean length
    pub fn norm(&self) -> f32 {
        self.vector.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Maps text to representations and scores pairs of them.
///
/// `similarity(a, b)` must equal `similarity(b, a)` and, when it succeeds,
/// fall inside [`SimilarityProvider::score_bounds`].
pub trait SimilarityProvider: Send + Sync {
    /// Returns the name of this provider (for logging)
    fn name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Representation, SimilarityError>;

    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32, SimilarityError>;

    /// Inclusive range every valid score falls in
    fn score_bounds(&self) -> (f32, f32) {
        (-1.0, 1.0)
    }
}

/// Cosine similarity between two equally sized vectors.
///
/// Returns 0.0 when either vector has (near) zero magnitude, and clamps
/// the result to [-1, 1] to absorb rounding such as 1.0000001.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}
