//! Hashed term-vector provider.
//!
//! ## Algorithm
//! 1. Lowercase the text and split it on anything that isn't alphanumeric
//! 2. Drop one-letter tokens and common English stop words, fold simple
//!    plurals ("aliens" -> "alien")
//! 3. Hash each token (FNV-1a) into one of `dimensions` buckets
//! 4. Weight each bucket by sublinear term frequency, `1 + ln(tf)`
//! 5. L2-normalise
//!
//! Scores are cosine similarities. Every component is non-negative, so
//! scores fall in [0, 1].

use crate::{cosine_similarity, Representation, SimilarityError, SimilarityProvider};
use std::collections::HashMap;
use tracing::trace;

const DEFAULT_DIMENSIONS: usize = 512;

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "for", "from", "has", "have", "he", "her", "his", "in", "into", "is",
    "it", "its", "of", "on", "one", "or", "she", "so", "than", "that", "the", "their", "them",
    "they", "this", "to", "was", "were", "when", "which", "who", "will", "with",
];

/// Local, deterministic similarity provider.
///
/// Identical input always yields an identical representation, across runs
/// and machines, which keeps recommendation order reproducible.
#[derive(Debug, Clone)]
pub struct TermVectorProvider {
    dimensions: usize,
}

impl TermVectorProvider {
    pub fn new() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Configure the number of hash buckets (default: 512, minimum 1)
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions.max(1);
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Default for TermVectorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityProvider for TermVectorProvider {
    fn name(&self) -> &str {
        "TermVectorProvider"
    }

    fn embed(&self, text: &str) -> Result<Representation, SimilarityError> {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in tokenize(text) {
            let bucket = (fnv1a(&token) % self.dimensions as u64) as usize;
            *counts.entry(bucket).or_insert(0) += 1;
        }

        if counts.is_empty() {
            trace!("No content tokens in {:?}", text);
            return Err(SimilarityError::DegenerateText(text.to_string()));
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (bucket, tf) in counts {
            vector[bucket] = 1.0 + (tf as f32).ln();
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        for v in &mut vector {
            *v /= norm;
        }

        Ok(Representation::new(vector))
    }

    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32, SimilarityError> {
        cosine_similarity(a.as_slice(), b.as_slice())
    }

    fn score_bounds(&self) -> (f32, f32) {
        (0.0, 1.0)
    }
}

/// Split text into normalised content tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| raw.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .map(fold_plural)
        .collect()
}

fn fold_plural(token: String) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token
    }
}

/// 64-bit FNV-1a. Stable across platforms and releases, unlike `DefaultHasher`.
fn fnv1a(token: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    token.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}
