//! Sentence-embedding provider backed by a pretrained transformer.
//!
//! Texts are encoded with a rust-bert sentence embedding model
//! (all-MiniLM-L12-v2 by default) and compared with cosine similarity, so
//! "spacemen" and "astronauts" land close together even though they share
//! no letters. The model is built once and shared by every request.

use std::sync::Mutex;

use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModel, SentenceEmbeddingsModelType,
};
use tracing::{debug, info};

use crate::{cosine_similarity, Representation, SimilarityError, SimilarityProvider};

/// Semantic similarity from a sentence embedding model. Runs on CPU.
pub struct SentenceEmbeddingProvider {
    model: Mutex<SentenceEmbeddingsModel>,
}

impl std::fmt::Debug for SentenceEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbeddingProvider")
            .field("model", &"<SentenceEmbeddingsModel>")
            .finish()
    }
}

impl SentenceEmbeddingProvider {
    /// Load the default all-MiniLM-L12-v2 model.
    ///
    /// Downloads the model on first run; later runs read the local cache.
    pub fn new() -> Result<Self, SimilarityError> {
        Self::with_model(SentenceEmbeddingsModelType::AllMiniLmL12V2)
    }

    pub fn with_model(model_type: SentenceEmbeddingsModelType) -> Result<Self, SimilarityError> {
        // Model download uses a blocking client, which must not run on an async worker
        let model = std::thread::spawn(move || {
            SentenceEmbeddingsBuilder::remote(model_type).create_model()
        })
        .join()
        .map_err(|_| SimilarityError::Backend("model loading thread panicked".to_string()))?
        .map_err(|e| SimilarityError::Backend(e.to_string()))?;

        info!("Loaded sentence embedding model");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl SimilarityProvider for SentenceEmbeddingProvider {
    fn name(&self) -> &str {
        "SentenceEmbeddingProvider"
    }

    fn embed(&self, text: &str) -> Result<Representation, SimilarityError> {
        if text.trim().is_empty() {
            return Err(SimilarityError::DegenerateText(text.to_string()));
        }

        let model = self
            .model
            .lock()
            .map_err(|_| SimilarityError::Backend("embedding model lock poisoned".to_string()))?;
        let mut embeddings = model
            .encode(&[text])
            .map_err(|e| SimilarityError::Backend(e.to_string()))?;

        let vector = embeddings
            .pop()
            .ok_or_else(|| SimilarityError::Backend("model returned no embedding".to_string()))?;
        debug!("Embedded {} chars into {} dimensions", text.len(), vector.len());
        Ok(Representation::new(vector))
    }

    fn similarity(&self, a: &Representation, b: &Representation) -> Result<f32, SimilarityError> {
        cosine_similarity(a.as_slice(), b.as_slice())
    }
}
