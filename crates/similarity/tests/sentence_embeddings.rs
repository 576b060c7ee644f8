//! Semantic scoring with the pretrained sentence embedding model.
//!
//! Needs the model, which is downloaded on first use:
//! `cargo test -p similarity --features sentence-embeddings -- --ignored`

#![cfg(feature = "sentence-embeddings")]

use similarity::{SentenceEmbeddingProvider, SimilarityError, SimilarityProvider, TermVectorProvider};
use std::sync::OnceLock;

const REFERENCE: &str = "Ridley Scott astronauts battle an extraterrestrial monster Horror";
const SYNONYMS: &str = "James Cameron spacemen fight alien creatures Sci-Fi";
const SHARED_WORD: &str = "Nancy Meyers a romantic battle of the sexes Comedy";

fn provider() -> &'static SentenceEmbeddingProvider {
    static PROVIDER: OnceLock<SentenceEmbeddingProvider> = OnceLock::new();
    PROVIDER.get_or_init(|| SentenceEmbeddingProvider::new().expect("load embedding model"))
}

fn score<P: SimilarityProvider>(provider: &P, a: &str, b: &str) -> f32 {
    let a = provider.embed(a).unwrap();
    let b = provider.embed(b).unwrap();
    provider.similarity(&a, &b).unwrap()
}

#[test]
#[ignore = "requires network access to download the embedding model"]
fn test_synonyms_outrank_a_shared_word() {
    let provider = provider();

    let related = score(provider, REFERENCE, SYNONYMS);
    let shared_word = score(provider, REFERENCE, SHARED_WORD);

    assert!(
        related > shared_word,
        "related={} shared_word={}",
        related,
        shared_word
    );
}

#[test]
#[ignore = "requires network access to download the embedding model"]
fn test_term_vectors_miss_what_embeddings_catch() {
    let lexical = TermVectorProvider::new();

    assert_eq!(score(&lexical, REFERENCE, SYNONYMS), 0.0);
    assert!(score(provider(), REFERENCE, SYNONYMS) > 0.0);
}

#[test]
#[ignore = "requires network access to download the embedding model"]
fn test_similarity_is_symmetric_and_bounded() {
    let provider = provider();
    let ab = score(provider, REFERENCE, SYNONYMS);
    let ba = score(provider, SYNONYMS, REFERENCE);

    assert!((ab - ba).abs() < 1e-6);
    let (low, high) = provider.score_bounds();
    assert!(ab >= low && ab <= high);
}

#[test]
#[ignore = "requires network access to download the embedding model"]
fn test_blank_text_is_degenerate() {
    let err = provider().embed("   ").unwrap_err();
    assert!(matches!(err, SimilarityError::DegenerateText(_)));
}
