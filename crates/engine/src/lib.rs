//! Content-based recommendation engine.
//!
//! Given the tag text of a movie the user just played and the rest of the
//! catalogue, scores every candidate with a [`similarity::SimilarityProvider`]
//! and returns the three closest, weakest first.
//!
//! ## Example Usage
//! ```ignore
//! use engine::{compose_tags, RecommendationEngine};
//! use similarity::TermVectorProvider;
//! use std::sync::Arc;
//!
//! let engine = RecommendationEngine::new(Arc::new(TermVectorProvider::new()));
//! let candidates = catalogue.fetch_excluding_id(&played.id).await?;
//! let recommended = engine.recommend(&compose_tags(&played), &candidates)?;
//! ```

pub mod engine;
pub mod error;
pub mod ranking;
pub mod tags;

pub use engine::{RecommendationEngine, DEFAULT_TOP_N};
pub use error::{EngineError, Result};
pub use ranking::{collect_by_id, select_top_n, RankedCandidate};
pub use tags::{compose_tags, TagSource};
