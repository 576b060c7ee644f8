//! The recommendation engine.
//!
//! ## Algorithm
//! 1. Reject empty reference text before touching the provider
//! 2. Embed the reference once
//! 3. Embed and score every candidate against it (in parallel, order kept)
//! 4. Skip candidates the provider fails on or scores out of bounds
//! 5. Collect into an id-keyed ordered list
//! 6. Stable sort ascending, keep the last N
//!
//! The engine holds no per-request state. One instance can serve any
//! number of concurrent requests.

use crate::error::{EngineError, Result};
use crate::ranking::{collect_by_id, select_top_n, RankedCandidate};
use crate::tags::TagSource;
use catalogue::MovieRecord;
use rayon::prelude::*;
use similarity::{Representation, SimilarityProvider};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Number of recommendations returned per request
pub const DEFAULT_TOP_N: usize = 3;

/// Ranks catalogue movies by similarity to a reference text
pub struct RecommendationEngine<P> {
    /// Shared, read-only provider
    provider: Arc<P>,
    top_n: usize,
    tag_source: TagSource,
}

impl<P> Clone for RecommendationEngine<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            top_n: self.top_n,
            tag_source: self.tag_source,
        }
    }
}

impl<P: SimilarityProvider> RecommendationEngine<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            top_n: DEFAULT_TOP_N,
            tag_source: TagSource::default(),
        }
    }

    /// Configure how many recommendations to keep (default: 3)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Configure which candidate text is scored (default: composed tags)
    pub fn with_tag_source(mut self, tag_source: TagSource) -> Self {
        self.tag_source = tag_source;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn tag_source(&self) -> TagSource {
        self.tag_source
    }

    /// Recommend up to N candidates, weakest first and strongest last.
    ///
    /// `candidates` must already exclude the reference movie. An empty
    /// candidate list yields an empty result, not an error.
    pub fn recommend(&self, reference_tags: &str, candidates: &[MovieRecord]) -> Result<Vec<MovieRecord>> {
        let ranked = self.rank(reference_tags, candidates)?;
        Ok(ranked.into_iter().map(|c| c.movie).collect())
    }

    /// Same as [`RecommendationEngine::recommend`], keeping the scores
    #[instrument(skip_all, fields(provider = self.provider.name(), candidates = candidates.len()))]
    pub fn rank(&self, reference_tags: &str, candidates: &[MovieRecord]) -> Result<Vec<RankedCandidate>> {
        if reference_tags.trim().is_empty() {
            return Err(EngineError::EmptyReferenceTags);
        }
        if candidates.is_empty() {
            debug!("No candidates to rank");
            return Ok(Vec::new());
        }

        let reference = self.provider.embed(reference_tags)?;

        let scored: Vec<Option<RankedCandidate>> = candidates
            .par_iter()
            .map(|movie| {
                self.score_candidate(&reference, movie)
                    .map(|score| RankedCandidate::new(score, movie.clone()))
            })
            .collect();

        let scored_count = scored.iter().filter(|s| s.is_some()).count();
        if scored_count < candidates.len() {
            debug!(
                "Skipped {} of {} candidates",
                candidates.len() - scored_count,
                candidates.len()
            );
        }

        let ranked = collect_by_id(scored.into_iter().flatten());
        let selected = select_top_n(ranked, self.top_n);

        debug!("Selected {} recommendations", selected.len());
        Ok(selected)
    }

    /// Score one candidate, or `None` if it must be skipped
    fn score_candidate(&self, reference: &Representation, movie: &MovieRecord) -> Option<f32> {
        let text = self.tag_source.text_for(movie);

        let representation = match self.provider.embed(&text) {
            Ok(rep) => rep,
            Err(e) => {
                warn!("Skipping {} ({}): {}", movie.id, movie.title, e);
                return None;
            }
        };

        let score = match self.provider.similarity(&representation, reference) {
            Ok(score) => score,
            Err(e) => {
                warn!("Skipping {} ({}): {}", movie.id, movie.title, e);
                return None;
            }
        };

        let (low, high) = self.provider.score_bounds();
        if score.is_nan() || score < low || score > high {
            warn!(
                "Skipping {} ({}): score {} outside [{}, {}]",
                movie.id, movie.title, score, low, high
            );
            return None;
        }

        Some(score)
    }
}
