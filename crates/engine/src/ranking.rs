//! Ranking and top-N selection over scored candidates.

use catalogue::{MovieId, MovieRecord};
use std::collections::HashMap;

/// A candidate together with its similarity to the reference
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub score: f32,
    pub movie: MovieRecord,
}

impl RankedCandidate {
    pub fn new(score: f32, movie: MovieRecord) -> Self {
        Self { score, movie }
    }
}

/// Collect scored candidates into an ordered list keyed by movie id.
///
/// If an id appears more than once the later entry replaces the earlier
/// one in the earlier entry's position. Distinct ids never collide, even
/// when their titles are equal.
pub fn collect_by_id(scored: impl IntoIterator<Item = RankedCandidate>) -> Vec<RankedCandidate> {
    let mut positions: HashMap<MovieId, usize> = HashMap::new();
    let mut ranked: Vec<RankedCandidate> = Vec::new();

    for candidate in scored {
        match positions.get(&candidate.movie.id) {
            Some(&idx) => ranked[idx] = candidate,
            None => {
                positions.insert(candidate.movie.id.clone(), ranked.len());
                ranked.push(candidate);
            }
        }
    }

    ranked
}

/// Keep the `n` highest-scoring candidates, weakest first.
///
/// The sort is stable, so candidates with equal scores keep their input
/// order, and of two tied candidates straddling the cut the later one is
/// kept.
pub fn select_top_n(mut ranked: Vec<RankedCandidate>, n: usize) -> Vec<RankedCandidate> {
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    let start = ranked.len().saturating_sub(n);
    ranked.split_off(start)
}
