//! # Viewing Session
//!
//! Ties the catalogue handle and the recommendation engine together for
//! one interactive user:
//! 1. Search or browse the catalogue
//! 2. Look up a single movie
//! 3. "Play" a movie: fetch every other movie, compose the played movie's
//!    tags and rank the candidates off the async runtime
//!
//! The session owns the catalogue handle it was given; closing the session
//! closes the catalogue.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use catalogue::{Catalogue, MovieRecord, SortKey, SortOrder};
use engine::{compose_tags, RecommendationEngine};
use similarity::SimilarityProvider;

/// Size of the "new releases" listing
pub const NEW_RELEASES_LIMIT: u32 = 10;

/// The three browse listings offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseMode {
    Genre,
    Director,
    NewReleases,
}

impl BrowseMode {
    fn query(self) -> (SortKey, SortOrder, Option<u32>) {
        match self {
            BrowseMode::Genre => (SortKey::Genre, SortOrder::Ascending, None),
            BrowseMode::Director => (SortKey::Director, SortOrder::Ascending, None),
            BrowseMode::NewReleases => (SortKey::Year, SortOrder::Descending, Some(NEW_RELEASES_LIMIT)),
        }
    }
}

/// One user's session over an open catalogue
pub struct Session<P> {
    catalogue: Catalogue,
    engine: RecommendationEngine<P>,
}

impl<P: SimilarityProvider + 'static> Session<P> {
    pub fn new(catalogue: Catalogue, engine: RecommendationEngine<P>) -> Self {
        Self { catalogue, engine }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn engine(&self) -> &RecommendationEngine<P> {
        &self.engine
    }

    /// Keyword search over title, director and stored tags
    pub async fn search(&self, query: &str) -> Result<Vec<MovieRecord>> {
        let results = self
            .catalogue
            .fetch_filtered(query)
            .await
            .context("Failed to search catalogue")?;
        info!("Search {:?} returned {} movies", query, results.len());
        Ok(results)
    }

    pub async fn browse(&self, mode: BrowseMode) -> Result<Vec<MovieRecord>> {
        let (by, order, limit) = mode.query();
        self.catalogue
            .fetch_sorted(by, order, limit)
            .await
            .with_context(|| format!("Failed to browse by {:?}", mode))
    }

    pub async fn movie(&self, id: &str) -> Result<MovieRecord> {
        self.catalogue
            .get(id)
            .await
            .with_context(|| format!("Failed to look up movie {}", id))
    }

    /// Recommendations for a movie the user just played.
    ///
    /// Up to three other movies, weakest match first. The played movie is
    /// excluded by id, so other movies sharing its title stay eligible.
    pub async fn play(&self, movie: &MovieRecord) -> Result<Vec<MovieRecord>> {
        let start_time = Instant::now();

        let candidates = self
            .catalogue
            .fetch_excluding_id(&movie.id)
            .await
            .context("Failed to fetch recommendation candidates")?;
        debug!("Fetched {} candidates for {}", candidates.len(), movie.id);

        let reference_tags = compose_tags(movie);
        let engine = self.engine.clone();
        let recommendations = tokio::task::spawn_blocking(move || {
            engine.recommend(&reference_tags, &candidates)
        })
        .await
        .context("Recommendation task panicked")?
        .with_context(|| format!("Failed to rank recommendations for {}", movie.id))?;

        info!(
            "Recommended {} movies for {} in {:.2?}",
            recommendations.len(),
            movie.id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// End the session and close the catalogue
    pub async fn close(self) {
        self.catalogue.close().await;
        info!("Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_mode_queries() {
        assert_eq!(
            BrowseMode::Genre.query(),
            (SortKey::Genre, SortOrder::Ascending, None)
        );
        assert_eq!(
            BrowseMode::Director.query(),
            (SortKey::Director, SortOrder::Ascending, None)
        );
        assert_eq!(
            BrowseMode::NewReleases.query(),
            (SortKey::Year, SortOrder::Descending, Some(10))
        );
    }
}
