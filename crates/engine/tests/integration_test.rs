//! Integration tests for the engine with the real term-vector provider.
//!
//! These verify that recommendations over a small realistic catalogue come
//! out in a sensible, reproducible order.

use catalogue::MovieRecord;
use engine::{compose_tags, EngineError, RecommendationEngine, TagSource};
use similarity::TermVectorProvider;
use std::sync::Arc;

fn movie(id: &str, title: &str, director: &str, description: &str, genre: &str) -> MovieRecord {
    MovieRecord {
        id: id.to_string(),
        title: title.to_string(),
        director: director.to_string(),
        year: 2000,
        description: description.to_string(),
        genre: genre.to_string(),
        tags: String::new(),
    }
}

fn create_catalogue() -> Vec<MovieRecord> {
    vec![
        movie("M001", "Alien", "Ridley Scott", "A spaceship crew is hunted by a deadly alien creature.", "Sci-Fi Horror"),
        movie("M002", "Aliens", "James Cameron", "Marines return to fight the alien creatures on a distant colony.", "Sci-Fi Action"),
        movie("M003", "Notting Hill", "Roger Michell", "A bookshop owner falls in love with a film star in London.", "Romance Comedy"),
        movie("M004", "Event Horizon", "Paul Anderson", "A rescue crew boards a spaceship that returned from hell.", "Sci-Fi Horror"),
        movie("M005", "Amelie", "Jean-Pierre Jeunet", "A shy waitress in Paris secretly helps others find love.", "Romance Comedy"),
        movie("M006", "Sunshine", "Danny Boyle", "A spaceship crew travels to reignite the dying sun.", "Sci-Fi Thriller"),
    ]
}

fn engine() -> RecommendationEngine<TermVectorProvider> {
    RecommendationEngine::new(Arc::new(TermVectorProvider::new()))
}

#[test]
fn test_space_horror_recommends_space_movies() {
    let catalogue = create_catalogue();
    let played = &catalogue[0];
    let candidates: Vec<MovieRecord> = catalogue.iter().filter(|m| m.id != played.id).cloned().collect();

    let result = engine().recommend(&compose_tags(played), &candidates).unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.iter().all(|m| m.genre.starts_with("Sci-Fi")));
    assert!(result.iter().all(|m| m.id != played.id));
    // Event Horizon shares genre, "spaceship" and "crew": strongest, so last
    assert_eq!(result[2].title, "Event Horizon");
}

#[test]
fn test_romance_recommends_romance_first_among_best() {
    let catalogue = create_catalogue();
    let played = &catalogue[2];
    let candidates: Vec<MovieRecord> = catalogue.iter().filter(|m| m.id != played.id).cloned().collect();

    let result = engine().recommend(&compose_tags(played), &candidates).unwrap();

    assert_eq!(result.last().map(|m| m.title.as_str()), Some("Amelie"));
}

#[test]
fn test_scores_ascending_and_reproducible() {
    let catalogue = create_catalogue();
    let engine = engine();
    let reference = compose_tags(&catalogue[5]);

    let first = engine.rank(&reference, &catalogue[..5]).unwrap();
    let second = engine.rank(&reference, &catalogue[..5]).unwrap();

    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].score <= w[1].score));
}

#[test]
fn test_candidates_without_content_are_skipped() {
    let mut catalogue = create_catalogue();
    catalogue.push(movie("M007", "Blank", "", "", ""));
    let engine = engine().with_tag_source(TagSource::Composed).with_top_n(10);

    let ranked = engine.rank("spaceship crew", &catalogue).unwrap();
    assert_eq!(ranked.len(), 6);
    assert!(ranked.iter().all(|c| c.movie.id != "M007"));
}

#[test]
fn test_stop_word_reference_is_a_provider_error() {
    let catalogue = create_catalogue();
    let err = engine().recommend("the of and", &catalogue).unwrap_err();
    assert!(matches!(err, EngineError::Provider(_)));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let catalogue = Arc::new(create_catalogue());
    let engine = engine();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            let catalogue = Arc::clone(&catalogue);
            std::thread::spawn(move || {
                let played = &catalogue[i];
                let candidates: Vec<MovieRecord> =
                    catalogue.iter().filter(|m| m.id != played.id).cloned().collect();
                engine.recommend(&compose_tags(played), &candidates).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let threaded = handle.join().unwrap();
        let played = &catalogue[i];
        let candidates: Vec<MovieRecord> =
            catalogue.iter().filter(|m| m.id != played.id).cloned().collect();
        assert_eq!(threaded, engine.recommend(&compose_tags(played), &candidates).unwrap());
    }
}
