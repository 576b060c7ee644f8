//! Tag composition: the text a movie is compared by.

use catalogue::MovieRecord;

/// Which text of a candidate is fed to the similarity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSource {
    /// `director description genre`, the same text used for the reference
    #[default]
    Composed,
    /// The stored `Tags` column. Kept for comparison with older catalogues;
    /// it is maintained for keyword search and drifts from the composed text.
    Stored,
}

impl TagSource {
    pub fn text_for(self, movie: &MovieRecord) -> String {
        match self {
            TagSource::Composed => compose_tags(movie),
            TagSource::Stored => movie.tags.clone(),
        }
    }
}

/// Canonical comparison text: director, description and genre joined by
/// single spaces.
pub fn compose_tags(movie: &MovieRecord) -> String {
    format!("{} {} {}", movie.director, movie.description, movie.genre)
}
