//! Core domain types for the movie catalogue.
//!
//! Every record the catalogue hands out is an owned, immutable
//! [`MovieRecord`]. Callers that only need to read a few fields borrow it;
//! nothing downstream ever writes back into the table.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Primary key of a catalogue row (a short opaque code such as `"M001"`)
pub type MovieId = String;

/// Number of columns in a catalogue row, both in the table and in the CSV
pub const COLUMN_COUNT: usize = 7;

// =============================================================================
// Movie Record
// =============================================================================

/// One row of the `movies` table.
///
/// `tags` is the stored keyword column. It feeds the search query only;
/// similarity scoring composes its own text from director, description
/// and genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub description: String,
    pub genre: String,
    pub tags: String,
}

impl fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})\nDirected by {}",
            self.title, self.year, self.director
        )
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Column a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Genre,
    /// Orders by surname, i.e. everything after the first space
    Director,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortKey {
    /// SQL expression used in the `ORDER BY` clause.
    ///
    /// Only ever built from this enum, never from user input.
    pub(crate) fn order_expr(self) -> &'static str {
        match self {
            SortKey::Genre => "Genre",
            SortKey::Director => "SUBSTR(Director, INSTR(Director, ' '), LENGTH(Director))",
            SortKey::Year => "Year",
        }
    }
}

impl SortOrder {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}
