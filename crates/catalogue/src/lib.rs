//! # Catalogue Crate
//!
//! Storage and querying for the movie catalogue.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord` and the sort options for listings
//! - **parser**: Parse the catalogue CSV into records
//! - **store**: The SQLite-backed `Catalogue` handle
//! - **error**: Error types for loading and querying
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalogue::{Catalogue, SortKey, SortOrder};
//! use std::path::Path;
//!
//! let catalogue = Catalogue::open(Path::new("movies.db")).await?;
//! catalogue.load_csv(Path::new("moviedb.csv")).await?;
//!
//! let hits = catalogue.fetch_filtered("ridley scott").await?;
//! let newest = catalogue.fetch_sorted(SortKey::Year, SortOrder::Descending, Some(10)).await?;
//!
//! catalogue.close().await;
//! ```

pub mod error;
pub mod parser;
pub mod store;
pub mod types;

pub use error::{CatalogueError, Result};
pub use store::{search_pattern, Catalogue};
pub use types::{MovieId, MovieRecord, SortKey, SortOrder, COLUMN_COUNT};
