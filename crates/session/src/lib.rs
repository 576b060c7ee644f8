//! Session crate for the home cinema.
//!
//! This crate contains the session that coordinates the catalogue and the
//! recommendation engine on behalf of the menu.

pub mod session;

pub use session::{BrowseMode, Session, NEW_RELEASES_LIMIT};
