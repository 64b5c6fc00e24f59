//! Core types shared by the position facade and the game tree.
//!
//! This crate provides:
//! - [`Variant`] keys, display names and fuzzy name matching
//! - [`FenFields`] for reading FEN fields without a rules engine
//! - [`store_key`] for position-keyed caches
//! - [`MoveRating`], the rating vocabulary for candidate moves

mod fen;
mod rating;
mod variant;

pub use fen::{store_key, FenError, FenFields};
pub use rating::MoveRating;
pub use variant::Variant;

/// Tags written first, in this order, when exporting PGN headers.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];
