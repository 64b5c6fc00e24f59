//! Variant-aware position facade.
//!
//! This crate wraps the `shakmaty` rules engine behind a small, string-based
//! API:
//! - [`Position`] - one board state of one [`Variant`](chess_core::Variant)
//! - FEN import and export
//! - Move legality, SAN and coordinate notation conversions
//!
//! # Example
//!
//! ```
//! use chess_core::Variant;
//! use chess_position::Position;
//!
//! let mut position = Position::new(Variant::Standard);
//! position.play_san("e4").unwrap();
//! position.play_uci("e7e5").unwrap();
//! println!("Position after 1.e4 e5: {}", position.to_fen());
//! ```

mod error;
mod position;

pub use error::PositionError;
pub use position::{Position, PROMOTION_PIECES};
