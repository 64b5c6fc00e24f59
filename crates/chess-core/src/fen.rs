//! Tolerant access to the fields of a FEN string.
//!
//! Validation of the board itself belongs to the rules engine. This module
//! only splits a FEN into its whitespace-separated fields so that callers can
//! read the side to move, the move counters or build storage keys without
//! materializing a position. Variant extensions are accepted as they appear:
//! crazyhouse pockets stay part of the placement field and the three-check
//! counter is recognized as an optional fifth field.

use crate::Variant;
use thiserror::Error;

/// Errors that can occur when splitting FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected at least 2 fields, got {0}")]
    TooFewFields(usize),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The fields of a FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement, including a crazyhouse pocket if present.
    pub placement: String,
    /// Active color ('w' or 'b').
    pub active_color: char,
    /// Castling availability (e.g., "KQkq", "-").
    pub castling: String,
    /// En passant target square (e.g., "e3", "-").
    pub en_passant: String,
    /// Remaining checks for three-check (e.g., "3+3").
    pub remaining_checks: Option<String>,
    /// Halfmove clock (for 50-move rule).
    pub halfmove_clock: u32,
    /// Fullmove number.
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits a FEN string into its fields.
    ///
    /// Placement and side to move are required. Missing castling and en
    /// passant fields default to "-", missing counters to `0 1`.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 2 {
            return Err(FenError::TooFewFields(parts.len()));
        }

        let active_color = match parts[1] {
            "w" => 'w',
            "b" => 'b',
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = parts.get(2).copied().unwrap_or("-");
        let en_passant = parts.get(3).copied().unwrap_or("-");

        // Three-check writes its counter between en passant and the clocks.
        let (remaining_checks, counters) = match parts.get(4) {
            Some(field) if field.contains('+') => (Some(field.to_string()), &parts[5.min(parts.len())..]),
            _ => (None, &parts[4.min(parts.len())..]),
        };

        let halfmove_clock = match counters.first() {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(s.to_string()))?,
            None => 0,
        };

        let fullmove_number = match counters.get(1) {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| FenError::InvalidFullmoveNumber(s.to_string()))?,
            None => 1,
        };

        Ok(FenFields {
            placement: parts[0].to_string(),
            active_color,
            castling: castling.to_string(),
            en_passant: en_passant.to_string(),
            remaining_checks,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Returns true if black is to move.
    pub fn black_to_move(&self) -> bool {
        self.active_color == 'b'
    }
}

/// Builds the storage key for a position.
///
/// The key is the variant key followed by the leading FEN fields joined with
/// underscores. Move counters are left out so that transpositions share a
/// key; three-check keeps its check counter.
pub fn store_key(variant: Variant, fen: &str) -> String {
    let take = if variant == Variant::ThreeCheck { 5 } else { 4 };
    let fen_key = fen.split(' ').take(take).collect::<Vec<_>>().join("_");
    format!("{}__{}", variant.key(), fen_key)
}
