use chess_position::PositionError;
use thiserror::Error;

/// Errors returned by tree operations.
///
/// A failed operation leaves the tree unchanged.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The move or position was rejected by the rules engine.
    #[error(transparent)]
    Position(#[from] PositionError),

    /// The JSON blob could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned when reading PGN text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgnError {
    /// The text contains no game.
    #[error("no game found in PGN text")]
    Empty,
}
