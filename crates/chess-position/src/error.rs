//! Errors reported by the position facade.

use thiserror::Error;

/// Reasons a position operation was rejected.
///
/// A rejected operation never changes the position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    /// The FEN string could not be parsed.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// The FEN parsed but does not describe a legal position for the variant.
    #[error("illegal setup: {0}")]
    IllegalSetup(String),

    /// The SAN string could not be parsed.
    #[error("invalid SAN: {0}")]
    InvalidSan(String),

    /// The SAN string does not name a legal move.
    #[error("illegal move: {0}")]
    IllegalSan(String),

    /// The coordinate move could not be parsed.
    #[error("invalid UCI: {0}")]
    InvalidUci(String),

    /// The coordinate move is not legal.
    #[error("illegal move: {0}")]
    IllegalUci(String),
}

impl PositionError {
    /// Returns true if the input was well-formed but not legal.
    pub fn is_illegal(&self) -> bool {
        matches!(
            self,
            PositionError::IllegalSan(_) | PositionError::IllegalUci(_) | PositionError::IllegalSetup(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = PositionError::IllegalSan("Ke2".to_string());
        assert_eq!(format!("{}", err), "illegal move: Ke2");
        let err = PositionError::InvalidFen("xyz".to_string());
        assert!(format!("{}", err).contains("xyz"));
    }

    #[test]
    fn illegal_versus_malformed() {
        assert!(PositionError::IllegalUci("e2e5".to_string()).is_illegal());
        assert!(!PositionError::InvalidSan("??".to_string()).is_illegal());
    }
}
