//! Variant-aware position facade.
//!
//! [`Position`] owns one rules-engine board state and exposes the small set of
//! operations the game tree needs: variant selection, FEN import and export,
//! move legality and the SAN/UCI conversions. Every mutating operation leaves
//! the position untouched when it fails.

use crate::PositionError;
use chess_core::{store_key, Variant};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::variant::{Variant as EngineVariant, VariantPosition};
use shakmaty::{CastlingMode, Color, EnPassantMode, Move, Outcome, Position as _};
use std::collections::{BTreeMap, HashSet};

/// Promotion piece letters tried when completing a coordinate move.
///
/// The king is only a legal promotion in antichess.
pub const PROMOTION_PIECES: [&str; 5] = ["q", "r", "b", "n", "k"];

/// A position in one chess variant.
#[derive(Debug, Clone)]
pub struct Position {
    variant: Variant,
    pos: VariantPosition,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Variant::Standard)
    }
}

impl Position {
    /// Creates the starting position of a variant.
    pub fn new(variant: Variant) -> Self {
        Position {
            variant,
            pos: VariantPosition::new(engine_variant(variant)),
        }
    }

    /// Creates a position of a variant from a FEN string.
    pub fn from_fen(variant: Variant, fen: &str) -> Result<Self, PositionError> {
        let mut position = Self::new(variant);
        position.set_fen(fen)?;
        Ok(position)
    }

    /// Returns the variant of this position.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Resets to the starting position of a variant.
    pub fn set_variant(&mut self, variant: Variant) -> &mut Self {
        *self = Self::new(variant);
        self
    }

    /// Replaces the position with one parsed from a FEN string.
    ///
    /// The FEN is interpreted under the current variant. On failure the
    /// position is left unchanged.
    pub fn set_fen(&mut self, fen: &str) -> Result<&mut Self, PositionError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|_| PositionError::InvalidFen(fen.to_string()))?;
        let pos = VariantPosition::from_setup(
            engine_variant(self.variant),
            parsed.into_setup(),
            CastlingMode::Standard,
        )
        .map_err(|_| PositionError::IllegalSetup(fen.to_string()))?;
        self.pos = pos;
        Ok(self)
    }

    /// Returns the position as a FEN string.
    pub fn to_fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    /// Returns the storage key of this position.
    pub fn store_key(&self) -> String {
        store_key(self.variant, &self.to_fen())
    }

    /// Returns the side to move.
    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    /// Returns the outcome if the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        self.pos.outcome()
    }

    /// Returns the square of the side to move's king when it is in check.
    pub fn checked_king_square(&self) -> Option<String> {
        if self.pos.checkers().is_empty() {
            return None;
        }
        self.pos
            .board()
            .king_of(self.pos.turn())
            .map(|sq| sq.to_string())
    }

    /// Parses SAN into a legal move.
    pub fn san_to_move(&self, san: &str) -> Result<Move, PositionError> {
        let parsed: SanPlus = san
            .parse()
            .map_err(|_| PositionError::InvalidSan(san.to_string()))?;
        parsed
            .san
            .to_move(&self.pos)
            .map_err(|_| PositionError::IllegalSan(san.to_string()))
    }

    /// Formats a legal move as SAN, including a check or mate suffix.
    pub fn move_to_san(&self, m: &Move) -> String {
        SanPlus::from_move(self.pos.clone(), m).to_string()
    }

    /// Parses a coordinate move into a legal move.
    pub fn uci_to_move(&self, uci: &str) -> Result<Move, PositionError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| PositionError::InvalidUci(uci.to_string()))?;
        parsed
            .to_move(&self.pos)
            .map_err(|_| PositionError::IllegalUci(uci.to_string()))
    }

    /// Formats a move in coordinate notation.
    pub fn move_to_uci(&self, m: &Move) -> String {
        m.to_uci(CastlingMode::Standard).to_string()
    }

    /// Converts SAN to coordinate notation.
    pub fn san_to_uci(&self, san: &str) -> Result<String, PositionError> {
        self.san_to_move(san).map(|m| self.move_to_uci(&m))
    }

    /// Converts coordinate notation to SAN.
    pub fn uci_to_san(&self, uci: &str) -> Result<String, PositionError> {
        self.uci_to_move(uci).map(|m| self.move_to_san(&m))
    }

    /// Plays a move if it is legal.
    pub fn play(&mut self, m: &Move) -> Result<&mut Self, PositionError> {
        if !self.pos.is_legal(m) {
            return Err(PositionError::IllegalUci(self.move_to_uci(m)));
        }
        self.pos.play_unchecked(m);
        Ok(self)
    }

    /// Plays a move given in SAN.
    pub fn play_san(&mut self, san: &str) -> Result<&mut Self, PositionError> {
        let m = self.san_to_move(san)?;
        self.play(&m)
    }

    /// Plays a move given in coordinate notation.
    pub fn play_uci(&mut self, uci: &str) -> Result<&mut Self, PositionError> {
        let m = self.uci_to_move(uci)?;
        self.play(&m)
    }

    /// Returns every legal completion of a coordinate move.
    ///
    /// Coordinate notation from a board UI carries no promotion piece, so the
    /// bare move and each promotion letter are tried in turn. A pawn reaching
    /// the last rank yields one entry per legal promotion piece.
    pub fn legals_for_uci(&self, uci: &str) -> Vec<String> {
        std::iter::once("")
            .chain(PROMOTION_PIECES)
            .map(|piece| format!("{}{}", uci, piece))
            .filter(|candidate| self.uci_to_move(candidate).is_ok())
            .collect()
    }

    /// Returns true if the coordinate move has at least one legal completion.
    pub fn is_uci_legal(&self, uci: &str) -> bool {
        !self.legals_for_uci(uci).is_empty()
    }

    /// Returns true if the SAN names a legal move.
    pub fn is_san_legal(&self, san: &str) -> bool {
        self.san_to_move(san).is_ok()
    }

    /// Returns all legal moves in coordinate notation.
    pub fn all_legal_ucis(&self) -> Vec<String> {
        self.pos
            .legal_moves()
            .iter()
            .map(|m| self.move_to_uci(m))
            .collect()
    }

    /// Returns all legal moves in SAN, without duplicates.
    pub fn all_legal_sans(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pos
            .legal_moves()
            .iter()
            .map(|m| self.move_to_san(m))
            .filter(|san| seen.insert(san.clone()))
            .collect()
    }

    /// Returns legal destination squares keyed by origin square.
    ///
    /// Drops have no origin square and are not included.
    pub fn destinations(&self) -> BTreeMap<String, Vec<String>> {
        let mut dests: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for m in self.pos.legal_moves().iter() {
            let Some(from) = m.from() else { continue };
            let to = m.to().to_string();
            let entry = dests.entry(from.to_string()).or_default();
            if !entry.contains(&to) {
                entry.push(to);
            }
        }
        for squares in dests.values_mut() {
            squares.sort();
        }
        dests
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Pos {} {}]", self.variant, self.to_fen())
    }
}

fn engine_variant(variant: Variant) -> EngineVariant {
    match variant {
        Variant::Standard => EngineVariant::Chess,
        Variant::Antichess => EngineVariant::Antichess,
        Variant::Atomic => EngineVariant::Atomic,
        Variant::Crazyhouse => EngineVariant::Crazyhouse,
        Variant::Horde => EngineVariant::Horde,
        Variant::KingOfTheHill => EngineVariant::KingOfTheHill,
        Variant::RacingKings => EngineVariant::RacingKings,
        Variant::ThreeCheck => EngineVariant::ThreeCheck,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn new_position() {
        let pos = Position::default();
        assert_eq!(pos.variant(), Variant::Standard);
        assert_eq!(pos.to_fen(), STARTPOS);
        assert_eq!(pos.all_legal_sans().len(), 20);
    }

    #[test]
    fn set_variant_resets() {
        let mut pos = Position::default();
        pos.play_san("e4").unwrap();
        pos.set_variant(Variant::Horde);
        assert_eq!(pos.variant(), Variant::Horde);
        assert_ne!(pos.to_fen(), STARTPOS);
    }

    #[test]
    fn three_check_fen_has_counter() {
        let pos = Position::new(Variant::ThreeCheck);
        assert!(pos.to_fen().contains("3+3"));
    }

    #[test]
    fn set_fen_invalid_leaves_position() {
        let mut pos = Position::default();
        pos.play_san("e4").unwrap();
        let before = pos.to_fen();
        assert!(matches!(
            pos.set_fen("not a fen"),
            Err(PositionError::InvalidFen(_))
        ));
        assert_eq!(pos.to_fen(), before);
    }

    #[test]
    fn set_fen_illegal_setup() {
        let mut pos = Position::default();
        // Two white kings
        let result = pos.set_fen("4k3/8/8/8/8/8/8/K3K3 w - - 0 1");
        assert!(matches!(result, Err(PositionError::IllegalSetup(_))));
        assert_eq!(pos.to_fen(), STARTPOS);
    }

    #[test]
    fn play_san_and_uci() {
        let mut pos = Position::default();
        pos.play_san("e4").unwrap();
        pos.play_uci("e7e5").unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn illegal_move_is_noop() {
        let mut pos = Position::default();
        assert!(matches!(
            pos.play_san("e5"),
            Err(PositionError::IllegalSan(_))
        ));
        assert!(matches!(
            pos.play_uci("e2e5"),
            Err(PositionError::IllegalUci(_))
        ));
        assert!(matches!(
            pos.play_san("hello"),
            Err(PositionError::InvalidSan(_))
        ));
        assert_eq!(pos.to_fen(), STARTPOS);
    }

    #[test]
    fn san_uci_conversion() {
        let pos = Position::default();
        assert_eq!(pos.san_to_uci("Nf3").unwrap(), "g1f3");
        assert_eq!(pos.uci_to_san("g1f3").unwrap(), "Nf3");
    }

    #[test]
    fn san_includes_check_suffix() {
        let mut pos = Position::default();
        for san in ["e4", "f6", "d4", "g5"] {
            pos.play_san(san).unwrap();
        }
        assert!(pos.all_legal_sans().contains(&"Qh5#".to_string()));
        assert_eq!(pos.uci_to_san("d1h5").unwrap(), "Qh5#");
    }

    #[test]
    fn legals_for_uci_promotion() {
        let pos = Position::from_fen(Variant::Standard, "8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let legals = pos.legals_for_uci("a7a8");
        assert_eq!(legals, vec!["a7a8q", "a7a8r", "a7a8b", "a7a8n"]);
    }

    #[test]
    fn legals_for_uci_plain_move() {
        let pos = Position::default();
        assert_eq!(pos.legals_for_uci("e2e4"), vec!["e2e4"]);
        assert!(pos.legals_for_uci("e2e5").is_empty());
        assert!(pos.is_uci_legal("g1f3"));
        assert!(!pos.is_uci_legal("g1g3"));
    }

    #[test]
    fn antichess_king_promotion() {
        let pos =
            Position::from_fen(Variant::Antichess, "8/P7/8/8/8/8/8/7k w - - 0 1").unwrap();
        assert!(pos.legals_for_uci("a7a8").contains(&"a7a8k".to_string()));
    }

    #[test]
    fn checked_king_square() {
        let mut pos = Position::default();
        assert_eq!(pos.checked_king_square(), None);
        for san in ["e4", "f5", "Qh5+"] {
            pos.play_san(san).unwrap();
        }
        assert!(pos.is_check());
        assert_eq!(pos.checked_king_square().as_deref(), Some("e8"));
    }

    #[test]
    fn destinations_from_start() {
        let pos = Position::default();
        let dests = pos.destinations();
        assert_eq!(dests["g1"], vec!["f3", "h3"]);
        assert_eq!(dests.values().map(Vec::len).sum::<usize>(), 20);
    }

    #[test]
    fn store_key_of_position() {
        let pos = Position::default();
        assert_eq!(
            pos.store_key(),
            "chess__rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR_w_KQkq_-"
        );
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Position::default()), format!("[Pos chess {}]", STARTPOS));
    }
}
