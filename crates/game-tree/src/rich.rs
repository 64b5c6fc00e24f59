//! Legal moves enriched with tree data, for move pickers.

use crate::node::Weights;
use crate::GameTree;
use chess_core::MoveRating;
use std::collections::HashMap;

/// A legal move from the cursor together with what the tree knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichLegalSan {
    pub san: String,
    pub uci: String,
    /// Rating bucket of the move's self-evaluation.
    pub rating: MoveRating,
    /// The move is the first child of the cursor.
    pub is_mainline: bool,
    /// The move is a child of the cursor but not the first one.
    pub is_variation: bool,
    pub weights: Weights,
}

impl GameTree {
    /// Returns every legal move from the cursor, highest priority and
    /// evaluation first.
    pub fn rich_legal_sans(&self) -> Vec<RichLegalSan> {
        let current = self.current();
        let ranks: HashMap<&str, usize> = self
            .child_nodes()
            .into_iter()
            .enumerate()
            .map(|(rank, node)| (node.display_san(), rank))
            .collect();

        let mut moves: Vec<RichLegalSan> = self
            .position()
            .all_legal_sans()
            .into_iter()
            .filter_map(|san| {
                let uci = self.position().san_to_uci(&san).ok()?;
                let weights = current.weights_for(&san);
                let rank = ranks.get(san.as_str()).copied();
                Some(RichLegalSan {
                    uci,
                    rating: MoveRating::from_weight(weights[1]),
                    is_mainline: rank == Some(0),
                    is_variation: rank.is_some_and(|r| r > 0),
                    weights,
                    san,
                })
            })
            .collect();

        moves.sort_by(|a, b| a.weights.cmp(&b.weights).then_with(|| a.san.cmp(&b.san)));
        moves.reverse();
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position() {
        let tree = GameTree::new();
        let moves = tree.rich_legal_sans();
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|m| m.rating == MoveRating::Unrated));
        assert!(moves.iter().all(|m| !m.is_mainline && !m.is_variation));
    }

    #[test]
    fn played_moves_rank_first() {
        let mut tree = GameTree::new();
        tree.play_san("e4").unwrap();
        tree.back();
        tree.play_san("d4").unwrap();
        tree.back();

        let moves = tree.rich_legal_sans();
        assert_eq!(moves[0].san, "d4");
        assert_eq!(moves[0].uci, "d2d4");
        assert!(moves[0].is_mainline);
        assert_eq!(moves[1].san, "e4");
        assert!(moves[1].is_variation);
        assert_eq!(moves[1].weights, [1, 0, 0]);
    }

    #[test]
    fn rating_from_self_evaluation() {
        let mut tree = GameTree::new();
        tree.set_my_weight("*", "Nf3", 7);
        let moves = tree.rich_legal_sans();
        let nf3 = moves.iter().find(|m| m.san == "Nf3").unwrap();
        assert_eq!(nf3.rating, MoveRating::Good);
        assert_eq!(moves[0].san, "Nf3");
        assert!(!nf3.is_mainline);
    }
}
