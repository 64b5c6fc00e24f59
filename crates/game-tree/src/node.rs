//! Game tree nodes and per-move weights.

use crate::analysis::DepthItem;
use chess_core::{store_key, Variant};
use std::collections::BTreeMap;

/// Id of the root node.
pub const ROOT_ID: &str = "*";

/// Separator between the SAN segments of a node id.
pub const ID_SEPARATOR: char = '_';

/// Index of a node inside the tree's arena.
pub type NodeIndex = usize;

/// `[priority, self evaluation, opponent evaluation]` for one candidate move.
///
/// A priority of 0 means the move is not prioritized. Positive priorities
/// are assigned in play order; the highest is shown first.
pub type Weights = [i32; 3];

const PRIORITY: usize = 0;
const MY_WEIGHT: usize = 1;
const OPP_WEIGHT: usize = 2;

/// One position reached by a specific move sequence.
///
/// The id is the parent's id, the separator, and the SAN of the generating
/// move; the root has id [`ROOT_ID`]. Weights are keyed by SAN so that a move
/// can carry a priority or evaluation before it has been played.
#[derive(Debug, Clone, PartialEq)]
pub struct GameNode {
    pub(crate) id: String,
    pub(crate) fen: String,
    pub(crate) gen_uci: Option<String>,
    pub(crate) gen_san: Option<String>,
    pub(crate) weights: BTreeMap<String, Weights>,
    pub(crate) comment: String,
    pub(crate) shapes: Vec<String>,
    pub(crate) analysis: Option<DepthItem>,
    pub(crate) parent: Option<NodeIndex>,
    /// Child indices, highest priority first.
    pub(crate) children: Vec<NodeIndex>,
}

impl GameNode {
    pub(crate) fn root(id: impl Into<String>, fen: impl Into<String>) -> Self {
        GameNode {
            id: id.into(),
            fen: fen.into(),
            gen_uci: None,
            gen_san: None,
            weights: BTreeMap::new(),
            comment: String::new(),
            shapes: Vec::new(),
            analysis: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn child(
        parent: NodeIndex,
        parent_id: &str,
        fen: String,
        uci: String,
        san: String,
    ) -> Self {
        GameNode {
            id: child_id(parent_id, &san),
            fen,
            gen_uci: Some(uci),
            gen_san: Some(san),
            weights: BTreeMap::new(),
            comment: String::new(),
            shapes: Vec::new(),
            analysis: None,
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    /// Returns the path id of this node.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the FEN of this node's position.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Returns the generating move in coordinate notation.
    pub fn gen_uci(&self) -> Option<&str> {
        self.gen_uci.as_deref()
    }

    /// Returns the generating move in SAN.
    pub fn gen_san(&self) -> Option<&str> {
        self.gen_san.as_deref()
    }

    /// Returns the generating SAN, or `*` for the root.
    pub fn display_san(&self) -> &str {
        self.gen_san().unwrap_or(ROOT_ID)
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn shapes(&self) -> &[String] {
        &self.shapes
    }

    pub fn analysis(&self) -> Option<&DepthItem> {
        self.analysis.as_ref()
    }

    /// Returns true if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the id of the parent, derived from this node's id.
    pub fn parent_id(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        parent_id(&self.id)
    }

    /// Returns the number of moves between the root and this node.
    pub fn depth(&self) -> usize {
        self.id.matches(ID_SEPARATOR).count()
    }

    /// Returns the storage key of this node's position.
    pub fn store_key(&self, variant: Variant) -> String {
        store_key(variant, &self.fen)
    }

    /// Returns all recorded weights, keyed by SAN.
    pub fn weights(&self) -> &BTreeMap<String, Weights> {
        &self.weights
    }

    /// Returns the weights of a candidate move, zero if none are recorded.
    pub fn weights_for(&self, san: &str) -> Weights {
        self.weights.get(san).copied().unwrap_or_default()
    }

    pub fn priority(&self, san: &str) -> i32 {
        self.weights_for(san)[PRIORITY]
    }

    pub fn my_weight(&self, san: &str) -> i32 {
        self.weights_for(san)[MY_WEIGHT]
    }

    pub fn opp_weight(&self, san: &str) -> i32 {
        self.weights_for(san)[OPP_WEIGHT]
    }

    /// Returns the highest priority, 0 if nothing is prioritized.
    pub fn max_priority(&self) -> i32 {
        self.weights
            .values()
            .map(|w| w[PRIORITY])
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Returns the lowest positive priority, 0 if nothing is prioritized.
    pub fn min_priority(&self) -> i32 {
        self.weights
            .values()
            .map(|w| w[PRIORITY])
            .filter(|&p| p > 0)
            .min()
            .unwrap_or(0)
    }

    pub(crate) fn set_weight(&mut self, san: &str, index: usize, value: i32) {
        self.weights.entry(san.to_string()).or_default()[index] = value;
    }

    pub(crate) fn set_priority(&mut self, san: &str, priority: i32) {
        self.set_weight(san, PRIORITY, priority);
    }

    pub(crate) fn set_my_weight(&mut self, san: &str, weight: i32) {
        self.set_weight(san, MY_WEIGHT, weight);
    }

    pub(crate) fn set_opp_weight(&mut self, san: &str, weight: i32) {
        self.set_weight(san, OPP_WEIGHT, weight);
    }

    /// Re-ranks positive priorities to a dense `1..=k`, keeping their order.
    /// Equal priorities share a rank.
    pub(crate) fn normalize_priorities(&mut self) {
        let mut distinct: Vec<i32> = self
            .weights
            .values()
            .map(|w| w[PRIORITY])
            .filter(|&p| p > 0)
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        for w in self.weights.values_mut() {
            if let Ok(rank) = distinct.binary_search(&w[PRIORITY]) {
                w[PRIORITY] = rank as i32 + 1;
            }
        }
    }

    pub(crate) fn clear_priorities(&mut self) {
        for w in self.weights.values_mut() {
            w[PRIORITY] = 0;
        }
    }

    /// Makes `san` the most preferred continuation.
    pub(crate) fn bring_forward_child(&mut self, san: &str) {
        let priority = self.max_priority() + 1;
        self.set_priority(san, priority);
        self.normalize_priorities();
    }
}

/// Builds the id of the child reached by `san`.
pub fn child_id(parent_id: &str, san: &str) -> String {
    format!("{}{}{}", parent_id, ID_SEPARATOR, san)
}

/// Drops the last segment of an id. The root id has no parent.
pub fn parent_id(id: &str) -> Option<&str> {
    id.rsplit_once(ID_SEPARATOR).map(|(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(priorities: &[(&str, i32)]) -> GameNode {
        let mut node = GameNode::root(ROOT_ID, "");
        for (san, p) in priorities {
            node.set_priority(san, *p);
        }
        node
    }

    fn positive_priorities(node: &GameNode) -> Vec<i32> {
        let mut ps: Vec<i32> = node
            .weights
            .values()
            .map(|w| w[PRIORITY])
            .filter(|&p| p > 0)
            .collect();
        ps.sort();
        ps
    }

    #[test]
    fn ids() {
        assert_eq!(child_id(ROOT_ID, "e4"), "*_e4");
        assert_eq!(parent_id("*_e4_e5"), Some("*_e4"));
        assert_eq!(parent_id(ROOT_ID), None);
    }

    #[test]
    fn root_node() {
        let node = GameNode::root(ROOT_ID, "fen");
        assert!(node.is_root());
        assert_eq!(node.parent_id(), None);
        assert_eq!(node.display_san(), "*");
        assert_eq!(node.depth(), 0);
    }

    #[test]
    fn child_node() {
        let node = GameNode::child(0, "*_e4", "fen".into(), "e7e5".into(), "e5".into());
        assert_eq!(node.id(), "*_e4_e5");
        assert_eq!(node.parent_id(), Some("*_e4"));
        assert_eq!(node.display_san(), "e5");
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn missing_weights_are_zero() {
        let node = GameNode::root(ROOT_ID, "");
        assert_eq!(node.weights_for("e4"), [0, 0, 0]);
        assert_eq!(node.max_priority(), 0);
        assert_eq!(node.min_priority(), 0);
    }

    #[test]
    fn weight_components() {
        let mut node = GameNode::root(ROOT_ID, "");
        node.set_priority("e4", 2);
        node.set_my_weight("e4", 7);
        node.set_opp_weight("e4", 3);
        assert_eq!(node.weights_for("e4"), [2, 7, 3]);
        assert_eq!(node.my_weight("e4"), 7);
        assert_eq!(node.opp_weight("e4"), 3);
    }

    #[test]
    fn bring_forward_appends() {
        let mut node = GameNode::root(ROOT_ID, "");
        node.bring_forward_child("e4");
        node.bring_forward_child("d4");
        assert_eq!(node.priority("e4"), 1);
        assert_eq!(node.priority("d4"), 2);

        node.bring_forward_child("e4");
        assert_eq!(node.priority("e4"), 2);
        assert_eq!(node.priority("d4"), 1);
    }

    #[test]
    fn normalize_shifts_down() {
        let mut node = node_with(&[("e4", 3), ("d4", 4), ("c4", 0)]);
        node.normalize_priorities();
        assert_eq!(node.priority("e4"), 1);
        assert_eq!(node.priority("d4"), 2);
        assert_eq!(node.priority("c4"), 0);
    }

    #[test]
    fn normalize_closes_gaps() {
        let mut node = node_with(&[("a3", 1), ("b3", 3), ("c3", 4)]);
        node.normalize_priorities();
        assert_eq!(positive_priorities(&node), vec![1, 2, 3]);
        assert_eq!(node.priority("c3"), 3);
    }

    #[test]
    fn normalize_keeps_ties_equal() {
        let mut node = node_with(&[("e4", 5), ("d4", 5), ("c4", 8), ("Nf3", 0)]);
        node.normalize_priorities();
        assert_eq!(node.priority("e4"), 1);
        assert_eq!(node.priority("d4"), 1);
        assert_eq!(node.priority("c4"), 2);
        assert_eq!(node.priority("Nf3"), 0);

        node.bring_forward_child("d4");
        assert_eq!(node.priority("d4"), 3);
        assert_eq!(node.priority("c4"), 2);
        assert_eq!(node.priority("e4"), 1);
    }

    #[test]
    fn bring_forward_middle_stays_dense() {
        let mut node = GameNode::root(ROOT_ID, "");
        for san in ["a3", "b3", "c3"] {
            node.bring_forward_child(san);
        }
        node.bring_forward_child("b3");
        assert_eq!(positive_priorities(&node), vec![1, 2, 3]);
        assert_eq!(node.priority("b3"), 3);
        assert_eq!(node.priority("c3"), 2);
        assert_eq!(node.priority("a3"), 1);
    }

    #[test]
    fn clear_priorities_keeps_evaluations() {
        let mut node = node_with(&[("e4", 2)]);
        node.set_my_weight("e4", 5);
        node.clear_priorities();
        assert_eq!(node.weights_for("e4"), [0, 5, 0]);
    }
}
