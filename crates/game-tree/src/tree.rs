//! The game tree: an arena of positions with a navigation cursor.
//!
//! Nodes live in an indexable arena. Each node records its parent index and
//! its children in priority order; an id -> index map gives lookups by path
//! id. The path ids themselves (`*`, `*_e4`, `*_e4_e5`, ...) are the stable,
//! serialized identity of a node.

use crate::analysis::DepthItem;
use crate::node::{child_id, GameNode, NodeIndex, ROOT_ID};
use crate::TreeError;
use chess_core::Variant;
use chess_position::Position;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Outcome recorded for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameResult {
    BlackWins,
    /// Drawn, or not decided yet.
    #[default]
    Undecided,
    WhiteWins,
}

impl GameResult {
    /// Converts the numeric form (`-1`, `0`, `1`). Other values are rejected.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(GameResult::BlackWins),
            0 => Some(GameResult::Undecided),
            1 => Some(GameResult::WhiteWins),
            _ => None,
        }
    }

    /// Returns the numeric form.
    pub fn value(self) -> i64 {
        match self {
            GameResult::BlackWins => -1,
            GameResult::Undecided => 0,
            GameResult::WhiteWins => 1,
        }
    }

    /// Reads a PGN `Result` tag.
    pub fn from_pgn(tag: &str) -> Self {
        match tag.trim() {
            "1-0" => GameResult::WhiteWins,
            "0-1" => GameResult::BlackWins,
            _ => GameResult::Undecided,
        }
    }
}

/// A participant in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub username: String,
    pub title: String,
}

impl Default for Player {
    fn default() -> Self {
        Player {
            username: "?".to_string(),
            title: String::new(),
        }
    }
}

/// A game as a branching history of positions.
///
/// The tree always holds a root and a `current` cursor pointing at a live
/// node, and keeps a [`Position`] in sync with the cursor for legality
/// checks.
#[derive(Debug, Clone)]
pub struct GameTree {
    pub(crate) variant: Variant,
    pub(crate) pos: Position,
    pub(crate) slots: Vec<Option<GameNode>>,
    free: Vec<NodeIndex>,
    pub(crate) index: HashMap<String, NodeIndex>,
    pub(crate) root: NodeIndex,
    pub(crate) current: NodeIndex,
    pub(crate) headers: BTreeMap<String, String>,
    /// Opaque extension data carried through serialization.
    pub props: serde_json::Map<String, serde_json::Value>,
    pub players: [Player; 2],
    pub(crate) result: GameResult,
    pub terminated: bool,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    /// Creates a standard chess game at the starting position.
    pub fn new() -> Self {
        Self::with_variant(Variant::Standard, None)
    }

    /// Creates a game of a variant, optionally from a FEN.
    ///
    /// A FEN that cannot be used for the variant is ignored and the game
    /// starts from the variant's standard position.
    pub fn with_variant(variant: Variant, fen: Option<&str>) -> Self {
        let mut pos = Position::new(variant);
        if let Some(fen) = fen {
            if let Err(e) = pos.set_fen(fen) {
                warn!(variant = %variant, error = %e, "ignoring start position");
            }
        }
        let root = GameNode::root(ROOT_ID, pos.to_fen());
        Self::from_root(variant, pos, root)
    }

    pub(crate) fn from_root(variant: Variant, pos: Position, root: GameNode) -> Self {
        let mut index = HashMap::new();
        index.insert(root.id.clone(), 0);
        GameTree {
            variant,
            pos,
            slots: vec![Some(root)],
            free: Vec::new(),
            index,
            root: 0,
            current: 0,
            headers: BTreeMap::new(),
            props: serde_json::Map::new(),
            players: Default::default(),
            result: GameResult::default(),
            terminated: false,
        }
    }

    /// Discards the whole game and starts over in a variant.
    pub fn set_variant(&mut self, variant: Variant, fen: Option<&str>) -> &mut Self {
        *self = Self::with_variant(variant, fen);
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the position at the cursor.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the FEN at the cursor.
    pub fn report_fen(&self) -> String {
        self.pos.to_fen()
    }

    /// Returns the storage key of the position at the cursor.
    pub fn store_key(&self) -> String {
        self.pos.store_key()
    }

    pub fn root(&self) -> &GameNode {
        self.slot(self.root)
    }

    pub fn current(&self) -> &GameNode {
        self.slot(self.current)
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&GameNode> {
        self.index.get(id).map(|&idx| self.slot(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates over all nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &GameNode> {
        self.slots.iter().flatten()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns a header value, or `default` if the tag is absent or empty.
    pub fn header<'a>(&'a self, tag: &str, default: &'a str) -> &'a str {
        match self.headers.get(tag) {
            Some(value) if !value.is_empty() => value.as_str(),
            _ => default,
        }
    }

    pub fn set_header(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(tag.into(), value.into());
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn set_result(&mut self, result: GameResult) {
        self.result = result;
    }

    /// Returns true while the game has not been terminated.
    pub fn is_playing(&self) -> bool {
        !self.terminated
    }

    // ---- Navigation ----

    /// Moves the cursor to the parent. Returns false at the root.
    pub fn back(&mut self) -> bool {
        match self.slot(self.current).parent {
            Some(parent) => self.set_current(parent),
            None => false,
        }
    }

    /// Moves the cursor to the highest-priority child. Returns false at a
    /// terminal node.
    pub fn forward(&mut self) -> bool {
        match self.slot(self.current).children.first() {
            Some(&child) => self.set_current(child),
            None => false,
        }
    }

    /// Moves the cursor to the root. Returns true if it moved.
    pub fn to_begin(&mut self) -> bool {
        let mut moved = false;
        while self.back() {
            moved = true;
        }
        moved
    }

    /// Follows the highest-priority children to a terminal node. Returns true
    /// if the cursor moved.
    pub fn to_end(&mut self) -> bool {
        let mut moved = false;
        while self.forward() {
            moved = true;
        }
        moved
    }

    /// Moves the cursor to the node with the given id. Unknown ids leave the
    /// cursor unchanged and return false.
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.index.get(id).copied() {
            Some(idx) => self.set_current(idx),
            None => false,
        }
    }

    /// Moves the cursor and rebuilds the position from the node's FEN. A
    /// node whose FEN is rejected leaves the cursor where it was.
    pub(crate) fn set_current(&mut self, idx: NodeIndex) -> bool {
        let node = self.slot(idx);
        match Position::from_fen(self.variant, &node.fen) {
            Ok(pos) => {
                self.pos = pos;
                self.current = idx;
                true
            }
            Err(e) => {
                warn!(id = %node.id, error = %e, "node has unusable FEN");
                false
            }
        }
    }

    // ---- Moves ----

    /// Plays a move in SAN from the cursor.
    ///
    /// The move is stored under its canonical SAN. An existing child for the
    /// move is reused; otherwise a new node is created. Either way the move
    /// becomes the parent's most preferred continuation and the cursor moves
    /// to it. An illegal or malformed move changes nothing.
    pub fn play_san(&mut self, san: &str) -> Result<(), TreeError> {
        let m = self.pos.san_to_move(san)?;
        let san = self.pos.move_to_san(&m);
        let uci = self.pos.move_to_uci(&m);
        self.pos.play(&m)?;

        let parent = self.current;
        let id = child_id(&self.slot(parent).id, &san);
        let idx = match self.index.get(&id).copied() {
            Some(idx) => idx,
            None => {
                let parent_id = self.slot(parent).id.clone();
                let node = GameNode::child(parent, &parent_id, self.pos.to_fen(), uci, san.clone());
                let idx = self.insert(node);
                self.slot_mut(parent).children.push(idx);
                idx
            }
        };
        self.current = idx;

        self.slot_mut(parent).bring_forward_child(&san);
        self.sync_children(parent);
        Ok(())
    }

    /// Plays a move in coordinate notation from the cursor.
    pub fn play_uci(&mut self, uci: &str) -> Result<(), TreeError> {
        let san = self.pos.uci_to_san(uci)?;
        self.play_san(&san)
    }

    /// Plays moves in order, skipping the ones that fail. Returns the number
    /// of moves played.
    pub fn play_sans<S: AsRef<str>>(&mut self, sans: &[S]) -> usize {
        sans.iter()
            .filter(|san| self.play_san(san.as_ref()).is_ok())
            .count()
    }

    /// Plays a whitespace-separated list of SAN moves.
    pub fn play_sans_str(&mut self, sans: &str) -> usize {
        let sans: Vec<&str> = sans.split_whitespace().collect();
        self.play_sans(&sans)
    }

    /// Deletes the node at the cursor together with its subtree.
    ///
    /// The cursor moves to the parent, and the deleted move's priority there
    /// is reset to 0. Returns false at the root.
    pub fn del(&mut self) -> bool {
        let deleted = self.current;
        let Some(parent) = self.slot(deleted).parent else {
            return false;
        };
        let san = self.slot(deleted).gen_san.clone().unwrap_or_default();
        if !self.set_current(parent) {
            return false;
        }

        let mut stack = vec![deleted];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.slots[idx].take() {
                self.index.remove(&node.id);
                stack.extend(node.children);
                self.free.push(idx);
            }
        }

        let parent_node = self.slot_mut(parent);
        parent_node.children.retain(|&child| child != deleted);
        parent_node.set_priority(&san, 0);
        parent_node.normalize_priorities();
        self.sync_children(parent);
        true
    }

    // ---- Weights and annotations ----

    /// Sets the priority of a candidate move at a node.
    pub fn set_priority(&mut self, id: &str, san: &str, priority: i32) -> bool {
        self.edit_weights(id, |node| node.set_priority(san, priority))
    }

    /// Sets the self-evaluation of a candidate move at a node.
    pub fn set_my_weight(&mut self, id: &str, san: &str, weight: i32) -> bool {
        self.edit_weights(id, |node| node.set_my_weight(san, weight))
    }

    /// Sets the opponent evaluation of a candidate move at a node.
    pub fn set_opp_weight(&mut self, id: &str, san: &str, weight: i32) -> bool {
        self.edit_weights(id, |node| node.set_opp_weight(san, weight))
    }

    /// Makes `san` the most preferred continuation at a node.
    pub fn bring_forward_child(&mut self, id: &str, san: &str) -> bool {
        self.edit_weights(id, |node| node.bring_forward_child(san))
    }

    pub fn normalize_priorities(&mut self, id: &str) -> bool {
        self.edit_weights(id, GameNode::normalize_priorities)
    }

    pub fn clear_priorities(&mut self, id: &str) -> bool {
        self.edit_weights(id, GameNode::clear_priorities)
    }

    pub fn set_comment(&mut self, id: &str, comment: impl Into<String>) -> bool {
        self.edit_node(id, |node| node.comment = comment.into())
    }

    pub fn set_shapes(&mut self, id: &str, shapes: Vec<String>) -> bool {
        self.edit_node(id, |node| node.shapes = shapes)
    }

    pub fn set_analysis(&mut self, id: &str, analysis: Option<DepthItem>) -> bool {
        self.edit_node(id, |node| node.analysis = analysis)
    }

    fn edit_weights(&mut self, id: &str, f: impl FnOnce(&mut GameNode)) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        f(self.slot_mut(idx));
        self.sync_children(idx);
        true
    }

    fn edit_node(&mut self, id: &str, f: impl FnOnce(&mut GameNode)) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        f(self.slot_mut(idx));
        true
    }

    // ---- Queries ----

    /// Returns the children of a node, highest priority first.
    pub fn children(&self, id: &str) -> Vec<&GameNode> {
        self.index
            .get(id)
            .map(|&idx| self.children_of(idx).collect())
            .unwrap_or_default()
    }

    /// Returns the children of the cursor, highest priority first.
    pub fn child_nodes(&self) -> Vec<&GameNode> {
        self.children_of(self.current).collect()
    }

    /// Returns the other children of a node's parent.
    pub fn siblings(&self, id: &str) -> Vec<&GameNode> {
        let Some(parent) = self.node(id).and_then(|node| node.parent) else {
            return Vec::new();
        };
        self.children_of(parent).filter(|node| node.id != id).collect()
    }

    /// Returns true if a node has no children.
    pub fn is_terminal(&self, id: &str) -> bool {
        self.children(id).is_empty()
    }

    /// Returns the nodes from the root following the highest-priority child
    /// at each step.
    pub fn main_line(&self) -> Vec<&GameNode> {
        let mut line = vec![self.slot(self.root)];
        let mut idx = self.root;
        while let Some(&child) = self.slot(idx).children.first() {
            line.push(self.slot(child));
            idx = child;
        }
        line
    }

    /// Returns the SANs leading from the root to a node.
    pub fn path_sans(&self, id: &str) -> Vec<&str> {
        let mut sans = Vec::new();
        let mut idx = self.index.get(id).copied();
        while let Some(i) = idx {
            let node = self.slot(i);
            if let Some(san) = node.gen_san() {
                sans.push(san);
            }
            idx = node.parent;
        }
        sans.reverse();
        sans
    }

    fn children_of(&self, idx: NodeIndex) -> impl Iterator<Item = &GameNode> {
        self.slot(idx).children.iter().map(|&child| self.slot(child))
    }

    // ---- Arena ----

    pub(crate) fn slot(&self, idx: NodeIndex) -> &GameNode {
        self.slots[idx].as_ref().expect("node index points at a live node")
    }

    pub(crate) fn slot_mut(&mut self, idx: NodeIndex) -> &mut GameNode {
        self.slots[idx].as_mut().expect("node index points at a live node")
    }

    pub(crate) fn insert(&mut self, node: GameNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, idx);
        idx
    }

    /// Re-sorts a node's children by the priorities recorded at the node.
    /// Ties are broken by SAN.
    pub(crate) fn sync_children(&mut self, idx: NodeIndex) {
        let mut children = std::mem::take(&mut self.slot_mut(idx).children);
        let node = self.slot(idx);
        children.sort_by_cached_key(|&child| {
            let san = self.slot(child).display_san().to_string();
            (Reverse(node.priority(&san)), san)
        });
        self.slot_mut(idx).children = children;
    }
}
