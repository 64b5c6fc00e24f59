//! JSON blob form of a game tree.
//!
//! The blob keeps the id-keyed node map, so parent and child links are
//! rebuilt from the ids on load. Every field is optional when reading; `{}`
//! loads as a fresh standard game.

use crate::analysis::DepthItem;
use crate::node::{parent_id, GameNode, Weights, ID_SEPARATOR, ROOT_ID};
use crate::tree::{GameResult, GameTree, Player};
use crate::TreeError;
use chess_core::Variant;
use chess_position::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeBlob {
    pub id: String,
    pub fen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gen_uci: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gen_san: Option<String>,
    pub weights: BTreeMap<String, Weights>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DepthItem>,
}

/// Serialized form of a whole tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeBlob {
    pub variant: Variant,
    /// Start position used when the blob carries no nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<NodeBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<NodeBlob>,
    pub nodes: BTreeMap<String, NodeBlob>,
    pub headers: BTreeMap<String, String>,
    pub props: serde_json::Map<String, serde_json::Value>,
    pub players: Vec<Player>,
    pub result: i64,
    pub terminated: bool,
}

impl From<&GameNode> for NodeBlob {
    fn from(node: &GameNode) -> Self {
        NodeBlob {
            id: node.id.clone(),
            fen: node.fen.clone(),
            gen_uci: node.gen_uci.clone(),
            gen_san: node.gen_san.clone(),
            weights: node.weights.clone(),
            comment: node.comment.clone(),
            shapes: node.shapes.clone(),
            analysis: node.analysis.clone(),
        }
    }
}

impl NodeBlob {
    fn into_node(self, parent: Option<usize>) -> GameNode {
        let gen_san = match (&self.gen_san, parent) {
            (_, None) => None,
            (Some(san), _) => Some(san.clone()),
            (None, Some(_)) => self
                .id
                .rsplit_once(ID_SEPARATOR)
                .map(|(_, san)| san.to_string()),
        };
        GameNode {
            id: self.id,
            fen: self.fen,
            gen_uci: if parent.is_some() { self.gen_uci } else { None },
            gen_san,
            weights: self.weights,
            comment: self.comment,
            shapes: self.shapes,
            analysis: self.analysis,
            parent,
            children: Vec::new(),
        }
    }
}

impl GameTree {
    /// Converts the tree to its blob form.
    pub fn serialize(&self) -> TreeBlob {
        TreeBlob {
            variant: self.variant,
            fen: None,
            root: Some(self.root().into()),
            current: Some(self.current().into()),
            nodes: self
                .nodes()
                .map(|node| (node.id.clone(), NodeBlob::from(node)))
                .collect(),
            headers: self.headers.clone(),
            props: self.props.clone(),
            players: self.players.to_vec(),
            result: self.result.value(),
            terminated: self.terminated,
        }
    }

    /// Rebuilds a tree from its blob form.
    ///
    /// Nodes whose parent is missing from the blob, or whose FEN is
    /// rejected, are dropped together with their descendants. A missing or unknown `current` falls back to
    /// the root.
    pub fn from_blob(blob: TreeBlob) -> Self {
        let TreeBlob {
            variant,
            fen,
            root,
            current,
            mut nodes,
            headers,
            props,
            players,
            result,
            terminated,
        } = blob;

        let root_blob = nodes
            .remove(ROOT_ID)
            .or_else(|| root.filter(|r| r.id == ROOT_ID));
        let mut tree = match root_blob {
            Some(root_blob) => {
                let pos = match Position::from_fen(variant, &root_blob.fen) {
                    Ok(pos) => pos,
                    Err(e) => {
                        warn!(error = %e, "root FEN rejected, using start position");
                        Position::new(variant)
                    }
                };
                let mut root_node = root_blob.into_node(None);
                root_node.fen = pos.to_fen();
                GameTree::from_root(variant, pos, root_node)
            }
            None => GameTree::with_variant(variant, fen.as_deref()),
        };

        // Parents sort before their children when ordered by depth.
        let mut pending: Vec<NodeBlob> = nodes.into_values().collect();
        pending.sort_by_cached_key(|node| node.id.matches(ID_SEPARATOR).count());
        for node in pending {
            if let Err(e) = Position::from_fen(variant, &node.fen) {
                warn!(id = %node.id, error = %e, "dropping node with unusable FEN");
                continue;
            }
            let parent = parent_id(&node.id).and_then(|pid| tree.index.get(pid).copied());
            match parent {
                Some(parent) => {
                    let idx = tree.insert(node.into_node(Some(parent)));
                    tree.slot_mut(parent).children.push(idx);
                }
                None => warn!(id = %node.id, "dropping node without parent"),
            }
        }
        let indices: Vec<usize> = tree.index.values().copied().collect();
        for idx in indices {
            tree.sync_children(idx);
        }

        if let Some(&idx) = current.and_then(|c| tree.index.get(&c.id)) {
            tree.set_current(idx);
        }

        tree.headers = headers;
        tree.props = props;
        for (slot, player) in tree.players.iter_mut().zip(players) {
            *slot = player;
        }
        tree.result = GameResult::from_value(result).unwrap_or_default();
        tree.terminated = terminated;
        tree
    }

    /// Serializes the tree to compact JSON.
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    /// Serializes the tree to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Reads a tree from JSON. Empty input gives a fresh standard game.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        if json.trim().is_empty() {
            return Ok(GameTree::new());
        }
        let blob: TreeBlob = serde_json::from_str(json)?;
        Ok(Self::from_blob(blob))
    }
}
