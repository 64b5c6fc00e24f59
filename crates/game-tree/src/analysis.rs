//! Engine analysis attached to a node.
//!
//! The tree never produces analysis; it only stores what an engine reported
//! for a node's position and carries it through serialization.

use serde::{Deserialize, Serialize};

/// Kind of engine score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    /// Centipawns (100 = 1 pawn advantage).
    #[default]
    Cp,
    /// Mate in N moves.
    Mate,
}

/// One principal variation reported at some depth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvItem {
    pub multipv: u32,
    /// The raw `pv ...` text as reported by the engine.
    pub parsed_pv: String,
    pub pv_ucis: Vec<String>,
    pub pv_sans: Vec<String>,
    pub score_type: ScoreType,
    pub score_value: f64,
    /// Score folded to a single number for sorting; mates map to large values.
    pub score_numerical: f64,
    pub depth: u32,
}

/// All principal variations reported for one search depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthItem {
    /// One slot per requested variation; `None` until the engine reports it.
    pub pv_items: Vec<Option<PvItem>>,
    pub depth: u32,
    pub multipv: u32,
}

impl Default for DepthItem {
    fn default() -> Self {
        DepthItem {
            pv_items: Vec::new(),
            depth: 0,
            multipv: 1,
        }
    }
}

impl DepthItem {
    /// Returns true once every requested variation has been reported.
    pub fn is_completed(&self) -> bool {
        self.pv_items.iter().flatten().count() == self.multipv as usize
    }
}
