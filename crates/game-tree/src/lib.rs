//! A chess game as a branching tree of positions.
//!
//! This crate provides:
//! - [`GameTree`] - nodes keyed by move path, a navigation cursor, and
//!   per-move priorities that decide which variation is shown first
//! - PGN import, merge and export ([`split_pgn`], [`GameTree::parse_pgn`],
//!   [`GameTree::merge_pgn`], [`GameTree::report_pgn`])
//! - A JSON blob form ([`TreeBlob`]) for storage
//!
//! # Example
//!
//! ```
//! use game_tree::GameTree;
//!
//! let mut tree = GameTree::new();
//! tree.play_sans_str("e4 e5 Nf3");
//! assert_eq!(tree.current().id(), "*_e4_e5_Nf3");
//!
//! tree.back();
//! tree.play_san("Nc3").unwrap();
//! tree.back();
//! assert_eq!(tree.child_nodes()[0].id(), "*_e4_e5_Nc3");
//! assert_eq!(tree.report_pgn(false), "1. e4 e5");
//! ```

pub mod analysis;
mod blob;
mod error;
mod node;
mod pgn;
mod rich;
mod tree;

pub use analysis::{DepthItem, PvItem, ScoreType};
pub use blob::{NodeBlob, TreeBlob};
pub use error::{PgnError, TreeError};
pub use node::{child_id, parent_id, GameNode, Weights, ID_SEPARATOR, ROOT_ID};
pub use pgn::{movetext_sans, split_pgn};
pub use rich::RichLegalSan;
pub use tree::{GameResult, GameTree, Player};
