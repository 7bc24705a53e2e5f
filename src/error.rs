//! Consistency errors reported by [`OrderedMap::verify`](crate::OrderedMap::verify).
//!
//! None of these can be produced by ordinary use of a map. They describe a
//! tree whose shape or metadata disagrees with its balancing invariant, which
//! only happens if the rebalancing code itself is wrong.

use thiserror::Error;

/// A broken structural invariant, found by recomputing a tree from scratch.
///
/// `depth` counts edges from the root (the root is at depth 0).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// An AVL node whose subtree heights differ by more than one.
    #[error("node at depth {depth} has balance factor {balance}")]
    StructuralImbalance { depth: usize, balance: i32 },

    /// Cached per-node metadata that no longer matches the subtree below it.
    #[error("node at depth {depth} stores {field} = {stored}, recomputed {actual}")]
    StaleMetadata {
        depth: usize,
        field: &'static str,
        stored: i64,
        actual: i64,
    },

    /// A Red-Black node whose subtrees carry different black heights.
    #[error("node at depth {depth} has left black height {left} and right black height {right}")]
    BlackHeightMismatch {
        depth: usize,
        left: usize,
        right: usize,
    },

    /// A red node with a red child, found outside of an insertion.
    #[error("red node at depth {depth} has a red child")]
    DoubleRed { depth: usize },

    /// The root of a Red-Black tree is red.
    #[error("root is red")]
    RedRoot,

    /// A key that is not strictly between its ancestors' keys.
    #[error("node at depth {depth} is out of order")]
    OutOfOrder { depth: usize },
}

pub type Result<T, E = TreeError> = std::result::Result<T, E>;
