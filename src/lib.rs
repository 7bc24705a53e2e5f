//! # bstrees
//!
//! Ordered maps on self-balancing binary search trees.
//!
//! - [`AvlTreeMap`]: height-balanced. Insertion records its descent path and
//!   rebalances bottom-up along it with single and double rotations.
//! - [`RedBlackTreeMap`]: color-balanced. Insertion recurses and resolves
//!   red-red pairs on the way back up by recoloring or rotating.
//! - [`BasicBstMap`]: no balancing at all; the baseline.
//!
//! All three implement [`OrderedMap`] and behave identically as maps. Keys
//! cannot be removed.
//!
//! ## Example
//!
//! ```rust
//! use bstrees::{AvlTreeMap, OrderedMap, RedBlackTreeMap};
//!
//! let mut avl = AvlTreeMap::new();
//! let mut rb = RedBlackTreeMap::new();
//! for (k, v) in [(50, "a"), (30, "b"), (70, "c"), (30, "d")] {
//!     avl.insert(k, v);
//!     rb.insert(k, v);
//! }
//!
//! assert_eq!(avl.get(&30), Some(&"d"));
//! assert_eq!(rb.get(&30), Some(&"d"));
//! assert!(!avl.contains_key(&40));
//! assert_eq!(avl.keys().copied().collect::<Vec<_>>(), vec![30, 50, 70]);
//! assert!(rb.verify().is_ok());
//! ```
//!
//! ## Threading
//!
//! A map is `Send` and `Sync` whenever its keys and values are. Mutation
//! needs `&mut`, so sharing a map across threads while writing to it requires
//! an external lock.

#![forbid(unsafe_code)]

pub mod avl;
pub mod basic;
pub mod debug;
pub mod error;
pub mod iter;
mod map;
pub mod red_black;
mod trace;

pub use avl::AvlTreeMap;
pub use basic::BasicBstMap;
pub use error::TreeError;
pub use map::OrderedMap;
pub use red_black::RedBlackTreeMap;

/// Construction options shared by the balanced maps.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Number of nodes to reserve up front. Only arena-backed maps use it.
    pub initial_capacity: usize,
    /// Run [`OrderedMap::verify`] after every insert and panic on failure.
    ///
    /// [`debug::set_verify_on_insert`] enables the same check for every map.
    pub verify_on_insert: bool,
}

#[cfg(test)]
mod proptests;
