//! Process-wide switch for whole-tree verification after every insert.
//!
//! Verification walks the entire tree, so it turns an O(log n) insert into an
//! O(n) one. It never changes what a map returns; it only decides whether a
//! broken invariant is noticed.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TreeError;

static VERIFY_ON_INSERT: AtomicBool = AtomicBool::new(false);

/// Turn post-insert verification on or off for every map in the process.
pub fn set_verify_on_insert(enabled: bool) {
    VERIFY_ON_INSERT.store(enabled, Ordering::Relaxed);
}

/// Whether post-insert verification is switched on process-wide.
pub fn verify_on_insert() -> bool {
    VERIFY_ON_INSERT.load(Ordering::Relaxed)
}

/// Fail loudly on a broken invariant.
///
/// A verification failure means the rebalancing code is wrong, and a tree in
/// that state cannot be repaired from the outside.
pub(crate) fn assert_consistent(engine: &'static str, result: Result<(), TreeError>) {
    if let Err(err) = result {
        tracing::error!(engine, error = %err, "tree invariant violated after insert");
        panic!("{engine}: {err}");
    }
}
