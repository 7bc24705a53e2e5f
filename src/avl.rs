//! Height-balanced (AVL) ordered map.
//!
//! Nodes live in an arena owned by the map and refer to each other by index.
//! An insert records the nodes it visits on a [`DescentTrace`], attaches the
//! new leaf, then pops the trace bottom-up: each popped node has its child
//! link rewired to whatever now roots the subtree below it, its metadata
//! recomputed, and, if its balance factor left `-1..=1`, a single or double
//! rotation applied.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::debug;
use crate::error::{Result, TreeError};
use crate::iter::{InOrder, Keys, Traverse};
use crate::trace::DescentTrace;
use crate::{Config, OrderedMap};

pub(crate) type NodeId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

/// Outcome of a search from the root.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Probe {
    Empty,
    Found(NodeId),
    /// Key is absent; it would hang off `parent` on `side`.
    Vacant { parent: NodeId, side: Side },
}

#[derive(Clone)]
struct AvlNode<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Nodes on the longest downward path, counting this one.
    height: u32,
    /// Left height minus right height.
    balance: i32,
    /// Nodes in this subtree, counting this one.
    size: usize,
}

impl<K, V> AvlNode<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
            balance: 0,
            size: 1,
        }
    }
}

/// An ordered map backed by an AVL tree.
///
/// Every node satisfies `|height(left) - height(right)| <= 1` between
/// operations, so a tree of `n` keys is at most about `1.44 * log2(n + 2)`
/// nodes tall.
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    nodes: Vec<AvlNode<K, V>>,
    root: Option<NodeId>,
    verify_on_insert: bool,
}

pub type Iter<'a, K, V> = InOrder<'a, &'a AvlTreeMap<K, V>>;

impl<K, V> AvlTreeMap<K, V> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(Config {
            initial_capacity: capacity,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            nodes: Vec::with_capacity(config.initial_capacity),
            root: None,
            verify_on_insert: config.verify_on_insert,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree in nodes; an empty tree has height 0.
    #[inline]
    pub fn height(&self) -> usize {
        self.height_of(self.root) as usize
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        InOrder::new(self)
    }

    pub fn keys(&self) -> Keys<'_, &Self> {
        Keys::new(self)
    }

    #[inline]
    fn height_of(&self, link: Option<NodeId>) -> u32 {
        link.map_or(0, |id| self.nodes[id].height)
    }

    #[inline]
    fn size_of(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| self.nodes[id].size)
    }

    fn alloc(&mut self, key: K, value: V) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(AvlNode::leaf(key, value));
        id
    }

    /// Refresh `height`, `balance` and `size` from the node's children,
    /// trusting the children's own metadata.
    fn recompute(&mut self, id: NodeId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let (lh, rh) = (self.height_of(left), self.height_of(right));
        let size = self.size_of(left) + self.size_of(right) + 1;

        let node = &mut self.nodes[id];
        node.height = lh.max(rh) + 1;
        node.balance = lh as i32 - rh as i32;
        node.size = size;
    }

    /// Lift the left child into `id`'s position. Returns the new local root.
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].left else {
            return id;
        };
        self.nodes[id].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(id);
        self.recompute(id);
        self.recompute(pivot);
        pivot
    }

    /// Lift the right child into `id`'s position. Returns the new local root.
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].right else {
            return id;
        };
        self.nodes[id].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(id);
        self.recompute(id);
        self.recompute(pivot);
        pivot
    }

    /// `id` has balance > 1. A left-right shape is first straightened by
    /// rotating the left child, then `id` itself is rotated right.
    fn rebalance_left_heavy(&mut self, id: NodeId) -> NodeId {
        let Some(left) = self.nodes[id].left else {
            return id;
        };
        if self.nodes[left].balance < 0 {
            tracing::trace!(case = "left-right", "avl double rotation");
            let straightened = self.rotate_left(left);
            self.nodes[id].left = Some(straightened);
        } else {
            tracing::trace!(case = "left-left", "avl single rotation");
        }
        self.rotate_right(id)
    }

    /// Mirror of [`Self::rebalance_left_heavy`].
    fn rebalance_right_heavy(&mut self, id: NodeId) -> NodeId {
        let Some(right) = self.nodes[id].right else {
            return id;
        };
        if self.nodes[right].balance > 0 {
            tracing::trace!(case = "right-left", "avl double rotation");
            let straightened = self.rotate_right(right);
            self.nodes[id].right = Some(straightened);
        } else {
            tracing::trace!(case = "right-right", "avl single rotation");
        }
        self.rotate_left(id)
    }

    /// Walk the trace from the insertion point back to the root, restoring
    /// the balance invariant at each node.
    ///
    /// `previous` is the node popped on the last iteration and `replacement`
    /// the node that now occupies its position (itself unless it rotated).
    fn fix_up(&mut self, trace: &mut DescentTrace<NodeId>) {
        let mut previous: Option<NodeId> = None;
        let mut replacement: Option<NodeId> = None;

        while let Some(current) = trace.pop() {
            if let Some(previous) = previous {
                let node = &mut self.nodes[current];
                if node.left == Some(previous) {
                    node.left = replacement;
                } else if node.right == Some(previous) {
                    node.right = replacement;
                }
            }

            self.recompute(current);
            let balance = self.nodes[current].balance;
            let local_root = if balance > 1 {
                self.rebalance_left_heavy(current)
            } else if balance < -1 {
                self.rebalance_right_heavy(current)
            } else {
                current
            };

            if local_root != current && self.root == Some(current) {
                tracing::debug!(old = current, new = local_root, "avl root rotated");
                self.root = Some(local_root);
            }

            previous = Some(current);
            replacement = Some(local_root);
        }
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Search from the root, pushing every visited node onto `trace` when one
    /// is supplied.
    fn descend<Q>(&self, key: &Q, mut trace: Option<&mut DescentTrace<NodeId>>) -> Probe
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut probe = Probe::Empty;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            if let Some(trace) = trace.as_deref_mut() {
                trace.push(id);
            }
            let node = &self.nodes[id];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    probe = Probe::Vacant {
                        parent: id,
                        side: Side::Left,
                    };
                    cursor = node.left;
                }
                Ordering::Greater => {
                    probe = Probe::Vacant {
                        parent: id,
                        side: Side::Right,
                    };
                    cursor = node.right;
                }
                Ordering::Equal => return Probe::Found(id),
            }
        }
        probe
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut trace = DescentTrace::with_capacity(self.height());
        let replaced = match self.descend(&key, Some(&mut trace)) {
            Probe::Found(id) => Some(std::mem::replace(&mut self.nodes[id].value, value)),
            Probe::Empty => {
                let id = self.alloc(key, value);
                self.root = Some(id);
                None
            }
            Probe::Vacant { parent, side } => {
                debug_assert_eq!(trace.top(), Some(parent));
                let id = self.alloc(key, value);
                match side {
                    Side::Left => self.nodes[parent].left = Some(id),
                    Side::Right => self.nodes[parent].right = Some(id),
                }
                self.fix_up(&mut trace);
                None
            }
        };
        debug_assert!(trace.is_empty() || replaced.is_some());

        if self.verify_on_insert || debug::verify_on_insert() {
            debug::assert_consistent("avl", self.verify());
        }
        replaced
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.descend(key, None) {
            Probe::Found(id) => Some(&self.nodes[id].value),
            _ => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.descend(key, None), Probe::Found(_))
    }

    /// Recompute every node's metadata from scratch and check it against the
    /// stored values, the AVL balance bound and key order.
    pub fn verify(&self) -> Result<()> {
        let (_, size) = self.verify_subtree(self.root, 0, None, None)?;
        if size != self.nodes.len() {
            return Err(TreeError::StaleMetadata {
                depth: 0,
                field: "reachable nodes",
                stored: self.nodes.len() as i64,
                actual: size as i64,
            });
        }
        Ok(())
    }

    /// Returns the recomputed `(height, size)` of the subtree at `link`.
    fn verify_subtree(
        &self,
        link: Option<NodeId>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(u32, usize)> {
        let Some(id) = link else {
            return Ok((0, 0));
        };
        let node = &self.nodes[id];
        if lower.is_some_and(|lo| *lo >= node.key) || upper.is_some_and(|hi| *hi <= node.key) {
            return Err(TreeError::OutOfOrder { depth });
        }

        let (lh, ls) = self.verify_subtree(node.left, depth + 1, lower, Some(&node.key))?;
        let (rh, rs) = self.verify_subtree(node.right, depth + 1, Some(&node.key), upper)?;
        let height = lh.max(rh) + 1;
        let balance = lh as i32 - rh as i32;
        let size = ls + rs + 1;

        if !(-1..=1).contains(&balance) {
            return Err(TreeError::StructuralImbalance { depth, balance });
        }
        for (field, stored, actual) in [
            ("height", node.height as i64, height as i64),
            ("balance", node.balance as i64, balance as i64),
            ("size", node.size as i64, size as i64),
        ] {
            if stored != actual {
                return Err(TreeError::StaleMetadata {
                    depth,
                    field,
                    stored,
                    actual,
                });
            }
        }
        Ok((height, size))
    }
}

impl<'a, K, V> Traverse<'a> for &'a AvlTreeMap<K, V> {
    type Handle = NodeId;
    type Key = K;
    type Value = V;

    #[inline]
    fn root(self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    fn left(self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].left
    }

    #[inline]
    fn right(self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].right
    }

    #[inline]
    fn entry(self, node: NodeId) -> (&'a K, &'a V) {
        let node = &self.nodes[node];
        (&node.key, &node.value)
    }

    #[inline]
    fn len(self) -> usize {
        AvlTreeMap::len(self)
    }
}

impl<K: Ord, V> OrderedMap<K, V> for AvlTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        AvlTreeMap::insert(self, key, value)
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::get(self, key)
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        AvlTreeMap::contains_key(self, key)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        AvlTreeMap::keys(self)
    }

    fn len(&self) -> usize {
        AvlTreeMap::len(self)
    }

    fn height(&self) -> usize {
        AvlTreeMap::height(self)
    }

    fn verify(&self) -> Result<()> {
        AvlTreeMap::verify(self)
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
