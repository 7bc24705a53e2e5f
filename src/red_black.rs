//! Color-balanced (Red-Black) ordered map.
//!
//! Insertion recurses down to a leaf, hangs a new red node there, and fixes
//! red-red pairs on the way back up. A child that comes back red under a red
//! parent is reported to the grandparent as [`Insertion::DoubleRed`]; the
//! grandparent then either recolors (red uncle) or rotates (black uncle).

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::debug;
use crate::error::{Result, TreeError};
use crate::iter::{InOrder, Keys, Traverse};
use crate::{Config, OrderedMap};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A child slot. `Leaf` is the black sentinel: it holds no key and counts as
/// one black node toward black height.
#[derive(Clone)]
enum Link<K, V> {
    Leaf,
    Node(Box<RbNode<K, V>>),
}

impl<K, V> Default for Link<K, V> {
    fn default() -> Self {
        Link::Leaf
    }
}

#[derive(Clone)]
pub struct RbNode<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Link<K, V>,
    right: Link<K, V>,
}

/// Result of inserting into a subtree.
enum Insertion<K, V> {
    /// The subtree has no red-red pair at its top.
    Settled(Box<RbNode<K, V>>),
    /// The subtree root is red and so is one of its children. The caller, the
    /// root's parent, has to resolve it.
    DoubleRed(Box<RbNode<K, V>>),
}

impl<K, V> RbNode<K, V> {
    fn red(key: K, value: V) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            left: Link::Leaf,
            right: Link::Leaf,
        }
    }

    #[inline]
    fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    fn child(&self, side: Side) -> &Link<K, V> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    #[inline]
    fn child_mut(&mut self, side: Side) -> &mut Link<K, V> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl<K, V> Link<K, V> {
    #[inline]
    fn is_red(&self) -> bool {
        match self {
            Link::Leaf => false,
            Link::Node(node) => node.is_red(),
        }
    }

    #[inline]
    fn as_node(&self) -> Option<&RbNode<K, V>> {
        match self {
            Link::Leaf => None,
            Link::Node(node) => Some(node),
        }
    }

    fn paint(&mut self, color: Color) {
        if let Link::Node(node) = self {
            node.color = color;
        }
    }

    fn height(&self) -> usize {
        match self {
            Link::Leaf => 0,
            Link::Node(node) => 1 + node.left.height().max(node.right.height()),
        }
    }

    fn count(&self) -> usize {
        match self {
            Link::Leaf => 0,
            Link::Node(node) => 1 + node.left.count() + node.right.count(),
        }
    }

    /// Black nodes on every path from here down to a sentinel, counting the
    /// sentinel.
    fn black_height(&self, depth: usize) -> Result<usize> {
        let node = match self {
            Link::Leaf => return Ok(1),
            Link::Node(node) => node,
        };
        if node.is_red() && (node.left.is_red() || node.right.is_red()) {
            return Err(TreeError::DoubleRed { depth });
        }
        let left = node.left.black_height(depth + 1)?;
        let right = node.right.black_height(depth + 1)?;
        if left != right {
            return Err(TreeError::BlackHeightMismatch { depth, left, right });
        }
        Ok(left + usize::from(!node.is_red()))
    }

    fn get<Q>(&self, key: &Q) -> Option<&RbNode<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        while let Link::Node(node) = cursor {
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return Some(node),
            };
        }
        None
    }
}

impl<K: Ord, V> Link<K, V> {
    fn check_order(&self, depth: usize, lower: Option<&K>, upper: Option<&K>) -> Result<()> {
        let Link::Node(node) = self else {
            return Ok(());
        };
        if lower.is_some_and(|lo| *lo >= node.key) || upper.is_some_and(|hi| *hi <= node.key) {
            return Err(TreeError::OutOfOrder { depth });
        }
        node.left.check_order(depth + 1, lower, Some(&node.key))?;
        node.right.check_order(depth + 1, Some(&node.key), upper)
    }
}

/// Lift the child on `side` into `node`'s position. Returns the new local
/// root; colors are left to the caller.
fn lift<K, V>(mut node: Box<RbNode<K, V>>, side: Side) -> Box<RbNode<K, V>> {
    let mut pivot = match mem::take(node.child_mut(side)) {
        Link::Node(pivot) => pivot,
        Link::Leaf => return node,
    };
    *node.child_mut(side) = mem::take(pivot.child_mut(side.opposite()));
    *pivot.child_mut(side.opposite()) = Link::Node(node);
    pivot
}

/// `node` is black and its child on `side` is red with a red child.
fn resolve_double_red<K, V>(mut node: Box<RbNode<K, V>>, side: Side) -> Box<RbNode<K, V>> {
    if node.child(side.opposite()).is_red() {
        tracing::trace!(case = "red uncle", "rb recolor");
        node.color = Color::Red;
        node.left.paint(Color::Black);
        node.right.paint(Color::Black);
        return node;
    }

    let zigzag = match node.child(side) {
        Link::Node(child) => child.child(side.opposite()).is_red(),
        Link::Leaf => false,
    };
    if zigzag {
        tracing::trace!(case = "opposite side", "rb double rotation");
        if let Link::Node(child) = mem::take(node.child_mut(side)) {
            *node.child_mut(side) = Link::Node(lift(child, side.opposite()));
        }
    } else {
        tracing::trace!(case = "same side", "rb single rotation");
    }

    let mut top = lift(node, side);
    top.color = Color::Black;
    top.child_mut(side.opposite()).paint(Color::Red);
    top
}

fn insert_into<K: Ord, V>(
    link: Link<K, V>,
    key: K,
    value: V,
    replaced: &mut Option<V>,
) -> Insertion<K, V> {
    let mut node = match link {
        Link::Leaf => return Insertion::Settled(Box::new(RbNode::red(key, value))),
        Link::Node(node) => node,
    };
    let side = match key.cmp(&node.key) {
        Ordering::Less => Side::Left,
        Ordering::Greater => Side::Right,
        Ordering::Equal => {
            *replaced = Some(mem::replace(&mut node.value, value));
            return Insertion::Settled(node);
        }
    };

    let child = mem::take(node.child_mut(side));
    match insert_into(child, key, value, replaced) {
        Insertion::Settled(child) => *node.child_mut(side) = Link::Node(child),
        Insertion::DoubleRed(child) => {
            *node.child_mut(side) = Link::Node(child);
            node = resolve_double_red(node, side);
        }
    }

    // A recolor leaves `node` red; if its parent is red too, that parent
    // reports the pair one level further up.
    if node.is_red() && node.child(side).is_red() {
        Insertion::DoubleRed(node)
    } else {
        Insertion::Settled(node)
    }
}

/// An ordered map backed by a Red-Black tree.
///
/// The root is black, no red node has a red child, and every root-to-leaf
/// path carries the same number of black nodes, so a tree of `n` keys is at
/// most `2 * log2(n + 1)` nodes tall.
#[derive(Clone)]
pub struct RedBlackTreeMap<K, V> {
    root: Link<K, V>,
    len: usize,
    verify_on_insert: bool,
}

pub type Iter<'a, K, V> = InOrder<'a, &'a RedBlackTreeMap<K, V>>;

impl<K, V> RedBlackTreeMap<K, V> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// `initial_capacity` is ignored: nodes are boxed individually.
    pub fn with_config(config: Config) -> Self {
        Self {
            root: Link::Leaf,
            len: 0,
            verify_on_insert: config.verify_on_insert,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree in nodes, not counting sentinels.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        InOrder::new(self)
    }

    pub fn keys(&self) -> Keys<'_, &Self> {
        Keys::new(self)
    }
}

impl<K: Ord, V> RedBlackTreeMap<K, V> {
    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut replaced = None;
        let root = mem::take(&mut self.root);
        let mut root = match insert_into(root, key, value, &mut replaced) {
            Insertion::Settled(root) | Insertion::DoubleRed(root) => root,
        };
        if root.is_red() {
            tracing::debug!("rb root repainted black");
            root.color = Color::Black;
        }
        self.root = Link::Node(root);
        if replaced.is_none() {
            self.len += 1;
        }

        if self.verify_on_insert || debug::verify_on_insert() {
            debug::assert_consistent("red-black", self.verify());
        }
        replaced
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.get(key).map(|node| &node.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.get(key).is_some()
    }

    /// Check root color, red-red pairs, black heights, key order and the
    /// cached length against a fresh walk of the tree.
    pub fn verify(&self) -> Result<()> {
        if self.root.is_red() {
            return Err(TreeError::RedRoot);
        }
        self.root.black_height(0)?;
        self.root.check_order(0, None, None)?;
        let count = self.root.count();
        if count != self.len {
            return Err(TreeError::StaleMetadata {
                depth: 0,
                field: "len",
                stored: self.len as i64,
                actual: count as i64,
            });
        }
        Ok(())
    }
}

impl<'a, K, V> Traverse<'a> for &'a RedBlackTreeMap<K, V> {
    type Handle = &'a RbNode<K, V>;
    type Key = K;
    type Value = V;

    #[inline]
    fn root(self) -> Option<Self::Handle> {
        self.root.as_node()
    }

    #[inline]
    fn left(self, node: Self::Handle) -> Option<Self::Handle> {
        node.left.as_node()
    }

    #[inline]
    fn right(self, node: Self::Handle) -> Option<Self::Handle> {
        node.right.as_node()
    }

    #[inline]
    fn entry(self, node: Self::Handle) -> (&'a K, &'a V) {
        (&node.key, &node.value)
    }

    #[inline]
    fn len(self) -> usize {
        self.len
    }
}

impl<K: Ord, V> OrderedMap<K, V> for RedBlackTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        RedBlackTreeMap::insert(self, key, value)
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        RedBlackTreeMap::get(self, key)
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        RedBlackTreeMap::contains_key(self, key)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        RedBlackTreeMap::keys(self)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        RedBlackTreeMap::height(self)
    }

    fn verify(&self) -> Result<()> {
        RedBlackTreeMap::verify(self)
    }
}

impl<K, V> Default for RedBlackTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RedBlackTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for RedBlackTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RedBlackTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a RedBlackTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
