//! Unbalanced binary search tree map, the baseline the balanced engines are
//! measured against. Sorted input degrades it to a linked list.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, TreeError};
use crate::iter::{InOrder, Keys, Traverse};
use crate::OrderedMap;

#[derive(Clone)]
pub struct BasicNode<K, V> {
    key: K,
    value: V,
    left: Option<Box<BasicNode<K, V>>>,
    right: Option<Box<BasicNode<K, V>>>,
}

/// An ordered map on a plain binary search tree, with no rebalancing.
#[derive(Clone)]
pub struct BasicBstMap<K, V> {
    root: Option<Box<BasicNode<K, V>>>,
    len: usize,
}

pub type Iter<'a, K, V> = InOrder<'a, &'a BasicBstMap<K, V>>;

impl<K, V> BasicBstMap<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height in nodes, computed with an explicit stack so a degenerate tree
    /// cannot overflow the call stack.
    pub fn height(&self) -> usize {
        let mut stack: Vec<(&BasicNode<K, V>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }
        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        InOrder::new(self)
    }

    pub fn keys(&self) -> Keys<'_, &Self> {
        Keys::new(self)
    }
}

impl<K: Ord, V> BasicBstMap<K, V> {
    /// The node holding `key`, if any.
    fn find<Q>(&self, key: &Q) -> Option<&BasicNode<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Some(std::mem::replace(&mut node.value, value)),
            };
        }
        *slot = Some(Box::new(BasicNode {
            key,
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &node.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Only key order and the cached length can be wrong here. Walks with an
    /// explicit stack, carrying each node's exclusive key bounds.
    pub fn verify(&self) -> Result<()> {
        type Frame<'a, K, V> = (&'a BasicNode<K, V>, usize, Option<&'a K>, Option<&'a K>);

        let mut stack: Vec<Frame<'_, K, V>> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 0, None, None));
        }
        let mut count = 0usize;
        while let Some((node, depth, lower, upper)) = stack.pop() {
            if lower.is_some_and(|lo| *lo >= node.key) || upper.is_some_and(|hi| *hi <= node.key) {
                return Err(TreeError::OutOfOrder { depth });
            }
            count += 1;
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1, lower, Some(&node.key)));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1, Some(&node.key), upper));
            }
        }
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

impl<'a, K, V> Traverse<'a> for &'a BasicBstMap<K, V> {
    type Handle = &'a BasicNode<K, V>;
    type Key = K;
    type Value = V;

    #[inline]
    fn root(self) -> Option<Self::Handle> {
        self.root.as_deref()
    }

    #[inline]
    fn left(self, node: Self::Handle) -> Option<Self::Handle> {
        node.left.as_deref()
    }

    #[inline]
    fn right(self, node: Self::Handle) -> Option<Self::Handle> {
        node.right.as_deref()
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

impl<K: Ord, V> OrderedMap<K, V> for BasicBstMap<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BasicBstMap::insert(self, key, value)
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BasicBstMap::get(self, key)
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        BasicBstMap::contains_key(self, key)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a,
    {
        BasicBstMap::keys(self)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        BasicBstMap::height(self)
    }

    fn verify(&self) -> Result<()> {
        BasicBstMap::verify(self)
    }
}

impl<K, V> Default for BasicBstMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for BasicBstMap<K, V> {
    // Unlink iteratively; the default recursive drop overflows on a
    // degenerate tree.
    fn drop(&mut self) {
        let mut stack: Vec<Box<BasicNode<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BasicBstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for BasicBstMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BasicBstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a BasicBstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
