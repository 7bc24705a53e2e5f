//! In-order traversal shared by every engine.
//!
//! The iterator keeps the left spine of the next node on an explicit stack:
//! the top of the stack is always the next node to yield. Popping a node
//! pushes the left spine of its right child, so each node is pushed and popped
//! exactly once over a full traversal.

use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Read-only view of a binary search tree, addressed through node handles.
///
/// Arena-backed trees hand out indices; boxed trees hand out references.
pub trait Traverse<'a>: Copy {
    type Handle: Copy;
    type Key: 'a;
    type Value: 'a;

    fn root(self) -> Option<Self::Handle>;
    fn left(self, node: Self::Handle) -> Option<Self::Handle>;
    fn right(self, node: Self::Handle) -> Option<Self::Handle>;
    fn entry(self, node: Self::Handle) -> (&'a Self::Key, &'a Self::Value);
    /// Number of nodes reachable from the root.
    fn len(self) -> usize;
}

/// Ascending `(key, value)` iterator over any [`Traverse`] view.
pub struct InOrder<'a, T: Traverse<'a>> {
    view: T,
    stack: Vec<T::Handle>,
    remaining: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, T: Traverse<'a>> InOrder<'a, T> {
    pub(crate) fn new(view: T) -> Self {
        let mut iter = Self {
            view,
            stack: Vec::new(),
            remaining: view.len(),
            _marker: PhantomData,
        };
        iter.push_left_spine(view.root());
        iter
    }

    fn push_left_spine(&mut self, mut cursor: Option<T::Handle>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = self.view.left(node);
        }
    }
}

impl<'a, T: Traverse<'a>> Clone for InOrder<'a, T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view,
            stack: self.stack.clone(),
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: Traverse<'a>> Iterator for InOrder<'a, T> {
    type Item = (&'a T::Key, &'a T::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(self.view.right(node));
        self.remaining = self.remaining.saturating_sub(1);
        Some(self.view.entry(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Traverse<'a>> ExactSizeIterator for InOrder<'a, T> {}

impl<'a, T: Traverse<'a>> FusedIterator for InOrder<'a, T> {}

/// Ascending key iterator; the `iterate()` of the map contract.
pub struct Keys<'a, T: Traverse<'a>> {
    inner: InOrder<'a, T>,
}

impl<'a, T: Traverse<'a>> Keys<'a, T> {
    pub(crate) fn new(view: T) -> Self {
        Self {
            inner: InOrder::new(view),
        }
    }
}

impl<'a, T: Traverse<'a>> Clone for Keys<'a, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T: Traverse<'a>> Iterator for Keys<'a, T> {
    type Item = &'a T::Key;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Traverse<'a>> ExactSizeIterator for Keys<'a, T> {}

impl<'a, T: Traverse<'a>> FusedIterator for Keys<'a, T> {}
