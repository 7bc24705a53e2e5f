//! Descent trace: the path recorded while searching for a key.

/// Stack of node handles visited on the way from the root to either the node
/// holding a key or the prospective parent of an absent key.
///
/// The trace never owns nodes. It lives for a single insert and is consumed
/// top-down, nearest-to-the-insertion-point first.
#[derive(Debug)]
pub(crate) struct DescentTrace<H> {
    frames: Vec<H>,
}

impl<H: Copy> DescentTrace<H> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, handle: H) {
        self.frames.push(handle);
    }

    /// Most recently pushed handle, or `None` once the trace is exhausted.
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<H> {
        self.frames.pop()
    }

    /// Most recently pushed handle without removing it.
    #[inline]
    pub(crate) fn top(&self) -> Option<H> {
        self.frames.last().copied()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut trace = DescentTrace::with_capacity(4);
        assert!(trace.is_empty());
        trace.push(1u32);
        trace.push(2);
        trace.push(3);
        assert_eq!(trace.top(), Some(3));
        assert_eq!(trace.pop(), Some(3));
        assert_eq!(trace.pop(), Some(2));
        assert_eq!(trace.pop(), Some(1));
        assert!(trace.is_empty());
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut trace: DescentTrace<usize> = DescentTrace::with_capacity(0);
        assert_eq!(trace.pop(), None);
        assert_eq!(trace.top(), None);
    }
}
