//! Detached node handles
//!
//! A [`NodeHandle`] owns a single element removed from a container. It is
//! either empty or holds exactly one element, and is not part of any sorted
//! sequence until reinserted. On a rejected reinsertion (duplicate key in a
//! unique container) the handle keeps its element, so the caller never loses
//! ownership of the rejected data.

use std::fmt;

/// A detached, independently owned container element.
pub struct NodeHandle<T> {
    element: Option<T>,
}

impl<T> NodeHandle<T> {
    /// Creates an empty handle
    pub fn empty() -> Self {
        NodeHandle { element: None }
    }

    /// Creates a handle owning `element`
    pub fn new(element: T) -> Self {
        NodeHandle {
            element: Some(element),
        }
    }

    /// True when the handle holds no element
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element.is_none()
    }

    /// Borrows the held element, if any
    pub fn as_ref(&self) -> Option<&T> {
        self.element.as_ref()
    }

    /// Mutably borrows the held element, if any
    pub fn as_mut(&mut self) -> Option<&mut T> {
        self.element.as_mut()
    }

    /// Takes the element out, leaving the handle empty
    pub fn take(&mut self) -> Option<T> {
        self.element.take()
    }

    /// Consumes the handle, yielding the element if any
    pub fn into_inner(self) -> Option<T> {
        self.element
    }
}

impl<T> Default for NodeHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Option<T>> for NodeHandle<T> {
    fn from(element: Option<T>) -> Self {
        NodeHandle { element }
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(e) => f.debug_tuple("NodeHandle").field(e).finish(),
            None => f.write_str("NodeHandle(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_populated() {
        let empty: NodeHandle<i32> = NodeHandle::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.into_inner(), None);

        let mut node = NodeHandle::new((2, "three"));
        assert!(!node.is_empty());
        assert_eq!(node.as_ref(), Some(&(2, "three")));
        assert_eq!(node.take(), Some((2, "three")));
        assert!(node.is_empty());
    }
}
