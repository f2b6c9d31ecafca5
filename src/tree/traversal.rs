//! Borrowed depth-first traversals
//!
//! Explicit stacks, so iteration depth never touches the call stack.
//! Stack size is bounded by the tree height.

use super::node::Node;

/// Pre-order walk: node, left subtree, right subtree
#[derive(Debug)]
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> PreOrder<'a> {
    /// Start at `root`
    pub fn new(root: Option<&'a Node>) -> Self {
        Self {
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Right first so the left subtree is visited next.
        if let Some(right) = node.right() {
            self.stack.push(right);
        }
        if let Some(left) = node.left() {
            self.stack.push(left);
        }
        Some(node)
    }
}

/// In-order walk: ascending key order for a valid search tree
#[derive(Debug)]
pub struct InOrder<'a> {
    stack: Vec<&'a Node>,
    next: Option<&'a Node>,
}

impl<'a> InOrder<'a> {
    /// Start at `root`
    pub fn new(root: Option<&'a Node>) -> Self {
        Self {
            stack: Vec::new(),
            next: root,
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.next.take() {
            self.stack.push(node);
            self.next = node.left();
        }
        let node = self.stack.pop()?;
        self.next = node.right();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{BalanceMode, Link};

    fn leaf(key: i32) -> Link {
        Some(Box::new(Node::leaf(key)))
    }

    fn sample() -> Node {
        //      8
        //     / \
        //    4   9
        //   / \
        //  2   6
        let left = Node::with_children(4, leaf(2), leaf(6), BalanceMode::Height);
        Node::with_children(8, Some(Box::new(left)), leaf(9), BalanceMode::Height)
    }

    #[test]
    fn test_pre_order() {
        let root = sample();
        let keys: Vec<i32> = PreOrder::new(Some(&root)).map(|n| n.key).collect();
        assert_eq!(keys, vec![8, 4, 2, 6, 9]);
    }

    #[test]
    fn test_in_order() {
        let root = sample();
        let keys: Vec<i32> = InOrder::new(Some(&root)).map(|n| n.key).collect();
        assert_eq!(keys, vec![2, 4, 6, 8, 9]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(PreOrder::new(None).count(), 0);
        assert_eq!(InOrder::new(None).count(), 0);
    }
}
