//! Owned tree node and balance bookkeeping
//!
//! A node owns its children outright: `Link = Option<Box<Node>>`.
//! Absence of a child is `None`, never a sentinel node.

use std::cmp;
use std::fmt;
use std::str::FromStr;

/// Owning handle to an optional subtree
pub type Link = Option<Box<Node>>;

/// How a node's balance factor is derived from its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub enum BalanceMode {
    /// `height(left) - height(right)` using cached true subtree heights.
    #[default]
    Height,

    /// `(left.balance + 1 | 0) - (right.balance + 1 | 0)`.
    ///
    /// Each child's stored factor stands in for its height. This only tracks
    /// the real height difference while every factor stays within ±1; a
    /// right-leaning chain, for instance, reads as height 0 and never
    /// triggers a rotation above it.
    Proxy,
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceMode::Height => f.write_str("height"),
            BalanceMode::Proxy => f.write_str("proxy"),
        }
    }
}

impl FromStr for BalanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height" => Ok(BalanceMode::Height),
            "proxy" => Ok(BalanceMode::Proxy),
            other => Err(format!("unknown balance mode '{other}' (expected 'height' or 'proxy')")),
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Search key
    pub key: i32,

    /// Balance factor, left-heavy positive
    pub balance: i32,

    /// Cached subtree height (a leaf is 1)
    pub height: u32,

    /// Left subtree (keys < `key`)
    pub left: Link,

    /// Right subtree (keys > `key`)
    pub right: Link,
}

impl Node {
    /// Fresh leaf: balance 0, no children
    pub fn leaf(key: i32) -> Self {
        Self {
            key,
            balance: 0,
            height: 1,
            left: None,
            right: None,
        }
    }

    /// Node with the given children; bookkeeping is refreshed under `mode`.
    pub fn with_children(key: i32, left: Link, right: Link, mode: BalanceMode) -> Self {
        let mut node = Self {
            key,
            balance: 0,
            height: 1,
            left,
            right,
        };
        node.refresh(mode);
        node
    }

    /// Check if leaf
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Borrow left child
    #[inline]
    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    /// Borrow right child
    #[inline]
    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// Recompute height and balance factor from the children's stored values.
    ///
    /// Children must already be up to date; callers refresh bottom-up.
    pub fn refresh(&mut self, mode: BalanceMode) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
        self.balance = match mode {
            BalanceMode::Height => height(&self.left) as i32 - height(&self.right) as i32,
            BalanceMode::Proxy => proxy_height(&self.left) - proxy_height(&self.right),
        };
    }

    /// Largest key in this subtree (rightmost node)
    pub fn max_key(&self) -> i32 {
        let mut node = self;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        node.key
    }
}

impl Drop for Node {
    // Unlink children onto a heap stack so dropping a long chain never recurses.
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

/// Cached height of a subtree, 0 when absent
#[inline]
pub fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

/// Approximate height read off the stored balance factor
#[inline]
pub fn proxy_height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |n| n.balance + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(node: Node) -> Link {
        Some(Box::new(node))
    }

    #[test]
    fn test_leaf_defaults() {
        let leaf = Node::leaf(7);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.balance, 0);
        assert_eq!(leaf.height, 1);
    }

    #[test]
    fn test_height_mode_uses_true_heights() {
        let chain = Node::with_children(
            20,
            None,
            boxed(Node::leaf(30)),
            BalanceMode::Height,
        );
        let root = Node::with_children(10, None, boxed(chain), BalanceMode::Height);
        assert_eq!(root.height, 3);
        assert_eq!(root.balance, -2);
    }

    #[test]
    fn test_proxy_mode_reads_child_factors() {
        // Right chain 10 -> 20 -> 30: node 20 has factor -1, so it reads as height 0.
        let chain = Node::with_children(20, None, boxed(Node::leaf(30)), BalanceMode::Proxy);
        assert_eq!(chain.balance, -1);
        let root = Node::with_children(10, None, boxed(chain), BalanceMode::Proxy);
        assert_eq!(root.balance, 0);
        assert_eq!(root.height, 3);
    }

    #[test]
    fn test_max_key_follows_right_spine() {
        let right = Node::with_children(9, boxed(Node::leaf(8)), None, BalanceMode::Height);
        let root = Node::with_children(5, boxed(Node::leaf(2)), boxed(right), BalanceMode::Height);
        assert_eq!(root.max_key(), 9);
        assert_eq!(root.left().map(Node::max_key), Some(2));
    }

    #[test]
    fn test_drop_long_chain() {
        let mut link: Link = None;
        for key in 0..200_000 {
            link = Some(Box::new(Node {
                key,
                balance: 0,
                height: 1,
                left: None,
                right: link,
            }));
        }
        drop(link);
    }

    #[test]
    fn test_balance_mode_parse() {
        assert_eq!("Height".parse::<BalanceMode>(), Ok(BalanceMode::Height));
        assert_eq!("proxy".parse::<BalanceMode>(), Ok(BalanceMode::Proxy));
        assert!("avl".parse::<BalanceMode>().is_err());
        assert_eq!(BalanceMode::Proxy.to_string(), "proxy");
    }
}
