//! Height-balanced binary search tree
//!
//! Insertion and deletion descend recursively by key comparison, then
//! refresh balance factors bottom-up on the way back and rotate wherever a
//! node's factor leaves [-1, 1].
//!
//! Rebalancing tie-breaks differ between the two operations:
//! - insert picks single vs double rotation by comparing the new key with
//!   the heavy child's key
//! - delete picks it from the sign of the heavy child's balance factor

mod node;
mod rotation;
mod traversal;

pub use node::{height, proxy_height, BalanceMode, Link, Node};
pub use rotation::{rotate_left, rotate_right};
pub use traversal::{InOrder, PreOrder};

use std::cmp::Ordering;

use tracing::trace;

use crate::ops::{Operation, OperationRecord};
use crate::validate::{self, KeyBounds};

/// Single-owner height-balanced tree of `i32` keys
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeightBalancedTree {
    root: Link,
    len: usize,
    mode: BalanceMode,
}

impl HeightBalancedTree {
    /// Empty tree using [`BalanceMode::Height`]
    pub fn new() -> Self {
        Self::with_mode(BalanceMode::default())
    }

    /// Empty tree with an explicit balance mode
    pub fn with_mode(mode: BalanceMode) -> Self {
        Self {
            root: None,
            len: 0,
            mode,
        }
    }

    /// Adopt an already-built subtree, recomputing every balance factor.
    pub fn from_root(mut root: Link, mode: BalanceMode) -> Self {
        let len = refresh_all(&mut root, mode);
        Self { root, len, mode }
    }

    /// Balance mode in use
    pub fn mode(&self) -> BalanceMode {
        self.mode
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Release ownership of the node graph
    pub fn into_root(self) -> Link {
        self.root
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the tree has no root
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Search for `key`
    pub fn contains(&self, key: i32) -> bool {
        let mut cursor = self.root();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Insert `key`. Equal keys route right, so a repeated key is stored
    /// again rather than rejected.
    pub fn insert(&mut self, key: i32) {
        insert_at(&mut self.root, key, self.mode);
        self.len += 1;
    }

    /// Delete one node holding `key`. Returns `false` (and leaves the tree
    /// untouched) if the key is absent.
    pub fn delete(&mut self, key: i32) -> bool {
        let removed = delete_at(&mut self.root, key, self.mode);
        if removed {
            self.len -= 1;
        } else {
            trace!(key, "delete of absent key ignored");
        }
        removed
    }

    /// Apply a single decoded operation record
    pub fn apply(&mut self, record: OperationRecord) {
        match record.op {
            Operation::Insert => self.insert(record.key),
            Operation::Delete => {
                self.delete(record.key);
            }
        }
    }

    /// Recompute every node's bookkeeping bottom-up
    pub fn recompute_balances(&mut self) {
        self.len = refresh_all(&mut self.root, self.mode);
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Pre-order iterator over nodes
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder::new(self.root())
    }

    /// In-order iterator over nodes
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder::new(self.root())
    }

    /// Keys in ascending (in-order) sequence
    pub fn keys(&self) -> Vec<i32> {
        self.in_order().map(|n| n.key).collect()
    }

    /// Serialize to the pre-order tree stream
    pub fn encode(&self) -> Vec<u8> {
        crate::codec::encode(self)
    }

    /// BST range check over `bounds`
    pub fn check_bst(&self, bounds: KeyBounds) -> bool {
        validate::check_bst(self.root(), bounds)
    }

    /// Height-balance check under this tree's balance mode
    pub fn check_balance(&self) -> bool {
        validate::check_balance(self.root(), self.mode)
    }
}

impl Extend<i32> for HeightBalancedTree {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}

impl FromIterator<i32> for HeightBalancedTree {
    fn from_iter<I: IntoIterator<Item = i32>>(keys: I) -> Self {
        let mut tree = Self::new();
        tree.extend(keys);
        tree
    }
}

fn refresh_all(link: &mut Link, mode: BalanceMode) -> usize {
    let Some(root) = link.take() else {
        return 0;
    };

    // Detach every node in pre-order, remembering which children it had.
    let mut detached: Vec<(Box<Node>, bool, bool)> = Vec::new();
    let mut pending = vec![root];
    while let Some(mut node) = pending.pop() {
        let left = node.left.take();
        let right = node.right.take();
        let (has_left, has_right) = (left.is_some(), right.is_some());
        pending.extend(right);
        pending.extend(left);
        detached.push((node, has_left, has_right));
    }
    let count = detached.len();

    // Reverse pre-order finishes both subtrees before their parent; the left
    // subtree's root sits on top of the right's.
    let mut built: Vec<Box<Node>> = Vec::new();
    for (mut node, has_left, has_right) in detached.into_iter().rev() {
        if has_left {
            node.left = built.pop();
        }
        if has_right {
            node.right = built.pop();
        }
        node.refresh(mode);
        built.push(node);
    }
    *link = built.pop();
    count
}

fn insert_at(slot: &mut Link, key: i32, mode: BalanceMode) {
    let Some(node) = slot.as_mut() else {
        *slot = Some(Box::new(Node::leaf(key)));
        return;
    };

    if key < node.key {
        insert_at(&mut node.left, key, mode);
    } else {
        insert_at(&mut node.right, key, mode);
    }
    node.refresh(mode);

    if node.balance > 1 {
        // New key landed in left.right (or matched left.key and routed right).
        let inner = node.left.as_ref().is_some_and(|left| key >= left.key);
        if inner {
            rotate_left_refreshed(&mut node.left, mode);
        }
        rotate_right_refreshed(slot, mode);
    } else if node.balance < -1 {
        // Ties were routed right, so an equal key counts as the outer case.
        let inner = node.right.as_ref().is_some_and(|right| key < right.key);
        if inner {
            rotate_right_refreshed(&mut node.right, mode);
        }
        rotate_left_refreshed(slot, mode);
    }
}

fn delete_at(slot: &mut Link, key: i32, mode: BalanceMode) -> bool {
    let Some(node) = slot.as_mut() else {
        return false;
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => delete_at(&mut node.left, key, mode),
        Ordering::Greater => delete_at(&mut node.right, key, mode),
        Ordering::Equal => match node.left.as_deref().map(Node::max_key) {
            Some(predecessor) if node.right.is_some() => {
                node.key = predecessor;
                delete_at(&mut node.left, predecessor, mode)
            }
            _ => {
                // At most one child: splice it into our slot. The child
                // subtree is already balanced; ancestors rebalance.
                let child = if node.left.is_some() {
                    node.left.take()
                } else {
                    node.right.take()
                };
                *slot = child;
                return true;
            }
        },
    };
    if !removed {
        return false;
    }

    node.refresh(mode);
    if node.balance > 1 {
        let single = node.left.as_ref().is_some_and(|left| left.balance >= 0);
        if !single {
            rotate_left_refreshed(&mut node.left, mode);
        }
        rotate_right_refreshed(slot, mode);
    } else if node.balance < -1 {
        let single = node.right.as_ref().is_some_and(|right| right.balance <= 0);
        if !single {
            rotate_right_refreshed(&mut node.right, mode);
        }
        rotate_left_refreshed(slot, mode);
    }
    true
}

fn rotate_right_refreshed(slot: &mut Link, mode: BalanceMode) {
    if !rotate_right(slot) {
        return;
    }
    if let Some(root) = slot.as_mut() {
        if let Some(demoted) = root.right.as_mut() {
            demoted.refresh(mode);
        }
        root.refresh(mode);
        trace!(root = root.key, "rotated right");
    }
}

fn rotate_left_refreshed(slot: &mut Link, mode: BalanceMode) {
    if !rotate_left(slot) {
        return;
    }
    if let Some(root) = slot.as_mut() {
        if let Some(demoted) = root.left.as_mut() {
            demoted.refresh(mode);
        }
        root.refresh(mode);
        trace!(root = root.key, "rotated left");
    }
}
