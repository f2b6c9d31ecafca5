//! Structural validators and evaluation reporting
//!
//! Two independent checks over a borrowed node graph:
//! - BST: range check, bounds narrowed by one at each step
//! - balance: per-node height comparison under a [`BalanceMode`]
//!
//! Both walk with heap stacks, so a degenerate chain of any length is
//! checked without recursion.

use std::fmt;

use crate::tree::{proxy_height, BalanceMode, HeightBalancedTree, Node, PreOrder};

/// Smallest key the range check accepts by default
pub const HBT_MIN: i32 = -268_435_456;

/// Largest key the range check accepts by default
pub const HBT_MAX: i32 = 268_435_455;

/// Inclusive key range seeded into the BST check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyBounds {
    /// Lowest admissible key
    pub min: i32,
    /// Highest admissible key
    pub max: i32,
}

impl Default for KeyBounds {
    fn default() -> Self {
        Self {
            min: HBT_MIN,
            max: HBT_MAX,
        }
    }
}

impl KeyBounds {
    /// Bounds `[min, max]`; `None` if the range is empty.
    pub fn new(min: i32, max: i32) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Full `i32` range
    pub fn unbounded() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
        }
    }
}

/// BST ordering check.
///
/// Every key must lie in `bounds`; a left child is checked against
/// `[min, key - 1]` and a right child against `[key + 1, max]`, so equal
/// keys anywhere on a path fail. The empty tree passes.
pub fn check_bst(root: Option<&Node>, bounds: KeyBounds) -> bool {
    let mut stack: Vec<(&Node, i64, i64)> = Vec::new();
    stack.extend(root.map(|n| (n, i64::from(bounds.min), i64::from(bounds.max))));

    while let Some((node, min, max)) = stack.pop() {
        let key = i64::from(node.key);
        if key < min || key > max {
            return false;
        }
        stack.extend(node.right().map(|n| (n, key + 1, max)));
        stack.extend(node.left().map(|n| (n, min, key - 1)));
    }
    true
}

/// Height-balance check.
///
/// Under [`BalanceMode::Proxy`] each child's height is read off its stored
/// balance factor (`balance + 1`, or 0 if absent), so the result is only
/// meaningful once factors have been computed in that mode. Under
/// [`BalanceMode::Height`] true subtree heights are measured directly.
pub fn check_balance(root: Option<&Node>, mode: BalanceMode) -> bool {
    match mode {
        BalanceMode::Proxy => proxy_balanced(root),
        BalanceMode::Height => heights_balanced(root),
    }
}

fn proxy_balanced(root: Option<&Node>) -> bool {
    PreOrder::new(root).all(|node| (proxy_height(&node.left) - proxy_height(&node.right)).abs() <= 1)
}

/// Measure true heights bottom-up; false as soon as any node is off by more than one.
fn heights_balanced(root: Option<&Node>) -> bool {
    let nodes: Vec<&Node> = PreOrder::new(root).collect();

    // Reverse pre-order: the left subtree's height is on top of the right's.
    let mut heights: Vec<u32> = Vec::new();
    for node in nodes.into_iter().rev() {
        let left = if node.left.is_some() { heights.pop().unwrap_or(0) } else { 0 };
        let right = if node.right.is_some() { heights.pop().unwrap_or(0) } else { 0 };
        if left.abs_diff(right) > 1 {
            return false;
        }
        heights.push(1 + left.max(right));
    }
    true
}

/// Outcome of reading the tree input, first field of the report line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalStatus {
    /// Input could not be opened
    Unreadable,
    /// Input was read but is not a well-formed tree stream
    Malformed,
    /// Tree decoded successfully
    Valid,
}

impl EvalStatus {
    /// Numeric code in the report line
    pub fn code(self) -> i32 {
        match self {
            EvalStatus::Unreadable => -1,
            EvalStatus::Malformed => 0,
            EvalStatus::Valid => 1,
        }
    }
}

/// Evaluation of one tree input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Whether the input decoded
    pub status: EvalStatus,
    /// BST check result (false unless decoded)
    pub is_bst: bool,
    /// Balance check result (false unless decoded)
    pub is_balanced: bool,
}

impl Evaluation {
    /// Run both checks on a decoded tree
    pub fn of_tree(tree: &HeightBalancedTree, bounds: KeyBounds) -> Self {
        Self {
            status: EvalStatus::Valid,
            is_bst: tree.check_bst(bounds),
            is_balanced: tree.check_balance(),
        }
    }

    /// Input was not a well-formed stream
    pub fn malformed() -> Self {
        Self::failed(EvalStatus::Malformed)
    }

    /// Input could not be opened
    pub fn unreadable() -> Self {
        Self::failed(EvalStatus::Unreadable)
    }

    fn failed(status: EvalStatus) -> Self {
        Self {
            status,
            is_bst: false,
            is_balanced: false,
        }
    }

    /// Machine-readable `<status>,<isBST>,<isBalanced>` line
    pub fn machine_line(&self) -> String {
        format!(
            "{},{},{}",
            self.status.code(),
            u8::from(self.is_bst),
            u8::from(self.is_balanced)
        )
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "Is BST: {}", yes_no(self.is_bst))?;
        write!(f, "Is Height-Balanced: {}", yes_no(self.is_balanced))
    }
}
