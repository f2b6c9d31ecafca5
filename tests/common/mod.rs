#![allow(dead_code)]

use hbtree::ops::{encode_operations, OperationRecord};
use hbtree::{HeightBalancedTree, Node};

/// Tree stream from `(key, mask)` records
pub fn tree_stream(records: &[(i32, u8)]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * 5);
    for &(key, mask) in records {
        bytes.extend_from_slice(&key.to_le_bytes());
        bytes.push(mask);
    }
    bytes
}

/// Operation stream from `(key, opcode)` pairs; opcodes outside `i`/`d` are
/// written verbatim so malformed streams can be built too.
pub fn ops_stream(ops: &[(i32, char)]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ops.len() * 5);
    for &(key, code) in ops {
        bytes.extend_from_slice(&key.to_le_bytes());
        bytes.push(code as u8);
    }
    bytes
}

/// Operation stream of inserts in the given order
pub fn inserts(keys: &[i32]) -> Vec<u8> {
    let records: Vec<_> = keys.iter().copied().map(OperationRecord::insert).collect();
    encode_operations(&records)
}

/// True height of a subtree
pub fn true_height(node: Option<&Node>) -> u32 {
    node.map_or(0, |n| 1 + true_height(n.left()).max(true_height(n.right())))
}

/// Every node's stored factor matches the real height difference and stays within ±1.
pub fn assert_avl(tree: &HeightBalancedTree) {
    for node in tree.pre_order() {
        let expected = true_height(node.left()) as i32 - true_height(node.right()) as i32;
        assert_eq!(node.balance, expected, "stale balance factor at key {}", node.key);
        assert!(
            node.balance.abs() <= 1,
            "node {} out of balance: {}",
            node.key,
            node.balance
        );
    }
}

/// Pre-order keys
pub fn pre_order_keys(tree: &HeightBalancedTree) -> Vec<i32> {
    tree.pre_order().map(|n| n.key).collect()
}
