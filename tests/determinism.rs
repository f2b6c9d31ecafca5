use std::collections::HashSet;

use blake3::hash;
use hbtree::ops::{encode_operations, OperationRecord};
use hbtree::{build_tree, HbtConfig};

#[test]
fn tree_stream_is_deterministic() {
    let mut records = Vec::new();
    for key in 0..500i32 {
        records.push(OperationRecord::insert((key * 7919) % 1009));
        if key % 3 == 0 {
            records.push(OperationRecord::delete((key * 31) % 1009));
        }
    }
    let ops = encode_operations(&records);

    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let tree = build_tree(ops.as_slice(), &HbtConfig::default()).expect("ops apply");
        fingerprints.insert(hash(&tree.encode()));
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}
