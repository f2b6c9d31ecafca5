//! Rotation primitives
//!
//! Both rotations re-root the subtree held in `slot` by moving ownership of
//! boxed children; keys are never copied. They do not touch balance factors:
//! the caller refreshes the demoted node and then the new root.

use super::node::Link;

/// Clockwise rotation: `slot.left` becomes the subtree root.
///
/// ```text
///       n            l
///      / \          / \
///     l   c   =>   a   n
///    / \              / \
///   a   b            b   c
/// ```
///
/// Returns `false` and leaves `slot` untouched if there is no left child.
pub fn rotate_right(slot: &mut Link) -> bool {
    let Some(mut root) = slot.take() else {
        return false;
    };
    let Some(mut pivot) = root.left.take() else {
        *slot = Some(root);
        return false;
    };
    root.left = pivot.right.take();
    pivot.right = Some(root);
    *slot = Some(pivot);
    true
}

/// Counter-clockwise rotation: `slot.right` becomes the subtree root.
///
/// Returns `false` and leaves `slot` untouched if there is no right child.
pub fn rotate_left(slot: &mut Link) -> bool {
    let Some(mut root) = slot.take() else {
        return false;
    };
    let Some(mut pivot) = root.right.take() else {
        *slot = Some(root);
        return false;
    };
    root.right = pivot.left.take();
    pivot.left = Some(root);
    *slot = Some(pivot);
    true
}
