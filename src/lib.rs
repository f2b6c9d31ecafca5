//! # Height-Balanced Binary Search Trees over Binary Streams
//!
//! This library maintains an AVL-style tree under a stream of insert and
//! delete operations, serializes it to a compact pre-order record stream,
//! and evaluates decoded trees against the BST ordering and height-balance
//! invariants.
//!
//! ## Pipeline
//!
//! 1. **Operation stream**: 5-byte `(i32 key, opcode)` records, `i`/`d`
//! 2. **Tree maintenance**: recursive insert/delete with bottom-up rotations
//! 3. **Tree stream**: pre-order `(i32 key, branch mask)` records
//! 4. **Evaluation**: range-narrowing BST check + height-balance check
//!
//! ## Usage Example
//!
//! ```
//! use hbtree::{build_tree, evaluate_bytes, HbtConfig};
//! use hbtree::ops::{encode_operations, OperationRecord};
//!
//! let config = HbtConfig::default();
//! let ops = encode_operations(&[
//!     OperationRecord::insert(10),
//!     OperationRecord::insert(20),
//!     OperationRecord::insert(30),
//! ]);
//! let tree = build_tree(ops.as_slice(), &config)?;
//! assert_eq!(tree.root().map(|n| n.key), Some(20));
//!
//! let report = evaluate_bytes(&tree.encode(), &config);
//! assert_eq!(report.machine_line(), "1,1,1");
//! # Ok::<(), hbtree::HbtError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod codec;    // Pre-order tree stream
pub mod ops;      // Operation stream
pub mod tree;     // Height-balanced tree and rotations
pub mod validate; // BST and balance checks

// Re-exports for convenience
pub use codec::{CodecError, Decoder};
pub use ops::{Operation, OperationReader, OperationRecord, OpsError};
pub use tree::{BalanceMode, HeightBalancedTree, Node};
pub use validate::{EvalStatus, Evaluation, KeyBounds, HBT_MAX, HBT_MIN};

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::{debug, warn};

/// Run-wide settings shared by the build and evaluate paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HbtConfig {
    /// How balance factors are derived and checked
    pub balance_mode: BalanceMode,

    /// Range seeded into the BST check
    pub key_bounds: KeyBounds,

    /// Maximum nesting accepted when decoding a tree stream, unlimited if `None`
    pub max_decode_depth: Option<usize>,

    /// Report pre-order keys after a build
    pub echo_keys: bool,
}

impl Default for HbtConfig {
    fn default() -> Self {
        Self {
            balance_mode: BalanceMode::default(),
            key_bounds: KeyBounds::default(),
            max_decode_depth: None,
            echo_keys: true,
        }
    }
}

impl HbtConfig {
    /// Reject settings no run could use
    pub fn validate(&self) -> Result<(), HbtError> {
        let KeyBounds { min, max } = self.key_bounds;
        if min > max {
            return Err(HbtError::InvalidKeyBounds { min, max });
        }
        if self.max_decode_depth == Some(0) {
            return Err(HbtError::InvalidDepthLimit);
        }
        Ok(())
    }

    /// Tree stream decoder matching this configuration
    pub fn decoder(&self) -> Decoder {
        let decoder = Decoder::new(self.balance_mode);
        match self.max_decode_depth {
            Some(limit) => decoder.with_max_depth(limit),
            None => decoder,
        }
    }
}

/// Errors that end a build or evaluation run
#[derive(Error, Debug)]
pub enum HbtError {
    /// Operation stream was malformed
    #[error("operation stream rejected: {0}")]
    Ops(#[from] OpsError),

    /// Tree stream was malformed
    #[error("tree stream rejected: {0}")]
    Codec(#[from] CodecError),

    /// Reading or writing failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Key range is empty
    #[error("invalid key bounds: min {min} > max {max}")]
    InvalidKeyBounds {
        /// Requested minimum
        min: i32,
        /// Requested maximum
        max: i32,
    },

    /// Decode depth limit of zero
    #[error("decode depth limit must be at least 1")]
    InvalidDepthLimit,
}

/// Apply an operation stream to an empty tree.
///
/// All-or-nothing: the first malformed record fails the run and the partial
/// tree is dropped.
pub fn build_tree<R: Read>(reader: R, config: &HbtConfig) -> Result<HeightBalancedTree, HbtError> {
    let mut tree = HeightBalancedTree::with_mode(config.balance_mode);
    let mut applied = 0usize;

    for record in OperationReader::new(reader) {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, applied, "operation stream rejected");
                return Err(err.into());
            }
        };
        tree.apply(record);
        applied += 1;
    }

    debug!(
        applied,
        nodes = tree.len(),
        height = tree.height(),
        "operation stream applied"
    );
    Ok(tree)
}

/// Write `tree` as a tree stream and flush
pub fn write_tree<W: Write>(tree: &HeightBalancedTree, mut writer: W) -> Result<(), HbtError> {
    codec::encode_to(tree, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Decode a tree stream from `reader` and evaluate it.
///
/// Malformed content yields [`EvalStatus::Malformed`]; only I/O failures
/// are errors.
pub fn evaluate_tree<R: Read>(mut reader: R, config: &HbtConfig) -> Result<Evaluation, HbtError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(evaluate_bytes(&bytes, config))
}

/// Decode and evaluate an in-memory tree stream
pub fn evaluate_bytes(bytes: &[u8], config: &HbtConfig) -> Evaluation {
    match config.decoder().decode(bytes) {
        Ok(tree) => {
            let evaluation = Evaluation::of_tree(&tree, config.key_bounds);
            debug!(
                nodes = tree.len(),
                height = tree.height(),
                is_bst = evaluation.is_bst,
                is_balanced = evaluation.is_balanced,
                "tree evaluated"
            );
            evaluation
        }
        Err(err) => {
            warn!(%err, "tree stream malformed");
            Evaluation::malformed()
        }
    }
}
