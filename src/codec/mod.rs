//! Pre-order tree stream
//!
//! Each node is a little-endian `i32` key followed by a branch mask byte:
//! bit 1 (`0b10`) means a left subtree follows, bit 0 (`0b01`) means a
//! right subtree follows after the left one. A mask of 0 is a leaf. The
//! node count is implicit in the mask bits; there is no length prefix or
//! end marker.
//!
//! Only keys and topology are persisted. Decoded trees get their balance
//! factors recomputed bottom-up before they are handed out.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::tree::{BalanceMode, HeightBalancedTree, Node};

/// Size of one node record in bytes
pub const NODE_RECORD_LEN: usize = 5;

/// Error type returned by tree stream decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input ended inside a record or before a promised subtree.
    #[error("truncated node record at byte offset {offset}")]
    Truncated {
        /// Offset where the missing record should start.
        offset: usize,
    },

    /// Mask byte had bits outside `0b11`.
    #[error("invalid branch mask {mask:#04x} at byte offset {offset}")]
    InvalidMask {
        /// Offending mask.
        mask: u8,
        /// Offset of the mask byte.
        offset: usize,
    },

    /// Bytes remained after the root's subtree was complete.
    #[error("unexpected trailing bytes at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unconsumed byte.
        offset: usize,
    },

    /// Nesting exceeded a caller-imposed depth limit.
    #[error("tree depth exceeds limit of {limit}")]
    TooDeep {
        /// Depth limit in effect.
        limit: usize,
    },

    /// Underlying reader failed.
    #[error("failed to read tree stream: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// True for errors caused by the stream's content rather than I/O
    pub fn is_format_error(&self) -> bool {
        !matches!(self, CodecError::Io(_))
    }
}

/// Child-presence flags stored after each key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchMask(u8);

impl BranchMask {
    /// Left subtree follows
    pub const LEFT: u8 = 0b10;
    /// Right subtree follows
    pub const RIGHT: u8 = 0b01;

    /// Mask describing `node`'s children
    pub fn of(node: &Node) -> Self {
        let mut bits = 0;
        if node.left.is_some() {
            bits |= Self::LEFT;
        }
        if node.right.is_some() {
            bits |= Self::RIGHT;
        }
        Self(bits)
    }

    /// Validate a raw mask byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        (byte & !(Self::LEFT | Self::RIGHT) == 0).then_some(Self(byte))
    }

    /// Raw byte
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Left subtree present
    #[inline]
    pub fn has_left(self) -> bool {
        self.0 & Self::LEFT != 0
    }

    /// Right subtree present
    #[inline]
    pub fn has_right(self) -> bool {
        self.0 & Self::RIGHT != 0
    }
}

/// Encode `tree` into a new buffer
pub fn encode(tree: &HeightBalancedTree) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tree.len() * NODE_RECORD_LEN);
    for node in tree.pre_order() {
        push_record(&mut buf, node);
    }
    buf
}

/// Encode `tree` into `writer`
pub fn encode_to<W: Write>(tree: &HeightBalancedTree, writer: &mut W) -> io::Result<()> {
    let mut record = Vec::with_capacity(NODE_RECORD_LEN);
    for node in tree.pre_order() {
        record.clear();
        push_record(&mut record, node);
        writer.write_all(&record)?;
    }
    Ok(())
}

fn push_record(buf: &mut Vec<u8>, node: &Node) {
    buf.extend_from_slice(&node.key.to_le_bytes());
    buf.push(BranchMask::of(node).bits());
}

/// Decode with the default balance mode and no depth limit
pub fn decode(bytes: &[u8]) -> Result<HeightBalancedTree, CodecError> {
    Decoder::default().decode(bytes)
}

/// Tree stream decoder.
///
/// Decoding keeps pending ancestors on a heap stack, so any well-formed
/// stream decodes regardless of depth unless a limit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    mode: BalanceMode,
    max_depth: Option<usize>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(BalanceMode::default())
    }
}

impl Decoder {
    /// Decoder producing trees in `mode`
    pub fn new(mode: BalanceMode) -> Self {
        Self {
            mode,
            max_depth: None,
        }
    }

    /// Reject streams nested deeper than `max_depth` (root is depth 1)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Decode a complete stream. Empty input is the empty tree.
    pub fn decode(&self, bytes: &[u8]) -> Result<HeightBalancedTree, CodecError> {
        if bytes.is_empty() {
            return Ok(HeightBalancedTree::with_mode(self.mode));
        }

        let mut cursor = Cursor { bytes, pos: 0 };
        let root = self.decode_root(&mut cursor)?;
        if cursor.pos != bytes.len() {
            return Err(CodecError::TrailingBytes { offset: cursor.pos });
        }
        Ok(HeightBalancedTree::from_root(Some(root), self.mode))
    }

    /// Read `reader` to the end and decode
    pub fn decode_from<R: Read>(&self, reader: &mut R) -> Result<HeightBalancedTree, CodecError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    fn decode_root(&self, cursor: &mut Cursor<'_>) -> Result<Box<Node>, CodecError> {
        // Ancestors whose subtrees are still being read, innermost last.
        let mut open: Vec<OpenNode> = Vec::new();

        'records: loop {
            if let Some(limit) = self.max_depth {
                if open.len() >= limit {
                    return Err(CodecError::TooDeep { limit });
                }
            }
            let (key, mask) = cursor.record()?;
            let node = Box::new(Node::leaf(key));
            if mask.has_left() || mask.has_right() {
                open.push(OpenNode {
                    node,
                    awaiting_left: mask.has_left(),
                    has_right: mask.has_right(),
                });
                continue;
            }

            // A finished subtree: attach it and close every ancestor it completes.
            let mut done = node;
            while let Some(mut parent) = open.pop() {
                if parent.awaiting_left {
                    parent.node.left = Some(done);
                    parent.awaiting_left = false;
                    if parent.has_right {
                        open.push(parent);
                        continue 'records;
                    }
                } else {
                    parent.node.right = Some(done);
                }
                done = parent.node;
            }
            return Ok(done);
        }
    }
}

struct OpenNode {
    node: Box<Node>,
    awaiting_left: bool,
    has_right: bool,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn record(&mut self) -> Result<(i32, BranchMask), CodecError> {
        let start = self.pos;
        let Some(chunk) = self.bytes.get(start..start + NODE_RECORD_LEN) else {
            return Err(CodecError::Truncated { offset: start });
        };
        let key = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let mask = BranchMask::from_byte(chunk[4]).ok_or(CodecError::InvalidMask {
            mask: chunk[4],
            offset: start + 4,
        })?;
        self.pos += NODE_RECORD_LEN;
        Ok((key, mask))
    }
}
