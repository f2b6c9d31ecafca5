//! Operation stream
//!
//! Fixed 5-byte records: a little-endian `i32` key followed by one opcode
//! byte, `b'i'` (insert) or `b'd'` (delete). There is no header and no
//! terminator; the stream ends at end of input.

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

/// Size of one encoded record in bytes
pub const RECORD_LEN: usize = 5;

/// Error type returned while reading an operation stream.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Opcode byte was neither `i` nor `d`.
    #[error("invalid operation code {code:#04x} at byte offset {offset}")]
    InvalidOpCode {
        /// Offending byte.
        code: u8,
        /// Offset of the record that carried it.
        offset: u64,
    },

    /// Input ended partway through a record.
    #[error("truncated operation record at byte offset {offset}")]
    Truncated {
        /// Offset of the incomplete record.
        offset: u64,
    },

    /// Underlying reader failed.
    #[error("failed to read operation stream: {0}")]
    Io(#[from] io::Error),
}

/// Tree mutation requested by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Insert the key
    Insert,
    /// Delete the key (no-op if absent)
    Delete,
}

impl Operation {
    /// Opcode byte on the wire
    pub const fn code(self) -> u8 {
        match self {
            Operation::Insert => b'i',
            Operation::Delete => b'd',
        }
    }

    /// Parse an opcode byte
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'i' => Some(Operation::Insert),
            b'd' => Some(Operation::Delete),
            _ => None,
        }
    }
}

/// One `(key, op)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct OperationRecord {
    /// Key operated on
    pub key: i32,
    /// Operation to perform
    pub op: Operation,
}

impl OperationRecord {
    /// Insert record
    pub fn insert(key: i32) -> Self {
        Self {
            key,
            op: Operation::Insert,
        }
    }

    /// Delete record
    pub fn delete(key: i32) -> Self {
        Self {
            key,
            op: Operation::Delete,
        }
    }

    /// Wire encoding
    pub fn to_bytes(self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4] = self.op.code();
        buf
    }
}

/// Streaming decoder over a byte source.
///
/// Yields records until clean end of input. After the first error the
/// reader is fused and yields `None`.
#[derive(Debug)]
pub struct OperationReader<R> {
    inner: R,
    offset: u64,
    done: bool,
}

impl<R: Read> OperationReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> Result<Option<OperationRecord>, OpsError> {
        let mut buf = [0u8; RECORD_LEN];
        let filled = read_full(&mut self.inner, &mut buf)?;
        let offset = self.offset;
        match filled {
            0 => return Ok(None),
            RECORD_LEN => {}
            _ => return Err(OpsError::Truncated { offset }),
        }
        self.offset += RECORD_LEN as u64;

        let key = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let op = Operation::from_code(buf[4])
            .ok_or(OpsError::InvalidOpCode { code: buf[4], offset })?;
        Ok(Some(OperationRecord { key, op }))
    }
}

impl<R: Read> Iterator for OperationReader<R> {
    type Item = Result<OperationRecord, OpsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_record().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Write records in wire format
pub fn write_operations<'a, W, I>(writer: &mut W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a OperationRecord>,
{
    for record in records {
        writer.write_all(&record.to_bytes())?;
    }
    Ok(())
}

/// Encode records into a fresh buffer
pub fn encode_operations(records: &[OperationRecord]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(records.len() * RECORD_LEN);
    for record in records {
        buf.extend_from_slice(&record.to_bytes());
    }
    buf
}

/// Fill `buf` as far as the reader allows; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let bytes = OperationRecord::insert(-2).to_bytes();
        assert_eq!(bytes, [0xfe, 0xff, 0xff, 0xff, b'i']);
        assert_eq!(OperationRecord::delete(258).to_bytes(), [2, 1, 0, 0, b'd']);
    }

    #[test]
    fn test_reader_yields_records() {
        let records = [
            OperationRecord::insert(5),
            OperationRecord::insert(3),
            OperationRecord::delete(3),
        ];
        let bytes = encode_operations(&records);
        let decoded: Vec<_> = OperationReader::new(bytes.as_slice())
            .collect::<Result<_, _>>()
            .expect("stream decodes");
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_invalid_opcode_stops_stream() {
        let mut bytes = encode_operations(&[OperationRecord::insert(1)]);
        bytes.extend_from_slice(&[7, 0, 0, 0, b'x']);
        bytes.extend_from_slice(&OperationRecord::insert(2).to_bytes());

        let mut reader = OperationReader::new(bytes.as_slice());
        assert!(matches!(reader.next(), Some(Ok(_))));
        assert!(matches!(
            reader.next(),
            Some(Err(OpsError::InvalidOpCode { code: b'x', offset: 5 }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_record() {
        let mut bytes = encode_operations(&[OperationRecord::insert(1)]);
        bytes.extend_from_slice(&[1, 2]);
        let result: Result<Vec<_>, _> = OperationReader::new(bytes.as_slice()).collect();
        assert!(matches!(result, Err(OpsError::Truncated { offset: 5 })));
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(OperationReader::new(&[0u8; 0][..]).count(), 0);
    }

    #[test]
    fn test_write_operations_matches_encode() {
        let records = vec![OperationRecord::insert(9), OperationRecord::delete(9)];
        let mut out = Vec::new();
        write_operations(&mut out, &records).expect("write to vec");
        assert_eq!(out, encode_operations(&records));
    }
}
