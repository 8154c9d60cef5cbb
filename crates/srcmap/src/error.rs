//! Error types for encoding and decoding source maps

use crate::position::Position;
use thiserror::Error;

/// Errors that can occur while decoding a Revision-Three document
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not valid JSON or misses required fields
    #[error("Malformed source map document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported source map version {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u64 },

    #[error("Invalid base64 digit {digit:?} at byte {offset}")]
    InvalidBase64Digit { digit: char, offset: usize },

    /// The last digit of a value still had its continuation bit set
    #[error("Unterminated VLQ value at byte {offset}")]
    UnterminatedVlq { offset: usize },

    #[error("VLQ value at byte {offset} does not fit in 64 bits")]
    VlqOverflow { offset: usize },

    #[error("Segment on generated line {line} has {fields} fields (expected 1, 4 or 5)")]
    InvalidSegment { line: usize, fields: usize },

    #[error("Source index {index} out of range ({len} sources)")]
    SourceIndexOutOfRange { index: i64, len: usize },

    #[error("Name index {index} out of range ({len} names)")]
    NameIndexOutOfRange { index: i64, len: usize },

    /// A decoded absolute value is negative or too large for its field
    #[error("Decoded {field} value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: i64 },

    #[error("Unsupported version {found} of extension field '{field}' (expected {expected})")]
    UnsupportedExtensionVersion {
        field: &'static str,
        found: u64,
        expected: u64,
    },

    #[error("Malformed extension field '{field}': {message}")]
    MalformedExtension {
        field: &'static str,
        message: String,
    },

    #[error("Caller index {index} out of range ({len} callers)")]
    CallerIndexOutOfRange { index: i64, len: usize },

    #[error("Caller {index} is part of a parent cycle")]
    CallerCycle { index: usize },

    #[error("Extension field '{field}' has {found} entries, map has {expected}")]
    EntryCountMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
}

/// Errors that can occur while encoding a mapping
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to serialize source map document: {0}")]
    Json(#[from] serde_json::Error),

    /// Generated positions need a line and column of at least 1
    #[error("Entry {index} has invalid generated position {position}")]
    InvalidGenerated { index: usize, position: Position },
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
