// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for serialization, deserialization and schema construction.

use crate::wire::WireType;
use std::fmt;

/// Errors raised by the descriptor engine and the wire ports.
///
/// All errors abort the current (de)serialize call; nothing is retried and
/// partial writes already flushed to the port are not rolled back here.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A value violates a structural constraint of its declared type
    /// (e.g. a non-nullable type handed an absent value).
    InvalidData(String),
    /// The wire tag read for a field cannot be coerced into the field's
    /// declared type.
    FieldTypeMismatch {
        field: String,
        expected: WireType,
        actual: WireType,
    },
    /// End of struct reached without observing a required field.
    RequiredFieldMissing { struct_name: String, field: String },
    /// A struct definition violates a schema invariant (duplicate ordinal,
    /// default value not assignable to the declared type, ...).
    SchemaError(String),
    /// The port ran out of bytes mid-value.
    BufferTooSmall { need: usize, have: usize },
    /// The port read a wire-type byte outside the known tag set.
    UnknownWireType(u8),
    /// A string value on the wire is not valid UTF-8/UTF-16.
    InvalidEncoding(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Self::FieldTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' cannot be read from wire type {} (declared {})",
                field, actual, expected
            ),
            Self::RequiredFieldMissing { struct_name, field } => write!(
                f,
                "required field '{}' of struct '{}' missing from payload",
                field, struct_name
            ),
            Self::SchemaError(msg) => write!(f, "schema error: {}", msg),
            Self::BufferTooSmall { need, have } => {
                write!(f, "buffer too small: need {} bytes, have {}", need, have)
            }
            Self::UnknownWireType(raw) => write!(f, "unknown wire type {:#04x}", raw),
            Self::InvalidEncoding(msg) => write!(f, "invalid string encoding: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::InvalidEncoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
