// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-side protocol port.

use super::{FieldTag, WireFormat, WireType};
use crate::error::Result;

/// Outcome of asking the port for the next field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRead {
    /// A field follows; the cursor is positioned at its encoded value.
    Field(FieldTag),
    /// End-of-struct sentinel.
    End,
}

/// Read side of a tagged protocol.
///
/// Deserialization is tag-driven: the engine repeatedly calls
/// [`read_field_begin`](Self::read_field_begin) and dispatches on the
/// reported tag. Unknown fields are discarded through
/// [`skip`](Self::skip) without being interpreted.
pub trait FieldReader {
    /// Identity of the concrete format consumed by this reader.
    fn format(&self) -> WireFormat;

    fn read_field_begin(&mut self) -> Result<FieldRead>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_u8(&mut self) -> Result<u8>;
    fn read_u16(&mut self) -> Result<u16>;
    fn read_u32(&mut self) -> Result<u32>;
    fn read_u64(&mut self) -> Result<u64>;
    fn read_i8(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_f64(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_wstring(&mut self) -> Result<String>;

    /// Discards one encoded value of the given wire type.
    fn skip(&mut self, wire_type: WireType) -> Result<()>;

    /// Captures one encoded struct value verbatim, including its stop
    /// marker, advancing the cursor past it. Feeds the deferred-value
    /// wrapper without decoding.
    fn read_raw_struct(&mut self) -> Result<Vec<u8>>;
}
