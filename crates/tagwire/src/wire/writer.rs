// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write-side protocol port.

use super::{WireFormat, WireType};
use crate::error::Result;
use crate::types::{FieldDescriptor, StructLayout};

/// Write side of a tagged protocol.
///
/// The descriptor engine drives this port field by field; implementations
/// own the byte layout. Field metadata is passed on framing calls so that
/// self-describing protocols can embed names and modifiers; binary
/// protocols are free to ignore it.
pub trait FieldWriter {
    /// Identity of the concrete format produced by this writer.
    fn format(&self) -> WireFormat;

    fn write_struct_begin(&mut self, layout: &StructLayout) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;

    fn write_field_begin(
        &mut self,
        wire_type: WireType,
        id: u16,
        field: &FieldDescriptor,
    ) -> Result<()>;

    /// Records that an optional field equal to its default was elided.
    /// Most binary protocols emit nothing.
    fn write_field_omitted(
        &mut self,
        wire_type: WireType,
        id: u16,
        field: &FieldDescriptor,
    ) -> Result<()>;

    fn write_field_end(&mut self) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_u8(&mut self, value: u8) -> Result<()>;
    fn write_u16(&mut self, value: u16) -> Result<()>;
    fn write_u32(&mut self, value: u32) -> Result<()>;
    fn write_u64(&mut self, value: u64) -> Result<()>;
    fn write_i8(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_f32(&mut self, value: f32) -> Result<()>;
    fn write_f64(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_wstring(&mut self, value: &str) -> Result<()>;

    /// Splices a struct value previously captured by
    /// [`FieldReader::read_raw_struct`](super::FieldReader::read_raw_struct)
    /// from a reader of the same format. The bytes include the terminating
    /// stop marker.
    fn write_raw_struct(&mut self, bytes: &[u8]) -> Result<()>;
}
