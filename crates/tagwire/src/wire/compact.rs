// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compact little-endian tagged codec.
//!
//! Reference implementation of the [`FieldWriter`]/[`FieldReader`] ports.
//! Layout: each field is `wire_type:u8, id:u16le, value`; a struct value is
//! its field sequence terminated by a single stop byte. Strings are
//! `len:u32le` followed by UTF-8 bytes; wstrings are `units:u32le` followed
//! by UTF-16LE code units. Omitted fields occupy no bytes at all.

use super::{FieldRead, FieldReader, FieldTag, FieldWriter, WireFormat, WireType};
use crate::error::{Error, Result};
use crate::types::{FieldDescriptor, StructLayout};

/// Growable-buffer writer for the compact format.
#[derive(Debug, Default)]
pub struct CompactWriter {
    buf: Vec<u8>,
}

impl CompactWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl FieldWriter for CompactWriter {
    fn format(&self) -> WireFormat {
        WireFormat::Compact
    }

    fn write_struct_begin(&mut self, _layout: &StructLayout) -> Result<()> {
        // no struct header; the stop byte alone delimits the value
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        self.buf.push(WireType::Stop.as_u8());
        Ok(())
    }

    fn write_field_begin(
        &mut self,
        wire_type: WireType,
        id: u16,
        _field: &FieldDescriptor,
    ) -> Result<()> {
        self.buf.push(wire_type.as_u8());
        self.buf.extend_from_slice(&id.to_le_bytes());
        Ok(())
    }

    fn write_field_omitted(
        &mut self,
        _wire_type: WireType,
        _id: u16,
        _field: &FieldDescriptor,
    ) -> Result<()> {
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.buf.push(u8::from(value));
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.push(value);
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.buf.push(value as u8);
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.buf
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn write_wstring(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.buf
            .extend_from_slice(&(units.len() as u32).to_le_bytes());
        for unit in units {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
        Ok(())
    }

    fn write_raw_struct(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Borrowed-buffer reader for the compact format.
#[derive(Debug)]
pub struct CompactReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> CompactReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.offset + count > self.buf.len() {
            return Err(Error::BufferTooSmall {
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buf[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}

impl FieldReader for CompactReader<'_> {
    fn format(&self) -> WireFormat {
        WireFormat::Compact
    }

    fn read_field_begin(&mut self) -> Result<FieldRead> {
        let raw = self.read_bytes(1)?[0];
        let wire_type = WireType::from_u8(raw)?;
        if wire_type == WireType::Stop {
            return Ok(FieldRead::End);
        }
        let id = u16::from_le_bytes(self.read_array::<2>()?);
        Ok(FieldRead::Field(FieldTag::new(wire_type, id)))
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bytes(1)?[0] != 0)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_bytes(1)?[0] as i8)
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array::<2>()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn read_wstring(&mut self) -> Result<String> {
        let units = self.read_u32()? as usize;
        let mut chars = Vec::with_capacity(units);
        for _ in 0..units {
            chars.push(u16::from_le_bytes(self.read_array::<2>()?));
        }
        String::from_utf16(&chars).map_err(|e| Error::InvalidEncoding(e.to_string()))
    }

    fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Stop => Err(Error::InvalidData("stop tag has no value to skip".into())),
            WireType::Bool | WireType::UInt8 | WireType::Int8 => {
                self.read_bytes(1)?;
                Ok(())
            }
            WireType::UInt16 | WireType::Int16 => {
                self.read_bytes(2)?;
                Ok(())
            }
            WireType::UInt32 | WireType::Int32 | WireType::Float => {
                self.read_bytes(4)?;
                Ok(())
            }
            WireType::UInt64 | WireType::Int64 | WireType::Double => {
                self.read_bytes(8)?;
                Ok(())
            }
            WireType::String => {
                let len = self.read_u32()? as usize;
                self.read_bytes(len)?;
                Ok(())
            }
            WireType::WString => {
                let units = self.read_u32()? as usize;
                self.read_bytes(units * 2)?;
                Ok(())
            }
            WireType::Struct => loop {
                match self.read_field_begin()? {
                    FieldRead::End => return Ok(()),
                    FieldRead::Field(tag) => self.skip(tag.wire_type)?,
                }
            },
        }
    }

    fn read_raw_struct(&mut self) -> Result<Vec<u8>> {
        let start = self.offset;
        self.skip(WireType::Struct)?;
        Ok(self.buf[start..self.offset].to_vec())
    }
}
