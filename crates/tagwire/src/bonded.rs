// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deferred struct values.
//!
//! A [`Bonded`] wraps a struct value that is either fully materialized or
//! still sitting in its encoded form together with the format that produced
//! it. Materialization is a one-way transition: once resolved, the raw form
//! is discarded and repeated calls return the cached value. Re-serializing
//! a deferred value into a writer of the same format splices the captured
//! bytes verbatim; a differing format forces a transcode through a
//! temporary decode.

use crate::error::Result;
use crate::ser::{deserialize_struct, serialize_struct, DeserializeContext, SerializeContext};
use crate::types::StructLayout;
use crate::value::StructValue;
use crate::wire::{CompactReader, WireFormat};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Resolved(StructValue),
    Deferred { bytes: Vec<u8>, format: WireFormat },
}

/// A struct value with deferred materialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Bonded {
    layout: Arc<StructLayout>,
    repr: Repr,
}

impl Bonded {
    /// Wraps an already-materialized struct value.
    pub fn from_value(value: StructValue) -> Self {
        let layout = Arc::clone(value.layout());
        Self {
            layout,
            repr: Repr::Resolved(value),
        }
    }

    /// Wraps an encoded struct value captured from a reader of `format`.
    /// The bytes must span exactly one struct value including its stop
    /// marker; ownership transfers to the wrapper.
    pub fn from_encoded(layout: &Arc<StructLayout>, bytes: Vec<u8>, format: WireFormat) -> Self {
        Self {
            layout: Arc::clone(layout),
            repr: Repr::Deferred { bytes, format },
        }
    }

    /// Captures the struct value at the reader's cursor without decoding.
    pub(crate) fn capture(
        layout: &Arc<StructLayout>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Self> {
        let format = ctx.reader.format();
        let bytes = ctx.reader.read_raw_struct()?;
        Ok(Self::from_encoded(layout, bytes, format))
    }

    /// Layout of the wrapped struct type.
    pub fn layout(&self) -> &Arc<StructLayout> {
        &self.layout
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.repr, Repr::Resolved(_))
    }

    /// The resolved value, when already materialized.
    pub fn value(&self) -> Option<&StructValue> {
        match &self.repr {
            Repr::Resolved(value) => Some(value),
            Repr::Deferred { .. } => None,
        }
    }

    /// Forces deserialization into the wrapped struct type.
    ///
    /// Idempotent: the first call decodes and caches, later calls return
    /// the same resolved value; the deferred form is dropped on transition
    /// and cannot be re-entered.
    pub fn materialize(&mut self) -> Result<&StructValue> {
        if let Repr::Deferred { bytes, format } = &self.repr {
            log::debug!(
                "[bonded] materializing '{}' from {} bytes ({})",
                self.layout.qualified_name(),
                bytes.len(),
                format
            );
            let value = decode(&self.layout, bytes, *format)?;
            self.repr = Repr::Resolved(value);
        }
        match &self.repr {
            Repr::Resolved(value) => Ok(value),
            Repr::Deferred { .. } => unreachable!("deferred repr survived materialization"),
        }
    }

    /// Writes the wrapped struct value into `ctx`.
    ///
    /// A deferred value whose format matches the writer takes the verbatim
    /// splice fast path; anything else serializes a decoded value.
    pub fn serialize_value(&self, ctx: &mut SerializeContext<'_>) -> Result<()> {
        match &self.repr {
            Repr::Resolved(value) => serialize_struct(value, ctx),
            Repr::Deferred { bytes, format } if *format == ctx.writer.format() => {
                ctx.writer.write_raw_struct(bytes)
            }
            Repr::Deferred { bytes, format } => {
                // target format differs: transcode without touching self
                let value = decode(&self.layout, bytes, *format)?;
                serialize_struct(&value, ctx)
            }
        }
    }
}

fn decode(layout: &Arc<StructLayout>, bytes: &[u8], format: WireFormat) -> Result<StructValue> {
    match format {
        WireFormat::Compact => {
            let mut reader = CompactReader::new(bytes);
            let mut ctx = DeserializeContext::new(&mut reader);
            deserialize_struct(layout, &mut ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::encode_struct;
    use crate::types::{PrimitiveKind, StructBuilder};
    use crate::value::Value;
    use crate::wire::{CompactWriter, FieldWriter};

    fn sample() -> (Arc<StructLayout>, StructValue, Vec<u8>) {
        let layout = StructBuilder::new("bonded_tests.Sample")
            .field(1, "n", PrimitiveKind::I32)
            .field(2, "s", PrimitiveKind::String)
            .build()
            .unwrap();
        let mut value = StructValue::new(&layout);
        value.set("n", 17).unwrap();
        value.set("s", "deferred").unwrap();
        let bytes = encode_struct(&value).unwrap();
        (layout, value, bytes)
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let (layout, expected, bytes) = sample();
        let mut bonded = Bonded::from_encoded(&layout, bytes, WireFormat::Compact);
        assert!(!bonded.is_resolved());

        let first = bonded.materialize().unwrap().clone();
        assert_eq!(first, expected);
        assert!(bonded.is_resolved());

        let second = bonded.materialize().unwrap().clone();
        assert_eq!(second, first);
        assert_eq!(bonded.value(), Some(&expected));
    }

    #[test]
    fn test_same_format_pass_through_is_verbatim() {
        let (layout, _, bytes) = sample();
        let bonded = Bonded::from_encoded(&layout, bytes.clone(), WireFormat::Compact);

        let mut writer = CompactWriter::new();
        let mut ctx = SerializeContext::new(&mut writer);
        bonded.serialize_value(&mut ctx).unwrap();
        assert_eq!(writer.as_bytes(), &bytes[..]);
    }

    #[test]
    fn test_resolved_wrapper_serializes_value() {
        let (_, value, bytes) = sample();
        let bonded = Bonded::from_value(value);
        assert!(bonded.is_resolved());

        let mut writer = CompactWriter::new();
        let mut ctx = SerializeContext::new(&mut writer);
        bonded.serialize_value(&mut ctx).unwrap();
        assert_eq!(writer.as_bytes(), &bytes[..]);
    }

    #[test]
    fn test_deferred_decode_failure_stays_deferred() {
        let layout = StructBuilder::new("bonded_tests.Broken")
            .required_field(1, "r", PrimitiveKind::I32)
            .build()
            .unwrap();
        // an encoding that omits the required field
        let mut w = CompactWriter::new();
        w.write_struct_end().unwrap();
        let mut bonded = Bonded::from_encoded(&layout, w.into_bytes(), WireFormat::Compact);

        assert!(bonded.materialize().is_err());
        assert!(!bonded.is_resolved());
        // a second attempt reports the same failure rather than panicking
        assert!(bonded.materialize().is_err());
    }

    #[test]
    fn test_default_bonded_value_is_resolved_default() {
        let (layout, _, _) = sample();
        let bonded = Bonded::from_value(StructValue::new(&layout));
        assert_eq!(
            bonded.value().and_then(|v| v.get("n")),
            Some(&Value::I32(0))
        );
    }
}
