// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven serialization engine.
//!
//! Implements the four per-type entry points (`serialize_value`,
//! `deserialize_value`, `serialize_field`, `deserialize_field`) plus the
//! struct field loop. Writing walks the declared field order; reading is
//! tag-driven and tolerates unknown fields by skipping them.

use crate::bonded::Bonded;
use crate::error::{Error, Result};
use crate::types::{
    FieldDescriptor, FieldModifier, PrimitiveKind, StructLayout, TypeDescriptor, TypeKind,
};
use crate::value::{StructValue, Value};
use crate::wire::{
    CompactReader, CompactWriter, FieldRead, FieldReader, FieldTag, FieldWriter, WireType,
};
use std::sync::Arc;

/// Runtime state of one serialization pass. Not shareable across threads;
/// each concurrent pass needs its own context over its own writer.
pub struct SerializeContext<'a> {
    pub writer: &'a mut dyn FieldWriter,
}

impl<'a> SerializeContext<'a> {
    pub fn new(writer: &'a mut dyn FieldWriter) -> Self {
        Self { writer }
    }
}

/// Runtime state of one tagged deserialization pass.
pub struct DeserializeContext<'a> {
    pub reader: &'a mut dyn FieldReader,
}

impl<'a> DeserializeContext<'a> {
    pub fn new(reader: &'a mut dyn FieldReader) -> Self {
        Self { reader }
    }
}

impl TypeDescriptor {
    /// Writes `value` with no field framing. Fails with an invalid-data
    /// error when the value does not inhabit this type.
    pub fn serialize_value(&self, ctx: &mut SerializeContext<'_>, value: &Value) -> Result<()> {
        self.verify_non_nullable(value)?;
        match self.kind() {
            TypeKind::Primitive(kind) => write_primitive(ctx.writer, *kind, value),
            TypeKind::Struct(layout) => {
                let sv = expect_struct(layout, value)?;
                serialize_struct(sv, ctx)
            }
            TypeKind::Bonded(layout) => {
                let bonded = expect_bonded(layout, value)?;
                bonded.serialize_value(ctx)
            }
        }
    }

    /// Reads a value assuming the cursor sits at its encoding (no framing).
    pub fn deserialize_value(&self, ctx: &mut DeserializeContext<'_>) -> Result<Value> {
        match self.kind() {
            TypeKind::Primitive(kind) => read_primitive(ctx.reader, *kind),
            TypeKind::Struct(layout) => Ok(Value::Struct(deserialize_struct(layout, ctx)?)),
            TypeKind::Bonded(layout) => Ok(Value::Bonded(Bonded::capture(layout, ctx)?)),
        }
    }

    /// Writes the framed field: tag plus value, or an omission marker when
    /// an optional field equals its declared default. Presence-tracked
    /// fields write nothing at all while absent and are never omitted
    /// while present.
    pub fn serialize_field(
        &self,
        ctx: &mut SerializeContext<'_>,
        value: &Value,
        field: &FieldDescriptor,
    ) -> Result<()> {
        if field.presence && value.is_nothing() {
            return Ok(());
        }
        let omittable = matches!(self.kind(), TypeKind::Primitive(_));
        if omittable
            && !field.presence
            && field.modifier == FieldModifier::Optional
            && *value == field.default
        {
            return ctx
                .writer
                .write_field_omitted(self.wire_type(), field.id, field);
        }
        ctx.writer
            .write_field_begin(self.wire_type(), field.id, field)?;
        self.serialize_value(ctx, value)?;
        ctx.writer.write_field_end()
    }

    /// Reads the field whose wire tag the port just reported, applying the
    /// read-side widening policy. Fails with a field-type-incompatible
    /// error when no coercion applies.
    pub fn deserialize_field(
        &self,
        ctx: &mut DeserializeContext<'_>,
        field: &FieldDescriptor,
        tag: FieldTag,
    ) -> Result<Value> {
        match self.kind() {
            TypeKind::Primitive(kind) => read_coerced(ctx.reader, *kind, tag, field),
            TypeKind::Struct(layout) => {
                expect_struct_tag(tag, field)?;
                Ok(Value::Struct(deserialize_struct(layout, ctx)?))
            }
            TypeKind::Bonded(layout) => {
                expect_struct_tag(tag, field)?;
                Ok(Value::Bonded(Bonded::capture(layout, ctx)?))
            }
        }
    }
}

/// Serializes a struct value: begin marker, every field in declaration
/// order (base-chain fields first), end marker.
pub fn serialize_struct(value: &StructValue, ctx: &mut SerializeContext<'_>) -> Result<()> {
    let layout = value.layout();
    ctx.writer.write_struct_begin(layout)?;
    for (idx, field) in layout.fields().iter().enumerate() {
        field
            .field_type
            .serialize_field(ctx, value.slot(idx), field)?;
    }
    ctx.writer.write_struct_end()
}

/// Tag-driven struct deserialization.
///
/// Unknown ordinals are skipped without interpretation (forward
/// compatibility); unobserved optional fields keep their declared default;
/// an unobserved required field is an error naming struct and field.
pub fn deserialize_struct(
    layout: &Arc<StructLayout>,
    ctx: &mut DeserializeContext<'_>,
) -> Result<StructValue> {
    let mut value = StructValue::new(layout);
    let mut seen = vec![false; layout.fields().len()];

    loop {
        match ctx.reader.read_field_begin()? {
            FieldRead::End => break,
            FieldRead::Field(tag) => match layout.field_by_id(tag.id) {
                Some((idx, field)) => {
                    *value.slot_mut(idx) = field.field_type.deserialize_field(ctx, field, tag)?;
                    seen[idx] = true;
                }
                None => {
                    log::trace!(
                        "[ser] skipping unknown field {} while reading '{}'",
                        tag,
                        layout.qualified_name()
                    );
                    ctx.reader.skip(tag.wire_type)?;
                }
            },
        }
    }

    for (idx, field) in layout.fields().iter().enumerate() {
        if field.modifier == FieldModifier::Required && !seen[idx] {
            return Err(Error::RequiredFieldMissing {
                struct_name: layout.qualified_name().to_string(),
                field: field.name.clone(),
            });
        }
    }
    Ok(value)
}

/// Encodes a struct value with the built-in compact codec.
pub fn encode_struct(value: &StructValue) -> Result<Vec<u8>> {
    let mut writer = CompactWriter::new();
    let mut ctx = SerializeContext::new(&mut writer);
    serialize_struct(value, &mut ctx)?;
    Ok(writer.into_bytes())
}

/// Decodes a compact-encoded struct value against its layout.
pub fn decode_struct(layout: &Arc<StructLayout>, bytes: &[u8]) -> Result<StructValue> {
    let mut reader = CompactReader::new(bytes);
    let mut ctx = DeserializeContext::new(&mut reader);
    deserialize_struct(layout, &mut ctx)
}

fn expect_struct<'v>(layout: &Arc<StructLayout>, value: &'v Value) -> Result<&'v StructValue> {
    match value.as_struct() {
        Some(sv) if sv.layout().identity() == layout.identity() => Ok(sv),
        Some(sv) => Err(Error::InvalidData(format!(
            "expected struct '{}', got '{}'",
            layout.qualified_name(),
            sv.layout().qualified_name()
        ))),
        None => Err(Error::InvalidData(format!(
            "expected struct '{}', got {} value",
            layout.qualified_name(),
            value.kind_name()
        ))),
    }
}

fn expect_bonded<'v>(layout: &Arc<StructLayout>, value: &'v Value) -> Result<&'v Bonded> {
    match value.as_bonded() {
        Some(b) if b.layout().identity() == layout.identity() => Ok(b),
        Some(b) => Err(Error::InvalidData(format!(
            "expected bonded<{}>, got bonded<{}>",
            layout.qualified_name(),
            b.layout().qualified_name()
        ))),
        None => Err(Error::InvalidData(format!(
            "expected bonded<{}>, got {} value",
            layout.qualified_name(),
            value.kind_name()
        ))),
    }
}

/// A deferred or nested struct field is legal only under a struct tag.
fn expect_struct_tag(tag: FieldTag, field: &FieldDescriptor) -> Result<()> {
    if tag.wire_type != WireType::Struct {
        return Err(Error::FieldTypeMismatch {
            field: field.label(),
            expected: WireType::Struct,
            actual: tag.wire_type,
        });
    }
    Ok(())
}

fn write_primitive(writer: &mut dyn FieldWriter, kind: PrimitiveKind, value: &Value) -> Result<()> {
    use PrimitiveKind as P;
    match (kind, value) {
        (P::Bool, Value::Bool(v)) => writer.write_bool(*v),
        (P::U8, Value::U8(v)) => writer.write_u8(*v),
        (P::U16, Value::U16(v)) => writer.write_u16(*v),
        (P::U32, Value::U32(v)) => writer.write_u32(*v),
        (P::U64, Value::U64(v)) => writer.write_u64(*v),
        (P::I8, Value::I8(v)) => writer.write_i8(*v),
        (P::I16, Value::I16(v)) => writer.write_i16(*v),
        (P::I32, Value::I32(v)) => writer.write_i32(*v),
        (P::I64, Value::I64(v)) => writer.write_i64(*v),
        (P::F32, Value::F32(v)) => writer.write_f32(*v),
        (P::F64, Value::F64(v)) => writer.write_f64(*v),
        (P::String, Value::String(v)) => writer.write_string(v),
        (P::WString, Value::WString(v)) => writer.write_wstring(v),
        (kind, value) => Err(Error::InvalidData(format!(
            "cannot serialize {} value as {}",
            value.kind_name(),
            kind.schema_name()
        ))),
    }
}

fn read_primitive(reader: &mut dyn FieldReader, kind: PrimitiveKind) -> Result<Value> {
    use PrimitiveKind as P;
    Ok(match kind {
        P::Bool => Value::Bool(reader.read_bool()?),
        P::U8 => Value::U8(reader.read_u8()?),
        P::U16 => Value::U16(reader.read_u16()?),
        P::U32 => Value::U32(reader.read_u32()?),
        P::U64 => Value::U64(reader.read_u64()?),
        P::I8 => Value::I8(reader.read_i8()?),
        P::I16 => Value::I16(reader.read_i16()?),
        P::I32 => Value::I32(reader.read_i32()?),
        P::I64 => Value::I64(reader.read_i64()?),
        P::F32 => Value::F32(reader.read_f32()?),
        P::F64 => Value::F64(reader.read_f64()?),
        P::String => Value::String(reader.read_string()?),
        P::WString => Value::WString(reader.read_wstring()?),
    })
}

/// Read-side widening policy.
///
/// An integer field of width W accepts any encoding of width <= W with the
/// same signedness (sign/zero-extended); a float field accepts a narrower
/// float encoding. Cross-signedness and cross-family coercions are
/// rejected.
fn read_coerced(
    reader: &mut dyn FieldReader,
    declared: PrimitiveKind,
    tag: FieldTag,
    field: &FieldDescriptor,
) -> Result<Value> {
    use PrimitiveKind as P;
    use WireType as W;
    let value = match (declared, tag.wire_type) {
        (P::Bool, W::Bool) => Value::Bool(reader.read_bool()?),

        (P::U8, W::UInt8) => Value::U8(reader.read_u8()?),
        (P::U16, W::UInt16) => Value::U16(reader.read_u16()?),
        (P::U16, W::UInt8) => Value::U16(u16::from(reader.read_u8()?)),
        (P::U32, W::UInt32) => Value::U32(reader.read_u32()?),
        (P::U32, W::UInt16) => Value::U32(u32::from(reader.read_u16()?)),
        (P::U32, W::UInt8) => Value::U32(u32::from(reader.read_u8()?)),
        (P::U64, W::UInt64) => Value::U64(reader.read_u64()?),
        (P::U64, W::UInt32) => Value::U64(u64::from(reader.read_u32()?)),
        (P::U64, W::UInt16) => Value::U64(u64::from(reader.read_u16()?)),
        (P::U64, W::UInt8) => Value::U64(u64::from(reader.read_u8()?)),

        (P::I8, W::Int8) => Value::I8(reader.read_i8()?),
        (P::I16, W::Int16) => Value::I16(reader.read_i16()?),
        (P::I16, W::Int8) => Value::I16(i16::from(reader.read_i8()?)),
        (P::I32, W::Int32) => Value::I32(reader.read_i32()?),
        (P::I32, W::Int16) => Value::I32(i32::from(reader.read_i16()?)),
        (P::I32, W::Int8) => Value::I32(i32::from(reader.read_i8()?)),
        (P::I64, W::Int64) => Value::I64(reader.read_i64()?),
        (P::I64, W::Int32) => Value::I64(i64::from(reader.read_i32()?)),
        (P::I64, W::Int16) => Value::I64(i64::from(reader.read_i16()?)),
        (P::I64, W::Int8) => Value::I64(i64::from(reader.read_i8()?)),

        (P::F32, W::Float) => Value::F32(reader.read_f32()?),
        (P::F64, W::Double) => Value::F64(reader.read_f64()?),
        (P::F64, W::Float) => Value::F64(f64::from(reader.read_f32()?)),

        (P::String, W::String) => Value::String(reader.read_string()?),
        (P::WString, W::WString) => Value::WString(reader.read_wstring()?),

        _ => {
            return Err(Error::FieldTypeMismatch {
                field: field.label(),
                expected: declared.wire_type(),
                actual: tag.wire_type,
            })
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{registry, StructBuilder};

    fn single_field(name: &str, kind: PrimitiveKind) -> Arc<StructLayout> {
        StructBuilder::new(format!("ser_tests.{}", name))
            .field(1, "v", kind)
            .build()
            .unwrap()
    }

    /// Hand-encodes one field with an arbitrary wire tag, then a stop byte.
    fn encode_one_field(tag: FieldTag, write: impl FnOnce(&mut CompactWriter)) -> Vec<u8> {
        let field = single_field("Scratch", PrimitiveKind::I32).fields()[0].clone();
        let mut w = CompactWriter::new();
        w.write_field_begin(tag.wire_type, tag.id, &field).unwrap();
        write(&mut w);
        w.write_field_end().unwrap();
        w.write_struct_end().unwrap();
        w.into_bytes()
    }

    #[test]
    fn test_primitive_value_round_trip() {
        let cases = vec![
            (PrimitiveKind::Bool, Value::Bool(true)),
            (PrimitiveKind::U8, Value::U8(200)),
            (PrimitiveKind::U16, Value::U16(65000)),
            (PrimitiveKind::U32, Value::U32(4_000_000_000)),
            (PrimitiveKind::U64, Value::U64(u64::MAX)),
            (PrimitiveKind::I8, Value::I8(-100)),
            (PrimitiveKind::I16, Value::I16(-30000)),
            (PrimitiveKind::I32, Value::I32(i32::MIN)),
            (PrimitiveKind::I64, Value::I64(i64::MAX)),
            (PrimitiveKind::F32, Value::F32(1.25)),
            (PrimitiveKind::F64, Value::F64(-2.5e300)),
            (PrimitiveKind::String, Value::String("round trip".into())),
            (PrimitiveKind::WString, Value::WString("ラウンド".into())),
        ];
        for (kind, value) in cases {
            let desc = registry::primitive(kind);
            let mut writer = CompactWriter::new();
            let mut ctx = SerializeContext::new(&mut writer);
            desc.serialize_value(&mut ctx, &value).unwrap();
            let bytes = writer.into_bytes();

            let mut reader = CompactReader::new(&bytes);
            let mut ctx = DeserializeContext::new(&mut reader);
            let back = desc.deserialize_value(&mut ctx).unwrap();
            assert_eq!(back, value, "kind {:?}", kind);
        }
    }

    #[test]
    fn test_value_kind_mismatch_is_invalid_data() {
        let desc = registry::primitive(PrimitiveKind::I32);
        let mut writer = CompactWriter::new();
        let mut ctx = SerializeContext::new(&mut writer);
        let err = ctx_err(desc.serialize_value(&mut ctx, &Value::Bool(true)));
        assert!(matches!(err, Error::InvalidData(_)));

        let err = ctx_err(desc.serialize_value(&mut ctx, &Value::Nothing));
        assert!(matches!(err, Error::InvalidData(_)));
    }

    fn ctx_err<T>(r: Result<T>) -> Error {
        r.err().expect("expected an error")
    }

    #[test]
    fn test_widening_sign_extension() {
        // -3 encoded as int8, read into an int32 field
        let layout = single_field("Wide32", PrimitiveKind::I32);
        let bytes = encode_one_field(FieldTag::new(WireType::Int8, 1), |w| {
            w.write_i8(-3).unwrap();
        });
        let value = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(value.get("v"), Some(&Value::I32(-3)));

        // 16 -> 64
        let layout = single_field("Wide64", PrimitiveKind::I64);
        let bytes = encode_one_field(FieldTag::new(WireType::Int16, 1), |w| {
            w.write_i16(-1234).unwrap();
        });
        let value = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(value.get("v"), Some(&Value::I64(-1234)));
    }

    #[test]
    fn test_widening_zero_extension() {
        let layout = single_field("WideU", PrimitiveKind::U64);
        let bytes = encode_one_field(FieldTag::new(WireType::UInt8, 1), |w| {
            w.write_u8(0xFF).unwrap();
        });
        let value = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(value.get("v"), Some(&Value::U64(255)));
    }

    #[test]
    fn test_float_widening() {
        let layout = single_field("WideF", PrimitiveKind::F64);
        let bytes = encode_one_field(FieldTag::new(WireType::Float, 1), |w| {
            w.write_f32(0.5).unwrap();
        });
        let value = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(value.get("v"), Some(&Value::F64(0.5)));
    }

    #[test]
    fn test_narrowing_rejected() {
        let layout = single_field("Narrow", PrimitiveKind::I8);
        let bytes = encode_one_field(FieldTag::new(WireType::Int32, 1), |w| {
            w.write_i32(7).unwrap();
        });
        let err = decode_struct(&layout, &bytes).unwrap_err();
        assert_eq!(
            err,
            Error::FieldTypeMismatch {
                field: "v (id 1)".into(),
                expected: WireType::Int8,
                actual: WireType::Int32,
            }
        );
    }

    #[test]
    fn test_cross_signedness_rejected() {
        let layout = single_field("CrossSign", PrimitiveKind::I32);
        let bytes = encode_one_field(FieldTag::new(WireType::UInt8, 1), |w| {
            w.write_u8(7).unwrap();
        });
        assert!(matches!(
            decode_struct(&layout, &bytes),
            Err(Error::FieldTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_family_rejected() {
        let layout = single_field("CrossFam", PrimitiveKind::Bool);
        let bytes = encode_one_field(FieldTag::new(WireType::Int32, 1), |w| {
            w.write_i32(1).unwrap();
        });
        assert!(matches!(
            decode_struct(&layout, &bytes),
            Err(Error::FieldTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_optional_default_is_omitted() {
        let layout = StructBuilder::new("ser_tests.Omit")
            .field(1, "kept", PrimitiveKind::I32)
            .with_default(5)
            .build()
            .unwrap();
        let value = StructValue::new(&layout);

        // value equals default: only the stop byte lands on the wire
        let bytes = encode_struct(&value).unwrap();
        assert_eq!(bytes, vec![WireType::Stop.as_u8()]);

        let back = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(back.get("kept"), Some(&Value::I32(5)));
    }

    #[test]
    fn test_required_field_always_written() {
        let layout = StructBuilder::new("ser_tests.ReqWrite")
            .required_field(1, "r", PrimitiveKind::I32)
            .build()
            .unwrap();
        let value = StructValue::new(&layout);
        let bytes = encode_struct(&value).unwrap();
        // tag (3 bytes) + int32 (4 bytes) + stop
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn test_required_missing_is_an_error() {
        let layout = StructBuilder::new("ser_tests.ReqRead")
            .required_field(1, "r", PrimitiveKind::I32)
            .build()
            .unwrap();
        let err = decode_struct(&layout, &[WireType::Stop.as_u8()]).unwrap_err();
        assert_eq!(
            err,
            Error::RequiredFieldMissing {
                struct_name: "ser_tests.ReqRead".into(),
                field: "r".into(),
            }
        );
    }

    #[test]
    fn test_required_optional_absence_tolerated() {
        let layout = StructBuilder::new("ser_tests.ReqOpt")
            .required_optional_field(1, "m", PrimitiveKind::I32)
            .with_default(9)
            .build()
            .unwrap();

        // always written even when equal to the default
        let bytes = encode_struct(&StructValue::new(&layout)).unwrap();
        assert_eq!(bytes.len(), 8);

        // but absence on read is not an error
        let back = decode_struct(&layout, &[WireType::Stop.as_u8()]).unwrap();
        assert_eq!(back.get("m"), Some(&Value::I32(9)));
    }

    #[test]
    fn test_unknown_field_skipped() {
        let known = single_field("Fwd", PrimitiveKind::I32);
        let scratch = single_field("FwdScratch", PrimitiveKind::I32);
        let field = scratch.fields()[0].clone();

        let mut w = CompactWriter::new();
        // unknown ordinal 99 carrying a string
        w.write_field_begin(WireType::String, 99, &field).unwrap();
        w.write_string("future data").unwrap();
        w.write_field_end().unwrap();
        // the known field
        w.write_field_begin(WireType::Int32, 1, &field).unwrap();
        w.write_i32(21).unwrap();
        w.write_field_end().unwrap();
        w.write_struct_end().unwrap();

        let value = decode_struct(&known, &w.into_bytes()).unwrap();
        assert_eq!(value.get("v"), Some(&Value::I32(21)));
    }

    #[test]
    fn test_presence_field_semantics() {
        let layout = StructBuilder::new("ser_tests.Presence")
            .presence_field(1, "maybe", PrimitiveKind::I32)
            .build()
            .unwrap();

        // absent: nothing on the wire, absent after re-read
        let value = StructValue::new(&layout);
        let bytes = encode_struct(&value).unwrap();
        assert_eq!(bytes, vec![WireType::Stop.as_u8()]);
        let back = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(back.get("maybe"), Some(&Value::Nothing));

        // present with the type's default value: still written, still
        // present after re-read
        let mut value = StructValue::new(&layout);
        value.set("maybe", 0).unwrap();
        let bytes = encode_struct(&value).unwrap();
        assert!(bytes.len() > 1);
        let back = decode_struct(&layout, &bytes).unwrap();
        assert_eq!(back.get("maybe"), Some(&Value::I32(0)));
    }

    #[test]
    fn test_nested_struct_round_trip() {
        let inner = StructBuilder::new("ser_tests.InnerPoint")
            .field(1, "x", PrimitiveKind::I32)
            .field(2, "y", PrimitiveKind::I32)
            .build()
            .unwrap();
        let outer = StructBuilder::new("ser_tests.Outer")
            .struct_field(1, "origin", &inner)
            .field(2, "label", PrimitiveKind::String)
            .build()
            .unwrap();

        let mut origin = StructValue::new(&inner);
        origin.set("x", 3).unwrap();
        origin.set("y", -4).unwrap();
        let mut value = StructValue::new(&outer);
        value.set("origin", origin.clone()).unwrap();
        value.set("label", "corner").unwrap();

        let bytes = encode_struct(&value).unwrap();
        let back = decode_struct(&outer, &bytes).unwrap();
        assert_eq!(back.get("origin").and_then(|v| v.as_struct()), Some(&origin));
        assert_eq!(
            back.get("label").and_then(|v| v.as_str()),
            Some("corner")
        );
    }
}
