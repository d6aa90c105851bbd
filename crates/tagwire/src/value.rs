// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values driven by type descriptors.

use crate::bonded::Bonded;
use crate::error::{Error, Result};
use crate::types::{StructLayout, TypeKind};
use std::fmt;
use std::sync::Arc;

/// A runtime value of any schema type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    WString(String),
    Struct(StructValue),
    Bonded(Bonded),
    /// Absent value of a presence-tracked field.
    Nothing,
}

impl Value {
    /// Short kind label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::U64(_) => "uint64",
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::F32(_) => "float",
            Self::F64(_) => "double",
            Self::String(_) => "string",
            Self::WString(_) => "wstring",
            Self::Struct(_) => "struct",
            Self::Bonded(_) => "bonded",
            Self::Nothing => "nothing",
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Self::I8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) | Self::WString(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bonded(&self) -> Option<&Bonded> {
        match self {
            Self::Bonded(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bonded_mut(&mut self) -> Option<&mut Bonded> {
        match self {
            Self::Bonded(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Self::Struct(v)
    }
}

impl From<Bonded> for Value {
    fn from(v: Bonded) -> Self {
        Self::Bonded(v)
    }
}

/// A struct value: one slot per flattened field of its layout.
///
/// Slots are created from the declared field defaults and stay parallel to
/// [`StructLayout::fields`] for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct StructValue {
    layout: Arc<StructLayout>,
    slots: Vec<Value>,
}

impl StructValue {
    /// Creates a struct value with every field at its declared default.
    pub fn new(layout: &Arc<StructLayout>) -> Self {
        let slots = layout.fields().iter().map(|f| f.default.clone()).collect();
        Self {
            layout: Arc::clone(layout),
            slots,
        }
    }

    pub fn layout(&self) -> &Arc<StructLayout> {
        &self.layout
    }

    pub fn type_name(&self) -> &str {
        self.layout.qualified_name()
    }

    /// Field value by name, searching the flattened field list.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.layout.fields().iter().position(|f| f.name == name)?;
        Some(&self.slots[idx])
    }

    /// Mutable field access by name. The caller is trusted to keep the
    /// value assignable to the declared type, as with
    /// [`set`](Self::set); needed for in-place work such as materializing
    /// a bonded slot.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let idx = self.layout.fields().iter().position(|f| f.name == name)?;
        Some(&mut self.slots[idx])
    }

    /// Field value by ordinal id.
    pub fn get_id(&self, id: u16) -> Option<&Value> {
        let (idx, _) = self.layout.field_by_id(id)?;
        Some(&self.slots[idx])
    }

    /// Sets a field by name after checking the value against the declared
    /// type. `Value::Nothing` is accepted only for presence-tracked fields.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self
            .layout
            .fields()
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "no field '{}' in struct '{}'",
                    name,
                    self.layout.qualified_name()
                ))
            })?;
        self.set_index(idx, value.into())
    }

    /// Sets a field by ordinal id with the same checks as [`set`](Self::set).
    pub fn set_id(&mut self, id: u16, value: impl Into<Value>) -> Result<()> {
        let (idx, _) = self.layout.field_by_id(id).ok_or_else(|| {
            Error::InvalidData(format!(
                "no field id {} in struct '{}'",
                id,
                self.layout.qualified_name()
            ))
        })?;
        self.set_index(idx, value.into())
    }

    fn set_index(&mut self, idx: usize, value: Value) -> Result<()> {
        let field = &self.layout.fields()[idx];
        if value.is_nothing() {
            if !field.presence {
                return Err(Error::InvalidData(format!(
                    "field '{}' is not presence-tracked, cannot be set to nothing",
                    field.name
                )));
            }
        } else if !kind_accepts(field.field_type.kind(), &value) {
            return Err(Error::InvalidData(format!(
                "field '{}' declared {}, got {} value",
                field.name,
                field.field_type.name(),
                value.kind_name()
            )));
        }
        self.slots[idx] = value;
        Ok(())
    }

    pub(crate) fn slot(&self, idx: usize) -> &Value {
        &self.slots[idx]
    }

    pub(crate) fn slot_mut(&mut self, idx: usize) -> &mut Value {
        &mut self.slots[idx]
    }
}

/// Struct equality is layout identity plus slot-wise value equality.
impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.layout.identity() == other.layout.identity() && self.slots == other.slots
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.layout.qualified_name())?;
        for (field, slot) in self.layout.fields().iter().zip(&self.slots) {
            write!(f, "{}: {:?}; ", field.name, slot)?;
        }
        write!(f, "}}")
    }
}

fn kind_accepts(kind: &TypeKind, value: &Value) -> bool {
    use crate::types::PrimitiveKind as P;
    match (kind, value) {
        (TypeKind::Primitive(P::Bool), Value::Bool(_))
        | (TypeKind::Primitive(P::U8), Value::U8(_))
        | (TypeKind::Primitive(P::U16), Value::U16(_))
        | (TypeKind::Primitive(P::U32), Value::U32(_))
        | (TypeKind::Primitive(P::U64), Value::U64(_))
        | (TypeKind::Primitive(P::I8), Value::I8(_))
        | (TypeKind::Primitive(P::I16), Value::I16(_))
        | (TypeKind::Primitive(P::I32), Value::I32(_))
        | (TypeKind::Primitive(P::I64), Value::I64(_))
        | (TypeKind::Primitive(P::F32), Value::F32(_))
        | (TypeKind::Primitive(P::F64), Value::F64(_))
        | (TypeKind::Primitive(P::String), Value::String(_))
        | (TypeKind::Primitive(P::WString), Value::WString(_)) => true,
        (TypeKind::Struct(layout), Value::Struct(sv)) => {
            layout.identity() == sv.layout().identity()
        }
        (TypeKind::Bonded(layout), Value::Bonded(b)) => layout.identity() == b.layout().identity(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveKind, StructBuilder};

    fn point() -> Arc<StructLayout> {
        StructBuilder::new("value_tests.Point")
            .field(1, "x", PrimitiveKind::I32)
            .field(2, "y", PrimitiveKind::I32)
            .build()
            .expect("valid layout")
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::I32(7).as_i32(), Some(7));
        assert_eq!(Value::I32(7).as_i64(), None);
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert!(Value::Nothing.is_nothing());
        assert_eq!(Value::F64(1.0).kind_name(), "double");
    }

    #[test]
    fn test_struct_value_defaults_and_set() {
        let layout = point();
        let mut v = StructValue::new(&layout);
        assert_eq!(v.get("x"), Some(&Value::I32(0)));

        v.set("x", 11).unwrap();
        assert_eq!(v.get_id(1), Some(&Value::I32(11)));

        let err = v.set("x", "eleven").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = v.set("missing", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_struct_value_rejects_nothing_without_presence() {
        let layout = point();
        let mut v = StructValue::new(&layout);
        let err = v.set("x", Value::Nothing).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_struct_value_equality() {
        let layout = point();
        let mut a = StructValue::new(&layout);
        let mut b = StructValue::new(&layout);
        assert_eq!(a, b);
        a.set("y", 3).unwrap();
        assert_ne!(a, b);
        b.set("y", 3).unwrap();
        assert_eq!(a, b);
    }
}
