// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is an immutable, registry-interned description of one
//! schema type: a wire primitive, a struct layout, or a bonded (deferred)
//! wrapper over a struct. Two descriptors are equal iff they describe the
//! same schema type with the same type arguments; equality is carried by a
//! stable [`TypeIdentity`] hash so repeated registry lookups stay reflexive.

use crate::bonded::Bonded;
use crate::error::{Error, Result};
use crate::types::registry;
use crate::value::{StructValue, Value};
use crate::wire::WireType;
use md5::{Digest, Md5};
use std::fmt;
use std::sync::Arc;

/// Stable identity of a type: truncated MD5 over its canonical notation
/// (qualified name plus generic arguments).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIdentity([u8; 14]);

impl TypeIdentity {
    pub fn compute(notation: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(notation.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&digest[..14]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 14]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdentity(")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Wire primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    WString,
}

impl PrimitiveKind {
    /// Name of the type as it appears in schemas.
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::String => "string",
            Self::WString => "wstring",
        }
    }

    pub const fn wire_type(self) -> WireType {
        match self {
            Self::Bool => WireType::Bool,
            Self::U8 => WireType::UInt8,
            Self::U16 => WireType::UInt16,
            Self::U32 => WireType::UInt32,
            Self::U64 => WireType::UInt64,
            Self::I8 => WireType::Int8,
            Self::I16 => WireType::Int16,
            Self::I32 => WireType::Int32,
            Self::I64 => WireType::Int64,
            Self::F32 => WireType::Float,
            Self::F64 => WireType::Double,
            Self::String => WireType::String,
            Self::WString => WireType::WString,
        }
    }

    /// Default value of the primitive (zero, false, or empty).
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::String(String::new()),
            Self::WString => Value::WString(String::new()),
        }
    }
}

/// Field modifier as declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum FieldModifier {
    /// May be elided on the wire when equal to its default.
    Optional,
    /// Always written; its absence on read is an error.
    Required,
    /// Migration state: always written, but absence on read is tolerated.
    RequiredOptional,
}

impl FieldModifier {
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Required => "required",
            Self::RequiredOptional => "required_optional",
        }
    }
}

/// One field of a struct layout.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Ordinal id, unique within the owning struct; used as the wire tag.
    pub id: u16,
    pub name: String,
    pub field_type: Arc<TypeDescriptor>,
    pub modifier: FieldModifier,
    /// Declared default; assignable to `field_type` by construction.
    pub default: Value,
    /// Presence-tracked ("something") field: absent is distinct from
    /// present-with-default.
    pub presence: bool,
}

impl FieldDescriptor {
    /// Field identity used in diagnostics.
    pub fn label(&self) -> String {
        format!("{} (id {})", self.name, self.id)
    }
}

/// Immutable layout of a struct: its flattened field list with base-chain
/// fields first, frozen at construction.
#[derive(Debug)]
pub struct StructLayout {
    identity: TypeIdentity,
    name: String,
    qualified_name: String,
    base: Option<Arc<StructLayout>>,
    fields: Vec<FieldDescriptor>,
    base_field_count: usize,
}

impl StructLayout {
    pub(crate) fn new(
        qualified_name: String,
        base: Option<Arc<StructLayout>>,
        own_fields: Vec<FieldDescriptor>,
    ) -> Self {
        let name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&qualified_name)
            .to_string();
        let mut fields: Vec<FieldDescriptor> = base
            .as_ref()
            .map(|b| b.fields.clone())
            .unwrap_or_default();
        let base_field_count = fields.len();
        fields.extend(own_fields);
        let identity = TypeIdentity::compute(&Self::signature(&qualified_name, &base, &fields));
        Self {
            identity,
            name,
            qualified_name,
            base,
            fields,
            base_field_count,
        }
    }

    /// Canonical signature the identity hash is computed over. Covers the
    /// qualified name, base identity and every field's wire-visible shape,
    /// so two structurally different definitions never collide by name.
    fn signature(
        qualified_name: &str,
        base: &Option<Arc<StructLayout>>,
        fields: &[FieldDescriptor],
    ) -> String {
        let mut sig = format!("struct {}", qualified_name);
        if let Some(base) = base {
            sig.push_str(&format!(" : {}", base.identity));
        }
        sig.push('{');
        for field in fields {
            sig.push_str(&format!(
                "{}:{}:{}:{};",
                field.id,
                field.name,
                field.field_type.notation(),
                field.modifier.schema_name()
            ));
        }
        sig.push('}');
        sig
    }

    pub fn identity(&self) -> TypeIdentity {
        self.identity
    }

    /// Unqualified struct name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn base(&self) -> Option<&Arc<StructLayout>> {
        self.base.as_ref()
    }

    /// Flattened field list, base-chain fields first.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields declared by this struct itself (excluding the base chain).
    pub fn own_fields(&self) -> &[FieldDescriptor] {
        &self.fields[self.base_field_count..]
    }

    /// Looks a field up by ordinal id across the whole chain.
    pub fn field_by_id(&self, id: u16) -> Option<(usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.id == id)
    }

    /// Fresh struct value with every field at its declared default.
    pub fn default_value(self: &Arc<Self>) -> StructValue {
        StructValue::new(self)
    }
}

impl PartialEq for StructLayout {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for StructLayout {}

/// The shape a descriptor describes.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Struct(Arc<StructLayout>),
    /// Deferred-value wrapper over a struct.
    Bonded(Arc<StructLayout>),
}

/// Runtime descriptor of one schema type.
///
/// Interned by the [`registry`]: each distinct identity resolves to a single
/// shared instance for the life of the process.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    identity: TypeIdentity,
    kind: TypeKind,
}

impl TypeDescriptor {
    pub(crate) fn from_kind(kind: TypeKind) -> Self {
        let identity = TypeIdentity::compute(&notation_of(&kind));
        Self { identity, kind }
    }

    pub fn identity(&self) -> TypeIdentity {
        self.identity
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Schema-visible name: `"int32"`, the struct's unqualified name, or
    /// `"bonded"` for the wrapper.
    pub fn name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(p) => p.schema_name(),
            TypeKind::Struct(layout) => layout.name(),
            TypeKind::Bonded(_) => "bonded",
        }
    }

    /// Namespace-qualified name; for primitives and the wrapper this equals
    /// [`name`](Self::name).
    pub fn qualified_name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(p) => p.schema_name(),
            TypeKind::Struct(layout) => layout.qualified_name(),
            TypeKind::Bonded(_) => "bonded",
        }
    }

    /// Tag written on the wire for values of this type.
    pub fn wire_type(&self) -> WireType {
        match &self.kind {
            TypeKind::Primitive(p) => p.wire_type(),
            TypeKind::Struct(_) | TypeKind::Bonded(_) => WireType::Struct,
        }
    }

    /// Fresh default-valued instance. Struct and bonded defaults are built
    /// anew per call so callers never share mutable state.
    pub fn default_value(&self) -> Value {
        match &self.kind {
            TypeKind::Primitive(p) => p.default_value(),
            TypeKind::Struct(layout) => Value::Struct(StructValue::new(layout)),
            TypeKind::Bonded(layout) => Value::Bonded(Bonded::from_value(StructValue::new(layout))),
        }
    }

    /// None of the types in this family admit a null value.
    pub fn is_nullable(&self) -> bool {
        false
    }

    pub fn is_generic(&self) -> bool {
        matches!(self.kind, TypeKind::Bonded(_))
    }

    /// Type arguments of a generic descriptor, outermost first.
    pub fn generic_type_arguments(&self) -> Vec<Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Bonded(layout) => vec![registry::struct_descriptor(Arc::clone(layout))],
            _ => Vec::new(),
        }
    }

    /// Canonical notation the identity hash is derived from.
    pub(crate) fn notation(&self) -> String {
        notation_of(&self.kind)
    }

    /// Rejects absent values handed to a non-nullable type.
    pub(crate) fn verify_non_nullable(&self, value: &Value) -> Result<()> {
        if value.is_nothing() && !self.is_nullable() {
            return Err(Error::InvalidData(format!(
                "non-nullable type '{}' cannot serialize an absent value",
                self.qualified_name()
            )));
        }
        Ok(())
    }
}

fn notation_of(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Primitive(p) => p.schema_name().to_string(),
        TypeKind::Struct(layout) => format!("struct<{}>", layout.identity()),
        TypeKind::Bonded(layout) => format!("bonded<{}>", layout.identity()),
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Bonded(layout) => write!(f, "bonded<{}>", layout.qualified_name()),
            _ => f.write_str(self.qualified_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructBuilder;

    #[test]
    fn test_identity_is_stable() {
        let a = TypeIdentity::compute("int32");
        let b = TypeIdentity::compute("int32");
        let c = TypeIdentity::compute("int64");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_primitive_metadata() {
        let desc = registry::primitive(PrimitiveKind::I32);
        assert_eq!(desc.name(), "int32");
        assert_eq!(desc.qualified_name(), "int32");
        assert_eq!(desc.wire_type(), WireType::Int32);
        assert_eq!(desc.default_value(), Value::I32(0));
        assert!(!desc.is_nullable());
        assert!(!desc.is_generic());
        assert!(desc.generic_type_arguments().is_empty());
    }

    #[test]
    fn test_struct_layout_flattening() {
        let base = StructBuilder::new("descriptor_tests.Base")
            .field(1, "tag", PrimitiveKind::U32)
            .build()
            .unwrap();
        let derived = StructBuilder::new("descriptor_tests.Derived")
            .base(&base)
            .field(2, "payload", PrimitiveKind::String)
            .build()
            .unwrap();

        assert_eq!(derived.fields().len(), 2);
        assert_eq!(derived.fields()[0].name, "tag");
        assert_eq!(derived.own_fields().len(), 1);
        assert_eq!(derived.own_fields()[0].name, "payload");
        assert_eq!(derived.base().map(|b| b.name()), Some("Base"));

        let (idx, field) = derived.field_by_id(1).expect("base field visible");
        assert_eq!(idx, 0);
        assert_eq!(field.name, "tag");
    }

    #[test]
    fn test_bonded_descriptor_shape() {
        let layout = StructBuilder::new("descriptor_tests.Inner")
            .field(1, "v", PrimitiveKind::I64)
            .build()
            .unwrap();
        let bonded = registry::bonded(Arc::clone(&layout));

        assert_eq!(bonded.name(), "bonded");
        assert_eq!(bonded.wire_type(), WireType::Struct);
        assert!(bonded.is_generic());

        let args = bonded.generic_type_arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].qualified_name(), "descriptor_tests.Inner");
        assert_eq!(format!("{}", bonded), "bonded<descriptor_tests.Inner>");
    }

    #[test]
    fn test_descriptor_equality_by_identity() {
        let a = registry::primitive(PrimitiveKind::F64);
        let b = registry::primitive(PrimitiveKind::F64);
        let c = registry::primitive(PrimitiveKind::F32);
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
    }
}
