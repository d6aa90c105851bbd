// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder for struct layouts.

use crate::error::{Error, Result};
use crate::types::{
    registry, FieldDescriptor, FieldModifier, PrimitiveKind, StructLayout, TypeDescriptor,
    TypeKind,
};
use crate::value::Value;
use std::sync::Arc;

/// Builder for [`StructLayout`] instances.
///
/// Fields default to the `optional` modifier, matching schema semantics.
/// `build()` validates the definition, flattens the base chain and interns
/// the layout in the global registry; building the same definition twice
/// yields the same shared instance.
#[derive(Debug)]
pub struct StructBuilder {
    qualified_name: String,
    base: Option<Arc<StructLayout>>,
    fields: Vec<FieldDescriptor>,
    invalid: Option<String>,
}

impl StructBuilder {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            base: None,
            fields: Vec::new(),
            invalid: None,
        }
    }

    /// Sets the base struct; its fields precede this struct's own fields.
    pub fn base(mut self, base: &Arc<StructLayout>) -> Self {
        self.base = Some(Arc::clone(base));
        self
    }

    /// Adds an optional primitive field.
    pub fn field(self, id: u16, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.push_primitive(id, name, kind, FieldModifier::Optional, false)
    }

    /// Adds a required primitive field.
    pub fn required_field(self, id: u16, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.push_primitive(id, name, kind, FieldModifier::Required, false)
    }

    /// Adds a required-optional primitive field (always written, absence
    /// tolerated on read).
    pub fn required_optional_field(
        self,
        id: u16,
        name: impl Into<String>,
        kind: PrimitiveKind,
    ) -> Self {
        self.push_primitive(id, name, kind, FieldModifier::RequiredOptional, false)
    }

    /// Adds a presence-tracked ("something") primitive field. Its default
    /// is the absent value.
    pub fn presence_field(self, id: u16, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.push_primitive(id, name, kind, FieldModifier::Optional, true)
    }

    /// Adds a nested struct field. Struct fields are always written.
    pub fn struct_field(
        mut self,
        id: u16,
        name: impl Into<String>,
        layout: &Arc<StructLayout>,
    ) -> Self {
        let field_type = registry::struct_descriptor(Arc::clone(layout));
        let default = field_type.default_value();
        self.fields.push(FieldDescriptor {
            id,
            name: name.into(),
            field_type,
            modifier: FieldModifier::Optional,
            default,
            presence: false,
        });
        self
    }

    /// Adds a `bonded<T>` field over a struct layout.
    pub fn bonded_field(
        mut self,
        id: u16,
        name: impl Into<String>,
        layout: &Arc<StructLayout>,
    ) -> Self {
        let field_type = registry::bonded(Arc::clone(layout));
        let default = field_type.default_value();
        self.fields.push(FieldDescriptor {
            id,
            name: name.into(),
            field_type,
            modifier: FieldModifier::Optional,
            default,
            presence: false,
        });
        self
    }

    /// Overrides the default of the most recently added field.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        match self.fields.last_mut() {
            Some(field) => field.default = default.into(),
            None => self.note_invalid("with_default called before any field"),
        }
        self
    }

    fn push_primitive(
        mut self,
        id: u16,
        name: impl Into<String>,
        kind: PrimitiveKind,
        modifier: FieldModifier,
        presence: bool,
    ) -> Self {
        let field_type = registry::primitive(kind);
        let default = if presence {
            Value::Nothing
        } else {
            kind.default_value()
        };
        self.fields.push(FieldDescriptor {
            id,
            name: name.into(),
            field_type,
            modifier,
            default,
            presence,
        });
        self
    }

    fn note_invalid(&mut self, reason: &str) {
        if self.invalid.is_none() {
            self.invalid = Some(reason.to_string());
        }
    }

    /// Validates and interns the layout.
    pub fn build(self) -> Result<Arc<StructLayout>> {
        if let Some(reason) = self.invalid {
            return Err(Error::SchemaError(format!(
                "{}: {}",
                self.qualified_name, reason
            )));
        }

        let mut seen_ids: Vec<u16> = self
            .base
            .as_ref()
            .map(|b| b.fields().iter().map(|f| f.id).collect())
            .unwrap_or_default();
        for field in &self.fields {
            if seen_ids.contains(&field.id) {
                return Err(Error::SchemaError(format!(
                    "{}: duplicate field id {} ('{}')",
                    self.qualified_name, field.id, field.name
                )));
            }
            seen_ids.push(field.id);
            validate_default(&self.qualified_name, field)?;
        }

        Ok(registry::register_layout(StructLayout::new(
            self.qualified_name,
            self.base,
            self.fields,
        )))
    }
}

fn validate_default(struct_name: &str, field: &FieldDescriptor) -> Result<()> {
    if field.presence {
        if !field.default.is_nothing() {
            return Err(Error::SchemaError(format!(
                "{}: presence field '{}' must default to the absent value",
                struct_name, field.name
            )));
        }
        return Ok(());
    }
    if !default_assignable(&field.field_type, &field.default) {
        return Err(Error::SchemaError(format!(
            "{}: default of field '{}' is not assignable to {}",
            struct_name,
            field.name,
            field.field_type.name()
        )));
    }
    Ok(())
}

fn default_assignable(declared: &TypeDescriptor, default: &Value) -> bool {
    use PrimitiveKind as P;
    match declared.kind() {
        TypeKind::Primitive(kind) => matches!(
            (kind, default),
            (P::Bool, Value::Bool(_))
                | (P::U8, Value::U8(_))
                | (P::U16, Value::U16(_))
                | (P::U32, Value::U32(_))
                | (P::U64, Value::U64(_))
                | (P::I8, Value::I8(_))
                | (P::I16, Value::I16(_))
                | (P::I32, Value::I32(_))
                | (P::I64, Value::I64(_))
                | (P::F32, Value::F32(_))
                | (P::F64, Value::F64(_))
                | (P::String, Value::String(_))
                | (P::WString, Value::WString(_))
        ),
        TypeKind::Struct(layout) => default
            .as_struct()
            .is_some_and(|sv| sv.layout().identity() == layout.identity()),
        TypeKind::Bonded(layout) => default
            .as_bonded()
            .is_some_and(|b| b.layout().identity() == layout.identity()),
    }
}
