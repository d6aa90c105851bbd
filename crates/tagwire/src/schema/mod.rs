// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema export.
//!
//! Walks a descriptor graph depth-first and produces a serializable
//! description of every struct reachable from a root. Struct defs are
//! deduplicated by type identity: the emitter reserves a struct's ordinal
//! before descending into its fields, so shared and mutually-referential
//! structs resolve to a single def referenced by ordinal.

use crate::types::{FieldModifier, StructLayout, TypeDescriptor, TypeIdentity, TypeKind};
use crate::value::Value;
use crate::wire::WireType;
use std::collections::HashMap;
use std::sync::Arc;

/// Exported reference to a type: its wire tag, the ordinal of its struct
/// def when it is (or wraps) a struct, and the bonded flag for deferred
/// wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TypeDef {
    pub id: WireType,
    pub struct_def: Option<u16>,
    pub bonded: bool,
}

/// Exported description of one struct field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct FieldDef {
    pub id: u16,
    pub name: String,
    pub modifier: FieldModifier,
    pub field_type: TypeDef,
    /// Rendered default literal; absent for struct-typed and
    /// presence-tracked fields.
    pub default: Option<String>,
}

/// Exported description of one struct.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct StructDef {
    pub name: String,
    pub qualified_name: String,
    pub base: Option<TypeDef>,
    /// Fields declared by the struct itself; base fields live in the base
    /// struct's def.
    pub fields: Vec<FieldDef>,
}

/// Full exported schema: every reachable struct def plus the root
/// reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SchemaDef {
    pub structs: Vec<StructDef>,
    pub root: TypeDef,
}

#[cfg(feature = "json")]
impl SchemaDef {
    /// Renders the schema as JSON for cross-language tooling.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Single-export emitter state. Scoped to one `export_schema` call and not
/// shareable across threads.
#[derive(Debug, Default)]
pub struct SchemaEmitter {
    memo: HashMap<TypeIdentity, u16>,
    structs: Vec<Option<StructDef>>,
}

impl SchemaEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exported type def for any descriptor, emitting struct defs on
    /// demand. Bonded wrappers mark the wrapped struct's def instead of
    /// re-emitting it.
    pub fn type_def(&mut self, descriptor: &TypeDescriptor) -> TypeDef {
        match descriptor.kind() {
            TypeKind::Primitive(_) => TypeDef {
                id: descriptor.wire_type(),
                struct_def: None,
                bonded: false,
            },
            TypeKind::Struct(layout) => TypeDef {
                id: descriptor.wire_type(),
                struct_def: Some(self.struct_ordinal(layout)),
                bonded: false,
            },
            TypeKind::Bonded(layout) => TypeDef {
                id: descriptor.wire_type(),
                struct_def: Some(self.struct_ordinal(layout)),
                bonded: true,
            },
        }
    }

    /// Ordinal of a struct's def, emitting it on first encounter. The
    /// ordinal is reserved before the fields are walked so recursive
    /// references resolve to a valid forward slot.
    fn struct_ordinal(&mut self, layout: &Arc<StructLayout>) -> u16 {
        if let Some(&ordinal) = self.memo.get(&layout.identity()) {
            return ordinal;
        }
        let ordinal = self.structs.len() as u16;
        self.memo.insert(layout.identity(), ordinal);
        self.structs.push(None);

        let base = layout.base().map(|base| TypeDef {
            id: WireType::Struct,
            struct_def: Some(self.struct_ordinal(base)),
            bonded: false,
        });
        let fields = layout
            .own_fields()
            .iter()
            .map(|field| FieldDef {
                id: field.id,
                name: field.name.clone(),
                modifier: field.modifier,
                field_type: self.type_def(&field.field_type),
                default: default_literal(&field.default),
            })
            .collect();

        self.structs[ordinal as usize] = Some(StructDef {
            name: layout.name().to_string(),
            qualified_name: layout.qualified_name().to_string(),
            base,
            fields,
        });
        ordinal
    }

    fn finish(self, root: TypeDef) -> SchemaDef {
        let structs = self
            .structs
            .into_iter()
            .map(|def| def.expect("every reserved ordinal is filled before finish"))
            .collect();
        SchemaDef { structs, root }
    }
}

impl TypeDescriptor {
    /// Exported type def, consulting `emitter` for struct deduplication.
    pub fn schema_type_def(&self, emitter: &mut SchemaEmitter) -> TypeDef {
        emitter.type_def(self)
    }
}

/// Exports the schema reachable from a root struct. The root def always
/// occupies ordinal 0.
pub fn export_schema(root: &Arc<StructLayout>) -> SchemaDef {
    let mut emitter = SchemaEmitter::new();
    let ordinal = emitter.struct_ordinal(root);
    let root_def = TypeDef {
        id: WireType::Struct,
        struct_def: Some(ordinal),
        bonded: false,
    };
    emitter.finish(root_def)
}

fn default_literal(default: &Value) -> Option<String> {
    match default {
        Value::Bool(v) => Some(v.to_string()),
        Value::U8(v) => Some(v.to_string()),
        Value::U16(v) => Some(v.to_string()),
        Value::U32(v) => Some(v.to_string()),
        Value::U64(v) => Some(v.to_string()),
        Value::I8(v) => Some(v.to_string()),
        Value::I16(v) => Some(v.to_string()),
        Value::I32(v) => Some(v.to_string()),
        Value::I64(v) => Some(v.to_string()),
        Value::F32(v) => Some(v.to_string()),
        Value::F64(v) => Some(v.to_string()),
        Value::String(v) | Value::WString(v) => Some(v.clone()),
        Value::Struct(_) | Value::Bonded(_) | Value::Nothing => None,
    }
}
