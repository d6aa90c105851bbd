// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # tagwire - Schema-aware tagged binary serialization
//!
//! A runtime type system that maps declared schema types (primitives,
//! structs, deferred-value wrappers) onto in-memory representations and
//! drives their encoding against a tagged binary wire protocol, with
//! forward/backward compatibility built into the field discipline.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagwire::{PrimitiveKind, StructBuilder, StructValue};
//!
//! // Describe a struct at runtime
//! let point = StructBuilder::new("demo.Point")
//!     .required_field(1, "x", PrimitiveKind::I32)
//!     .field(2, "y", PrimitiveKind::I32)
//!     .with_default(5)
//!     .build()
//!     .unwrap();
//!
//! // Populate and round-trip a value
//! let mut value = StructValue::new(&point);
//! value.set("x", 7).unwrap();
//!
//! let bytes = tagwire::encode_struct(&value).unwrap();
//! let back = tagwire::decode_struct(&point, &bytes).unwrap();
//! assert_eq!(back.get("x").and_then(|v| v.as_i32()), Some(7));
//! // "y" equals its default, was omitted from the wire, and comes back
//! assert_eq!(back.get("y").and_then(|v| v.as_i32()), Some(5));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                        Application Layer                         |
//! |      StructBuilder -> StructLayout -> StructValue / Bonded       |
//! +------------------------------------------------------------------+
//! |                       Descriptor Engine                          |
//! |  TypeDescriptor dispatch | field loop | widening | omission      |
//! +------------------------------------------------------------------+
//! |                        Protocol Ports                            |
//! |     FieldWriter / FieldReader traits | compact reference codec   |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Registry-interned runtime description of one schema type |
//! | [`StructBuilder`] | Fluent construction and registration of struct layouts |
//! | [`StructValue`] | Struct instance with one slot per flattened field |
//! | [`Bonded`] | Deferred struct value with one-way materialization |
//! | [`SchemaDef`] | Deterministic exported schema for cross-language interop |
//!
//! ## Modules Overview
//!
//! - [`types`] - Descriptors, struct layouts and the global registry
//! - [`ser`] - The descriptor-driven serialization engine
//! - [`wire`] - Wire-type tags, port traits and the compact codec
//! - [`schema`] - Schema export with struct-def deduplication

/// Deferred struct values with one-way materialization.
pub mod bonded;
/// Error types shared across the engine and the ports.
pub mod error;
/// Schema export (type defs, struct defs, emitter).
pub mod schema;
/// Descriptor-driven serialization/deserialization engine.
pub mod ser;
/// Runtime type system: descriptors, layouts, builder, registry.
pub mod types;
/// Runtime values driven by descriptors.
pub mod value;
/// Wire-type tags, protocol port traits and the compact codec.
pub mod wire;

pub use bonded::Bonded;
pub use error::{Error, Result};
pub use schema::{export_schema, FieldDef, SchemaDef, SchemaEmitter, StructDef, TypeDef};
pub use ser::{
    decode_struct, deserialize_struct, encode_struct, serialize_struct, DeserializeContext,
    SerializeContext,
};
pub use types::{
    registry, FieldDescriptor, FieldModifier, PrimitiveKind, StructBuilder, StructLayout,
    TypeDescriptor, TypeIdentity, TypeKind,
};
pub use value::{StructValue, Value};
pub use wire::{
    CompactReader, CompactWriter, FieldRead, FieldReader, FieldTag, FieldWriter, WireFormat,
    WireType,
};

/// tagwire version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
