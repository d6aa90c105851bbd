// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type system: descriptors, struct layouts and the global registry.

mod builder;
mod descriptor;
pub mod registry;

pub use builder::StructBuilder;
pub use descriptor::{
    FieldDescriptor, FieldModifier, PrimitiveKind, StructLayout, TypeDescriptor, TypeIdentity,
    TypeKind,
};
