// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide descriptor registry.
//!
//! Every distinct type identity maps to exactly one shared descriptor
//! instance. Lookup is get-or-create: concurrent first access from multiple
//! threads converges on a single `Arc` via the map's entry API, and nothing
//! is ever mutated or evicted afterwards.

use crate::types::{PrimitiveKind, StructLayout, TypeDescriptor, TypeIdentity, TypeKind};
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

static DESCRIPTORS: OnceLock<DashMap<TypeIdentity, Arc<TypeDescriptor>>> = OnceLock::new();

fn descriptors() -> &'static DashMap<TypeIdentity, Arc<TypeDescriptor>> {
    DESCRIPTORS.get_or_init(DashMap::new)
}

fn get_or_intern(kind: TypeKind) -> Arc<TypeDescriptor> {
    let descriptor = TypeDescriptor::from_kind(kind);
    let entry = descriptors()
        .entry(descriptor.identity())
        .or_insert_with(|| {
            log::debug!(
                "[types] interning descriptor '{}' ({})",
                descriptor,
                descriptor.identity()
            );
            Arc::new(descriptor)
        });
    Arc::clone(entry.value())
}

/// Shared descriptor for a wire primitive.
pub fn primitive(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
    get_or_intern(TypeKind::Primitive(kind))
}

/// Shared descriptor for a registered struct layout.
pub fn struct_descriptor(layout: Arc<StructLayout>) -> Arc<TypeDescriptor> {
    get_or_intern(TypeKind::Struct(layout))
}

/// Shared descriptor for `bonded<T>` over a registered struct layout.
pub fn bonded(layout: Arc<StructLayout>) -> Arc<TypeDescriptor> {
    get_or_intern(TypeKind::Bonded(layout))
}

/// Interns a freshly built layout, converging on the already-registered
/// instance when an identical definition was built before.
pub(crate) fn register_layout(layout: StructLayout) -> Arc<StructLayout> {
    let descriptor = struct_descriptor(Arc::new(layout));
    match descriptor.kind() {
        TypeKind::Struct(layout) => Arc::clone(layout),
        // get_or_intern only ever stores Struct kinds under a struct identity
        _ => unreachable!("struct identity resolved to a non-struct descriptor"),
    }
}
