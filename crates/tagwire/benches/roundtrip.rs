// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialize/deserialize throughput for a representative struct.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagwire::{decode_struct, encode_struct, PrimitiveKind, StructBuilder, StructValue};

fn bench_roundtrip(c: &mut Criterion) {
    let layout = StructBuilder::new("bench.Sample")
        .required_field(1, "id", PrimitiveKind::U64)
        .field(2, "temperature", PrimitiveKind::F64)
        .field(3, "label", PrimitiveKind::String)
        .field(4, "flags", PrimitiveKind::U32)
        .build()
        .expect("valid layout");

    let mut value = StructValue::new(&layout);
    value.set("id", 123_456_789u64).expect("set id");
    value.set("temperature", 21.5f64).expect("set temperature");
    value.set("label", "bench-sample-label").expect("set label");
    value.set("flags", 0xA5A5u32).expect("set flags");

    let bytes = encode_struct(&value).expect("encode");

    c.bench_function("encode_struct", |b| {
        b.iter(|| encode_struct(black_box(&value)).expect("encode"))
    });

    c.bench_function("decode_struct", |b| {
        b.iter(|| decode_struct(black_box(&layout), black_box(&bytes)).expect("decode"))
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
