//! Criterion benchmarks for the physical ⇄ virtual key code map.
//!
//! The reverse direction runs on the hook thread for every key event on the
//! machine, so it must stay a plain table lookup.
//!
//! Run with:
//! ```bash
//! cargo bench --package osk-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use osk_core::{KeyCodeMap, PhysicalKey, VirtualKeyCode};

// ── Representative codes ──────────────────────────────────────────────────────

/// VK codes seen on a typical typing burst, plus one unmapped code.
const BENCH_VK_CODES: &[u8] = &[
    0x41, // 'A'
    0x5A, // 'Z'
    0x0D, // VK_RETURN
    0x08, // VK_BACK
    0x20, // VK_SPACE
    0x14, // VK_CAPITAL
    0xA0, // VK_LSHIFT
    0xA1, // VK_RSHIFT
    0xBA, // VK_OEM_1
    0x31, // '1'
    0x10, // VK_SHIFT (generic, unmapped)
];

fn bench_virtual_to_physical(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_virtual_to_physical");

    group.bench_function("single", |b| {
        b.iter(|| KeyCodeMap::virtual_to_physical(black_box(VirtualKeyCode::new(0x41))))
    });

    group.bench_function("burst_11", |b| {
        b.iter(|| {
            BENCH_VK_CODES
                .iter()
                .filter_map(|&vk| KeyCodeMap::virtual_to_physical(black_box(VirtualKeyCode::new(vk))))
                .count()
        })
    });

    group.finish();
}

fn bench_physical_to_virtual(c: &mut Criterion) {
    c.bench_function("keymap_physical_to_virtual_all", |b| {
        b.iter(|| {
            PhysicalKey::ALL
                .iter()
                .map(|&key| KeyCodeMap::physical_to_virtual(black_box(key)).value() as u32)
                .sum::<u32>()
        })
    });
}

fn bench_from_name(c: &mut Criterion) {
    c.bench_function("physical_key_from_name", |b| {
        b.iter(|| PhysicalKey::from_name(black_box("ShiftRight")))
    });
}

criterion_group!(
    benches,
    bench_virtual_to_physical,
    bench_physical_to_virtual,
    bench_from_name
);
criterion_main!(benches);
