//! Performance benchmarks for glyphguard-core.
//!
//! Identifiers are short, so each benchmark runs a small batch per iteration.
//! The built-in table is forced before measuring so lazy construction is not
//! counted.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glyphguard_core::{ConfusableTable, Skeletonizer};

const CLEAN: [&str; 8] = [
    "alice",
    "Bob_1984",
    "admin",
    "root",
    "github-actions",
    "release-bot",
    "Zo\u{00EB}",
    "M\u{00FC}ller",
];

const SPOOFED: [&str; 6] = [
    "\u{0391}lice",
    "p\u{0430}yp\u{0430}l",
    "g\u{0456}thub-actions",
    "\u{FF41}\u{FF44}\u{FF4D}\u{FF49}\u{FF4E}",
    "\u{1FBA}lice",
    "l\u{0131}\u{0307}nux",
];

fn bench_normalize_clean(c: &mut Criterion) {
    let engine = Skeletonizer::builtin();
    c.bench_function("normalize_clean", |b| {
        b.iter(|| {
            for input in &CLEAN {
                black_box(engine.normalize(input));
            }
        })
    });
}

fn bench_normalize_spoofed(c: &mut Criterion) {
    let engine = Skeletonizer::builtin();
    c.bench_function("normalize_spoofed", |b| {
        b.iter(|| {
            for input in &SPOOFED {
                black_box(engine.normalize(input));
            }
        })
    });
}

fn bench_contains_homoglyphs(c: &mut Criterion) {
    let engine = Skeletonizer::builtin();

    c.bench_function("contains_homoglyphs_clean", |b| {
        b.iter(|| {
            for input in &CLEAN {
                black_box(engine.contains_homoglyphs(input));
            }
        })
    });

    c.bench_function("contains_homoglyphs_spoofed", |b| {
        b.iter(|| {
            for input in &SPOOFED {
                black_box(engine.contains_homoglyphs(input));
            }
        })
    });
}

fn bench_long_text(c: &mut Criterion) {
    let engine = Skeletonizer::builtin();
    let text = "The qu\u{0456}ck brown f\u{043E}x jumps over the l\u{0430}zy dog. ".repeat(64);

    c.bench_function("normalize_long_text", |b| {
        b.iter(|| black_box(engine.normalize(&text)))
    });
}

fn bench_table_build(c: &mut Criterion) {
    let entries: Vec<_> = ConfusableTable::builtin().iter().cloned().collect();

    c.bench_function("table_from_entries", |b| {
        b.iter(|| black_box(ConfusableTable::from_entries(entries.clone())))
    });
}

criterion_group!(
    benches,
    bench_normalize_clean,
    bench_normalize_spoofed,
    bench_contains_homoglyphs,
    bench_long_text,
    bench_table_build,
);
criterion_main!(benches);
