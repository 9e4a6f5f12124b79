//! Benchmarks for the text-to-PDF pipeline stages.
//!
//! Run with: cargo bench
//!
//! Planning and shaping run on synthetic text; line rendering and document
//! building use the test fixture font.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use txtpdf::pdf::PageConfig;
use txtpdf::{ChunkPlanner, DocumentBuilder, FontLocator, LineRenderer, RtlShaper};

fn fixture_font() -> FontLocator {
    FontLocator::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/DejaVuSans.ttf"
    ))
}

/// Mixed Persian/Latin text with a table every few paragraphs.
fn sample_text(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        match i % 10 {
            3 | 4 => text.push_str("| \u{0646}\u{0627}\u{0645} | value | 42 |\n"),
            7 => text.push('\n'),
            _ if i % 2 == 0 => {
                text.push_str("\u{0627}\u{06CC}\u{0646} \u{06CC}\u{06A9} \u{0645}\u{062A}\u{0646} \u{0622}\u{0632}\u{0645}\u{0627}\u{06CC}\u{0634}\u{06CC} \u{0627}\u{0633}\u{062A}\n")
            }
            _ => text.push_str("The quick brown fox jumps over the lazy dog.\n"),
        }
    }
    text
}

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_planning");
    let text = sample_text(20_000);

    for max_bytes in [4 * 1024, 64 * 1024, 1024 * 1024] {
        let planner = ChunkPlanner::new(max_bytes).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(max_bytes), &text, |b, text| {
            b.iter(|| planner.plan(black_box(text)))
        });
    }

    group.finish();
}

fn bench_shaping(c: &mut Criterion) {
    let shaper = RtlShaper::new().with_cache_capacity(0);
    let cached = RtlShaper::new();
    let rtl = "\u{0633}\u{0644}\u{0627}\u{0645} \u{062F}\u{0646}\u{06CC}\u{0627} 123 test";
    let ltr = "The quick brown fox jumps over the lazy dog.";

    c.bench_function("shape_rtl_line", |b| {
        b.iter(|| shaper.shape(black_box(rtl)).unwrap())
    });

    c.bench_function("shape_ltr_line", |b| {
        b.iter(|| shaper.shape(black_box(ltr)).unwrap())
    });

    c.bench_function("shape_rtl_line_cached", |b| {
        b.iter(|| cached.shape(black_box(rtl)).unwrap())
    });
}

fn bench_line_rendering(c: &mut Criterion) {
    let font = fixture_font();
    let renderer = LineRenderer::new();
    let text = sample_text(1_000);

    c.bench_function("render_1000_lines", |b| {
        b.iter(|| renderer.render(black_box(text.lines()), &font).unwrap())
    });
}

fn bench_document_build(c: &mut Criterion) {
    let locator = fixture_font();
    let builder = DocumentBuilder::new(locator.load().unwrap());
    let elements = LineRenderer::new()
        .render(sample_text(500).lines(), &locator)
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench_0.pdf");

    c.bench_function("build_500_lines", |b| {
        b.iter(|| {
            builder
                .build(black_box(&elements), &path, &PageConfig::a4())
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_planning,
    bench_shaping,
    bench_line_rendering,
    bench_document_build
);
criterion_main!(benches);
