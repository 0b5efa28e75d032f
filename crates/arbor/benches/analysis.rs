//! Benchmarks for Arbor analysis.
//!
//! These benchmarks measure:
//! - Cold parse + extraction at increasing file sizes
//! - Cached outline queries (fingerprint check only)
//! - Structural search over a cached tree

// Benchmark code - performance of the benchmark setup is not critical
#![allow(missing_docs)]

use std::fmt::Write as _;
use std::hint::black_box;
use std::path::Path;

use arbor::extract::extract;
use arbor::parser::parse;
use arbor::{Analyzer, Budget, Language, SourceRequest};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A Python module with `classes` classes of five methods each.
fn python_module(classes: usize) -> String {
    let mut out = String::from("import os\nfrom typing import Optional\n\n");
    for c in 0..classes {
        writeln!(out, "class Service{c}:").unwrap();
        for m in 0..5 {
            writeln!(out, "    def method_{m}(self, value: int) -> Optional[int]:").unwrap();
            writeln!(out, "        result = helper_{m}(value)").unwrap();
            writeln!(out, "        return os.path.join(str(result), 'x')\n").unwrap();
        }
    }
    out
}

fn bench_cold_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_parse");
    let budget = Budget::default();

    for classes in [10, 100, 500] {
        let source = python_module(classes);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(classes), &source, |b, source| {
            b.iter(|| {
                let parsed = parse(black_box(source), Language::Python, &budget).expect("parse");
                extract(&parsed.root, source, Language::Python, &budget)
            });
        });
    }
    group.finish();
}

fn bench_cached_outline(c: &mut Criterion) {
    let analyzer = Analyzer::default();
    let source = python_module(100);
    let request = SourceRequest::new(Path::new("service.py"), &source);
    analyzer.get_outline(request).expect("warm cache");

    c.bench_function("cached_outline", |b| {
        b.iter(|| analyzer.get_outline(black_box(request)).expect("outline"));
    });
    c.bench_function("cached_find_symbol", |b| {
        b.iter(|| analyzer.find_symbol(black_box(request), "method_3").expect("search"));
    });
}

fn bench_structural_search(c: &mut Criterion) {
    let analyzer = Analyzer::default();
    let source = python_module(100);
    let request = SourceRequest::new(Path::new("service.py"), &source);
    analyzer.get_outline(request).expect("warm cache");

    c.bench_function("search_calls", |b| {
        b.iter(|| {
            analyzer
                .search(black_box(request), "(call function: (attribute))")
                .expect("search")
        });
    });
}

criterion_group!(
    benches,
    bench_cold_parse,
    bench_cached_outline,
    bench_structural_search
);
criterion_main!(benches);
