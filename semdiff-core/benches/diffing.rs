//! Benchmark for structure diff performance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use semdiff_core::{diff_element, diff_structures, CodeElement, Structure};

/// Directory-shaped structure: `files` files with ten functions, two classes
/// and three imports each. `seed` perturbs complexities so two structures
/// built with different seeds differ in roughly one function in seven.
fn synthetic(files: usize, seed: u32) -> Structure {
    let mut structure = Structure::directory("bench");
    for f in 0..files {
        let mut file = Structure::file(format!("pkg/mod_{f}.py"));
        for i in 0..10u32 {
            let bump = if (i + f as u32) % 7 == 0 { seed } else { 0 };
            file.functions.push(CodeElement {
                name: format!("func_{i}"),
                signature: Some(format!("func_{i}(a, b)")),
                complexity: Some(1 + i % 4 + bump),
                line: Some(1 + i * 6),
                line_count: Some(5),
                ..Default::default()
            });
        }
        for c in 0..2u32 {
            file.classes.push(CodeElement {
                name: format!("Class{c}"),
                bases: vec!["Base".to_string()],
                methods: (0..5).map(|m| CodeElement::named(format!("method_{m}"))).collect(),
                line: Some(100 + c * 30),
                ..Default::default()
            });
        }
        for imp in ["import os", "import sys", "from typing import List"] {
            file.imports.push(CodeElement::import(imp, 1));
        }
        structure.absorb(file, &format!("pkg/mod_{f}.py"));
    }
    structure
}

fn bench_diff_structures(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_structures");
    for files in [10usize, 100, 1000] {
        let left = synthetic(files, 0);
        let right = synthetic(files, 2);
        group.bench_with_input(BenchmarkId::from_parameter(files), &files, |b, _| {
            b.iter(|| diff_structures(black_box(&left), black_box(&right)))
        });
    }
    group.finish();
}

fn bench_diff_element(c: &mut Criterion) {
    let left = synthetic(1000, 0);
    let right = synthetic(1000, 2);
    c.bench_function("diff_element_method_lookup", |b| {
        b.iter(|| diff_element(black_box(&left), black_box(&right), "method_4"))
    });
}

criterion_group!(benches, bench_diff_structures, bench_diff_element);
criterion_main!(benches);
