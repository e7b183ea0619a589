use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use relief::{generate_mesh, stl::encode_stl, ScalarField};

fn waves(size: usize) -> ScalarField {
    ScalarField::from_fn(size, size, 0.5, 2.0, |x, y| {
        let (x, y) = (x as f32 / 16.0, y as f32 / 16.0);
        5.0 + 2.0 * x.sin() * y.cos() + (x + y).sin()
    })
    .unwrap()
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Relief");

    for size in [64, 256] {
        let field = waves(size);
        let mesh = generate_mesh(&field).unwrap();

        group.bench_with_input(BenchmarkId::new("Mesh", size), &field, |b, i| {
            b.iter(|| generate_mesh(i).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("Encode", size), &mesh, |b, i| {
            b.iter(|| encode_stl(i, "benchmark").unwrap())
        });
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
