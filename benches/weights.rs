//! Benchmarks for the weight methods.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use harmonica::mesh::primitives;
use harmonica::prelude::*;

fn bench_topology(c: &mut Criterion) {
    let mesh: PolyMesh = primitives::icosphere(4).unwrap();
    let seed = VertexId::new(0);

    c.bench_function("neighbor_map_icosphere4", |b| {
        b.iter(|| build_neighbor_map(&mesh))
    });

    c.bench_function("ring_map_icosphere4_r8", |b| {
        b.iter(|| build_ring_map(&mesh, seed, 8).unwrap())
    });
}

fn bench_weights(c: &mut Criterion) {
    let mesh: PolyMesh = primitives::icosphere(4).unwrap();
    let seed = VertexId::new(0);
    let mut group = c.benchmark_group("weights");

    for rings in [4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("simple", rings), &rings, |b, &rings| {
            b.iter(|| simple_harmonic(&mesh, seed, rings).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("laplace", rings), &rings, |b, &rings| {
            b.iter(|| solve_laplace(&mesh, seed, rings).unwrap())
        });
    }

    for iterations in [5, 20, 80] {
        group.bench_with_input(
            BenchmarkId::new("diffusion", iterations),
            &iterations,
            |b, &iterations| b.iter(|| laplacian_diffusion(&mesh, seed, 0.25, iterations).unwrap()),
        );
    }

    group.finish();
}

fn bench_consumers(c: &mut Criterion) {
    let mesh: PolyMesh = primitives::icosphere(4).unwrap();
    let seed = VertexId::new(0);
    let weights = solve_laplace(&mesh, seed, 8).unwrap();

    c.bench_function("weighted_translate_icosphere4", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            weighted_translate(&mut m, seed, 0.1, &weights).unwrap();
            m
        })
    });

    c.bench_function("laplacian_smoothing_icosphere4_x5", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            laplacian_smoothing(&mut m, 5);
            m
        })
    });
}

criterion_group!(benches, bench_topology, bench_weights, bench_consumers);
criterion_main!(benches);
