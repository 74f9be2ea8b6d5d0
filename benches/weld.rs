//! Benchmarks for index record deduplication.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Point3, Vector2};
use tessera::prelude::*;

/// (position, texcoord) records of an n x n quad grid, split into triangles.
///
/// Texcoords repeat every four cells, so most records are shared and a few
/// seams split positions.
fn create_grid_records(n: u32) -> Vec<u32> {
    let mut records = Vec::with_capacity((n * n * 12) as usize);
    let vertex = |i: u32, j: u32| [j * (n + 1) + i, (j % 4) * 5 + (i % 4)];

    for j in 0..n {
        for i in 0..n {
            let v00 = vertex(i, j);
            let v10 = vertex(i + 1, j);
            let v01 = vertex(i, j + 1);
            let v11 = vertex(i + 1, j + 1);

            for corner in [v00, v10, v11, v00, v11, v01] {
                records.extend_from_slice(&corner);
            }
        }
    }
    records
}

fn create_grid_source(n: u32) -> MeshSource {
    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f32, j as f32, 0.0));
        }
    }
    let texcoords = (0..25)
        .map(|k| Vector2::new((k % 5) as f32 / 4.0, (k / 5) as f32 / 4.0))
        .collect();

    let mut arrays = BTreeMap::new();
    arrays.insert(Semantic::Position, AttributeArray::Point3(positions));
    arrays.insert(Semantic::TexCoord(0), AttributeArray::Vector2(texcoords));

    let layout = InputLayout::positional(&[
        (Semantic::Position, "pos"),
        (Semantic::TexCoord(0), "uv"),
    ]);
    MeshSource::new(Topology::Triangles, layout, create_grid_records(n), arrays)
}

fn bench_combination_map(c: &mut Criterion) {
    for n in [10, 100] {
        let records = create_grid_records(n);
        c.bench_function(&format!("weld_grid_{}x{}", n, n), |b| {
            b.iter(|| CombinationMap::build(black_box(&records), 2).unwrap().len())
        });
    }
}

fn bench_mesh_build(c: &mut Criterion) {
    let source = create_grid_source(100);
    c.bench_function("build_grid_100x100", |b| {
        b.iter(|| black_box(&source).build(None).unwrap())
    });
}

criterion_group!(benches, bench_combination_map, bench_mesh_build);
criterion_main!(benches);
