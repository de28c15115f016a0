mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use scatter_lab::geometry::{PathCurve, SurfaceMesh, VolumeBox};
use scatter_lab::sampling::{
    CandidateSampling, CumulativeTable, PathSampler, SurfaceSampler, UniformBoxSampling,
};

const GRID_CELLS: [u32; 4] = [4, 16, 64, 128];
const DRAWS: usize = 4096;

fn draw_all(sampler: &dyn CandidateSampling, rng: &mut StdRng) -> f32 {
    let mut acc = 0.0;
    for _ in 0..DRAWS {
        acc += sampler.sample(rng).position.x;
    }
    acc
}

fn sampling_surface_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/surface");
    group.throughput(common::elements_throughput(DRAWS));

    for &cells in &GRID_CELLS {
        let mesh = SurfaceMesh::triangulated_grid(100.0, cells);
        let sampler = SurfaceSampler::new(&mesh);
        let mut rng = common::seeded_rng(cells as u64);

        group.bench_with_input(
            BenchmarkId::from_parameter(mesh.polygons.len()),
            &cells,
            |b, _| {
                b.iter(|| black_box(draw_all(&sampler, &mut rng)));
            },
        );
    }

    group.finish();
}

fn sampling_cumulative_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/cumulative_pick");
    group.throughput(common::elements_throughput(DRAWS));

    for &len in &[16usize, 1024, 65536] {
        let table = CumulativeTable::new((0..len).map(|i| 1.0 + (i % 7) as f32));
        let mut rng = common::seeded_rng(len as u64);

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                let mut hits = 0usize;
                for _ in 0..DRAWS {
                    hits += table.pick(&mut rng).map_or(0, |(i, _)| i & 1);
                }
                black_box(hits);
            });
        });
    }

    group.finish();
}

fn sampling_path_and_volume_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/path_volume");
    group.throughput(common::elements_throughput(DRAWS));

    let points: Vec<Vec3> = (0..512)
        .map(|i| {
            let t = i as f32 * 0.1;
            Vec3::new(t.cos() * t, t.sin() * t, 0.0)
        })
        .collect();
    let curve = PathCurve::new(points);
    let path = PathSampler::new(&curve);
    let mut rng = common::seeded_rng(512);
    group.bench_function("path_512_points", |b| {
        b.iter(|| black_box(draw_all(&path, &mut rng)));
    });

    let volume = UniformBoxSampling::new(VolumeBox::default());
    let mut rng = common::seeded_rng(3);
    group.bench_function("volume_box", |b| {
        b.iter(|| black_box(draw_all(&volume, &mut rng)));
    });
    group.bench_function("volume_box_batch", |b| {
        b.iter(|| black_box(volume.generate(DRAWS, &mut rng).len()));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets =
        sampling_surface_benches,
        sampling_cumulative_benches,
        sampling_path_and_volume_benches
}
criterion_main!(benches);
