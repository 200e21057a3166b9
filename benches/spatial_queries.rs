//! Measure rebuilding the spatial hash and querying it with a crowd of agents
//!

use bevy::prelude::*;
use bevy_flowfield_grid::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Scatter agents over a square area
fn prepare_agents(count: usize, extent: f32) -> Vec<(u32, Vec2)> {
	let mut rng = StdRng::seed_from_u64(42);
	(0..count as u32)
		.map(|i| {
			(
				i,
				Vec2::new(
					rng.random_range(-extent..extent),
					rng.random_range(-extent..extent),
				),
			)
		})
		.collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let agents = prepare_agents(10_000, 500.0);
	let mut grid = SpatialHashGrid::new(8.0);
	group.bench_function("build_grid_10k", |b| {
		b.iter(|| grid.build_grid(black_box(&agents)))
	});
	grid.build_grid(&agents);
	let mut found = Vec::new();
	group.bench_function("query_radius_all", |b| {
		b.iter(|| {
			found.clear();
			grid.query_radius_all(black_box(Vec2::new(10.0, -20.0)), black_box(24.0), &mut found);
			found.len()
		})
	});
	group.bench_function("query_cone_closest", |b| {
		b.iter(|| {
			grid.query_cone_closest(
				black_box(Vec2::ZERO),
				black_box(40.0),
				Vec2::X,
				std::f32::consts::FRAC_PI_4,
			)
		})
	});
	group.bench_function("query_k_nearest", |b| {
		b.iter(|| grid.query_k_nearest(black_box(Vec2::new(-100.0, 100.0)), 32.0, 8))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
