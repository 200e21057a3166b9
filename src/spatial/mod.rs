//! A uniform spatial hash for proximity queries over moving agents.
//!
//! The grid holds no state between ticks: it is cleared and every entry is
//! reinserted by [SpatialHashGrid::build_grid] each tick, so there is no
//! incremental insert or remove. Queries enumerate the square of buckets
//! bounding the query radius and test each entry exactly
//!

pub mod priority_heap;

use std::{cmp::Ordering, collections::HashMap, f32::consts::PI};

use crate::prelude::*;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

/// An item stored in the [SpatialHashGrid] along with its position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialEntry<T> {
	/// The stored item
	item: T,
	/// World position of the item when the grid was built
	position: Vec2,
}

impl<T: Copy> SpatialEntry<T> {
	/// Create a new instance of [SpatialEntry]
	pub fn new(item: T, position: Vec2) -> Self {
		SpatialEntry { item, position }
	}
	/// The stored item
	pub fn get_item(&self) -> T {
		self.item
	}
	/// World position of the item
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
}

/// Orders candidates of a k-nearest query by distance, ties go to the earliest found
#[derive(Clone, Copy, Debug)]
struct RankedCandidate {
	/// Squared distance to the query centre
	distance_squared: f32,
	/// Position of the candidate in the list of found entries
	index: usize,
}

impl PartialEq for RankedCandidate {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl Eq for RankedCandidate {}
impl PartialOrd for RankedCandidate {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for RankedCandidate {
	fn cmp(&self, other: &Self) -> Ordering {
		self.distance_squared
			.total_cmp(&other.distance_squared)
			.then(self.index.cmp(&other.index))
	}
}

/// Buckets items by `floor(position / cell_size)`
pub struct SpatialHashGrid<T> {
	/// World space length of one side of a bucket
	cell_size: f32,
	/// Upper bound on entries per bucket, exceeding it is fatal
	bucket_budget: Option<usize>,
	/// Occupied buckets
	buckets: HashMap<IVec2, Vec<SpatialEntry<T>>>,
	/// Number of entries inserted by the last build
	len: usize,
	/// Bucket key of every entry of the last build, kept to reuse the allocation
	keys: Vec<IVec2>,
}

impl<T: Copy + Send + Sync> SpatialHashGrid<T> {
	/// Create an empty grid with buckets of `cell_size x cell_size`
	pub fn new(cell_size: f32) -> Self {
		if !cell_size.is_finite() || cell_size <= 0.0 {
			panic!(
				"Spatial cell size `{}` is invalid, it must be a positive finite number",
				cell_size
			);
		}
		SpatialHashGrid {
			cell_size,
			bucket_budget: None,
			buckets: HashMap::new(),
			len: 0,
			keys: Vec::new(),
		}
	}
	/// Create a grid configured by [GridSettings]
	pub fn from_settings(settings: &GridSettings) -> Self {
		let grid = SpatialHashGrid::new(settings.get_spatial_cell_size());
		match settings.get_spatial_bucket_budget() {
			Some(budget) => grid.with_bucket_budget(budget),
			None => grid,
		}
	}
	/// Treat more than `budget` entries in one bucket as fatal
	pub fn with_bucket_budget(mut self, budget: usize) -> Self {
		self.bucket_budget = Some(budget);
		self
	}
	/// World space length of one side of a bucket
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Change the bucket size, takes effect on the next build
	pub fn set_cell_size(&mut self, cell_size: f32) {
		if !cell_size.is_finite() || cell_size <= 0.0 {
			panic!(
				"Spatial cell size `{}` is invalid, it must be a positive finite number",
				cell_size
			);
		}
		self.cell_size = cell_size;
	}
	/// Number of entries
	pub fn len(&self) -> usize {
		self.len
	}
	/// Whether the grid holds no entries
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
	/// Number of occupied buckets
	pub fn get_bucket_count(&self) -> usize {
		self.buckets.len()
	}
	/// Key of the bucket containing `position`
	pub fn get_bucket_key(&self, position: Vec2) -> IVec2 {
		bucket_key(self.cell_size, position)
	}
	/// Entries within a bucket
	pub fn get_bucket(&self, key: IVec2) -> &[SpatialEntry<T>] {
		self.buckets
			.get(&key)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}
	/// Clear the grid and insert every `(item, position)` pair. Bucket keys are computed in parallel.
	///
	/// The bucket size is not a parameter, it is the one given to
	/// [SpatialHashGrid::new] or the latest [SpatialHashGrid::set_cell_size]
	pub fn build_grid(&mut self, entries: &[(T, Vec2)]) {
		self.buckets.clear();
		// keep the load factor at or below one half
		self.buckets.reserve(entries.len() * 2);
		self.keys.clear();
		self.keys.resize(entries.len(), IVec2::ZERO);

		let cell_size = self.cell_size;
		let pool = ComputeTaskPool::get_or_init(TaskPool::default);
		let batch_size = entries.len().div_ceil(pool.thread_num().max(1)).max(1);
		pool.scope(|scope| {
			for (keys, batch) in self.keys.chunks_mut(batch_size).zip(entries.chunks(batch_size)) {
				scope.spawn(async move {
					for (key, (_, position)) in keys.iter_mut().zip(batch.iter()) {
						*key = bucket_key(cell_size, *position);
					}
				});
			}
		});

		for ((item, position), key) in entries.iter().zip(self.keys.iter()) {
			let bucket = self.buckets.entry(*key).or_default();
			if let Some(budget) = self.bucket_budget {
				if bucket.len() >= budget {
					panic!(
						"Spatial bucket {:?} exceeded its budget of {} entries",
						key, budget
					);
				}
			}
			bucket.push(SpatialEntry::new(*item, *position));
		}
		self.len = entries.len();
		trace!(
			"Spatial grid rebuilt with {} entries across {} buckets",
			self.len,
			self.buckets.len()
		);
	}
	/// Call `visit` for every bucket which could hold an entry within `radius` of `center`
	fn visit_buckets(&self, center: Vec2, radius: f32, mut visit: impl FnMut(IVec2, &[SpatialEntry<T>])) {
		if !radius.is_finite() || radius < 0.0 {
			return;
		}
		let min = self.get_bucket_key(center - Vec2::splat(radius));
		let max = self.get_bucket_key(center + Vec2::splat(radius));
		let span = (max.x as i64 - min.x as i64 + 1) * (max.y as i64 - min.y as i64 + 1);
		if span > self.buckets.len() as i64 {
			// fewer occupied buckets than keys in range, walk the buckets instead,
			// sorted to visit in the same row-major order as the dense walk
			let mut keys: Vec<IVec2> = self
				.buckets
				.keys()
				.filter(|key| key.x >= min.x && key.x <= max.x && key.y >= min.y && key.y <= max.y)
				.copied()
				.collect();
			keys.sort_unstable_by_key(|key| (key.y, key.x));
			for key in keys {
				if let Some(bucket) = self.buckets.get(&key) {
					visit(key, bucket);
				}
			}
		} else {
			for y in min.y..=max.y {
				for x in min.x..=max.x {
					let key = IVec2::new(x, y);
					if let Some(bucket) = self.buckets.get(&key) {
						visit(key, bucket);
					}
				}
			}
		}
	}
	/// Call `found` with every entry within `radius` of `center` and its squared distance
	fn for_each_in_radius(
		&self,
		center: Vec2,
		radius: f32,
		mut found: impl FnMut(&SpatialEntry<T>, f32),
	) {
		let radius_squared = radius * radius;
		self.visit_buckets(center, radius, |_, bucket| {
			for entry in bucket {
				let distance_squared = entry.position.distance_squared(center);
				if distance_squared <= radius_squared {
					found(entry, distance_squared);
				}
			}
		});
	}
	/// Call `found` with every entry within the cone and its squared distance. A
	/// zero-length `direction` matches nothing and an entry exactly at `center` always matches
	fn for_each_in_cone(
		&self,
		center: Vec2,
		radius: f32,
		direction: Vec2,
		half_angle: f32,
		mut found: impl FnMut(&SpatialEntry<T>, f32),
	) {
		if half_angle >= PI {
			self.for_each_in_radius(center, radius, found);
			return;
		}
		let Some(direction) = direction.try_normalize() else {
			warn!("Cone query at {:?} has no direction, nothing can match", center);
			return;
		};
		let cos_half_angle = half_angle.cos();
		let radius_squared = radius * radius;
		let half_diagonal = self.cell_size * std::f32::consts::FRAC_1_SQRT_2;
		self.visit_buckets(center, radius, |key, bucket| {
			if !self.bucket_may_intersect_cone(key, center, direction, half_angle, half_diagonal) {
				return;
			}
			for entry in bucket {
				let offset = entry.position - center;
				let distance_squared = offset.length_squared();
				if distance_squared > radius_squared {
					continue;
				}
				if distance_squared == 0.0
					|| offset.dot(direction) >= distance_squared.sqrt() * cos_half_angle
				{
					found(entry, distance_squared);
				}
			}
		});
	}
	/// Conservative angular test of a whole bucket. Every point of the bucket
	/// lies within `half_diagonal` of its centre, seen from `center` that disc
	/// spans at most `asin(half_diagonal / distance)` either side of the centre
	fn bucket_may_intersect_cone(
		&self,
		key: IVec2,
		center: Vec2,
		direction: Vec2,
		half_angle: f32,
		half_diagonal: f32,
	) -> bool {
		let bucket_centre = (key.as_vec2() + Vec2::splat(0.5)) * self.cell_size;
		let offset = bucket_centre - center;
		let distance = offset.length();
		if distance <= half_diagonal {
			return true;
		}
		let angle = (offset.dot(direction) / distance).clamp(-1.0, 1.0).acos();
		let slack = (half_diagonal / distance).asin();
		angle <= half_angle + slack
	}
	/// Append every entry within `radius` of `center` to `out`
	pub fn query_radius_all(&self, center: Vec2, radius: f32, out: &mut Vec<SpatialEntry<T>>) {
		self.for_each_in_radius(center, radius, |entry, _| out.push(*entry));
	}
	/// The entry nearest to `center` within `radius`. Ties go to the entry in
	/// the lowest bucket (by row then column), then to the earliest inserted
	pub fn query_radius_closest(&self, center: Vec2, radius: f32) -> Option<SpatialEntry<T>> {
		let mut closest: Option<(f32, SpatialEntry<T>)> = None;
		self.for_each_in_radius(center, radius, |entry, distance_squared| {
			if closest.is_none_or(|(best, _)| distance_squared < best) {
				closest = Some((distance_squared, *entry));
			}
		});
		closest.map(|(_, entry)| entry)
	}
	/// Append every entry within `radius` of `center` whose bearing lies within
	/// `half_angle` radians of `direction` to `out`
	pub fn query_cone_all(
		&self,
		center: Vec2,
		radius: f32,
		direction: Vec2,
		half_angle: f32,
		out: &mut Vec<SpatialEntry<T>>,
	) {
		self.for_each_in_cone(center, radius, direction, half_angle, |entry, _| {
			out.push(*entry)
		});
	}
	/// The entry nearest to `center` within the cone
	pub fn query_cone_closest(
		&self,
		center: Vec2,
		radius: f32,
		direction: Vec2,
		half_angle: f32,
	) -> Option<SpatialEntry<T>> {
		let mut closest: Option<(f32, SpatialEntry<T>)> = None;
		self.for_each_in_cone(center, radius, direction, half_angle, |entry, distance_squared| {
			if closest.is_none_or(|(best, _)| distance_squared < best) {
				closest = Some((distance_squared, *entry));
			}
		});
		closest.map(|(_, entry)| entry)
	}
	/// Up to `k` entries within `radius` of `center`, nearest first
	pub fn query_k_nearest(&self, center: Vec2, radius: f32, k: usize) -> Vec<SpatialEntry<T>> {
		if k == 0 {
			return Vec::new();
		}
		let mut heap = PriorityHeap::new(k, HeapOrder::Max);
		let mut candidates = Vec::new();
		self.for_each_in_radius(center, radius, |entry, distance_squared| {
			let ranked = RankedCandidate {
				distance_squared,
				index: candidates.len(),
			};
			if heap.is_full() {
				if heap.peek().is_some_and(|worst| ranked < *worst) {
					heap.pop();
				} else {
					return;
				}
			}
			candidates.push(*entry);
			heap.push(ranked);
		});
		let mut nearest: Vec<SpatialEntry<T>> = heap
			.into_sorted_vec()
			.into_iter()
			.map(|ranked| candidates[ranked.index])
			.collect();
		nearest.reverse();
		nearest
	}
}

/// Key of the bucket containing `position`
fn bucket_key(cell_size: f32, position: Vec2) -> IVec2 {
	(position / cell_size).floor().as_ivec2()
}
