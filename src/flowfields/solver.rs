//! Relaxes the flow field of every registered chunk towards the nearest
//! target.
//!
//! Each pass is a Jacobi sweep: every cell is recomputed purely from the
//! previous pass's distances, so chunks are processed in parallel on the
//! [ComputeTaskPool] and written to a scratch buffer. Once every chunk has
//! been processed the scratch buffer is swapped in as the new visible field.
//!
//! A single pass only propagates distances by one cell, the field is an
//! anytime approximation that converges over several ticks after a change
//!

use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

use crate::flowfields::chunks::chunk_registry::{resolve_neighbour, ChunkArena, ChunkNeighbours};
use crate::prelude::*;

/// Parameters of the relaxation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowFieldSolver {
	/// Number of relaxation passes performed by [FlowFieldSolver::solve]
	passes_per_tick: u32,
	/// Whether a diagonal step may squeeze between two unwalkable orthogonal neighbours
	allow_corner_cutting: bool,
}

impl Default for FlowFieldSolver {
	fn default() -> Self {
		FlowFieldSolver {
			passes_per_tick: 1,
			allow_corner_cutting: false,
		}
	}
}

/// Read-only view of the arena shared by every task of a pass
struct PassInputs<'a> {
	/// Solver inputs by slot
	chunks: &'a [GridChunk],
	/// Results of the previous pass by slot
	flow: &'a [FlowField],
	/// Surrounding chunks by slot
	neighbours: &'a [ChunkNeighbours],
	/// See [FlowFieldSolver::allow_corner_cutting]
	allow_corner_cutting: bool,
}

impl PassInputs<'_> {
	/// Recompute every cell of the chunk in `slot` into `output`, returns whether anything differs from the previous pass
	fn relax_chunk(&self, slot: usize, output: &mut FlowField) -> bool {
		let chunk = &self.chunks[slot];
		let previous = &self.flow[slot];
		let no_heading = convert_ordinal_to_bits_dir(Ordinal::Zero);
		let mut changed = false;
		for index in 0..CHUNK_CELL_COUNT {
			let (distance, direction) = if chunk.is_target_at(index) {
				(0, no_heading)
			} else if chunk.is_blocked_at(index) {
				(UNREACHABLE, previous.get_direction_bits_at(index))
			} else {
				self.relax_cell(slot, index)
			};
			if distance != previous.get_distance_at(index)
				|| direction != previous.get_direction_bits_at(index)
			{
				changed = true;
			}
			output.set_cell(index, distance, direction);
		}
		changed
	}
	/// Find the cheapest reachable neighbour of a walkable, non-target cell
	fn relax_cell(&self, slot: usize, index: usize) -> (u32, u8) {
		let field_cell = FieldCell::from_index(index);
		let mut best = UNREACHABLE;
		let mut best_neighbour = UNREACHABLE;
		let mut heading = Ordinal::Zero;
		for ordinal in Ordinal::ENUMERATION {
			let Some((n_slot, n_index)) = resolve_neighbour(self.neighbours, slot, field_cell, ordinal)
			else {
				continue;
			};
			// blocked cells carry UNREACHABLE unless they are also targets
			let neighbour_distance = self.flow[n_slot].get_distance_at(n_index);
			if neighbour_distance == UNREACHABLE {
				continue;
			}
			if !self.allow_corner_cutting && self.is_corner_cut(slot, field_cell, ordinal) {
				continue;
			}
			let step = self.chunks[n_slot]
				.get_step_cost_at(n_index)
				.saturating_mul(ordinal.get_step_weight());
			let candidate = neighbour_distance.saturating_add(step);
			// strict so the first neighbour in enumeration order wins a tie
			if candidate < best {
				best = candidate;
				best_neighbour = neighbour_distance;
				heading = ordinal;
			}
		}
		if best == UNREACHABLE {
			return (UNREACHABLE, convert_ordinal_to_bits_dir(Ordinal::Zero));
		}
		// a negative bias may pull a cell down towards its heading but never to
		// or below it, headings must always lead strictly downhill to a target
		let bias = self.chunks[slot].get_distance_bias_at(index) as i64;
		let floor = best_neighbour as i64 + 1;
		let distance = (best as i64 + bias)
			.max(floor)
			.clamp(1, UNREACHABLE as i64 - 1) as u32;
		(distance, convert_ordinal_to_bits_dir(heading))
	}
	/// A diagonal step is blocked when both orthogonals either side of it are not walkable, i.e
	/// ```text
	///   X ~ <- ignore diagonal from o
	///   o X
	/// ```
	fn is_corner_cut(&self, slot: usize, field_cell: FieldCell, ordinal: Ordinal) -> bool {
		match ordinal.get_flanking_orthogonals() {
			Some((first, second)) => {
				!self.is_walkable(slot, field_cell, first) && !self.is_walkable(slot, field_cell, second)
			}
			None => false,
		}
	}
	/// Whether the neighbour in the direction of `ordinal` exists and is not blocked
	fn is_walkable(&self, slot: usize, field_cell: FieldCell, ordinal: Ordinal) -> bool {
		resolve_neighbour(self.neighbours, slot, field_cell, ordinal)
			.is_some_and(|(n_slot, n_index)| !self.chunks[n_slot].is_blocked_at(n_index))
	}
}

impl FlowFieldSolver {
	/// Create a new instance of [FlowFieldSolver]
	pub fn new(passes_per_tick: u32, allow_corner_cutting: bool) -> Self {
		if passes_per_tick == 0 {
			panic!("A FlowFieldSolver must perform at least one pass per tick");
		}
		FlowFieldSolver {
			passes_per_tick,
			allow_corner_cutting,
		}
	}
	/// Create a [FlowFieldSolver] from the grid settings
	pub fn from_settings(settings: &GridSettings) -> Self {
		FlowFieldSolver::new(
			settings.get_passes_per_tick(),
			settings.get_allow_corner_cutting(),
		)
	}
	/// Number of passes run by [FlowFieldSolver::solve]
	pub fn get_passes_per_tick(&self) -> u32 {
		self.passes_per_tick
	}
	/// Whether diagonal steps may cut between two unwalkable cells
	pub fn get_allow_corner_cutting(&self) -> bool {
		self.allow_corner_cutting
	}
	/// Run the per-tick number of relaxation passes. Returns whether any cell changed
	pub fn solve(&self, registry: &mut ChunkRegistry) -> bool {
		let mut changed = false;
		for _ in 0..self.passes_per_tick {
			changed |= self.relax_pass(registry);
		}
		changed
	}
	/// Relax until a pass changes nothing or `max_passes` have been run. Returns the number of passes performed
	pub fn solve_until_stable(&self, registry: &mut ChunkRegistry, max_passes: u32) -> u32 {
		let mut passes = 0;
		while passes < max_passes {
			passes += 1;
			if !self.relax_pass(registry) {
				break;
			}
		}
		debug!("Flow field settled after {} passes", passes);
		passes
	}
	/// A single Jacobi pass over every registered chunk. Returns whether any cell changed
	pub fn relax_pass(&self, registry: &mut ChunkRegistry) -> bool {
		let ChunkArena {
			chunks,
			flow,
			scratch,
			neighbours,
			..
		} = registry.get_arena_mut();
		if chunks.is_empty() {
			return false;
		}
		let inputs = PassInputs {
			chunks: &chunks[..],
			flow: &flow[..],
			neighbours: &neighbours[..],
			allow_corner_cutting: self.allow_corner_cutting,
		};
		let pool = ComputeTaskPool::get_or_init(TaskPool::default);
		let batch_size = scratch.len().div_ceil(pool.thread_num().max(1)).max(1);
		let results: Vec<bool> = pool.scope(|scope| {
			for (batch, outputs) in scratch.chunks_mut(batch_size).enumerate() {
				let inputs = &inputs;
				scope.spawn(async move {
					let mut changed = false;
					for (offset, output) in outputs.iter_mut().enumerate() {
						changed |= inputs.relax_chunk(batch * batch_size + offset, output);
					}
					changed
				});
			}
		});
		std::mem::swap(flow, scratch);
		let changed = results.into_iter().any(|c| c);
		trace!("Relaxation pass complete, changed: {}", changed);
		changed
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	fn single_chunk() -> ChunkRegistry {
		let mut registry = ChunkRegistry::new(1.0);
		registry.register_chunk(ChunkID::new(0, 0));
		registry
	}
	fn set_target(registry: &mut ChunkRegistry, field: FieldCell) {
		registry.get_arena_mut().chunks[0].get_targets_mut()[field.get_index()] = true;
	}
	fn set_blocked(registry: &mut ChunkRegistry, field: FieldCell) {
		registry.get_arena_mut().chunks[0].get_blocked_mut()[field.get_index()] = true;
	}
	fn flow(registry: &ChunkRegistry) -> &FlowField {
		registry.get_flow_field(&ChunkID::new(0, 0)).unwrap()
	}
	#[test]
	fn target_is_stable_across_passes() {
		let mut registry = single_chunk();
		let target = FieldCell::new(4, 9);
		set_target(&mut registry, target);
		let solver = FlowFieldSolver::default();
		for _ in 0..5 {
			solver.relax_pass(&mut registry);
			assert_eq!(0, flow(&registry).get_distance(target));
			assert_eq!(Ordinal::Zero, flow(&registry).get_direction(target));
		}
	}
	#[test]
	fn neighbours_point_at_target() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(5, 5));
		let solver = FlowFieldSolver::default();
		// first pass writes the target, second pass reaches its neighbours
		solver.relax_pass(&mut registry);
		solver.relax_pass(&mut registry);
		let east = FieldCell::new(6, 5);
		assert_eq!(
			BASE_MOVEMENT_COST as u32 * ORTHOGONAL_STEP_WEIGHT,
			flow(&registry).get_distance(east)
		);
		assert_eq!(Ordinal::West, flow(&registry).get_direction(east));
		let north_east = FieldCell::new(6, 6);
		assert_eq!(
			BASE_MOVEMENT_COST as u32 * DIAGONAL_STEP_WEIGHT,
			flow(&registry).get_distance(north_east)
		);
		assert_eq!(Ordinal::SouthWest, flow(&registry).get_direction(north_east));
	}
	#[test]
	fn tie_goes_to_first_in_enumeration() {
		let mut registry = single_chunk();
		// two targets equally far from (5, 5), north is inspected before south
		set_target(&mut registry, FieldCell::new(5, 6));
		set_target(&mut registry, FieldCell::new(5, 4));
		let solver = FlowFieldSolver::default();
		solver.solve_until_stable(&mut registry, 64);
		assert_eq!(Ordinal::North, flow(&registry).get_direction(FieldCell::new(5, 5)));
	}
	#[test]
	fn blocked_cell_is_unreachable() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(0, 0));
		let wall = FieldCell::new(1, 0);
		set_blocked(&mut registry, wall);
		FlowFieldSolver::default().solve_until_stable(&mut registry, 64);
		assert_eq!(UNREACHABLE, flow(&registry).get_distance(wall));
	}
	#[test]
	fn enclosed_cell_has_no_heading() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(0, 0));
		let inside = FieldCell::new(8, 8);
		for ordinal in Ordinal::ENUMERATION {
			let (_, wall) = inside.step(ordinal);
			set_blocked(&mut registry, wall);
		}
		FlowFieldSolver::default().solve_until_stable(&mut registry, 64);
		assert_eq!(UNREACHABLE, flow(&registry).get_distance(inside));
		assert_eq!(Ordinal::Zero, flow(&registry).get_direction(inside));
	}
	#[test]
	fn corner_cutting_is_blocked_by_default() {
		let mut registry = single_chunk();
		// target at (1, 1), walls either side of the diagonal from (0, 0)
		set_target(&mut registry, FieldCell::new(1, 1));
		set_blocked(&mut registry, FieldCell::new(1, 0));
		set_blocked(&mut registry, FieldCell::new(0, 1));
		let origin = FieldCell::new(0, 0);
		FlowFieldSolver::default().solve_until_stable(&mut registry, 64);
		assert_eq!(UNREACHABLE, flow(&registry).get_distance(origin));

		let mut cutting = single_chunk();
		set_target(&mut cutting, FieldCell::new(1, 1));
		set_blocked(&mut cutting, FieldCell::new(1, 0));
		set_blocked(&mut cutting, FieldCell::new(0, 1));
		FlowFieldSolver::new(1, true).solve_until_stable(&mut cutting, 64);
		assert_eq!(Ordinal::NorthEast, flow(&cutting).get_direction(origin));
	}
	#[test]
	fn surcharge_steers_around_expensive_cell() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(5, 5));
		// make the western neighbour of the target costly to step onto
		registry.get_arena_mut().chunks[0].get_movement_costs_mut()
			[FieldCell::new(4, 5).get_index()] = 10_000;
		FlowFieldSolver::default().solve_until_stable(&mut registry, 64);
		// from (3, 5) the cheapest route avoids (4, 5)
		let direction = flow(&registry).get_direction(FieldCell::new(3, 5));
		assert_ne!(Ordinal::East, direction);
	}
	#[test]
	fn distance_bias_is_added() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(0, 0));
		let biased = FieldCell::new(1, 0);
		registry.get_arena_mut().chunks[0].get_distance_biases_mut()[biased.get_index()] = 250;
		let solver = FlowFieldSolver::default();
		solver.relax_pass(&mut registry);
		solver.relax_pass(&mut registry);
		assert_eq!(1000 + 250, flow(&registry).get_distance(biased));
	}
	#[test]
	fn blocked_target_still_attracts() {
		let mut registry = single_chunk();
		let building = FieldCell::new(8, 8);
		set_target(&mut registry, building);
		set_blocked(&mut registry, building);
		FlowFieldSolver::default().solve_until_stable(&mut registry, 64);
		assert_eq!(0, flow(&registry).get_distance(building));
		let east = FieldCell::new(9, 8);
		assert_eq!(1000, flow(&registry).get_distance(east));
		assert_eq!(Ordinal::West, flow(&registry).get_direction(east));
	}
	#[test]
	fn negative_bias_never_undercuts_heading() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(0, 0));
		let lure = FieldCell::new(10, 10);
		registry.get_arena_mut().chunks[0].get_distance_biases_mut()[lure.get_index()] = -5000;
		let solver = FlowFieldSolver::default();
		let passes = solver.solve_until_stable(&mut registry, 512);
		assert!(passes < 512);
		// one more than the diagonal neighbour it points at
		assert_eq!(12_601, flow(&registry).get_distance(lure));
		assert_eq!(Ordinal::SouthWest, flow(&registry).get_direction(lure));
		// the lure is cheaper than open ground so its neighbour is drawn to it
		assert_eq!(
			Ordinal::SouthWest,
			flow(&registry).get_direction(FieldCell::new(11, 11))
		);
		for index in 1..CHUNK_CELL_COUNT {
			let cell = FieldCell::from_index(index);
			let (_, next) = cell.step(flow(&registry).get_direction(cell));
			assert!(flow(&registry).get_distance(next) < flow(&registry).get_distance(cell));
		}
	}
	#[test]
	fn flow_crosses_chunk_boundaries() {
		let mut registry = ChunkRegistry::new(1.0);
		registry.register_chunk(ChunkID::new(0, 0));
		registry.register_chunk(ChunkID::new(-1, 0));
		set_target(&mut registry, FieldCell::new(0, 3));
		FlowFieldSolver::default().solve_until_stable(&mut registry, 128);
		let west = registry.get_flow_field(&ChunkID::new(-1, 0)).unwrap();
		let edge = FieldCell::new(CHUNK_RESOLUTION - 1, 3);
		assert_eq!(1000, west.get_distance(edge));
		assert_eq!(Ordinal::East, west.get_direction(edge));
	}
	#[test]
	fn stable_field_reports_no_change() {
		let mut registry = single_chunk();
		set_target(&mut registry, FieldCell::new(2, 2));
		let solver = FlowFieldSolver::default();
		let passes = solver.solve_until_stable(&mut registry, 256);
		assert!(passes < 256);
		assert!(!solver.relax_pass(&mut registry));
	}
	#[test]
	fn empty_registry_is_noop() {
		let mut registry = ChunkRegistry::new(1.0);
		assert!(!FlowFieldSolver::default().solve(&mut registry));
	}
	#[test]
	#[should_panic]
	fn zero_passes() {
		FlowFieldSolver::new(0, false);
	}
}
