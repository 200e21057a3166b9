//! The [ChunkRegistry] maps each [ChunkID] to a stable slot within a
//! contiguous arena of [GridChunk]s and their [FlowField]s.
//!
//! Slots are handed out in registration order and are never removed. When a
//! chunk is registered a larger arena is built off to the side holding copies
//! of every existing chunk plus the new one, the new arena is installed in a
//! single swap and the old one is released afterwards. Growth requires
//! exclusive access to the registry so a reader can never observe a
//! partially copied arena.
//!

use std::collections::HashMap;

use crate::prelude::*;
use bevy::prelude::*;

/// Slots of the 8 chunks surrounding a chunk in [Ordinal::ENUMERATION] order, `None` where no chunk has been registered
pub type ChunkNeighbours = [Option<usize>; 8];

/// Backing storage of every registered chunk, each array is indexed by slot
#[derive(Default, Clone)]
pub(crate) struct ChunkArena {
	/// The [ChunkID] occupying each slot
	pub(crate) ids: Box<[ChunkID]>,
	/// Solver inputs
	pub(crate) chunks: Box<[GridChunk]>,
	/// Solver outputs visible to readers
	pub(crate) flow: Box<[FlowField]>,
	/// Solver outputs being written by an in-progress pass
	pub(crate) scratch: Box<[FlowField]>,
	/// Slots of the surrounding chunks
	pub(crate) neighbours: Box<[ChunkNeighbours]>,
}

/// Resolve the neighbour of a cell in the direction of `ordinal` into its
/// `(slot, index)`, crossing into surrounding chunks where needed. `None` when
/// the neighbour lies in an unregistered chunk
pub(crate) fn resolve_neighbour(
	neighbours: &[ChunkNeighbours],
	slot: usize,
	field_cell: FieldCell,
	ordinal: Ordinal,
) -> Option<(usize, usize)> {
	let (chunk_offset, neighbour) = field_cell.step(ordinal);
	let neighbour_slot = match Ordinal::from_offset(chunk_offset).get_enumeration_index() {
		None => Some(slot),
		Some(i) => neighbours[slot][i],
	}?;
	Some((neighbour_slot, neighbour.get_index()))
}

/// Owns every registered chunk of the world
pub struct ChunkRegistry {
	/// World space length of one side of a cell
	cell_size: f32,
	/// Append-only lookup from chunk to slot
	slots: HashMap<ChunkID, usize>,
	/// Chunk storage
	arena: ChunkArena,
}

impl ChunkRegistry {
	/// Create an empty [ChunkRegistry] where each cell covers `cell_size x cell_size` units of world space
	pub fn new(cell_size: f32) -> Self {
		if !cell_size.is_finite() || cell_size <= 0.0 {
			panic!(
				"Cell size `{}` is invalid, it must be a positive finite number",
				cell_size
			);
		}
		ChunkRegistry {
			cell_size,
			slots: HashMap::new(),
			arena: ChunkArena::default(),
		}
	}
	/// World space length of one side of a cell
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Number of registered chunks
	pub fn len(&self) -> usize {
		self.arena.ids.len()
	}
	/// Whether any chunk has been registered
	pub fn is_empty(&self) -> bool {
		self.arena.ids.is_empty()
	}
	/// Registered chunks in slot order
	pub fn get_chunk_ids(&self) -> &[ChunkID] {
		&self.arena.ids
	}
	/// Get the slot of a chunk if it has been registered
	pub fn get_slot(&self, chunk_id: &ChunkID) -> Option<usize> {
		self.slots.get(chunk_id).copied()
	}
	/// Whether a chunk has been registered
	pub fn contains(&self, chunk_id: &ChunkID) -> bool {
		self.slots.contains_key(chunk_id)
	}
	/// Register a chunk, growing the arena by one fresh chunk. If the chunk
	/// is already registered its existing slot is returned and nothing changes
	pub fn register_chunk(&mut self, chunk_id: ChunkID) -> usize {
		if let Some(slot) = self.get_slot(&chunk_id) {
			debug!("Chunk {:?} is already registered in slot {}", chunk_id.get(), slot);
			return slot;
		}
		self.grow(&[chunk_id]);
		self.len() - 1
	}
	/// Register several chunks growing the arena only once. Returns the slot of each requested chunk in order
	pub fn register_chunks(&mut self, chunk_ids: &[ChunkID]) -> Vec<usize> {
		let mut fresh: Vec<ChunkID> = Vec::new();
		for id in chunk_ids {
			if !self.contains(id) && !fresh.contains(id) {
				fresh.push(*id);
			}
		}
		if !fresh.is_empty() {
			self.grow(&fresh);
		}
		chunk_ids
			.iter()
			.filter_map(|id| self.get_slot(id))
			.collect()
	}
	/// Build a larger arena holding copies of the existing chunks plus fresh
	/// chunks for `fresh_ids`, then swap it in
	fn grow(&mut self, fresh_ids: &[ChunkID]) {
		let old_len = self.len();
		let new_len = old_len + fresh_ids.len();

		let mut ids = Vec::with_capacity(new_len);
		ids.extend_from_slice(&self.arena.ids);
		ids.extend_from_slice(fresh_ids);

		let mut chunks = Vec::with_capacity(new_len);
		chunks.extend_from_slice(&self.arena.chunks);
		chunks.resize(new_len, GridChunk::default());

		let mut flow = Vec::with_capacity(new_len);
		flow.extend_from_slice(&self.arena.flow);
		flow.resize(new_len, FlowField::default());

		let scratch = vec![FlowField::default(); new_len];

		let mut neighbours = Vec::with_capacity(new_len);
		neighbours.extend_from_slice(&self.arena.neighbours);
		neighbours.resize(new_len, [None; 8]);

		for (offset, id) in fresh_ids.iter().enumerate() {
			self.slots.insert(*id, old_len + offset);
		}
		for (offset, id) in fresh_ids.iter().enumerate() {
			let slot = old_len + offset;
			for (i, ordinal) in Ordinal::ENUMERATION.iter().enumerate() {
				if let Some(&other) = self.slots.get(&id.get_neighbour(*ordinal)) {
					neighbours[slot][i] = Some(other);
					if let Some(back) = ordinal.inverse().get_enumeration_index() {
						neighbours[other][back] = Some(slot);
					}
				}
			}
		}

		let previous = std::mem::replace(
			&mut self.arena,
			ChunkArena {
				ids: ids.into_boxed_slice(),
				chunks: chunks.into_boxed_slice(),
				flow: flow.into_boxed_slice(),
				scratch: scratch.into_boxed_slice(),
				neighbours: neighbours.into_boxed_slice(),
			},
		);
		drop(previous);
		debug!(
			"Chunk arena grew from {} to {} chunks, added {:?}",
			old_len,
			new_len,
			fresh_ids.iter().map(|id| id.get()).collect::<Vec<_>>()
		);
	}
	/// Get the solver inputs of a chunk
	pub fn get_chunk(&self, chunk_id: &ChunkID) -> Option<&GridChunk> {
		self.get_slot(chunk_id).map(|slot| &self.arena.chunks[slot])
	}
	/// Get the solved [FlowField] of a chunk
	pub fn get_flow_field(&self, chunk_id: &ChunkID) -> Option<&FlowField> {
		self.get_slot(chunk_id).map(|slot| &self.arena.flow[slot])
	}
	/// Get the slots of the chunks surrounding a chunk
	pub fn get_chunk_neighbours(&self, chunk_id: &ChunkID) -> Option<&ChunkNeighbours> {
		self.get_slot(chunk_id).map(|slot| &self.arena.neighbours[slot])
	}
	/// Forget every solved distance and direction, the field floods out from
	/// the targets again over the following passes
	pub fn reset_flow(&mut self) {
		for field in self.arena.flow.iter_mut() {
			*field = FlowField::default();
		}
	}
	/// Write access to the arena, the slot layout must not be changed through it
	pub(crate) fn get_arena_mut(&mut self) -> &mut ChunkArena {
		&mut self.arena
	}
	/// Resolve a global cell into its `(slot, index)` if its chunk is registered
	pub fn get_cell_location(&self, grid_cell: GridCell) -> Option<(usize, usize)> {
		let (chunk_id, field_cell) = grid_cell.get_chunk_and_field();
		self.get_slot(&chunk_id)
			.map(|slot| (slot, field_cell.get_index()))
	}
	/// Find the global cell containing a world `position`
	pub fn world_to_grid_cell(&self, position: Vec2) -> GridCell {
		let scaled = (position / self.cell_size).floor();
		GridCell::new(scaled.x as i32, scaled.y as i32)
	}
	/// Find the chunk and the cell within it containing a world `position`
	pub fn world_to_cell(&self, position: Vec2) -> (ChunkID, FieldCell) {
		self.world_to_grid_cell(position).get_chunk_and_field()
	}
	/// World position of the centre of a cell
	pub fn cell_to_world(&self, chunk_id: ChunkID, field_cell: FieldCell) -> Vec2 {
		let grid_cell = GridCell::from_chunk_and_field(chunk_id, field_cell);
		Vec2::new(
			(grid_cell.get_column() as f32 + 0.5) * self.cell_size,
			(grid_cell.get_row() as f32 + 0.5) * self.cell_size,
		)
	}
	/// Every global cell overlapped by the world space rectangle spanning `min` to `max`, handy for describing footprints
	pub fn get_cells_in_rect(&self, min: Vec2, max: Vec2) -> Vec<GridCell> {
		let lower = self.world_to_grid_cell(min.min(max));
		let upper = self.world_to_grid_cell(min.max(max));
		let mut cells = Vec::new();
		for row in lower.get_row()..=upper.get_row() {
			for column in lower.get_column()..=upper.get_column() {
				cells.push(GridCell::new(column, row));
			}
		}
		cells
	}
	/// Whether an agent can stand on a cell, cells of unregistered chunks are never walkable
	pub fn is_walkable(&self, grid_cell: GridCell) -> bool {
		self.get_cell_location(grid_cell)
			.is_some_and(|(slot, index)| !self.arena.chunks[slot].is_blocked_at(index))
	}
	/// Direction an agent at `position` should step in, [Ordinal::Zero] outside the registered grid
	pub fn get_direction_at(&self, position: Vec2) -> Ordinal {
		match self.get_cell_location(self.world_to_grid_cell(position)) {
			Some((slot, index)) => {
				convert_bits_dir_to_ordinal(self.arena.flow[slot].get_direction_bits_at(index))
			}
			None => Ordinal::Zero,
		}
	}
	/// Distance from `position` to the nearest target, [UNREACHABLE] outside the registered grid
	pub fn get_distance_at(&self, position: Vec2) -> u32 {
		match self.get_cell_location(self.world_to_grid_cell(position)) {
			Some((slot, index)) => self.arena.flow[slot].get_distance_at(index),
			None => UNREACHABLE,
		}
	}
	/// Whether an agent at `position` has nowhere left to go, its cell has no
	/// heading yet is reachable (in practice a target cell)
	pub fn is_arrived(&self, position: Vec2) -> bool {
		match self.get_cell_location(self.world_to_grid_cell(position)) {
			Some((slot, index)) => {
				let flow = &self.arena.flow[slot];
				flow.get_distance_at(index) != UNREACHABLE
					&& convert_bits_dir_to_ordinal(flow.get_direction_bits_at(index))
						== Ordinal::Zero
			}
			None => false,
		}
	}
}
