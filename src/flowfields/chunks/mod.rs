//! The world is split into a series of `CHUNK_RESOLUTION x CHUNK_RESOLUTION`
//! chunks which are registered at runtime as the world grows outward. Each
//! chunk carries the per-cell inputs of the solver while the outputs live in
//! a [FlowField] stored alongside it
//!

pub mod chunk_registry;

use crate::prelude::*;

/// Unique ID of a chunk, chunks may sit at negative coordinates
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ChunkID((i32, i32));

impl ChunkID {
	/// Create a new instance of [ChunkID]
	pub fn new(column: i32, row: i32) -> Self {
		ChunkID((column, row))
	}
	/// Get the chunk `(column, row)` tuple
	pub fn get(&self) -> (i32, i32) {
		self.0
	}
	/// Get the chunk column
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the chunk row
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// The chunk offset from this one by `(column, row)`
	pub fn offset(&self, offset: (i32, i32)) -> Self {
		ChunkID((self.get_column() + offset.0, self.get_row() + offset.1))
	}
	/// The chunk one step away in the direction of `ordinal`
	pub fn get_neighbour(&self, ordinal: Ordinal) -> Self {
		self.offset(ordinal.get_offset())
	}
}

/// Global `(column, row)` coordinate of a cell, independent of the chunk that
/// stores it. Registrants describe the cells they cover with these
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct GridCell((i32, i32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: i32, row: i32) -> Self {
		GridCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get(&self) -> (i32, i32) {
		self.0
	}
	/// Get the column
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// Combine a chunk and a cell within it into a global coordinate
	pub fn from_chunk_and_field(chunk: ChunkID, field_cell: FieldCell) -> Self {
		let res = CHUNK_RESOLUTION as i32;
		GridCell((
			chunk.get_column() * res + field_cell.get_column() as i32,
			chunk.get_row() * res + field_cell.get_row() as i32,
		))
	}
	/// Split the global coordinate into the chunk storing it and the cell within that chunk
	pub fn get_chunk_and_field(&self) -> (ChunkID, FieldCell) {
		let res = CHUNK_RESOLUTION as i32;
		let chunk = ChunkID::new(
			self.get_column().div_euclid(res),
			self.get_row().div_euclid(res),
		);
		let field_cell = FieldCell::new(
			self.get_column().rem_euclid(res) as usize,
			self.get_row().rem_euclid(res) as usize,
		);
		(chunk, field_cell)
	}
}

/// Per-cell inputs of the solver for a single chunk. The arrays are derived
/// state, owned and rewritten by the contribution sets
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GridChunk {
	/// Cells which cannot be walked through
	blocked: [bool; CHUNK_CELL_COUNT],
	/// Cells agents are trying to reach
	targets: [bool; CHUNK_CELL_COUNT],
	/// Cost of stepping onto a cell, [BASE_MOVEMENT_COST] plus any surcharges
	movement_costs: [i32; CHUNK_CELL_COUNT],
	/// Added to the integrated distance of a cell after relaxation
	distance_biases: [i32; CHUNK_CELL_COUNT],
}

impl Default for GridChunk {
	fn default() -> Self {
		GridChunk {
			blocked: [false; CHUNK_CELL_COUNT],
			targets: [false; CHUNK_CELL_COUNT],
			movement_costs: [BASE_MOVEMENT_COST; CHUNK_CELL_COUNT],
			distance_biases: [0; CHUNK_CELL_COUNT],
		}
	}
}

impl GridChunk {
	/// Whether an agent can stand on the cell
	pub fn is_walkable(&self, field_cell: FieldCell) -> bool {
		!self.blocked[field_cell.get_index()]
	}
	/// Whether the cell is a target
	pub fn is_target(&self, field_cell: FieldCell) -> bool {
		self.targets[field_cell.get_index()]
	}
	/// Current movement cost of the cell
	pub fn get_movement_cost(&self, field_cell: FieldCell) -> i32 {
		self.movement_costs[field_cell.get_index()]
	}
	/// Current distance bias of the cell
	pub fn get_distance_bias(&self, field_cell: FieldCell) -> i32 {
		self.distance_biases[field_cell.get_index()]
	}
	/// Blocked flag of the cell at a flat `index`
	pub(crate) fn is_blocked_at(&self, index: usize) -> bool {
		self.blocked[index]
	}
	/// Target flag of the cell at a flat `index`
	pub(crate) fn is_target_at(&self, index: usize) -> bool {
		self.targets[index]
	}
	/// Movement cost of the cell at a flat `index` clamped to [MIN_MOVEMENT_COST]
	pub(crate) fn get_step_cost_at(&self, index: usize) -> u32 {
		self.movement_costs[index].max(MIN_MOVEMENT_COST) as u32
	}
	/// Distance bias of the cell at a flat `index`
	pub(crate) fn get_distance_bias_at(&self, index: usize) -> i32 {
		self.distance_biases[index]
	}
	/// Mutable access to the blocked layer
	pub(crate) fn get_blocked_mut(&mut self) -> &mut [bool; CHUNK_CELL_COUNT] {
		&mut self.blocked
	}
	/// Mutable access to the target layer
	pub(crate) fn get_targets_mut(&mut self) -> &mut [bool; CHUNK_CELL_COUNT] {
		&mut self.targets
	}
	/// Mutable access to the movement cost layer
	pub(crate) fn get_movement_costs_mut(&mut self) -> &mut [i32; CHUNK_CELL_COUNT] {
		&mut self.movement_costs
	}
	/// Mutable access to the distance bias layer
	pub(crate) fn get_distance_biases_mut(&mut self) -> &mut [i32; CHUNK_CELL_COUNT] {
		&mut self.distance_biases
	}
}
