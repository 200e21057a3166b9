//! A [FlowField] is the solver's output for a single chunk. Every cell
//! carries its integrated distance to the nearest target and an 8-bit
//! direction indicating which neighbour to step onto next. A steering
//! pipeline/character controller reads and interprets a [FlowField] to
//! provide movement.
//!

use crate::prelude::*;

/// Bit to indicate a northerly direction
const BITS_NORTH: u8 = 0b0000_0001;
/// Bit to indicate an easterly direction
const BITS_EAST: u8 = 0b0000_0010;
/// Bit to indicate a southerly direction
const BITS_SOUTH: u8 = 0b0000_0100;
/// Bit to indicate a westerly direction
const BITS_WEST: u8 = 0b0000_1000;
/// Bit to indicate a north-easterly direction
const BITS_NORTH_EAST: u8 = 0b0000_0011;
/// Bit to indicate a south-easterly direction
const BITS_SOUTH_EAST: u8 = 0b0000_0110;
/// Bit to indicate south-westerly direction
const BITS_SOUTH_WEST: u8 = 0b0000_1100;
/// Bit to indicate a north-westerly direction
const BITS_NORTH_WEST: u8 = 0b0000_1001;
/// Bit to indicate no direction of travel
const BITS_ZERO: u8 = 0b0000_0000;

/// Convert an [Ordinal] to a bit representation
pub fn convert_ordinal_to_bits_dir(ordinal: Ordinal) -> u8 {
	match ordinal {
		Ordinal::North => BITS_NORTH,
		Ordinal::East => BITS_EAST,
		Ordinal::South => BITS_SOUTH,
		Ordinal::West => BITS_WEST,
		Ordinal::NorthEast => BITS_NORTH_EAST,
		Ordinal::SouthEast => BITS_SOUTH_EAST,
		Ordinal::SouthWest => BITS_SOUTH_WEST,
		Ordinal::NorthWest => BITS_NORTH_WEST,
		Ordinal::Zero => BITS_ZERO,
	}
}

/// Convert the direction bits of a [FlowField] cell back into an [Ordinal].
/// Unrecognised bit patterns are treated as [Ordinal::Zero]
pub fn convert_bits_dir_to_ordinal(bits: u8) -> Ordinal {
	match bits {
		BITS_NORTH => Ordinal::North,
		BITS_EAST => Ordinal::East,
		BITS_SOUTH => Ordinal::South,
		BITS_WEST => Ordinal::West,
		BITS_NORTH_EAST => Ordinal::NorthEast,
		BITS_SOUTH_EAST => Ordinal::SouthEast,
		BITS_SOUTH_WEST => Ordinal::SouthWest,
		BITS_NORTH_WEST => Ordinal::NorthWest,
		_ => Ordinal::Zero,
	}
}

/// Distance and direction of every cell in a chunk, stored as flat row-major arrays
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FlowField {
	/// Integrated distance to the nearest target, [UNREACHABLE] when no route is known
	distances: [u32; CHUNK_CELL_COUNT],
	/// Bit-encoded [Ordinal] of the neighbour to step onto
	directions: [u8; CHUNK_CELL_COUNT],
}

impl Default for FlowField {
	fn default() -> Self {
		FlowField {
			distances: [UNREACHABLE; CHUNK_CELL_COUNT],
			directions: [BITS_ZERO; CHUNK_CELL_COUNT],
		}
	}
}

impl FlowField {
	/// Get a reference to the distance array
	pub fn get_distances(&self) -> &[u32; CHUNK_CELL_COUNT] {
		&self.distances
	}
	/// Get a reference to the direction bits array
	pub fn get_direction_bits(&self) -> &[u8; CHUNK_CELL_COUNT] {
		&self.directions
	}
	/// Retrieve the distance of a field cell
	pub fn get_distance(&self, field_cell: FieldCell) -> u32 {
		self.distances[field_cell.get_index()]
	}
	/// Retrieve the direction of a field cell
	pub fn get_direction(&self, field_cell: FieldCell) -> Ordinal {
		convert_bits_dir_to_ordinal(self.directions[field_cell.get_index()])
	}
	/// Set the distance and direction of the cell at a flat `index`
	pub(crate) fn set_cell(&mut self, index: usize, distance: u32, direction_bits: u8) {
		self.distances[index] = distance;
		self.directions[index] = direction_bits;
	}
	/// Raw direction bits of the cell at a flat `index`
	pub(crate) fn get_direction_bits_at(&self, index: usize) -> u8 {
		self.directions[index]
	}
	/// Distance of the cell at a flat `index`
	pub(crate) fn get_distance_at(&self, index: usize) -> u32 {
		self.distances[index]
	}
}
