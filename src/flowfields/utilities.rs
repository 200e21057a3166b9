//! Useful structures and tools used by the fields
//!

use bevy::prelude::*;

/// Defines the dimensions of every chunk, a chunk is `CHUNK_RESOLUTION x CHUNK_RESOLUTION` cells
pub const CHUNK_RESOLUTION: usize = 16;
/// Number of cells stored by a single chunk
pub const CHUNK_CELL_COUNT: usize = CHUNK_RESOLUTION * CHUNK_RESOLUTION;
/// Movement cost of a cell with no surcharges applied
pub const BASE_MOVEMENT_COST: i32 = 100;
/// Surcharges can lower a cell below its base cost, the solver never treats a step as cheaper than this
pub const MIN_MOVEMENT_COST: i32 = 1;
/// Multiplier applied to the movement cost of a neighbour reached orthogonally
pub const ORTHOGONAL_STEP_WEIGHT: u32 = 10;
/// Multiplier applied to the movement cost of a neighbour reached diagonally (approximates 10 * sqrt(2))
pub const DIAGONAL_STEP_WEIGHT: u32 = 14;
/// Distance of a cell with no known route to a target
pub const UNREACHABLE: u32 = u32::MAX;

/// The 8 directions of movement across the grid plus [Ordinal::Zero] to
/// indicate the absence of a heading (a target cell or a cell with no route)
///
/// Rows increase northwards, so [Ordinal::North] is a step of `+1` row
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
	/// Special case, no direction of travel
	Zero,
}

impl Ordinal {
	/// Order in which neighbours are inspected, when two neighbours offer
	/// the same distance the one appearing first wins
	pub const ENUMERATION: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::NorthEast,
		Ordinal::East,
		Ordinal::SouthEast,
		Ordinal::South,
		Ordinal::SouthWest,
		Ordinal::West,
		Ordinal::NorthWest,
	];
	/// The `(column, row)` offset of a single step in this direction
	pub fn get_offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, 1),
			Ordinal::NorthEast => (1, 1),
			Ordinal::East => (1, 0),
			Ordinal::SouthEast => (1, -1),
			Ordinal::South => (0, -1),
			Ordinal::SouthWest => (-1, -1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthWest => (-1, 1),
			Ordinal::Zero => (0, 0),
		}
	}
	/// For a `(column, row)` offset between two adjacent cells or chunks find the
	/// [Ordinal] pointing from the source to the target. This will panic if the offset
	/// is not orthogonally or diagonally adjacent
	pub fn from_offset(offset: (i32, i32)) -> Self {
		match offset {
			(0, 1) => Ordinal::North,
			(1, 1) => Ordinal::NorthEast,
			(1, 0) => Ordinal::East,
			(1, -1) => Ordinal::SouthEast,
			(0, -1) => Ordinal::South,
			(-1, -1) => Ordinal::SouthWest,
			(-1, 0) => Ordinal::West,
			(-1, 1) => Ordinal::NorthWest,
			(0, 0) => Ordinal::Zero,
			_ => panic!("Offset {:?} is not a single step in any direction", offset),
		}
	}
	/// Position of the direction within [Ordinal::ENUMERATION], [Ordinal::Zero] has none
	pub fn get_enumeration_index(&self) -> Option<usize> {
		match self {
			Ordinal::North => Some(0),
			Ordinal::NorthEast => Some(1),
			Ordinal::East => Some(2),
			Ordinal::SouthEast => Some(3),
			Ordinal::South => Some(4),
			Ordinal::SouthWest => Some(5),
			Ordinal::West => Some(6),
			Ordinal::NorthWest => Some(7),
			Ordinal::Zero => None,
		}
	}
	/// Whether the direction moves across both axes at once
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Multiplier applied to a neighbour's movement cost when stepping onto it in this direction
	pub fn get_step_weight(&self) -> u32 {
		match self {
			Ordinal::Zero => 0,
			ord if ord.is_diagonal() => DIAGONAL_STEP_WEIGHT,
			_ => ORTHOGONAL_STEP_WEIGHT,
		}
	}
	/// For a diagonal direction get the two orthogonal directions either side of it, i.e
	/// ```text
	///  N  NE
	///  o  E
	/// ```
	pub fn get_flanking_orthogonals(&self) -> Option<(Ordinal, Ordinal)> {
		match self {
			Ordinal::NorthEast => Some((Ordinal::North, Ordinal::East)),
			Ordinal::SouthEast => Some((Ordinal::South, Ordinal::East)),
			Ordinal::SouthWest => Some((Ordinal::South, Ordinal::West)),
			Ordinal::NorthWest => Some((Ordinal::North, Ordinal::West)),
			_ => None,
		}
	}
	/// Returns the opposite [Ordinal] of the current
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
			Ordinal::Zero => Ordinal::Zero,
		}
	}
	/// Unit vector of the direction in world space, [Ordinal::Zero] produces [Vec2::ZERO]
	pub fn to_vec2(&self) -> Vec2 {
		let (x, y) = self.get_offset();
		Vec2::new(x as f32, y as f32).normalize_or_zero()
	}
}
