//! The per-chunk field arrays and the addressing of cells within them
//!

pub mod flow_field;

use crate::prelude::*;

/// ID of a cell within a chunk, `(column, row)` where both are in the range `0..CHUNK_RESOLUTION`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct FieldCell((usize, usize));

impl FieldCell {
	/// Create a new instance of [FieldCell]
	pub fn new(column: usize, row: usize) -> Self {
		if column >= CHUNK_RESOLUTION || row >= CHUNK_RESOLUTION {
			panic!(
				"FieldCell ({}, {}) is out of bounds, a chunk is {} cells wide",
				column, row, CHUNK_RESOLUTION
			);
		}
		FieldCell((column, row))
	}
	/// Build a [FieldCell] from its position in a flat field array
	pub fn from_index(index: usize) -> Self {
		if index >= CHUNK_CELL_COUNT {
			panic!(
				"Cannot create a FieldCell from index {}, a chunk stores {} cells",
				index, CHUNK_CELL_COUNT
			);
		}
		FieldCell((index % CHUNK_RESOLUTION, index / CHUNK_RESOLUTION))
	}
	/// Get the `(column, row)` tuple
	pub fn get_column_row(&self) -> (usize, usize) {
		self.0
	}
	/// Get the column
	pub fn get_column(&self) -> usize {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> usize {
		self.0 .1
	}
	/// Position of the cell within a flat field array, rows are laid out one after another
	pub fn get_index(&self) -> usize {
		self.get_row() * CHUNK_RESOLUTION + self.get_column()
	}
	/// Take a step in the direction of `ordinal`. If the step leaves the chunk the
	/// returned [FieldCell] is wrapped around into the neighbouring chunk and the
	/// `(column, row)` offset of that chunk is returned alongside it
	pub fn step(&self, ordinal: Ordinal) -> ((i32, i32), FieldCell) {
		let (dx, dy) = ordinal.get_offset();
		let column = self.get_column() as i32 + dx;
		let row = self.get_row() as i32 + dy;
		let res = CHUNK_RESOLUTION as i32;
		let chunk_offset = (column.div_euclid(res), row.div_euclid(res));
		let cell = FieldCell((
			column.rem_euclid(res) as usize,
			row.rem_euclid(res) as usize,
		));
		(chunk_offset, cell)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn index_round_trip() {
		for index in 0..CHUNK_CELL_COUNT {
			let cell = FieldCell::from_index(index);
			assert_eq!(index, cell.get_index());
		}
	}
	#[test]
	fn index_is_row_major() {
		let cell = FieldCell::new(3, 2);
		let result = cell.get_index();
		let actual = 2 * CHUNK_RESOLUTION + 3;
		assert_eq!(actual, result);
	}
	#[test]
	#[should_panic]
	fn out_of_bounds_cell() {
		FieldCell::new(CHUNK_RESOLUTION, 0);
	}
	#[test]
	fn step_inside_chunk() {
		let cell = FieldCell::new(4, 4);
		let result = cell.step(Ordinal::NorthEast);
		let actual = ((0, 0), FieldCell::new(5, 5));
		assert_eq!(actual, result);
	}
	#[test]
	fn step_across_western_boundary() {
		let cell = FieldCell::new(0, 7);
		let result = cell.step(Ordinal::West);
		let actual = ((-1, 0), FieldCell::new(CHUNK_RESOLUTION - 1, 7));
		assert_eq!(actual, result);
	}
	#[test]
	fn step_across_north_east_corner() {
		let cell = FieldCell::new(CHUNK_RESOLUTION - 1, CHUNK_RESOLUTION - 1);
		let result = cell.step(Ordinal::NorthEast);
		let actual = ((1, 1), FieldCell::new(0, 0));
		assert_eq!(actual, result);
	}
}
