//! How contributions are folded into a derived [GridChunk] layer and how
//! they are taken back out again
//!

use std::fmt::Debug;

use crate::prelude::*;

/// Combines contribution values into a derived cell value and reverses that combination
pub trait MergeStrategy: Send + Sync + 'static {
	/// Type of the derived cell value and of each contribution
	type Value: Copy + PartialEq + Debug + Send + Sync + 'static;
	/// Fold `amount` into the derived `cell`
	fn merge(cell: &mut Self::Value, amount: Self::Value);
	/// Reverse a previous [MergeStrategy::merge] of `amount` into `cell`
	fn retract(cell: &mut Self::Value, amount: Self::Value);
}

/// Boolean layers, the derived value is the union of every contribution.
///
/// Retraction clears the cell which is exact as every applied contribution
/// is retracted before any is re-applied
pub struct UnionMerge;

impl MergeStrategy for UnionMerge {
	type Value = bool;
	fn merge(cell: &mut bool, amount: bool) {
		*cell |= amount;
	}
	fn retract(cell: &mut bool, amount: bool) {
		if amount {
			*cell = false;
		}
	}
}

/// Integer layers, the derived value is the sum of every contribution
pub struct AdditiveMerge;

impl MergeStrategy for AdditiveMerge {
	type Value = i32;
	fn merge(cell: &mut i32, amount: i32) {
		*cell = cell.wrapping_add(amount);
	}
	fn retract(cell: &mut i32, amount: i32) {
		*cell = cell.wrapping_sub(amount);
	}
}

/// Shorthand for the value type a [CellLayer] stores
pub type LayerValue<L> = <<L as CellLayer>::Merge as MergeStrategy>::Value;

/// A derived per-cell array of [GridChunk] that a contribution set owns
pub trait CellLayer: Send + Sync + 'static {
	/// How contributions combine within this layer
	type Merge: MergeStrategy;
	/// Name used when logging
	const NAME: &'static str;
	/// The layer's array within a chunk
	fn get_layer_mut(chunk: &mut GridChunk) -> &mut [LayerValue<Self>; CHUNK_CELL_COUNT];
}

/// Cells which cannot be walked through
pub struct BlockerLayer;

impl CellLayer for BlockerLayer {
	type Merge = UnionMerge;
	const NAME: &'static str = "blocker";
	fn get_layer_mut(chunk: &mut GridChunk) -> &mut [bool; CHUNK_CELL_COUNT] {
		chunk.get_blocked_mut()
	}
}

/// Cells agents are trying to reach
pub struct TargetLayer;

impl CellLayer for TargetLayer {
	type Merge = UnionMerge;
	const NAME: &'static str = "target";
	fn get_layer_mut(chunk: &mut GridChunk) -> &mut [bool; CHUNK_CELL_COUNT] {
		chunk.get_targets_mut()
	}
}

/// Surcharges added on top of [BASE_MOVEMENT_COST]
pub struct CostLayer;

impl CellLayer for CostLayer {
	type Merge = AdditiveMerge;
	const NAME: &'static str = "movement cost";
	fn get_layer_mut(chunk: &mut GridChunk) -> &mut [i32; CHUNK_CELL_COUNT] {
		chunk.get_movement_costs_mut()
	}
}

/// Adjustments to the integrated distance of a cell
pub struct DistanceBiasLayer;

impl CellLayer for DistanceBiasLayer {
	type Merge = AdditiveMerge;
	const NAME: &'static str = "distance bias";
	fn get_layer_mut(chunk: &mut GridChunk) -> &mut [i32; CHUNK_CELL_COUNT] {
		chunk.get_distance_biases_mut()
	}
}
