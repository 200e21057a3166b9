//! Many independent registrants (buildings, units, terrain features...)
//! contribute to the derived per-cell layers of the grid. A
//! [DirtyContributionSet] remembers the latest contribution of every member
//! and exactly what it applied to the grid so that, whenever a member joins,
//! changes or leaves, the layer can be rebuilt without leftovers or double
//! counting.
//!
//! Rebuilding is lazy, mutations only flag the set as dirty and the work
//! happens once per tick in [DirtyContributionSet::rebuild_if_dirty]
//!

pub mod merge;

use std::{collections::BTreeMap, marker::PhantomData};

use crate::prelude::*;
use bevy::prelude::*;

/// Identifies a member of a contribution set
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct RegistrantID(u64);

impl RegistrantID {
	/// Create a new instance of [RegistrantID]
	pub fn new(id: u64) -> Self {
		RegistrantID(id)
	}
	/// Get the raw id
	pub fn get(&self) -> u64 {
		self.0
	}
}

impl From<Entity> for RegistrantID {
	fn from(entity: Entity) -> Self {
		RegistrantID(entity.to_bits())
	}
}

/// Anything that contributes a value to a set of grid cells
pub trait Registrant<V> {
	/// The cells currently covered
	fn get_current_cells(&self) -> Vec<GridCell>;
	/// The value contributed to each covered cell, `true` for boolean layers or a signed magnitude for additive layers
	fn get_contribution_value(&self) -> V;
}

/// Snapshot of what a registrant reported when it last registered or changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution<V> {
	/// Covered cells
	cells: Vec<GridCell>,
	/// Value applied to each covered cell
	value: V,
}

impl<V: Copy> Contribution<V> {
	/// Create a new instance of [Contribution]
	pub fn new(cells: Vec<GridCell>, value: V) -> Self {
		Contribution { cells, value }
	}
	/// Take a snapshot of a registrant
	pub fn from_registrant(registrant: &impl Registrant<V>) -> Self {
		Contribution {
			cells: registrant.get_current_cells(),
			value: registrant.get_contribution_value(),
		}
	}
	/// Covered cells
	pub fn get_cells(&self) -> &[GridCell] {
		&self.cells
	}
	/// Value applied to each covered cell
	pub fn get_value(&self) -> V {
		self.value
	}
}

impl<V: Copy> Registrant<V> for Contribution<V> {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> V {
		self.value
	}
}

/// Record of a value merged into one cell of the grid
#[derive(Clone, Copy, Debug)]
struct AppliedContribution<V> {
	/// Arena slot of the chunk
	slot: usize,
	/// Flat index of the cell within the chunk
	index: usize,
	/// What was merged
	value: V,
}

/// Derives one [CellLayer] of the grid from the contributions of its members.
/// Each layer must be owned by exactly one set
pub struct DirtyContributionSet<L: CellLayer> {
	/// Whether membership changed since the last rebuild
	dirty: bool,
	/// Latest contribution of each member
	members: BTreeMap<RegistrantID, Contribution<LayerValue<L>>>,
	/// Everything merged into the grid by the last rebuild
	applied: Vec<AppliedContribution<LayerValue<L>>>,
	/// The layer being derived
	layer: PhantomData<L>,
}

impl<L: CellLayer> Default for DirtyContributionSet<L> {
	fn default() -> Self {
		DirtyContributionSet {
			dirty: false,
			members: BTreeMap::new(),
			applied: Vec::new(),
			layer: PhantomData,
		}
	}
}

impl<L: CellLayer> DirtyContributionSet<L> {
	/// Create an empty set
	pub fn new() -> Self {
		Self::default()
	}
	/// Whether the next [DirtyContributionSet::rebuild_if_dirty] will do any work
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}
	/// Force the next rebuild, used when the grid grows and previously skipped cells become addressable
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}
	/// Number of members
	pub fn len(&self) -> usize {
		self.members.len()
	}
	/// Whether the set has no members
	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
	/// Whether `id` is a member
	pub fn contains(&self, id: RegistrantID) -> bool {
		self.members.contains_key(&id)
	}
	/// The latest contribution recorded for `id`
	pub fn get_contribution(&self, id: RegistrantID) -> Option<&Contribution<LayerValue<L>>> {
		self.members.get(&id)
	}
	/// Number of cell contributions currently merged into the grid
	pub fn get_applied_count(&self) -> usize {
		self.applied.len()
	}
	/// Add a member. Registering an existing member is a logic error and leaves the set untouched
	pub fn register(
		&mut self,
		id: RegistrantID,
		registrant: &impl Registrant<LayerValue<L>>,
	) -> GridResult<()> {
		if self.members.contains_key(&id) {
			error!("Registrant {:?} is already part of the {} layer", id, L::NAME);
			return Err(GridError::AlreadyRegistered {
				id,
				layer: L::NAME,
			});
		}
		self.members
			.insert(id, Contribution::from_registrant(registrant));
		self.dirty = true;
		Ok(())
	}
	/// A member's cells or value changed, take a fresh snapshot of it
	pub fn notify_changed(
		&mut self,
		id: RegistrantID,
		registrant: &impl Registrant<LayerValue<L>>,
	) -> GridResult<()> {
		match self.members.get_mut(&id) {
			Some(contribution) => {
				*contribution = Contribution::from_registrant(registrant);
				self.dirty = true;
				Ok(())
			}
			None => {
				error!(
					"Registrant {:?} changed but is not part of the {} layer",
					id,
					L::NAME
				);
				Err(GridError::NotRegistered {
					id,
					layer: L::NAME,
				})
			}
		}
	}
	/// Remove a member. Removing an absent member is a logic error and leaves the set untouched
	pub fn unregister(&mut self, id: RegistrantID) -> GridResult<()> {
		if self.members.remove(&id).is_none() {
			error!(
				"Registrant {:?} cannot leave the {} layer, it never joined",
				id,
				L::NAME
			);
			return Err(GridError::NotRegistered {
				id,
				layer: L::NAME,
			});
		}
		self.dirty = true;
		Ok(())
	}
	/// When dirty, retract everything previously applied and re-apply the
	/// contribution of every member. Cells of unregistered chunks are skipped.
	/// Returns whether a rebuild happened
	pub fn rebuild_if_dirty(&mut self, registry: &mut ChunkRegistry) -> bool {
		if !self.dirty {
			return false;
		}
		{
			let arena = registry.get_arena_mut();
			for applied in self.applied.drain(..) {
				let layer = L::get_layer_mut(&mut arena.chunks[applied.slot]);
				<L::Merge as MergeStrategy>::retract(&mut layer[applied.index], applied.value);
			}
		}
		let mut skipped = 0;
		for (id, contribution) in self.members.iter() {
			let value = contribution.get_value();
			for cell in contribution.get_cells() {
				match registry.get_cell_location(*cell) {
					Some((slot, index)) => {
						let layer = L::get_layer_mut(&mut registry.get_arena_mut().chunks[slot]);
						<L::Merge as MergeStrategy>::merge(&mut layer[index], value);
						self.applied.push(AppliedContribution { slot, index, value });
					}
					None => {
						trace!(
							"Registrant {:?} covers {:?} outside the registered grid",
							id,
							cell.get()
						);
						skipped += 1;
					}
				}
			}
		}
		self.dirty = false;
		debug!(
			"Rebuilt {} layer from {} registrants, {} cells applied, {} skipped",
			L::NAME,
			self.members.len(),
			self.applied.len(),
			skipped
		);
		true
	}
}

/// Derives which cells are blocked
pub type BlockerSet = DirtyContributionSet<BlockerLayer>;
/// Derives which cells are targets
pub type TargetSet = DirtyContributionSet<TargetLayer>;
/// Derives movement cost surcharges
pub type CostSet = DirtyContributionSet<CostLayer>;
/// Derives distance biases
pub type DistanceBiasSet = DirtyContributionSet<DistanceBiasLayer>;
