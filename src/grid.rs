//! [FlowFieldGrid] bundles the chunk storage, the contribution sets deriving
//! its layers and the solver into a single [Resource]. It can equally be
//! driven by hand outside of an [App] by calling [FlowFieldGrid::tick]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// The whole navigable world
#[derive(Resource)]
pub struct FlowFieldGrid {
	/// Chunk storage
	registry: ChunkRegistry,
	/// Derives the blocked layer
	blockers: BlockerSet,
	/// Derives the target layer
	targets: TargetSet,
	/// Derives the movement cost layer
	costs: CostSet,
	/// Derives the distance bias layer
	distance_biases: DistanceBiasSet,
	/// Relaxation parameters
	solver: FlowFieldSolver,
}

impl FlowFieldGrid {
	/// Create an empty grid, no chunks are registered
	pub fn new(settings: &GridSettings) -> Self {
		FlowFieldGrid {
			registry: ChunkRegistry::new(settings.get_cell_size()),
			blockers: BlockerSet::new(),
			targets: TargetSet::new(),
			costs: CostSet::new(),
			distance_biases: DistanceBiasSet::new(),
			solver: FlowFieldSolver::from_settings(settings),
		}
	}
	/// Chunk storage
	pub fn get_registry(&self) -> &ChunkRegistry {
		&self.registry
	}
	/// Relaxation parameters
	pub fn get_solver(&self) -> &FlowFieldSolver {
		&self.solver
	}
	/// The set deriving blocked cells
	pub fn get_blockers(&self) -> &BlockerSet {
		&self.blockers
	}
	/// The set deriving blocked cells
	pub fn get_blockers_mut(&mut self) -> &mut BlockerSet {
		&mut self.blockers
	}
	/// The set deriving target cells
	pub fn get_targets(&self) -> &TargetSet {
		&self.targets
	}
	/// The set deriving target cells
	pub fn get_targets_mut(&mut self) -> &mut TargetSet {
		&mut self.targets
	}
	/// The set deriving movement cost surcharges
	pub fn get_costs(&self) -> &CostSet {
		&self.costs
	}
	/// The set deriving movement cost surcharges
	pub fn get_costs_mut(&mut self) -> &mut CostSet {
		&mut self.costs
	}
	/// The set deriving distance biases
	pub fn get_distance_biases(&self) -> &DistanceBiasSet {
		&self.distance_biases
	}
	/// The set deriving distance biases
	pub fn get_distance_biases_mut(&mut self) -> &mut DistanceBiasSet {
		&mut self.distance_biases
	}
	/// Register a chunk. When the grid actually grows every contribution set
	/// is flagged so that contributions to the new cells get applied
	pub fn register_chunk(&mut self, chunk_id: ChunkID) -> usize {
		let before = self.registry.len();
		let slot = self.registry.register_chunk(chunk_id);
		if self.registry.len() != before {
			self.mark_all_dirty();
		}
		slot
	}
	/// Register several chunks growing the arena only once
	pub fn register_chunks(&mut self, chunk_ids: &[ChunkID]) -> Vec<usize> {
		let before = self.registry.len();
		let slots = self.registry.register_chunks(chunk_ids);
		if self.registry.len() != before {
			self.mark_all_dirty();
		}
		slots
	}
	/// Flag every contribution set for rebuilding
	fn mark_all_dirty(&mut self) {
		self.blockers.mark_dirty();
		self.targets.mark_dirty();
		self.costs.mark_dirty();
		self.distance_biases.mark_dirty();
	}
	/// Rebuild whichever contribution sets have changed. Returns whether any layer was rebuilt.
	///
	/// If the target layer ends up empty the solved field is reset, otherwise
	/// stale distances would keep pointing agents at targets which no longer exist
	pub fn rebuild_contributions(&mut self) -> bool {
		let blockers = self.blockers.rebuild_if_dirty(&mut self.registry);
		let targets = self.targets.rebuild_if_dirty(&mut self.registry);
		let costs = self.costs.rebuild_if_dirty(&mut self.registry);
		let biases = self.distance_biases.rebuild_if_dirty(&mut self.registry);
		if targets && self.targets.get_applied_count() == 0 {
			debug!("No targets remain on the grid, resetting the flow field");
			self.registry.reset_flow();
		}
		blockers || targets || costs || biases
	}
	/// Run the per-tick relaxation passes. Returns whether any cell changed
	pub fn solve(&mut self) -> bool {
		self.solver.solve(&mut self.registry)
	}
	/// Rebuild any changed contributions then relax the field
	pub fn tick(&mut self) -> bool {
		self.rebuild_contributions();
		self.solve()
	}
	/// Rebuild any changed contributions then relax until the field settles
	/// or `max_passes` is reached, useful after loading a level
	pub fn warm_up(&mut self, max_passes: u32) -> u32 {
		self.rebuild_contributions();
		self.solver.solve_until_stable(&mut self.registry, max_passes)
	}
	/// Forget the solved field
	pub fn reset_flow(&mut self) {
		self.registry.reset_flow();
	}
	/// Find the chunk and the cell within it containing a world `position`
	pub fn world_to_cell(&self, position: Vec2) -> (ChunkID, FieldCell) {
		self.registry.world_to_cell(position)
	}
	/// World position of the centre of a cell
	pub fn cell_to_world(&self, chunk_id: ChunkID, field_cell: FieldCell) -> Vec2 {
		self.registry.cell_to_world(chunk_id, field_cell)
	}
	/// Direction an agent at `position` should step in
	pub fn get_direction_at(&self, position: Vec2) -> Ordinal {
		self.registry.get_direction_at(position)
	}
	/// Distance from `position` to the nearest target
	pub fn get_distance_at(&self, position: Vec2) -> u32 {
		self.registry.get_distance_at(position)
	}
	/// Whether an agent at `position` has arrived
	pub fn is_arrived(&self, position: Vec2) -> bool {
		self.registry.is_arrived(position)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn growth_reapplies_skipped_contributions() {
		let mut grid = FlowFieldGrid::new(&GridSettings::default());
		grid.register_chunk(ChunkID::new(0, 0));
		let far = GridCell::new(-3, 4);
		grid.get_blockers_mut()
			.register(RegistrantID::new(1), &Contribution::new(vec![far], true))
			.unwrap();
		grid.tick();
		assert!(!grid.get_registry().is_walkable(far));
		grid.register_chunk(ChunkID::new(-1, 0));
		grid.tick();
		assert!(!grid.get_registry().is_walkable(far));
		assert!(grid.get_registry().get_chunk(&ChunkID::new(-1, 0)).is_some());
		assert_eq!(1, grid.get_blockers().get_applied_count());
	}
	#[test]
	fn agent_walks_to_target() {
		let mut grid = FlowFieldGrid::new(&GridSettings::default());
		grid.register_chunk(ChunkID::new(0, 0));
		grid.get_targets_mut()
			.register(
				RegistrantID::new(7),
				&Contribution::new(vec![GridCell::new(12, 3)], true),
			)
			.unwrap();
		grid.warm_up(128);
		let mut position = Vec2::new(1.5, 14.5);
		let mut steps = 0;
		while !grid.is_arrived(position) {
			let direction = grid.get_direction_at(position);
			assert_ne!(Ordinal::Zero, direction);
			let (x, y) = direction.get_offset();
			position += Vec2::new(x as f32, y as f32);
			steps += 1;
			assert!(steps < 64, "agent never arrived");
		}
		assert_eq!(0, grid.get_distance_at(position));
	}
	#[test]
	fn removing_last_target_resets_flow() {
		let mut grid = FlowFieldGrid::new(&GridSettings::default());
		grid.register_chunk(ChunkID::new(0, 0));
		let id = RegistrantID::new(2);
		grid.get_targets_mut()
			.register(id, &Contribution::new(vec![GridCell::new(0, 0)], true))
			.unwrap();
		grid.warm_up(64);
		assert_ne!(UNREACHABLE, grid.get_distance_at(Vec2::new(9.5, 9.5)));
		grid.get_targets_mut().unregister(id).unwrap();
		grid.tick();
		assert_eq!(UNREACHABLE, grid.get_distance_at(Vec2::new(9.5, 9.5)));
		assert!(!grid.is_arrived(Vec2::new(0.5, 0.5)));
	}
}
