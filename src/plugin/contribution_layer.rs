//! Components which contribute to the derived layers of the
//! [FlowFieldGrid]. Adding one of these components to an entity registers
//! it with the matching contribution set, mutating it signals a change and
//! removing it (or despawning the entity) unregisters it
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A component which feeds one [CellLayer] of the grid, it must also be a
/// [Registrant] of the layer's value type
pub trait ContributionComponent: Component {
	/// The layer fed by the component
	type Layer: CellLayer;
	/// The contribution set deriving [ContributionComponent::Layer]
	fn get_set_mut(grid: &mut FlowFieldGrid) -> &mut DirtyContributionSet<Self::Layer>;
}

/// Cells which agents cannot walk through, i.e. a building footprint
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct Obstacle {
	/// Covered cells
	cells: Vec<GridCell>,
}

impl Obstacle {
	/// Create a new instance of [Obstacle]
	pub fn new(cells: Vec<GridCell>) -> Self {
		Obstacle { cells }
	}
	/// Covered cells
	pub fn get_cells(&self) -> &[GridCell] {
		&self.cells
	}
	/// Move or resize the obstacle
	pub fn set_cells(&mut self, cells: Vec<GridCell>) {
		self.cells = cells;
	}
}

impl Registrant<bool> for Obstacle {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> bool {
		true
	}
}

impl ContributionComponent for Obstacle {
	type Layer = BlockerLayer;
	fn get_set_mut(grid: &mut FlowFieldGrid) -> &mut BlockerSet {
		grid.get_blockers_mut()
	}
}

/// Cells agents are trying to reach
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct Goal {
	/// Covered cells
	cells: Vec<GridCell>,
}

impl Goal {
	/// Create a new instance of [Goal]
	pub fn new(cells: Vec<GridCell>) -> Self {
		Goal { cells }
	}
	/// Covered cells
	pub fn get_cells(&self) -> &[GridCell] {
		&self.cells
	}
	/// Move or resize the goal
	pub fn set_cells(&mut self, cells: Vec<GridCell>) {
		self.cells = cells;
	}
}

impl Registrant<bool> for Goal {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> bool {
		true
	}
}

impl ContributionComponent for Goal {
	type Layer = TargetLayer;
	fn get_set_mut(grid: &mut FlowFieldGrid) -> &mut TargetSet {
		grid.get_targets_mut()
	}
}

/// Makes cells more (or less) expensive to step onto, i.e. rough terrain or a road
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct CostModifier {
	/// Covered cells
	cells: Vec<GridCell>,
	/// Added to the movement cost of each covered cell
	surcharge: i32,
}

impl CostModifier {
	/// Create a new instance of [CostModifier]
	pub fn new(cells: Vec<GridCell>, surcharge: i32) -> Self {
		CostModifier { cells, surcharge }
	}
	/// Covered cells
	pub fn get_cells(&self) -> &[GridCell] {
		&self.cells
	}
	/// Added to the movement cost of each covered cell
	pub fn get_surcharge(&self) -> i32 {
		self.surcharge
	}
	/// Move or resize the modifier
	pub fn set_cells(&mut self, cells: Vec<GridCell>) {
		self.cells = cells;
	}
	/// Change the surcharge
	pub fn set_surcharge(&mut self, surcharge: i32) {
		self.surcharge = surcharge;
	}
}

impl Registrant<i32> for CostModifier {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> i32 {
		self.surcharge
	}
}

impl ContributionComponent for CostModifier {
	type Layer = CostLayer;
	fn get_set_mut(grid: &mut FlowFieldGrid) -> &mut CostSet {
		grid.get_costs_mut()
	}
}

/// Adjusts the integrated distance of cells, a positive bias pushes agents
/// away (danger zones) and a negative one pulls them in. A cell is never
/// pulled below one more than the neighbour it points at, so however large a
/// negative bias is agents still flow through it towards a real [Goal]
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct DistanceBias {
	/// Covered cells
	cells: Vec<GridCell>,
	/// Added to the distance of each covered cell
	bias: i32,
}

impl DistanceBias {
	/// Create a new instance of [DistanceBias]
	pub fn new(cells: Vec<GridCell>, bias: i32) -> Self {
		DistanceBias { cells, bias }
	}
	/// Covered cells
	pub fn get_cells(&self) -> &[GridCell] {
		&self.cells
	}
	/// Added to the distance of each covered cell
	pub fn get_bias(&self) -> i32 {
		self.bias
	}
	/// Move or resize the biased area
	pub fn set_cells(&mut self, cells: Vec<GridCell>) {
		self.cells = cells;
	}
	/// Change the bias
	pub fn set_bias(&mut self, bias: i32) {
		self.bias = bias;
	}
}

impl Registrant<i32> for DistanceBias {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> i32 {
		self.bias
	}
}

impl ContributionComponent for DistanceBias {
	type Layer = DistanceBiasLayer;
	fn get_set_mut(grid: &mut FlowFieldGrid) -> &mut DistanceBiasSet {
		grid.get_distance_biases_mut()
	}
}

/// Translate component lifecycle into the register / change / unregister protocol of the matching contribution set
#[cfg(not(tarpaulin_include))]
pub fn sync_registrants<C>(
	mut grid: ResMut<FlowFieldGrid>,
	mut removed: RemovedComponents<C>,
	changed: Query<(Entity, Ref<C>), Changed<C>>,
) where
	C: ContributionComponent + Registrant<LayerValue<C::Layer>>,
{
	for entity in removed.read() {
		let id = RegistrantID::from(entity);
		let set = C::get_set_mut(&mut grid);
		// added and removed within the same frame, it never joined
		if set.contains(id) {
			if let Err(e) = set.unregister(id) {
				warn!("{:?} could not leave its layer: {}", entity, e);
			}
		}
	}
	for (entity, component) in changed.iter() {
		let id = RegistrantID::from(entity);
		let set = C::get_set_mut(&mut grid);
		let result = if component.is_added() || !set.contains(id) {
			set.register(id, &*component)
		} else {
			set.notify_changed(id, &*component)
		};
		if let Err(e) = result {
			warn!("{:?} could not update its layer: {}", entity, e);
		}
	}
}
