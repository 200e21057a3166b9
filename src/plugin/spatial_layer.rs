//! Keeps a [SpatialHashGrid] of agent positions for neighbour queries such as
//! separation steering or target acquisition
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Agents bucketed by position, rebuilt every frame
#[derive(Resource)]
pub struct AgentSpatialGrid(SpatialHashGrid<Entity>);

impl AgentSpatialGrid {
	pub fn new(settings: &GridSettings) -> Self {
		AgentSpatialGrid(SpatialHashGrid::from_settings(settings))
	}
	pub fn get(&self) -> &SpatialHashGrid<Entity> {
		&self.0
	}
	pub fn get_mut(&mut self) -> &mut SpatialHashGrid<Entity> {
		&mut self.0
	}
}

/// Rebuild [AgentSpatialGrid] from the current [AgentPosition]s
#[cfg(not(tarpaulin_include))]
pub fn rebuild_agent_grid(
	mut spatial: ResMut<AgentSpatialGrid>,
	agents: Query<(Entity, &AgentPosition)>,
	mut buffer: Local<Vec<(Entity, Vec2)>>,
) {
	buffer.clear();
	buffer.extend(agents.iter().map(|(entity, position)| (entity, position.get())));
	spatial.get_mut().build_grid(&buffer);
}
