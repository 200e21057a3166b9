//! Logic relating to growing the grid, solving the [FlowField]s and handing
//! the result back to agents
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A request to extend the grid with a chunk. Requests for chunks which
/// already exist are ignored
#[derive(Event, Clone, Copy, Debug)]
pub struct EventRegisterChunk(ChunkID);

impl EventRegisterChunk {
	pub fn new(chunk_id: ChunkID) -> Self {
		EventRegisterChunk(chunk_id)
	}
	pub fn get(&self) -> ChunkID {
		self.0
	}
}

/// Process [EventRegisterChunk], requests arriving in the same frame are
/// gathered so the chunk arena only grows once
#[cfg(not(tarpaulin_include))]
pub fn process_chunk_requests(
	mut events: EventReader<EventRegisterChunk>,
	mut grid: ResMut<FlowFieldGrid>,
) {
	let mut requested: Vec<ChunkID> = Vec::new();
	for event in events.read() {
		let chunk_id = event.get();
		if !grid.get_registry().contains(&chunk_id) && !requested.contains(&chunk_id) {
			requested.push(chunk_id);
		}
	}
	if !requested.is_empty() {
		debug!("Registering {} requested chunks", requested.len());
		grid.register_chunks(&requested);
	}
}

/// Apply any changed contributions to the chunk layers
#[cfg(not(tarpaulin_include))]
pub fn rebuild_contributions(mut grid: ResMut<FlowFieldGrid>) {
	grid.rebuild_contributions();
}

/// Run this frame's relaxation passes
#[cfg(not(tarpaulin_include))]
pub fn solve_flow_field(mut grid: ResMut<FlowFieldGrid>) {
	if grid.solve() {
		trace!("Flow field changed");
	}
}

/// World position of a navigating agent
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
#[require(FlowSample)]
pub struct AgentPosition(pub Vec2);

impl AgentPosition {
	pub fn new(position: Vec2) -> Self {
		AgentPosition(position)
	}
	pub fn get(&self) -> Vec2 {
		self.0
	}
}

/// What the flow field told an agent during the last update
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct FlowSample {
	/// Direction to step in
	direction: Ordinal,
	/// Distance to the nearest target, [UNREACHABLE] when there is no path
	distance: u32,
	/// Whether the agent stands on a target
	arrived: bool,
}

impl Default for FlowSample {
	fn default() -> Self {
		FlowSample {
			direction: Ordinal::Zero,
			distance: UNREACHABLE,
			arrived: false,
		}
	}
}

impl FlowSample {
	/// Direction to step in
	pub fn get_direction(&self) -> Ordinal {
		self.direction
	}
	/// Distance to the nearest target, [UNREACHABLE] when there is no path
	pub fn get_distance(&self) -> u32 {
		self.distance
	}
	/// Whether the agent stands on a target
	pub fn is_arrived(&self) -> bool {
		self.arrived
	}
	/// Whether a route to some target exists
	pub fn has_route(&self) -> bool {
		self.distance != UNREACHABLE
	}
}

/// Look up the flow under every agent
#[cfg(not(tarpaulin_include))]
pub fn sample_flow(grid: Res<FlowFieldGrid>, mut agents: Query<(&AgentPosition, &mut FlowSample)>) {
	let registry = grid.get_registry();
	for (position, mut sample) in agents.iter_mut() {
		let next = FlowSample {
			direction: registry.get_direction_at(position.get()),
			distance: registry.get_distance_at(position.get()),
			arrived: registry.is_arrived(position.get()),
		};
		// avoid tripping change detection for stationary agents
		sample.set_if_neq(next);
	}
}
