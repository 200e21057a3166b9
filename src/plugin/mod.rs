//! Defines the Bevy [Plugin] for the flow field grid
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod contribution_layer;
pub mod flow_layer;
pub mod spatial_layer;

/// Frame ordering of the grid systems
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Register requested chunks
	Grow,
	/// Sync components into the contribution sets and rebuild changed layers
	Contribute,
	/// Relax the flow field
	Solve,
	/// Sample the flow for agents and rebuild the agent hash grid
	Spatial,
}

/// Inserts a [FlowFieldGrid] and an [AgentSpatialGrid] configured from the
/// [GridSettings] resource (or its defaults if none has been inserted) and
/// schedules the systems maintaining them
pub struct FlowFieldGridPlugin;

impl Plugin for FlowFieldGridPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		let settings = app
			.world()
			.get_resource::<GridSettings>()
			.cloned()
			.unwrap_or_default();
		if let Err(e) = settings.validate() {
			panic!("FlowFieldGridPlugin cannot use the provided GridSettings: {}", e);
		}
		app.insert_resource(FlowFieldGrid::new(&settings))
			.insert_resource(AgentSpatialGrid::new(&settings))
			.insert_resource(settings)
			.add_event::<flow_layer::EventRegisterChunk>()
			.configure_sets(
				Update,
				(
					OrderingSet::Grow,
					OrderingSet::Contribute,
					OrderingSet::Solve,
					OrderingSet::Spatial,
				)
					.chain(),
			)
			.add_systems(
				Update,
				(
					flow_layer::process_chunk_requests.in_set(OrderingSet::Grow),
					(
						contribution_layer::sync_registrants::<Obstacle>,
						contribution_layer::sync_registrants::<Goal>,
						contribution_layer::sync_registrants::<CostModifier>,
						contribution_layer::sync_registrants::<DistanceBias>,
						flow_layer::rebuild_contributions,
					)
						.chain()
						.in_set(OrderingSet::Contribute),
					flow_layer::solve_flow_field.in_set(OrderingSet::Solve),
					(flow_layer::sample_flow, spatial_layer::rebuild_agent_grid)
						.in_set(OrderingSet::Spatial),
				),
			);
	}
}
