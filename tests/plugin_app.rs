//! Run the plugin inside a headless [App] and check agents receive sensible flow
//!

use bevy::prelude::*;
use bevy_flowfield_grid::prelude::*;

/// App with the plugin and a single registered chunk
fn app_with_chunk() -> App {
	let mut app = App::new();
	app.add_plugins(FlowFieldGridPlugin);
	app.world_mut()
		.send_event(EventRegisterChunk::new(ChunkID::new(0, 0)));
	app.update();
	app
}

#[test]
fn settings_are_picked_up() {
	let mut app = App::new();
	app.insert_resource(GridSettings::new(0.5, 3.0).with_passes_per_tick(3));
	app.add_plugins(FlowFieldGridPlugin);
	let grid = app.world().resource::<FlowFieldGrid>();
	assert_eq!(0.5, grid.get_registry().get_cell_size());
	assert_eq!(3, grid.get_solver().get_passes_per_tick());
	let spatial = app.world().resource::<AgentSpatialGrid>();
	assert_eq!(3.0, spatial.get().get_cell_size());
}

#[test]
fn chunk_requests_grow_the_grid() {
	let mut app = app_with_chunk();
	assert!(app
		.world()
		.resource::<FlowFieldGrid>()
		.get_registry()
		.contains(&ChunkID::new(0, 0)));
	// duplicates within a frame are coalesced
	app.world_mut()
		.send_event(EventRegisterChunk::new(ChunkID::new(1, 0)));
	app.world_mut()
		.send_event(EventRegisterChunk::new(ChunkID::new(1, 0)));
	app.world_mut()
		.send_event(EventRegisterChunk::new(ChunkID::new(0, 0)));
	app.update();
	assert_eq!(2, app.world().resource::<FlowFieldGrid>().get_registry().len());
}

#[test]
fn agent_is_guided_to_goal() {
	let mut app = app_with_chunk();
	app.world_mut().spawn(Goal::new(vec![GridCell::new(3, 3)]));
	let agent = app
		.world_mut()
		.spawn(AgentPosition::new(Vec2::new(10.5, 3.5)))
		.id();
	for _ in 0..20 {
		app.update();
	}
	let sample = *app.world().get::<FlowSample>(agent).unwrap();
	assert!(sample.has_route());
	assert_eq!(7 * ORTHOGONAL_STEP_WEIGHT * BASE_MOVEMENT_COST as u32, sample.get_distance());
	assert_eq!(Ordinal::West, sample.get_direction());
	assert!(!sample.is_arrived());

	app.world_mut().get_mut::<AgentPosition>(agent).unwrap().0 = Vec2::new(3.5, 3.5);
	app.update();
	let sample = *app.world().get::<FlowSample>(agent).unwrap();
	assert!(sample.is_arrived());
	assert_eq!(0, sample.get_distance());
}

#[test]
fn despawned_obstacle_frees_its_cells() {
	let mut app = app_with_chunk();
	let cell = GridCell::new(6, 6);
	let obstacle = app.world_mut().spawn(Obstacle::new(vec![cell])).id();
	app.update();
	assert!(!app
		.world()
		.resource::<FlowFieldGrid>()
		.get_registry()
		.is_walkable(cell));
	app.world_mut().despawn(obstacle);
	app.update();
	let grid = app.world().resource::<FlowFieldGrid>();
	assert!(grid.get_registry().is_walkable(cell));
	assert!(grid.get_blockers().is_empty());
}

#[test]
fn mutated_modifier_is_resynced() {
	let mut app = app_with_chunk();
	let cell = GridCell::new(2, 9);
	let modifier = app
		.world_mut()
		.spawn(CostModifier::new(vec![cell], 40))
		.id();
	app.update();
	app.world_mut()
		.get_mut::<CostModifier>(modifier)
		.unwrap()
		.set_surcharge(-20);
	app.update();
	let grid = app.world().resource::<FlowFieldGrid>();
	let (chunk, field) = cell.get_chunk_and_field();
	let cost = grid
		.get_registry()
		.get_chunk(&chunk)
		.unwrap()
		.get_movement_cost(field);
	assert_eq!(BASE_MOVEMENT_COST - 20, cost);
	assert_eq!(1, grid.get_costs().len());
}

#[test]
fn agents_are_hashed_each_frame() {
	let mut app = app_with_chunk();
	let near = app
		.world_mut()
		.spawn(AgentPosition::new(Vec2::new(1.0, 1.0)))
		.id();
	app.world_mut()
		.spawn(AgentPosition::new(Vec2::new(40.0, 40.0)));
	app.update();
	let spatial = app.world().resource::<AgentSpatialGrid>();
	assert_eq!(2, spatial.get().len());
	let mut found = Vec::new();
	spatial.get().query_radius_all(Vec2::ZERO, 5.0, &mut found);
	assert_eq!(1, found.len());
	assert_eq!(near, found[0].get_item());
}
