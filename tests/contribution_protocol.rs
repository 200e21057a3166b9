//! Walk contributions through their whole lifecycle against a [FlowFieldGrid]
//!

use bevy_flowfield_grid::prelude::*;

/// A moving registrant, i.e. a unit standing on some cells
struct Footprint {
	cells: Vec<GridCell>,
	surcharge: i32,
}

impl Registrant<i32> for Footprint {
	fn get_current_cells(&self) -> Vec<GridCell> {
		self.cells.clone()
	}
	fn get_contribution_value(&self) -> i32 {
		self.surcharge
	}
}

fn grid() -> FlowFieldGrid {
	let mut grid = FlowFieldGrid::new(&GridSettings::default());
	grid.register_chunk(ChunkID::new(0, 0));
	grid
}

fn movement_cost(grid: &FlowFieldGrid, cell: GridCell) -> i32 {
	let (chunk, field) = cell.get_chunk_and_field();
	grid.get_registry()
		.get_chunk(&chunk)
		.unwrap()
		.get_movement_cost(field)
}

#[test]
fn overlapping_surcharges_add_up_and_retract() {
	let mut grid = grid();
	let shared = GridCell::new(4, 4);
	let a = RegistrantID::new(1);
	let b = RegistrantID::new(2);
	grid.get_costs_mut()
		.register(a, &Contribution::new(vec![shared], 50))
		.unwrap();
	grid.get_costs_mut()
		.register(b, &Contribution::new(vec![shared, GridCell::new(5, 4)], 25))
		.unwrap();
	grid.rebuild_contributions();
	assert_eq!(BASE_MOVEMENT_COST + 75, movement_cost(&grid, shared));
	assert_eq!(BASE_MOVEMENT_COST + 25, movement_cost(&grid, GridCell::new(5, 4)));

	grid.get_costs_mut().unregister(a).unwrap();
	grid.rebuild_contributions();
	assert_eq!(BASE_MOVEMENT_COST + 25, movement_cost(&grid, shared));

	grid.get_costs_mut().unregister(b).unwrap();
	grid.rebuild_contributions();
	assert_eq!(BASE_MOVEMENT_COST, movement_cost(&grid, shared));
	assert_eq!(BASE_MOVEMENT_COST, movement_cost(&grid, GridCell::new(5, 4)));
}

#[test]
fn moving_registrant_leaves_no_trail() {
	let mut grid = grid();
	let id = RegistrantID::new(9);
	let mut unit = Footprint {
		cells: vec![GridCell::new(1, 1)],
		surcharge: 300,
	};
	grid.get_costs_mut().register(id, &unit).unwrap();
	grid.rebuild_contributions();
	for column in 2..10 {
		unit.cells = vec![GridCell::new(column, 1)];
		grid.get_costs_mut().notify_changed(id, &unit).unwrap();
		grid.rebuild_contributions();
	}
	for column in 1..9 {
		assert_eq!(BASE_MOVEMENT_COST, movement_cost(&grid, GridCell::new(column, 1)));
	}
	assert_eq!(BASE_MOVEMENT_COST + 300, movement_cost(&grid, GridCell::new(9, 1)));
	assert_eq!(1, grid.get_costs().get_applied_count());
}

#[test]
fn overlapping_obstacles_need_both_removed() {
	let mut grid = grid();
	let cell = GridCell::new(7, 7);
	let first = RegistrantID::new(1);
	let second = RegistrantID::new(2);
	grid.get_blockers_mut()
		.register(first, &Contribution::new(vec![cell], true))
		.unwrap();
	grid.get_blockers_mut()
		.register(second, &Contribution::new(vec![cell], true))
		.unwrap();
	grid.rebuild_contributions();
	grid.get_blockers_mut().unregister(first).unwrap();
	grid.rebuild_contributions();
	assert!(!grid.get_registry().is_walkable(cell));
	grid.get_blockers_mut().unregister(second).unwrap();
	grid.rebuild_contributions();
	assert!(grid.get_registry().is_walkable(cell));
}

#[test]
fn protocol_violations_are_rejected() {
	let mut grid = grid();
	let id = RegistrantID::new(3);
	let target = Contribution::new(vec![GridCell::new(0, 0)], true);
	assert!(matches!(
		grid.get_targets_mut().notify_changed(id, &target),
		Err(GridError::NotRegistered { .. })
	));
	assert!(matches!(
		grid.get_targets_mut().unregister(id),
		Err(GridError::NotRegistered { .. })
	));
	grid.get_targets_mut().register(id, &target).unwrap();
	let moved = Contribution::new(vec![GridCell::new(3, 3)], true);
	assert!(matches!(
		grid.get_targets_mut().register(id, &moved),
		Err(GridError::AlreadyRegistered { .. })
	));
	// the rejected registration did not replace the original snapshot
	assert_eq!(
		&[GridCell::new(0, 0)],
		grid.get_targets().get_contribution(id).unwrap().get_cells()
	);
	assert_eq!(1, grid.get_targets().len());
}

#[test]
fn distance_bias_pushes_agents_around_danger() {
	let mut grid = grid();
	grid.get_targets_mut()
		.register(
			RegistrantID::new(1),
			&Contribution::new(vec![GridCell::new(8, 0)], true),
		)
		.unwrap();
	// a danger zone directly between the agent and the target
	let danger: Vec<GridCell> = (0..3)
		.flat_map(|row| (3..6).map(move |column| GridCell::new(column, row)))
		.collect();
	grid.get_distance_biases_mut()
		.register(RegistrantID::new(2), &Contribution::new(danger, 50_000))
		.unwrap();
	grid.warm_up(256);
	let start = bevy::prelude::Vec2::new(0.5, 0.5);
	// three diagonals up, two steps along row 3 and three diagonals down
	assert_eq!(10_400, grid.get_distance_at(start));
	assert_eq!(Ordinal::NorthEast, grid.get_direction_at(start));
}
