//! Tunable parameters of the grid, inserted as a [Resource] before the
//! plugin is added or loaded from disk with the `ron` feature
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Parameters shared by the grid, the solver and the spatial hash
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct GridSettings {
	/// World space length of one side of a grid cell
	cell_size: f32,
	/// Relaxation passes performed each tick
	passes_per_tick: u32,
	/// Whether diagonal steps may squeeze between two unwalkable cells
	allow_corner_cutting: bool,
	/// World space length of one side of a spatial hash bucket, ideally close to the typical query radius
	spatial_cell_size: f32,
	/// Upper bound on entries within a single spatial hash bucket, exceeding it is fatal
	spatial_bucket_budget: Option<usize>,
}

impl Default for GridSettings {
	fn default() -> Self {
		GridSettings {
			cell_size: 1.0,
			passes_per_tick: 1,
			allow_corner_cutting: false,
			spatial_cell_size: 4.0,
			spatial_bucket_budget: None,
		}
	}
}

impl GridSettings {
	/// Create a new instance of [GridSettings]. Both sizes must be positive finite numbers
	pub fn new(cell_size: f32, spatial_cell_size: f32) -> Self {
		let settings = GridSettings {
			cell_size,
			spatial_cell_size,
			..Default::default()
		};
		if let Err(e) = settings.validate() {
			panic!("{}", e);
		}
		settings
	}
	/// Set how many relaxation passes run each tick
	pub fn with_passes_per_tick(mut self, passes: u32) -> Self {
		if passes == 0 {
			panic!("At least one relaxation pass must run each tick");
		}
		self.passes_per_tick = passes;
		self
	}
	/// Allow diagonal steps between two unwalkable cells
	pub fn with_corner_cutting(mut self, allow: bool) -> Self {
		self.allow_corner_cutting = allow;
		self
	}
	/// Treat more than `budget` entries in one spatial hash bucket as fatal
	pub fn with_bucket_budget(mut self, budget: usize) -> Self {
		self.spatial_bucket_budget = Some(budget);
		self
	}
	/// World space length of one side of a grid cell
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Relaxation passes performed each tick
	pub fn get_passes_per_tick(&self) -> u32 {
		self.passes_per_tick
	}
	/// Whether diagonal steps may squeeze between two unwalkable cells
	pub fn get_allow_corner_cutting(&self) -> bool {
		self.allow_corner_cutting
	}
	/// World space length of one side of a spatial hash bucket
	pub fn get_spatial_cell_size(&self) -> f32 {
		self.spatial_cell_size
	}
	/// Upper bound on entries within a single spatial hash bucket
	pub fn get_spatial_bucket_budget(&self) -> Option<usize> {
		self.spatial_bucket_budget
	}
	/// Check every parameter is usable
	pub fn validate(&self) -> GridResult<()> {
		if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
			return Err(GridError::InvalidSettings(format!(
				"cell size `{}` must be a positive finite number",
				self.cell_size
			)));
		}
		if !self.spatial_cell_size.is_finite() || self.spatial_cell_size <= 0.0 {
			return Err(GridError::InvalidSettings(format!(
				"spatial cell size `{}` must be a positive finite number",
				self.spatial_cell_size
			)));
		}
		if self.passes_per_tick == 0 {
			return Err(GridError::InvalidSettings(
				"at least one relaxation pass must run each tick".to_string(),
			));
		}
		if self.spatial_bucket_budget == Some(0) {
			return Err(GridError::InvalidSettings(
				"a spatial bucket budget of zero cannot hold any entry".to_string(),
			));
		}
		Ok(())
	}
	/// Read and validate [GridSettings] from a `.ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> GridResult<Self> {
		let file = std::fs::File::open(path)?;
		let settings: GridSettings = ron::de::from_reader(file)?;
		settings.validate()?;
		Ok(settings)
	}
}
