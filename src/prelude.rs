//! `use bevy_flowfield_grid::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::flowfields::{
	chunks::{chunk_registry::*, *},
	contributions::{merge::*, *},
	fields::{flow_field::*, *},
	solver::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::spatial::{priority_heap::*, *};

#[doc(hidden)]
pub use crate::{
	error::*,
	grid::*,
	plugin::{contribution_layer::*, flow_layer::*, spatial_layer::*, *},
	settings::*,
};
