//! Errors surfaced by the grid
//!

use thiserror::Error;

use crate::prelude::*;

/// Result alias used across the crate
pub type GridResult<T> = Result<T, GridError>;

/// Ways in which a request against the grid can be rejected
#[derive(Error, Debug)]
pub enum GridError {
	/// A registrant tried to join a contribution set it is already a member of
	#[error("registrant {id:?} is already registered with the {layer} layer")]
	AlreadyRegistered {
		/// The offending registrant
		id: RegistrantID,
		/// Name of the layer the set derives
		layer: &'static str,
	},
	/// A registrant tried to change or leave a contribution set it isn't a member of
	#[error("registrant {id:?} is not registered with the {layer} layer")]
	NotRegistered {
		/// The offending registrant
		id: RegistrantID,
		/// Name of the layer the set derives
		layer: &'static str,
	},
	/// [GridSettings] failed validation
	#[error("invalid grid settings: {0}")]
	InvalidSettings(String),
	/// A settings file could not be opened
	#[cfg(feature = "ron")]
	#[error("failed opening settings file: {0}")]
	Io(#[from] std::io::Error),
	/// A settings file could not be deserialized
	#[cfg(feature = "ron")]
	#[error("failed deserializing settings: {0}")]
	Ron(#[from] ron::error::SpannedError),
}
