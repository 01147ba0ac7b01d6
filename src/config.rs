//! Composition behaviour switches.
//!
//! Options can be built in code or read from TOML:
//!
//! ```toml
//! # Reject connections binding more exports than an import's cardinality admits.
//! enforce_cardinality = true
//! # Keep parts whose prerequisites come from another group pending until connected.
//! allow_pending_parts = true
//! # Withdraw a connection whose cascade fails and restore the previous bindings.
//! rollback_failed_connections = true
//! ```

use serde::{ Deserialize, Serialize };
use thiserror::Error ;



/// Error returned when options cannot be parsed.
#[derive( Debug, Error )]
pub enum ConfigError {
	#[error( "Invalid composition options: {0}" )]
	Parse( #[from] toml::de::Error ),
}

/// Options of a [`CompositionLayer`]( crate::CompositionLayer ).
#[derive( Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize )]
#[serde( default, deny_unknown_fields )]
pub struct CompositionOptions {
	/// `connect` rejects bindings exceeding an import's cardinality.
	pub enforce_cardinality: bool,
	/// `add` accepts parts whose required prerequisites can only be satisfied by
	/// a group import; they are constructed once the group is connected.
	pub allow_pending_parts: bool,
	/// A `connect` whose cascade fails is withdrawn before the error is returned.
	pub rollback_failed_connections: bool,
}

impl Default for CompositionOptions {
	fn default() -> Self {
		Self {
			enforce_cardinality: true,
			allow_pending_parts: true,
			rollback_failed_connections: true,
		}
	}
}

impl CompositionOptions {

	/// Parses options from TOML; missing keys take their default.
	///
	/// # Errors
	/// [`ConfigError::Parse`] on malformed TOML or unknown keys.
	pub fn from_toml_str( text: &str ) -> Result<Self, ConfigError> {
		Ok( toml::from_str( text )? )
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn missing_keys_take_defaults() {
		let options = CompositionOptions::from_toml_str( "allow_pending_parts = false" ).unwrap();
		assert_eq!( options, CompositionOptions { allow_pending_parts: false, ..CompositionOptions::default() });
	}

	#[test]
	fn empty_document_is_default() {
		assert_eq!( CompositionOptions::from_toml_str( "" ).unwrap(), CompositionOptions::default() );
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!( matches!( CompositionOptions::from_toml_str( "strict = true" ), Err( ConfigError::Parse( _ ))));
	}

}
