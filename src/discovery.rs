//! The seam to part discovery.
//!
//! Discovery scans modules on disk (possibly in an isolated process) and reports
//! what it found as batches, one per origin. How scanning and isolation work is
//! up to the implementor; the repository only consumes finished batches through
//! [`TypeRepository::ingest`]( crate::TypeRepository::ingest ) or
//! [`TypeRepository::add_batch`]( crate::TypeRepository::add_batch ).

use crate::{ ModuleOrigin, PartDefinition, TypeDefinition };



/// The types and parts discovered in one origin.
#[derive( Debug, Clone )]
pub struct ScanBatch {
	pub origin: ModuleOrigin,
	pub types: Vec<TypeDefinition>,
	pub parts: Vec<PartDefinition>,
}

/// Scans module paths for types and parts.
pub trait PartScanner {

	/// Error type for scanning failures.
	type Error: std::error::Error ;

	/// Scans `paths` and returns one batch per origin found.
	///
	/// # Errors
	/// Implementations may fail if a module cannot be read or inspected.
	fn scan( &self, paths: &[std::path::PathBuf] ) -> Result<Vec<ScanBatch>, Self::Error> ;

}
