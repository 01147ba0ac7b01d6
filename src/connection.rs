//! Connections between live groups.

use nonempty_collections::NEVec ;

use crate::{ ExportRegistrationId, GroupCompositionId, GroupImportDefinition, ImportRegistrationId };



/// The exports one part import binds to in a group connection.
///
/// The export list is never empty: an import no export accepts is simply not
/// part of the connection.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct PartImportToPartExportMap {
	import: ImportRegistrationId,
	exports: NEVec<ExportRegistrationId>,
}

impl PartImportToPartExportMap {

	pub fn new( import: ImportRegistrationId, exports: NEVec<ExportRegistrationId> ) -> Self {
		Self { import, exports }
	}

	/// Builds a map from a possibly empty export list.
	pub fn try_new( import: ImportRegistrationId, exports: Vec<ExportRegistrationId> ) -> Option<Self> {
		NEVec::try_from_vec( exports ).map(| exports | Self { import, exports })
	}

	#[inline] pub fn import( &self ) -> &ImportRegistrationId { &self.import }
	#[inline] pub fn exports( &self ) -> &NEVec<ExportRegistrationId> { &self.exports }

	/// Exports in binding order.
	pub fn export_ids( &self ) -> impl Iterator<Item = &ExportRegistrationId> {
		( &self.exports ).into_iter()
	}

}

/// A satisfied group import: which live group imports from which, through what.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct GroupConnection {
	importing_group: GroupCompositionId,
	exporting_group: GroupCompositionId,
	import: GroupImportDefinition,
	part_connections: Vec<PartImportToPartExportMap>,
}

impl GroupConnection {

	pub fn new(
		importing_group: GroupCompositionId,
		exporting_group: GroupCompositionId,
		import: GroupImportDefinition,
		part_connections: impl IntoIterator<Item = PartImportToPartExportMap>,
	) -> Self {
		Self {
			importing_group,
			exporting_group,
			import,
			part_connections: part_connections.into_iter().collect(),
		}
	}

	#[inline] pub fn importing_group( &self ) -> GroupCompositionId { self.importing_group }
	#[inline] pub fn exporting_group( &self ) -> GroupCompositionId { self.exporting_group }
	#[inline] pub fn import( &self ) -> &GroupImportDefinition { &self.import }
	#[inline] pub fn part_connections( &self ) -> &[PartImportToPartExportMap] { &self.part_connections }

	/// Returns `true` if the connection involves `group` on either side.
	pub fn touches( &self, group: GroupCompositionId ) -> bool {
		self.importing_group == group || self.exporting_group == group
	}

	/// Exports bound to `import` through this connection.
	pub fn exports_for<'a, 'b>( &'a self, import: &'b ImportRegistrationId ) -> impl Iterator<Item = &'a ExportRegistrationId> + use<'a, 'b> {
		self.part_connections.iter()
			.filter( move | map | map.import() == import )
			.flat_map( PartImportToPartExportMap::export_ids )
	}

}
