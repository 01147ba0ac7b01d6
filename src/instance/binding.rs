use serde::{ Deserialize, Serialize };

use crate::{ ExportRegistrationId, ImportRegistrationId, PartInstanceId };



/// One import of an instance fed by one export of another instance.
///
/// An import with cardinality `Many` appears in several bindings, one per export,
/// in binding order.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct InstanceBinding {
	import: ImportRegistrationId,
	source: PartInstanceId,
	export: ExportRegistrationId,
}

impl InstanceBinding {

	pub fn new( import: ImportRegistrationId, source: PartInstanceId, export: ExportRegistrationId ) -> Self {
		Self { import, source, export }
	}

	#[inline] pub fn import( &self ) -> &ImportRegistrationId { &self.import }
	/// The instance providing the export.
	#[inline] pub fn source( &self ) -> PartInstanceId { self.source }
	#[inline] pub fn export( &self ) -> &ExportRegistrationId { &self.export }

}

/// Orders bindings by import position, keeping the relative order of each import's exports.
pub(super) fn normalise( mut bindings: Vec<InstanceBinding> ) -> Vec<InstanceBinding> {
	bindings.sort_by_key(| binding | binding.import.position() );
	bindings
}
