use std::collections::BTreeMap ;
use std::sync::Arc ;
use pipe_trait::Pipe ;
use tracing::debug ;

use crate::{ ExportRegistrationId, PartImportEngine, PartImportToPartExportMap, PartRepository };
use super::{ GroupDefinition, GroupExportDefinition, GroupImportDefinition };



/// Selection key matched against a group export's contract name.
pub const CONTRACT_CRITERION: &str = "contract" ;
/// Selection key matched against the exporting group's name.
pub const GROUP_CRITERION: &str = "group" ;

/// Decides which groups can satisfy a group import and how their parts connect.
///
/// Like the [`PartImportEngine`], this is a query-only component: mismatches are
/// reported as `false` or empty results and the repository is never mutated.
pub struct GroupImportEngine<'a, R: PartRepository + ?Sized> {
	repository: &'a R,
}

impl<'a, R: PartRepository + ?Sized> GroupImportEngine<'a, R> {

	pub fn new( repository: &'a R ) -> Self { Self { repository }}

	/// Returns `true` if `export` can satisfy `import`.
	///
	/// The contract names must match, a schedule import needs an export that
	/// exposes its schedule, and every part import the group import aggregates must
	/// be accepted by at least one of the provided part exports. Both groups are
	/// resolved through the repository; an unknown group never matches.
	pub fn accepts( &self, import: &GroupImportDefinition, export: &GroupExportDefinition ) -> bool {

		if import.contract_name() != export.contract_name() { return false }
		if import.insertion_point().is_some() && !export.exposes_schedule() { return false }

		let ( Some( importing ), Some( exporting )) = (
			self.repository.group( import.containing_group() ),
			self.repository.group( export.containing_group() ),
		) else { return false };

		self.satisfies_every_import( &importing, import, &exporting, export )

	}

	/// Returns `true` if each part import of `import` is accepted by at least one
	/// provided export of `export`, with both groups already at hand.
	pub(crate) fn satisfies_every_import(
		&self,
		importing: &GroupDefinition,
		import: &GroupImportDefinition,
		exporting: &GroupDefinition,
		export: &GroupExportDefinition,
	) -> bool {
		let engine = PartImportEngine::new( self.repository );
		import.imports().iter().all(| id | importing.import_definition( id )
			.is_some_and(| part_import | export.provided_exports().iter()
				.filter_map(| export_id | exporting.export_definition( export_id ))
				.any(| part_export | engine.accepts( part_import, part_export ))
			)
		)
	}

	/// Returns `true` if `export` satisfies every key/value pair in `criteria`.
	///
	/// [`CONTRACT_CRITERION`] matches the contract name, [`GROUP_CRITERION`] the
	/// containing group's name, and any other key the export's metadata. Empty
	/// criteria accept every export.
	pub fn export_passes_selection_criteria( export: &GroupExportDefinition, criteria: &BTreeMap<String, String> ) -> bool {
		criteria.iter().all(|( key, value )| match key.as_str() {
			CONTRACT_CRITERION => export.contract_name() == value,
			GROUP_CRITERION => export.containing_group().name() == value,
			_ => export.metadata().get( key ) == Some( value ),
		})
	}

	/// Every known group with an export passing `criteria`, ordered by group id.
	pub fn matching_groups( &self, criteria: &BTreeMap<String, String> ) -> Vec<Arc<GroupDefinition>> {
		self.repository.groups().into_iter()
			.filter(| group | group.group_export()
				.is_some_and(| export | Self::export_passes_selection_criteria( export, criteria )))
			.collect()
	}

	/// Every known group whose export [`accepts`]( Self::accepts ) `import`, ordered by group id.
	pub fn matching_groups_for_import( &self, import: &GroupImportDefinition ) -> Vec<Arc<GroupDefinition>> {
		self.repository.groups().into_iter()
			.filter(| group | group.group_export().is_some_and(| export | self.accepts( import, export )))
			.collect::<Vec<_>>()
			.pipe(| groups | {
				debug!( import = import.contract_name(), matches = groups.len(), "Matched groups for import" );
				groups
			})
	}

	/// Maps each part import of `import` onto the exports of `exporting` that accept it.
	///
	/// Maps follow the import list's order and exports within a map follow the
	/// provided-export order. A sequence-shaped import binds every accepted export
	/// and any other import binds the first one, whatever cardinality either
	/// declares. Imports no export accepts are left out.
	pub fn generate_connection_for(
		&self,
		importing: &GroupDefinition,
		import: &GroupImportDefinition,
		exporting: &GroupDefinition,
	) -> Vec<PartImportToPartExportMap> {

		let Some( export ) = exporting.group_export() else { return Vec::new() };
		let engine = PartImportEngine::new( self.repository );

		import.imports().iter()
			.filter_map(| id | importing.import_definition( id ).map(| definition | ( id, definition )))
			.filter_map(|( id, definition )| {
				let accepted = export.provided_exports().iter()
					.filter(| export_id | exporting.export_definition( export_id )
						.is_some_and(| part_export | engine.accepts( definition, part_export )))
					.cloned();
				let exports: Vec<ExportRegistrationId> = match definition.shape().is_collection() {
					true => accepted.collect(),
					false => accepted.take( 1 ).collect(),
				};
				PartImportToPartExportMap::try_new( id.clone(), exports )
			})
			.collect()

	}

}
