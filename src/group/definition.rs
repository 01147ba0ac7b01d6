use std::collections::BTreeMap ;
use std::sync::Arc ;

use crate::{
	ExportDefinition, ImportDefinition, PartDefinition, ScheduleActionDefinition, ScheduleConditionDefinition,
	ExportRegistrationId, ImportRegistrationId, PartRegistrationId, GroupRegistrationId, InsertionPointId,
	ScheduleActionRegistrationId, ScheduleConditionRegistrationId,
};
use super::ScheduleDefinition ;



/// A part registered in a group, with its capabilities keyed by registration id.
///
/// The part definition itself is shared with the repository; the maps only hold
/// positions into its capability lists.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct GroupPartDefinition {
	registration: PartRegistrationId,
	part: Arc<PartDefinition>,
	exports: BTreeMap<ExportRegistrationId, usize>,
	imports: BTreeMap<ImportRegistrationId, usize>,
	actions: BTreeMap<ScheduleActionRegistrationId, usize>,
	conditions: BTreeMap<ScheduleConditionRegistrationId, usize>,
}

#[allow( clippy::cast_possible_truncation )]
fn positions<T, Id: Ord>(
	items: &[T],
	mut id: impl FnMut( &T, u32 ) -> Id,
) -> BTreeMap<Id, usize> {
	items.iter().enumerate().map(|( index, item )| ( id( item, index as u32 ), index )).collect()
}

impl GroupPartDefinition {

	/// Registers `part` as the `ordinal`-th part of a group.
	pub fn new( part: Arc<PartDefinition>, ordinal: u32 ) -> Self {
		let registration = PartRegistrationId::new( part.identity(), ordinal );
		Self {
			exports: positions( part.exports(), | export, index |
				ExportRegistrationId::new( registration.clone(), export.contract_name(), index )),
			imports: positions( part.imports(), | import, index |
				ImportRegistrationId::new( registration.clone(), import.contract_name(), index )),
			actions: positions( part.actions(), | action, index |
				ScheduleActionRegistrationId::new( registration.clone(), action.contract_name(), index )),
			conditions: positions( part.conditions(), | condition, index |
				ScheduleConditionRegistrationId::new( registration.clone(), condition.contract_name(), index )),
			registration,
			part,
		}
	}

	#[inline] pub fn registration( &self ) -> &PartRegistrationId { &self.registration }
	#[inline] pub fn part( &self ) -> &Arc<PartDefinition> { &self.part }

	pub fn export( &self, id: &ExportRegistrationId ) -> Option<&ExportDefinition> {
		self.exports.get( id ).and_then(| index | self.part.exports().get( *index ))
	}

	pub fn import( &self, id: &ImportRegistrationId ) -> Option<&ImportDefinition> {
		self.imports.get( id ).and_then(| index | self.part.imports().get( *index ))
	}

	pub fn action( &self, id: &ScheduleActionRegistrationId ) -> Option<&ScheduleActionDefinition> {
		self.actions.get( id ).and_then(| index | self.part.actions().get( *index ))
	}

	pub fn condition( &self, id: &ScheduleConditionRegistrationId ) -> Option<&ScheduleConditionDefinition> {
		self.conditions.get( id ).and_then(| index | self.part.conditions().get( *index ))
	}

	/// Export registrations in declaration order.
	pub fn export_ids( &self ) -> impl Iterator<Item = &ExportRegistrationId> {
		sorted_by_position( &self.exports )
	}

	/// Import registrations in declaration order.
	pub fn import_ids( &self ) -> impl Iterator<Item = &ImportRegistrationId> {
		sorted_by_position( &self.imports )
	}

	pub fn action_ids( &self ) -> impl Iterator<Item = &ScheduleActionRegistrationId> {
		sorted_by_position( &self.actions )
	}

	pub fn condition_ids( &self ) -> impl Iterator<Item = &ScheduleConditionRegistrationId> {
		sorted_by_position( &self.conditions )
	}

	/// Import registrations paired with their definitions, in declaration order.
	pub fn imports( &self ) -> impl Iterator<Item = ( &ImportRegistrationId, &ImportDefinition )> {
		self.import_ids().filter_map( move | id | self.import( id ).map(| import | ( id, import )))
	}

}

fn sorted_by_position<Id>( map: &BTreeMap<Id, usize> ) -> impl Iterator<Item = &Id> {
	let mut entries = map.iter().collect::<Vec<_>>();
	entries.sort_by_key(|( _, index )| **index );
	entries.into_iter().map(|( id, _ )| id )
}

/// The export surface of a group.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct GroupExportDefinition {
	contract_name: String,
	containing_group: GroupRegistrationId,
	provided_exports: Vec<ExportRegistrationId>,
	exposes_schedule: bool,
	metadata: BTreeMap<String, String>,
}

impl GroupExportDefinition {

	pub fn new(
		contract_name: impl Into<String>,
		containing_group: GroupRegistrationId,
		provided_exports: impl IntoIterator<Item = ExportRegistrationId>,
		exposes_schedule: bool,
		metadata: impl IntoIterator<Item = ( String, String )>,
	) -> Self {
		Self {
			contract_name: contract_name.into(),
			containing_group,
			provided_exports: provided_exports.into_iter().collect(),
			exposes_schedule,
			metadata: metadata.into_iter().collect(),
		}
	}

	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn containing_group( &self ) -> &GroupRegistrationId { &self.containing_group }
	/// Part exports offered to importing groups, in offer order.
	#[inline] pub fn provided_exports( &self ) -> &[ExportRegistrationId] { &self.provided_exports }
	/// Returns `true` if the group offers its schedule for insertion into other groups.
	#[inline] pub fn exposes_schedule( &self ) -> bool { self.exposes_schedule }
	#[inline] pub fn metadata( &self ) -> &BTreeMap<String, String> { &self.metadata }

}

/// One import surface of a group.
///
/// Either aggregates a list of part imports, names an insertion point in the
/// group's schedule, or both.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct GroupImportDefinition {
	contract_name: String,
	containing_group: GroupRegistrationId,
	insertion_point: Option<InsertionPointId>,
	imports: Vec<ImportRegistrationId>,
}

impl GroupImportDefinition {

	pub fn new(
		contract_name: impl Into<String>,
		containing_group: GroupRegistrationId,
		insertion_point: Option<InsertionPointId>,
		imports: impl IntoIterator<Item = ImportRegistrationId>,
	) -> Self {
		Self {
			contract_name: contract_name.into(),
			containing_group,
			insertion_point,
			imports: imports.into_iter().collect(),
		}
	}

	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn containing_group( &self ) -> &GroupRegistrationId { &self.containing_group }
	#[inline] pub fn insertion_point( &self ) -> Option<InsertionPointId> { self.insertion_point }
	/// Part imports this group import satisfies, in declaration order.
	#[inline] pub fn imports( &self ) -> &[ImportRegistrationId] { &self.imports }

}

/// A named composite of parts with internal wiring and an external surface.
///
/// Built by [`GroupDefinitionBuilder`]( crate::GroupDefinitionBuilder ), which
/// guarantees every registration id referenced below belongs to one of the
/// group's parts.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct GroupDefinition {
	pub(crate) id: GroupRegistrationId,
	pub(crate) parts: Vec<GroupPartDefinition>,
	pub(crate) internal_connections: BTreeMap<ImportRegistrationId, Vec<ExportRegistrationId>>,
	pub(crate) schedule: Option<ScheduleDefinition>,
	pub(crate) export: Option<GroupExportDefinition>,
	pub(crate) imports: Vec<GroupImportDefinition>,
}

impl GroupDefinition {

	#[inline] pub fn id( &self ) -> &GroupRegistrationId { &self.id }
	/// Registered parts in declaration order.
	#[inline] pub fn parts( &self ) -> &[GroupPartDefinition] { &self.parts }
	/// Import to export wiring between the group's own parts.
	#[inline] pub fn internal_connections( &self ) -> &BTreeMap<ImportRegistrationId, Vec<ExportRegistrationId>> {
		&self.internal_connections
	}
	#[inline] pub fn schedule( &self ) -> Option<&ScheduleDefinition> { self.schedule.as_ref() }
	#[inline] pub fn group_export( &self ) -> Option<&GroupExportDefinition> { self.export.as_ref() }
	#[inline] pub fn group_imports( &self ) -> &[GroupImportDefinition] { &self.imports }

	pub fn part( &self, id: &PartRegistrationId ) -> Option<&GroupPartDefinition> {
		self.parts.iter().find(| part | part.registration() == id )
	}

	pub fn import_definition( &self, id: &ImportRegistrationId ) -> Option<&ImportDefinition> {
		self.part( id.owner() ).and_then(| part | part.import( id ))
	}

	pub fn export_definition( &self, id: &ExportRegistrationId ) -> Option<&ExportDefinition> {
		self.part( id.owner() ).and_then(| part | part.export( id ))
	}

	/// The group import with the given contract name.
	pub fn group_import( &self, contract_name: &str ) -> Option<&GroupImportDefinition> {
		self.imports.iter().find(| import | import.contract_name() == contract_name )
	}

}
