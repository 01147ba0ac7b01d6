use std::collections::{ BTreeMap, HashSet };
use thiserror::Error ;
use tracing::debug ;

use crate::{
	ExportRegistrationId, ImportRegistrationId, PartRegistrationId, GroupRegistrationId, InsertionPointId,
	ScheduleActionRegistrationId, ScheduleConditionRegistrationId, PartImportEngine, PartRepository, TypeIdentity,
};
use super::{ GroupDefinition, GroupExportDefinition, GroupImportDefinition, GroupPartDefinition, ScheduleDefinition };



/// Errors raised while assembling a [`GroupDefinition`].
#[derive( Debug, Error, PartialEq, Eq )]
pub enum GroupBuildError {
	/// The part's type is not registered in the repository.
	#[error( "Unknown plugin type: {0}" )] UnknownPluginType( TypeIdentity ),
	/// A registration id does not belong to any part registered in this group.
	#[error( "Unknown registration: {0}" )] UnknownRegistration( String ),
	/// Something was defined twice: an import connected twice, a second export
	/// surface, or two group imports with the same contract name.
	#[error( "Duplicate definition: {0}" )] DuplicateDefinition( String ),
	/// An internal connection pairs an import with an export it does not accept,
	/// or binds more exports than the import's cardinality admits.
	#[error( "Cannot map export {export} to import {import}" )]
	CannotMapExportToImport { import: String, export: String },
	/// A group import names an insertion point the group's schedule does not define.
	#[error( "No insertion point available: {0}" )] NoInsertionPointAvailable( InsertionPointId ),
}

/// Capability registrations of a part just added to a builder, in declaration order.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct RegisteredPart {
	pub registration: PartRegistrationId,
	pub exports: Vec<ExportRegistrationId>,
	pub imports: Vec<ImportRegistrationId>,
	pub actions: Vec<ScheduleActionRegistrationId>,
	pub conditions: Vec<ScheduleConditionRegistrationId>,
}

struct PendingExport {
	contract_name: String,
	provided_exports: Vec<ExportRegistrationId>,
	metadata: BTreeMap<String, String>,
}

struct PendingImport {
	contract_name: String,
	insertion_point: Option<InsertionPointId>,
	imports: Vec<ImportRegistrationId>,
}

/// Assembles registered parts, their internal wiring and an optional schedule
/// into a [`GroupDefinition`].
///
/// Internal connections are validated with the [`PartImportEngine`] as they are
/// made, so a finished group only contains wiring the parts accept.
/// [`register`]( Self::register ) hands back the finished definition without
/// storing it anywhere.
///
/// # Example
///
/// ```
/// use plugin_link::{
/// 	ExportDefinition, GroupDefinitionBuilder, ImportDefinition, ModuleOrigin,
/// 	ParameterDefinition, PartDefinition, TypeDefinition, TypeIdentity, TypeRepository,
/// };
///
/// let clock = TypeIdentity::new( "Clock" );
/// let timer = TypeIdentity::new( "Timer" );
///
/// let repository = TypeRepository::new();
/// repository.add_batch(
/// 	ModuleOrigin::new( "time.plugin" ),
/// 	[ TypeDefinition::new( clock.clone(), []), TypeDefinition::new( timer.clone(), [])],
/// 	[
/// 		PartDefinition::new( clock.clone() ).with_export( ExportDefinition::for_type( clock.clone(), None )),
/// 		PartDefinition::new( timer.clone() )
/// 			.with_export( ExportDefinition::for_type( timer.clone(), None ))
/// 			.with_import( ImportDefinition::for_constructor(
/// 				timer.clone(), ParameterDefinition::new( "clock", clock.clone() ), None,
/// 			)),
/// 	],
/// ).unwrap();
///
/// let mut builder = GroupDefinitionBuilder::new( &repository );
/// let clock_part = builder.register_part( &clock ).unwrap();
/// let timer_part = builder.register_part( &timer ).unwrap();
/// builder.connect( &timer_part.imports[0], &clock_part.exports ).unwrap();
/// builder.define_export( "timing", &timer_part.exports, [] ).unwrap();
///
/// let group = builder.register( "timing-group" ).unwrap();
/// assert_eq!( group.parts().len(), 2 );
/// assert_eq!( group.internal_connections().len(), 1 );
/// ```
pub struct GroupDefinitionBuilder<'a, R: PartRepository + ?Sized> {
	repository: &'a R,
	parts: Vec<GroupPartDefinition>,
	connections: BTreeMap<ImportRegistrationId, Vec<ExportRegistrationId>>,
	export: Option<PendingExport>,
	imports: Vec<PendingImport>,
	schedule: Option<ScheduleDefinition>,
}

impl<'a, R: PartRepository + ?Sized> GroupDefinitionBuilder<'a, R> {

	pub fn new( repository: &'a R ) -> Self {
		Self {
			repository,
			parts: Vec::new(),
			connections: BTreeMap::new(),
			export: None,
			imports: Vec::with_capacity( 0 ),
			schedule: None,
		}
	}

	/// Registers one more instance of the part with type `identity`.
	///
	/// The same part type may be registered several times; each registration gets
	/// the next ordinal.
	///
	/// # Errors
	/// [`GroupBuildError::UnknownPluginType`] if the repository has no such part.
	#[allow( clippy::cast_possible_truncation )]
	pub fn register_part( &mut self, identity: &TypeIdentity ) -> Result<RegisteredPart, GroupBuildError> {

		let part = self.repository.part( identity )
			.ok_or_else(|| GroupBuildError::UnknownPluginType( identity.clone() ))?;
		let part = GroupPartDefinition::new( part, self.parts.len() as u32 );

		let registered = RegisteredPart {
			registration: part.registration().clone(),
			exports: part.export_ids().cloned().collect(),
			imports: part.import_ids().cloned().collect(),
			actions: part.action_ids().cloned().collect(),
			conditions: part.condition_ids().cloned().collect(),
		};
		debug!( part = %registered.registration, "Registered part in group builder" );
		self.parts.push( part );
		Ok( registered )

	}

	/// Wires `import` to `exports` inside the group.
	///
	/// # Errors
	/// - [`GroupBuildError::UnknownRegistration`] if an id does not belong to this group.
	/// - [`GroupBuildError::DuplicateDefinition`] if the import is already connected.
	/// - [`GroupBuildError::CannotMapExportToImport`] if an export is not accepted or
	/// 	the import's cardinality is exceeded.
	pub fn connect( &mut self, import: &ImportRegistrationId, exports: &[ExportRegistrationId] ) -> Result<(), GroupBuildError> {

		let import_definition = self.part( import.owner() )
			.and_then(| part | part.import( import ))
			.ok_or_else(|| GroupBuildError::UnknownRegistration( import.to_string() ))?;

		if self.connections.contains_key( import ) {
			return Err( GroupBuildError::DuplicateDefinition( import.to_string() ));
		}

		if import_definition.cardinality().is_exceeded_by( exports.len() ) {
			return Err( GroupBuildError::CannotMapExportToImport {
				import: import.to_string(),
				export: exports.iter().map( ToString::to_string ).collect::<Vec<_>>().join( ", " ),
			});
		}

		let engine = PartImportEngine::new( self.repository );
		for export in exports {
			let export_definition = self.part( export.owner() )
				.and_then(| part | part.export( export ))
				.ok_or_else(|| GroupBuildError::UnknownRegistration( export.to_string() ))?;
			if !engine.accepts( import_definition, export_definition ) {
				return Err( GroupBuildError::CannotMapExportToImport {
					import: import.to_string(),
					export: export.to_string(),
				});
			}
		}

		debug!( %import, exports = exports.len(), "Connected import inside group" );
		self.connections.insert( import.clone(), exports.to_vec() );
		Ok(())

	}

	/// Defines the group's export surface.
	///
	/// # Errors
	/// - [`GroupBuildError::DuplicateDefinition`] if an export surface already exists.
	/// - [`GroupBuildError::UnknownRegistration`] if a provided export is not part of the group.
	pub fn define_export(
		&mut self,
		contract_name: impl Into<String>,
		provided_exports: &[ExportRegistrationId],
		metadata: impl IntoIterator<Item = ( String, String )>,
	) -> Result<(), GroupBuildError> {

		let contract_name = contract_name.into();
		if self.export.is_some() {
			return Err( GroupBuildError::DuplicateDefinition( contract_name ));
		}
		self.ensure_exports( provided_exports )?;
		self.export = Some( PendingExport {
			contract_name,
			provided_exports: provided_exports.to_vec(),
			metadata: metadata.into_iter().collect(),
		});
		Ok(())

	}

	/// Defines a group import aggregating `imports` and, optionally, naming an
	/// insertion point in this group's schedule.
	///
	/// # Errors
	/// - [`GroupBuildError::DuplicateDefinition`] if a group import with this contract exists.
	/// - [`GroupBuildError::UnknownRegistration`] if an import is not part of the group.
	pub fn define_import(
		&mut self,
		contract_name: impl Into<String>,
		insertion_point: Option<InsertionPointId>,
		imports: &[ImportRegistrationId],
	) -> Result<(), GroupBuildError> {

		let contract_name = contract_name.into();
		if self.imports.iter().any(| import | import.contract_name == contract_name ) {
			return Err( GroupBuildError::DuplicateDefinition( contract_name ));
		}
		if let Some( unknown ) = imports.iter().find(| import | self.part( import.owner() )
			.and_then(| part | part.import( import ))
			.is_none()
		) {
			return Err( GroupBuildError::UnknownRegistration( unknown.to_string() ));
		}
		self.imports.push( PendingImport { contract_name, insertion_point, imports: imports.to_vec() });
		Ok(())

	}

	/// Attaches a schedule to the group, replacing any previous one.
	pub fn define_schedule( &mut self, schedule: ScheduleDefinition ) {
		self.schedule = Some( schedule );
	}

	/// Finishes the group.
	///
	/// The definition is returned, not stored: the [`GroupImportEngine`]( crate::GroupImportEngine )
	/// only sees it once it is passed to [`TypeRepository::add_group`]( crate::TypeRepository::add_group ).
	///
	/// # Errors
	/// - [`GroupBuildError::UnknownRegistration`] if the schedule uses an action or
	/// 	condition that is not part of the group.
	/// - [`GroupBuildError::NoInsertionPointAvailable`] if a group import names an
	/// 	insertion point the schedule does not define.
	pub fn register( self, name: impl Into<String> ) -> Result<GroupDefinition, GroupBuildError> {

		let id = GroupRegistrationId::new( name );

		if let Some( schedule ) = &self.schedule {
			if let Some( action ) = schedule.actions().iter()
				.find(| action | self.part( action.owner() ).and_then(| part | part.action( action )).is_none() )
			{
				return Err( GroupBuildError::UnknownRegistration( action.to_string() ));
			}
			if let Some( condition ) = schedule.conditions().iter()
				.find(| condition | self.part( condition.owner() ).and_then(| part | part.condition( condition )).is_none() )
			{
				return Err( GroupBuildError::UnknownRegistration( condition.to_string() ));
			}
			let mut seen = HashSet::new();
			if let Some( point ) = schedule.insertion_points().iter().find(| point | !seen.insert( point.id() )) {
				return Err( GroupBuildError::DuplicateDefinition( format!( "insertion point {}", point.id() )));
			}
		}

		if let Some( point ) = self.imports.iter()
			.filter_map(| import | import.insertion_point )
			.find(| point | self.schedule.as_ref().and_then(| schedule | schedule.insertion_point( *point )).is_none() )
		{
			return Err( GroupBuildError::NoInsertionPointAvailable( point ));
		}

		let exposes_schedule = self.schedule.is_some();
		let export = self.export.map(| export | GroupExportDefinition::new(
			export.contract_name,
			id.clone(),
			export.provided_exports,
			exposes_schedule,
			export.metadata,
		));
		let imports = self.imports.into_iter()
			.map(| import | GroupImportDefinition::new( import.contract_name, id.clone(), import.insertion_point, import.imports ))
			.collect();

		debug!( group = %id, parts = self.parts.len(), "Built group definition" );
		Ok( GroupDefinition {
			id,
			parts: self.parts,
			internal_connections: self.connections,
			schedule: self.schedule,
			export,
			imports,
		})

	}

	fn part( &self, id: &PartRegistrationId ) -> Option<&GroupPartDefinition> {
		self.parts.iter().find(| part | part.registration() == id )
	}

	fn ensure_exports( &self, exports: &[ExportRegistrationId] ) -> Result<(), GroupBuildError> {
		match exports.iter().find(| export | self.part( export.owner() ).and_then(| part | part.export( export )).is_none() ) {
			Some( unknown ) => Err( GroupBuildError::UnknownRegistration( unknown.to_string() )),
			None => Ok(()),
		}
	}

}
