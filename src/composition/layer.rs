use std::sync::Arc ;
use parking_lot::RwLock ;
use thiserror::Error ;
use tracing::{ debug, info, warn };

use crate::{
	CompositionOptions, DefaultActivator, GroupCompositionId, GroupConnection, GroupDefinition,
	GroupImportDefinition, GroupImportEngine, InsertionPointId, PartCompositionId, PartImportEngine,
	PartInstanceId, PartRepository, TypeRepository,
};
use crate::instance::{ ChangeSet, InstanceError, InstanceUpdate, PartActivator, PartObject };
use super::{ CompositionObserver, CompositionSnapshot, ConnectionSnapshot, GroupSnapshot, PartSnapshot };
use super::state::{ CompositionState, GroupRecord };



/// Errors raised by composition operations.
#[derive( Debug, Error )]
pub enum CompositionError {

	/// A group id was added twice, or the same group import was connected twice
	/// to the same exporting group.
	#[error( "Duplicate definition: {0}" )]
	DuplicateDefinition( String ),

	/// The id does not name a live group.
	#[error( "Unknown group: {0}" )]
	UnknownGroup( GroupCompositionId ),

	/// The connection pairs an import with an export it does not accept, names a
	/// capability the groups do not have, or exceeds an import's cardinality.
	#[error( "Cannot map export {export} to import {import}" )]
	CannotMapExportToImport { import: String, export: String },

	/// The connection's insertion point does not exist or is full.
	#[error( "No insertion point available: {0}" )]
	NoInsertionPointAvailable( InsertionPointId ),

	/// Constructing or reconciling an instance failed.
	#[error( transparent )]
	Instance( #[from] InstanceError ),

}

fn cannot_map( import: impl ToString, export: impl ToString ) -> CompositionError {
	CompositionError::CannotMapExportToImport { import: import.to_string(), export: export.to_string() }
}

/// Live groups, their connections and the instances backing their parts.
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use plugin_link::{
/// 	CompositionLayer, CompositionOptions, DefaultActivator, ExportDefinition, GroupDefinitionBuilder,
/// 	ImportDefinition, ModuleOrigin, PartDefinition, PartState, TypeDefinition, TypeIdentity, TypeRepository,
/// };
///
/// let logger = TypeIdentity::new( "Logger" );
/// let service = TypeIdentity::new( "Service" );
/// let repository = Arc::new( TypeRepository::new() );
/// repository.add_batch(
/// 	ModuleOrigin::new( "app.plugin" ),
/// 	[ TypeDefinition::new( logger.clone(), []), TypeDefinition::new( service.clone(), [])],
/// 	[
/// 		PartDefinition::new( logger.clone() ).with_export( ExportDefinition::for_type( logger.clone(), None )),
/// 		PartDefinition::new( service.clone() )
/// 			.with_import( ImportDefinition::for_property( service.clone(), "logger", logger.clone(), None )),
/// 	],
/// ).unwrap();
///
/// let mut builder = GroupDefinitionBuilder::new( repository.as_ref() );
/// let part = builder.register_part( &logger ).unwrap();
/// builder.define_export( "logging", &part.exports, [] ).unwrap();
/// let logging = Arc::new( builder.register( "logging" ).unwrap() );
///
/// let mut builder = GroupDefinitionBuilder::new( repository.as_ref() );
/// let part = builder.register_part( &service ).unwrap();
/// builder.define_import( "logging", None, &part.imports ).unwrap();
/// let app = Arc::new( builder.register( "app" ).unwrap() );
///
/// let composition = CompositionLayer::new( Arc::clone( &repository ), DefaultActivator, CompositionOptions::default() );
/// let logging = composition.add( logging ).unwrap();
/// let app = composition.add( app ).unwrap();
/// assert_eq!( composition.unsatisfied_imports( app ).len(), 1 );
///
/// let changes = composition.connect_groups( app, "logging", logging ).unwrap();
/// assert_eq!( changes.len(), 1 );
/// assert!( composition.unsatisfied_imports( app ).is_empty() );
/// assert!( matches!( composition.snapshot().groups[1].parts[0].state, PartState::Constructed( _ )));
/// ```
pub struct CompositionLayer<R: PartRepository + ?Sized = TypeRepository, A: PartActivator = DefaultActivator> {
	repository: Arc<R>,
	options: CompositionOptions,
	state: RwLock<CompositionState<A>>,
	observers: RwLock<Vec<Arc<dyn CompositionObserver>>>,
}

impl<R: PartRepository + ?Sized, A: PartActivator> CompositionLayer<R, A> {

	pub fn new( repository: Arc<R>, activator: A, options: CompositionOptions ) -> Self {
		Self {
			repository,
			options,
			state: RwLock::new( CompositionState::new( activator )),
			observers: RwLock::new( Vec::new() ),
		}
	}

	#[inline] pub fn repository( &self ) -> &Arc<R> { &self.repository }
	#[inline] pub fn options( &self ) -> &CompositionOptions { &self.options }

	/// Registers an observer for the change lists of future mutations.
	pub fn subscribe( &self, observer: Arc<dyn CompositionObserver> ) {
		self.observers.write().push( observer );
	}

	/// Adds a group under a fresh id.
	///
	/// # Errors
	/// See [`add_with_id`]( Self::add_with_id ).
	pub fn add( &self, definition: Arc<GroupDefinition> ) -> Result<GroupCompositionId, CompositionError> {
		let id = GroupCompositionId::new();
		self.add_with_id( id, definition ).map(|()| id )
	}

	/// Adds a group and constructs its parts.
	///
	/// Parts are constructed once their prerequisites are available; parts whose
	/// prerequisites can only come through a group import stay pending until the
	/// group is connected. If any part fails to construct, every part constructed
	/// so far is released and the group is not added.
	///
	/// # Errors
	/// - [`CompositionError::DuplicateDefinition`] if `id` is already live.
	/// - [`CompositionError::Instance`] with [`InstanceError::ConstructionFailed`] if
	/// 	a part can never be constructed, or is pending while pending parts are
	/// 	disallowed, or construction itself fails.
	pub fn add_with_id( &self, id: GroupCompositionId, definition: Arc<GroupDefinition> ) -> Result<(), CompositionError> {

		let mut state = self.state.write();
		if state.groups.contains_key( &id ) {
			return Err( CompositionError::DuplicateDefinition( id.to_string() ));
		}

		let name = definition.id().clone();
		state.groups.insert( id, GroupRecord::new( definition ));
		state.order.push( id );

		let mut changes = ChangeSet::new();
		let result = state.construct_ready_parts( id )
			.and_then(|_| self.check_pending( &state, id ))
			.and_then(|()| state.reconcile_all( None, &mut changes ));

		if let Err( error ) = result {
			warn!( group = %id, definition = %name, %error, "Failed to add group, rolling back" );
			let mut ignored = ChangeSet::new();
			if let Err( release_error ) = state.release_group( id, &mut ignored ) {
				warn!( group = %id, error = %release_error, "Rollback left instances behind" );
			}
			return Err( error.into() );
		}

		let pending = state.groups.get( &id )
			.map_or( 0, | record | record.parts.values().filter(| part | part.instance().is_none() ).count() );
		info!( group = %id, definition = %name, pending, "Added group" );
		drop( state );
		self.notify( changes.into_updates() );
		Ok(())

	}

	/// Connects a group import to the group that satisfies it.
	///
	/// The connection is validated in full before anything changes. Applying it
	/// updates, rebuilds or constructs the affected parts, cascading to their
	/// dependents.
	///
	/// # Errors
	/// - [`CompositionError::UnknownGroup`] if either group is not live.
	/// - [`CompositionError::DuplicateDefinition`] if the same import is already
	/// 	connected to the same exporting group.
	/// - [`CompositionError::CannotMapExportToImport`] if the connection does not fit
	/// 	the groups' definitions, or some part import of the group import has no
	/// 	accepting export in the exporting group.
	/// - [`CompositionError::NoInsertionPointAvailable`] if the import's insertion
	/// 	point is undefined or full.
	/// - [`CompositionError::Instance`] if the cascade fails. The connection is
	/// 	withdrawn first when [`CompositionOptions::rollback_failed_connections`] is set.
	pub fn connect( &self, connection: GroupConnection ) -> Result<Vec<InstanceUpdate>, CompositionError> {

		let mut state = self.state.write();
		self.validate_connection( &state, &connection )?;

		let importing = connection.importing_group();
		let exporting = connection.exporting_group();
		let contract = connection.import().contract_name().to_string();
		state.connections.push( connection );

		let mut changes = ChangeSet::new();
		let result = state.reconcile_all( None, &mut changes );
		if let Err( error ) = result {
			if self.options.rollback_failed_connections {
				warn!( %importing, %exporting, import = %contract, %error, "Connection failed, rolling back" );
				state.connections.retain(| existing | !( existing.importing_group() == importing
					&& existing.exporting_group() == exporting
					&& existing.import().contract_name() == contract ));
				if let Err( rollback_error ) = state.reconcile_all( None, &mut changes ) {
					warn!( error = %rollback_error, "Rollback of failed connection did not complete" );
				}
			}
			drop( state );
			self.notify( changes.into_updates() );
			return Err( error.into() );
		}

		info!( %importing, %exporting, import = %contract, changes = changes.len(), "Connected groups" );
		drop( state );
		let updates = changes.into_updates();
		self.notify( updates.clone() );
		Ok( updates )

	}

	/// Connects `importing`'s group import `contract_name` to `exporting`, binding
	/// every part import to the exports the [`GroupImportEngine`] selects.
	///
	/// # Errors
	/// As [`connect`]( Self::connect ); additionally
	/// [`CompositionError::CannotMapExportToImport`] if `importing` has no such import.
	pub fn connect_groups(
		&self,
		importing: GroupCompositionId,
		contract_name: &str,
		exporting: GroupCompositionId,
	) -> Result<Vec<InstanceUpdate>, CompositionError> {

		let connection = {
			let state = self.state.read();
			let importing_definition = &state.groups.get( &importing ).ok_or( CompositionError::UnknownGroup( importing ))?.definition ;
			let exporting_definition = &state.groups.get( &exporting ).ok_or( CompositionError::UnknownGroup( exporting ))?.definition ;
			let import = importing_definition.group_import( contract_name )
				.ok_or_else(|| cannot_map( contract_name, exporting_definition.id() ))?;
			let maps = GroupImportEngine::new( self.repository.as_ref() )
				.generate_connection_for( importing_definition, import, exporting_definition );
			GroupConnection::new( importing, exporting, import.clone(), maps )
		};
		self.connect( connection )

	}

	/// Removes every connection from `exporting` into `importing`.
	///
	/// # Errors
	/// [`CompositionError::UnknownGroup`] if either group is not live, or
	/// [`CompositionError::Instance`] if the cascade fails.
	pub fn disconnect( &self, importing: GroupCompositionId, exporting: GroupCompositionId ) -> Result<Vec<InstanceUpdate>, CompositionError> {
		self.withdraw_connections(
			&[ importing, exporting ],
			| connection | connection.importing_group() == importing && connection.exporting_group() == exporting,
		)
	}

	/// Removes every connection `group` takes part in, on either side.
	///
	/// # Errors
	/// [`CompositionError::UnknownGroup`] if the group is not live, or
	/// [`CompositionError::Instance`] if the cascade fails.
	pub fn disconnect_all( &self, group: GroupCompositionId ) -> Result<Vec<InstanceUpdate>, CompositionError> {
		self.withdraw_connections( &[ group ], | connection | connection.touches( group ))
	}

	/// Removes a group, disconnecting its dependents first and then releasing its
	/// instances, newest first.
	///
	/// # Errors
	/// [`CompositionError::UnknownGroup`] if the group is not live, or
	/// [`CompositionError::Instance`] with the first cascade failure. The group is
	/// removed regardless.
	pub fn remove( &self, group: GroupCompositionId ) -> Result<Vec<InstanceUpdate>, CompositionError> {

		let mut state = self.state.write();
		if !state.groups.contains_key( &group ) {
			return Err( CompositionError::UnknownGroup( group ));
		}

		state.connections.retain(| connection | !connection.touches( group ));
		let mut changes = ChangeSet::new();
		let disconnected = state.reconcile_all( Some( group ), &mut changes );
		if let Err( error ) = &disconnected {
			warn!( %group, %error, "Dependents failed to reconcile while removing group" );
		}
		let released = state.release_group( group, &mut changes );

		info!( %group, changes = changes.len(), "Removed group" );
		drop( state );
		let updates = changes.into_updates();
		self.notify( updates.clone() );
		disconnected.and( released )?;
		Ok( updates )

	}

	/// Group imports of `group` satisfied by a connection. Empty for unknown groups.
	pub fn satisfied_imports( &self, group: GroupCompositionId ) -> Vec<GroupImportDefinition> {
		self.state.read().import_satisfaction( group ).0
	}

	/// Group imports of `group` no connection satisfies. Empty for unknown groups.
	pub fn unsatisfied_imports( &self, group: GroupCompositionId ) -> Vec<GroupImportDefinition> {
		self.state.read().import_satisfaction( group ).1
	}

	/// Returns `true` if `group` is live.
	pub fn contains( &self, group: GroupCompositionId ) -> bool {
		self.state.read().groups.contains_key( &group )
	}

	/// Live groups in the order they were added.
	pub fn groups( &self ) -> Vec<GroupCompositionId> {
		self.state.read().order.clone()
	}

	pub fn definition( &self, group: GroupCompositionId ) -> Option<Arc<GroupDefinition>> {
		self.state.read().groups.get( &group ).map(| record | Arc::clone( &record.definition ))
	}

	/// Connections `group` takes part in, in the order they were made.
	pub fn connections( &self, group: GroupCompositionId ) -> Vec<GroupConnection> {
		self.state.read().connections.iter()
			.filter(| connection | connection.touches( group ))
			.cloned()
			.collect()
	}

	/// The instance backing a part, if it is constructed.
	pub fn instance_for( &self, part: &PartCompositionId ) -> Option<PartInstanceId> {
		self.state.read().instance_of( part.group(), part.part() )
	}

	/// The part an instance backs.
	pub fn part_for( &self, instance: PartInstanceId ) -> Option<PartCompositionId> {
		self.state.read().part_for( instance )
	}

	/// The object backing a part, if it is constructed.
	pub fn object_for( &self, part: &PartCompositionId ) -> Option<PartObject> {
		let state = self.state.read();
		state.instance_of( part.group(), part.part() )
			.and_then(| instance | state.instances.object( instance ))
			.map( Arc::clone )
	}

	/// Current state of every live group and connection.
	pub fn snapshot( &self ) -> CompositionSnapshot {
		let state = self.state.read();
		let groups = state.order.iter()
			.filter_map(| id | state.groups.get( id ).map(| record | GroupSnapshot {
				id: *id,
				definition: record.definition.id().clone(),
				parts: record.definition.parts().iter()
					.filter_map(| part | record.parts.get( part.registration() ).map(| part_state | PartSnapshot {
						part: part.registration().clone(),
						state: *part_state,
					}))
					.collect(),
				unsatisfied_imports: state.import_satisfaction( *id ).1.iter()
					.map(| import | import.contract_name().to_string() )
					.collect(),
			}))
			.collect();
		let connections = state.connections.iter()
			.map(| connection | ConnectionSnapshot {
				importing_group: connection.importing_group(),
				exporting_group: connection.exporting_group(),
				import: connection.import().contract_name().to_string(),
				bindings: connection.part_connections().iter().map(| map | map.export_ids().count() ).sum(),
			})
			.collect();
		CompositionSnapshot { groups, connections }
	}

	fn withdraw_connections(
		&self,
		groups: &[GroupCompositionId],
		mut matches: impl FnMut( &GroupConnection ) -> bool,
	) -> Result<Vec<InstanceUpdate>, CompositionError> {

		let mut state = self.state.write();
		if let Some( unknown ) = groups.iter().find(| group | !state.groups.contains_key( *group )) {
			return Err( CompositionError::UnknownGroup( *unknown ));
		}

		let before = state.connections.len();
		state.connections.retain(| connection | !matches( connection ));
		let removed = before - state.connections.len();
		if removed == 0 { return Ok( Vec::new() ) }

		let mut changes = ChangeSet::new();
		let result = state.reconcile_all( None, &mut changes );
		info!( connections = removed, changes = changes.len(), "Disconnected groups" );
		drop( state );
		let updates = changes.into_updates();
		self.notify( updates.clone() );
		result?;
		Ok( updates )

	}

	/// Fails if `group` has pending parts that can never be constructed, or any
	/// pending part while pending parts are disallowed.
	fn check_pending( &self, state: &CompositionState<A>, group: GroupCompositionId ) -> Result<(), InstanceError> {

		if let Some( part ) = state.unviable_part( group ) {
			return Err( InstanceError::ConstructionFailed {
				part: part.part().identity().clone(),
				reason: "prerequisite imports are unwired or form a cycle".to_string(),
			});
		}

		if !self.options.allow_pending_parts {
			let pending = state.groups.get( &group ).and_then(| record | record.definition.parts().iter()
				.find(| part | record.parts.get( part.registration() ).is_some_and(| part_state | part_state.instance().is_none() )));
			if let Some( part ) = pending {
				return Err( InstanceError::ConstructionFailed {
					part: part.part().identity().clone(),
					reason: "prerequisite imports wait for a group import".to_string(),
				});
			}
		}

		Ok(())

	}

	fn validate_connection( &self, state: &CompositionState<A>, connection: &GroupConnection ) -> Result<(), CompositionError> {

		let importing_id = connection.importing_group();
		let exporting_id = connection.exporting_group();
		let importing = &state.groups.get( &importing_id ).ok_or( CompositionError::UnknownGroup( importing_id ))?.definition ;
		let exporting = &state.groups.get( &exporting_id ).ok_or( CompositionError::UnknownGroup( exporting_id ))?.definition ;
		let import = connection.import();

		if importing_id == exporting_id {
			return Err( cannot_map( import.contract_name(), "a group cannot import from itself" ));
		}
		if !importing.group_imports().contains( import ) {
			return Err( cannot_map( import.contract_name(), format!( "group '{}' declares no such import", importing.id() )));
		}
		let Some( export ) = exporting.group_export().filter(| export | export.contract_name() == import.contract_name() ) else {
			return Err( cannot_map( import.contract_name(), format!( "group '{}' exports no such contract", exporting.id() )));
		};
		if state.connections.iter().any(| existing | existing.importing_group() == importing_id
			&& existing.exporting_group() == exporting_id
			&& existing.import() == import )
		{
			return Err( CompositionError::DuplicateDefinition( format!( "{} from {}", import.contract_name(), exporting_id )));
		}

		if let Some( point ) = import.insertion_point() {
			if !export.exposes_schedule() {
				return Err( cannot_map( import.contract_name(), format!( "group '{}' exposes no schedule", exporting.id() )));
			}
			let has_room = importing.schedule()
				.and_then(| schedule | schedule.insertion_point( point ))
				.is_some_and(| definition | definition.has_room( state.used_insertions( importing_id, point )));
			if !has_room {
				return Err( CompositionError::NoInsertionPointAvailable( point ));
			}
		}

		if !GroupImportEngine::new( self.repository.as_ref() ).satisfies_every_import( importing, import, exporting, export ) {
			return Err( cannot_map( import.contract_name(), format!( "group '{}' cannot satisfy every import", exporting.id() )));
		}

		let engine = PartImportEngine::new( self.repository.as_ref() );
		for map in connection.part_connections() {

			let import_id = map.import();
			let part_import = importing.import_definition( import_id )
				.filter(|_| import.imports().contains( import_id ))
				.ok_or_else(|| cannot_map( import_id, "not part of the group import" ))?;

			for export_id in map.export_ids() {
				let part_export = exporting.export_definition( export_id )
					.filter(|_| export.provided_exports().contains( export_id ))
					.ok_or_else(|| cannot_map( import_id, export_id ))?;
				if !engine.accepts( part_import, part_export ) {
					return Err( cannot_map( import_id, export_id ));
				}
			}

			let total = state.bound_export_count( importing_id, import_id ) + map.export_ids().count();
			if self.options.enforce_cardinality && part_import.cardinality().is_exceeded_by( total ) {
				debug!( import = %import_id, total, cardinality = %part_import.cardinality(), "Connection exceeds cardinality" );
				return Err( cannot_map( import_id, format!( "{total} exports exceed cardinality {}", part_import.cardinality() )));
			}

		}

		Ok(())

	}

	fn notify( &self, updates: Vec<InstanceUpdate> ) {
		if updates.is_empty() { return }
		let observers = self.observers.read().clone();
		observers.iter().for_each(| observer | observer.on_changes( &updates ));
	}

}

impl<R: PartRepository + ?Sized, A: PartActivator> std::fmt::Debug for CompositionLayer<R, A> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let state = self.state.read();
		f.debug_struct( "CompositionLayer" )
			.field( "groups", &state.order )
			.field( "connections", &state.connections.len() )
			.field( "options", &self.options )
			.finish_non_exhaustive()
	}
}
