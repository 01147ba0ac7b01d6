//! Type, part and group storage.
//!
//! The composition core consumes type information through two traits:
//! [`TypeStore`] answers identity and subtype questions, [`PartRepository`]
//! additionally hands out the part and group definitions discovery produced.
//! [`TypeRepository`] is the in-memory implementation of both. It is an explicit
//! object shared through an `Arc` by whoever needs it, never ambient state.
//!
//! Every definition in the repository remembers the [`ModuleOrigin`] it was
//! discovered in, so that unloading a module purges exactly what it contributed.

use std::collections::{ BTreeSet, HashMap, HashSet };
use std::sync::Arc ;
use itertools::Itertools ;
use parking_lot::RwLock ;
use serde::{ Deserialize, Serialize };
use thiserror::Error ;
use tracing::{ debug, info };

use crate::{ GroupDefinition, GroupRegistrationId, PartDefinition, TypeIdentity };
use crate::discovery::{ PartScanner, ScanBatch };



/// The file or module a definition was discovered in.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct ModuleOrigin( String );

impl ModuleOrigin {
	pub fn new( origin: impl Into<String> ) -> Self { Self( origin.into() )}
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl std::fmt::Display for ModuleOrigin {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { f.write_str( &self.0 )}
}

/// Reflection-shaped description of one type: its identity and direct supertypes.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct TypeDefinition {
	identity: TypeIdentity,
	base_types: Vec<TypeIdentity>,
}

impl TypeDefinition {

	pub fn new( identity: TypeIdentity, base_types: impl IntoIterator<Item = TypeIdentity> ) -> Self {
		Self { identity, base_types: base_types.into_iter().collect() }
	}

	#[inline] pub fn identity( &self ) -> &TypeIdentity { &self.identity }
	/// Direct base types and implemented interfaces.
	#[inline] pub fn base_types( &self ) -> &[TypeIdentity] { &self.base_types }

}

/// Errors raised while registering or looking up definitions.
#[derive( Debug, Error, PartialEq, Eq )]
pub enum RepositoryError {
	/// A part or group was registered twice under the same identity.
	#[error( "Duplicate definition: {0}" )] DuplicateDefinition( String ),
	/// A definition references a type that was never registered.
	#[error( "Unknown plugin type: {0}" )] UnknownPluginType( TypeIdentity ),
}

/// Identity and subtype queries over the known types.
pub trait TypeStore {

	/// Looks an identity up by its display name, e.g. `"Sequence<Int>"`.
	fn identity_by_name( &self, name: &str ) -> Option<TypeIdentity> ;

	/// The stored definition of `identity`, if any.
	fn type_by_identity( &self, identity: &TypeIdentity ) -> Option<Arc<TypeDefinition>> ;

	/// Returns `true` if `child` derives from or implements `parent`, directly or
	/// transitively. A type is not its own subtype.
	fn is_subtype_of( &self, parent: &TypeIdentity, child: &TypeIdentity ) -> bool ;

	/// Returns `true` if a definition for `identity` is stored.
	fn contains_definition_for_type( &self, identity: &TypeIdentity ) -> bool ;

}

/// Access to the part and group definitions produced by discovery.
pub trait PartRepository: TypeStore {

	fn part( &self, identity: &TypeIdentity ) -> Option<Arc<PartDefinition>> ;

	fn parts( &self ) -> Vec<Arc<PartDefinition>> ;

	fn group( &self, id: &GroupRegistrationId ) -> Option<Arc<GroupDefinition>> ;

	/// Every known group, ordered by registration id.
	fn groups( &self ) -> Vec<Arc<GroupDefinition>> ;

}

/// What a call to [`TypeRepository::remove_origins`] purged.
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct RemovedDefinitions {
	pub types: Vec<TypeIdentity>,
	pub parts: Vec<TypeIdentity>,
	pub groups: Vec<GroupRegistrationId>,
}

struct TypeRecord {
	definition: Arc<TypeDefinition>,
	origins: BTreeSet<ModuleOrigin>,
}

struct Tables {
	types: HashMap<TypeIdentity, TypeRecord>,
	names: HashMap<String, TypeIdentity>,
	parts: HashMap<TypeIdentity, ( Arc<PartDefinition>, ModuleOrigin )>,
	groups: HashMap<GroupRegistrationId, ( Arc<GroupDefinition>, ModuleOrigin )>,
}

/// In-memory [`PartRepository`].
///
/// # Example
///
/// ```
/// use plugin_link::{ ModuleOrigin, PartDefinition, TypeDefinition, TypeIdentity, TypeRepository, TypeStore };
///
/// let animal = TypeIdentity::new( "Animal" );
/// let dog = TypeIdentity::new( "Dog" );
///
/// let repository = TypeRepository::new();
/// repository.add_batch(
/// 	ModuleOrigin::new( "zoo.plugin" ),
/// 	[ TypeDefinition::new( animal.clone(), []), TypeDefinition::new( dog.clone(), [ animal.clone() ])],
/// 	[ PartDefinition::new( dog.clone() )],
/// ).unwrap();
///
/// assert!( repository.is_subtype_of( &animal, &dog ));
/// assert!( !repository.is_subtype_of( &dog, &animal ));
/// ```
pub struct TypeRepository {
	tables: RwLock<Tables>,
}

impl Default for TypeRepository {
	fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for TypeRepository {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let tables = self.tables.read();
		f.debug_struct( "TypeRepository" )
			.field( "types", &tables.types.len() )
			.field( "parts", &tables.parts.len() )
			.field( "groups", &tables.groups.len() )
			.finish()
	}
}

impl TypeRepository {

	pub fn new() -> Self {
		Self { tables: RwLock::new( Tables {
			types: HashMap::new(),
			names: HashMap::new(),
			parts: HashMap::new(),
			groups: HashMap::new(),
		})}
	}

	/// Registers a discovery batch.
	///
	/// A type that is already known only records the additional origin. The batch
	/// is applied atomically: nothing is stored unless every part is valid.
	///
	/// # Errors
	/// - [`RepositoryError::DuplicateDefinition`] if a part identity is already
	///   registered or appears twice in the batch.
	/// - [`RepositoryError::UnknownPluginType`] if a part's type is neither in the
	///   batch nor already stored.
	pub fn add_batch(
		&self,
		origin: ModuleOrigin,
		types: impl IntoIterator<Item = TypeDefinition>,
		parts: impl IntoIterator<Item = PartDefinition>,
	) -> Result<(), RepositoryError> {

		let types = types.into_iter().collect::<Vec<_>>();
		let parts = parts.into_iter().collect::<Vec<_>>();
		let mut tables = self.tables.write();

		let batch_types = types.iter().map( TypeDefinition::identity ).collect::<HashSet<_>>();
		let mut seen = HashSet::with_capacity( parts.len() );
		for part in &parts {
			let identity = part.identity();
			if tables.parts.contains_key( identity ) || !seen.insert( identity ) {
				return Err( RepositoryError::DuplicateDefinition( identity.to_string() ));
			}
			if !batch_types.contains( identity ) && !tables.types.contains_key( identity ) {
				return Err( RepositoryError::UnknownPluginType( identity.clone() ));
			}
		}

		let type_count = types.len();
		let part_count = parts.len();

		for definition in types {
			let identity = definition.identity().clone();
			match tables.types.get_mut( &identity ) {
				Some( record ) => { record.origins.insert( origin.clone() ); },
				None => {
					tables.names.insert( identity.to_string(), identity.clone() );
					tables.types.insert( identity, TypeRecord {
						definition: Arc::new( definition ),
						origins: BTreeSet::from([ origin.clone() ]),
					});
				},
			}
		}

		for part in parts {
			tables.parts.insert( part.identity().clone(), ( Arc::new( part ), origin.clone() ));
		}

		info!( %origin, types = type_count, parts = part_count, "Registered discovery batch" );
		Ok(())

	}

	/// Runs `scanner` over `paths` and registers every batch it reports.
	///
	/// Batches are registered in the order the scanner returns them; a failing
	/// batch stops ingestion but keeps the batches registered before it.
	///
	/// # Errors
	/// Returns the scanner's error, or the first registration error.
	pub fn ingest<S: PartScanner>(
		&self,
		scanner: &S,
		paths: &[std::path::PathBuf],
	) -> Result<usize, IngestError<S::Error>> {
		let batches = scanner.scan( paths ).map_err( IngestError::Scan )?;
		let count = batches.len();
		batches.into_iter().try_for_each(| ScanBatch { origin, types, parts } |
			self.add_batch( origin, types, parts ).map_err( IngestError::Repository )
		)?;
		Ok( count )
	}

	/// Registers a group definition.
	///
	/// # Errors
	/// - [`RepositoryError::DuplicateDefinition`] if a group with the same id exists.
	/// - [`RepositoryError::UnknownPluginType`] if the group registers a part that is
	///   not stored.
	pub fn add_group( &self, origin: ModuleOrigin, group: GroupDefinition ) -> Result<Arc<GroupDefinition>, RepositoryError> {
		let mut tables = self.tables.write();
		if tables.groups.contains_key( group.id() ) {
			return Err( RepositoryError::DuplicateDefinition( group.id().to_string() ));
		}
		if let Some( missing ) = group.parts().iter()
			.map(| part | part.part().identity() )
			.find(| identity | !tables.parts.contains_key( *identity ))
		{
			return Err( RepositoryError::UnknownPluginType( missing.clone() ));
		}
		let group = Arc::new( group );
		info!( group = %group.id(), %origin, "Registered group definition" );
		tables.groups.insert( group.id().clone(), ( Arc::clone( &group ), origin ));
		Ok( group )
	}

	/// Purges every part, group and type sourced only from `origins`.
	///
	/// A type is kept while another origin still provides it or while a surviving
	/// type names it as a base. Groups that register a purged part are purged too.
	pub fn remove_origins( &self, origins: &[ModuleOrigin] ) -> RemovedDefinitions {

		let origins = origins.iter().collect::<HashSet<_>>();
		let mut tables = self.tables.write();

		let removed_parts = tables.parts.iter()
			.filter(|( _, ( _, origin ))| origins.contains( origin ))
			.map(|( identity, _ )| identity.clone() )
			.sorted()
			.collect::<Vec<_>>();
		removed_parts.iter().for_each(| identity | { tables.parts.remove( identity ); });

		let removed_groups = tables.groups.iter()
			.filter(|( _, ( group, origin ))| origins.contains( origin ) || group.parts().iter()
				.any(| part | !tables.parts.contains_key( part.part().identity() )))
			.map(|( id, _ )| id.clone() )
			.sorted()
			.collect::<Vec<_>>();
		removed_groups.iter().for_each(| id | { tables.groups.remove( id ); });

		tables.types.values_mut().for_each(| record | record.origins.retain(| origin | !origins.contains( origin )));

		// Orphaned types survive while a surviving type still derives from them.
		let mut retained = tables.types.iter()
			.filter(|( _, record )| !record.origins.is_empty() )
			.map(|( identity, _ )| identity.clone() )
			.collect::<HashSet<_>>();
		let mut pending = retained.iter().cloned().collect::<Vec<_>>();
		while let Some( identity ) = pending.pop() {
			let Some( record ) = tables.types.get( &identity ) else { continue };
			for base in record.definition.base_types() {
				if tables.types.contains_key( base ) && retained.insert( base.clone() ) {
					pending.push( base.clone() );
				}
			}
		}

		let removed_types = tables.types.keys()
			.filter(| identity | !retained.contains( *identity ))
			.cloned()
			.sorted()
			.collect::<Vec<_>>();
		for identity in &removed_types {
			tables.types.remove( identity );
			tables.names.remove( &identity.to_string() );
		}

		info!(
			origins = origins.len(),
			types = removed_types.len(),
			parts = removed_parts.len(),
			groups = removed_groups.len(),
			"Removed definitions for unloaded origins",
		);
		RemovedDefinitions { types: removed_types, parts: removed_parts, groups: removed_groups }

	}

	/// Origins a type is currently registered from.
	pub fn origins_of( &self, identity: &TypeIdentity ) -> Vec<ModuleOrigin> {
		self.tables.read().types.get( identity )
			.map(| record | record.origins.iter().cloned().collect() )
			.unwrap_or_default()
	}

}

fn bases_of( tables: &Tables, identity: &TypeIdentity ) -> Vec<TypeIdentity> {
	match tables.types.get( identity ) {
		Some( record ) => record.definition.base_types().to_vec(),
		None => identity.generic_definition()
			.and_then(| definition | tables.types.get( &definition ))
			.map(| record | record.definition.base_types().to_vec() )
			.unwrap_or_default(),
	}
}

fn matches_parent( parent: &TypeIdentity, candidate: &TypeIdentity ) -> bool {
	candidate == parent || ( parent.is_open_generic() && candidate.generic_definition().as_ref() == Some( parent ))
}

impl TypeStore for TypeRepository {

	fn identity_by_name( &self, name: &str ) -> Option<TypeIdentity> {
		self.tables.read().names.get( name ).cloned()
	}

	fn type_by_identity( &self, identity: &TypeIdentity ) -> Option<Arc<TypeDefinition>> {
		self.tables.read().types.get( identity ).map(| record | Arc::clone( &record.definition ))
	}

	fn is_subtype_of( &self, parent: &TypeIdentity, child: &TypeIdentity ) -> bool {

		let tables = self.tables.read();
		let mut visited = HashSet::new();
		let mut pending = bases_of( &tables, child );

		while let Some( candidate ) = pending.pop() {
			if matches_parent( parent, &candidate ) {
				debug!( %parent, %child, "Subtype relation found" );
				return true ;
			}
			if visited.insert( candidate.clone() ) {
				pending.extend( bases_of( &tables, &candidate ));
			}
		}
		false

	}

	fn contains_definition_for_type( &self, identity: &TypeIdentity ) -> bool {
		self.tables.read().types.contains_key( identity )
	}

}

impl PartRepository for TypeRepository {

	fn part( &self, identity: &TypeIdentity ) -> Option<Arc<PartDefinition>> {
		self.tables.read().parts.get( identity ).map(|( part, _ )| Arc::clone( part ))
	}

	fn parts( &self ) -> Vec<Arc<PartDefinition>> {
		self.tables.read().parts.values()
			.map(|( part, _ )| Arc::clone( part ))
			.sorted_by(| a, b | a.identity().cmp( b.identity() ))
			.collect()
	}

	fn group( &self, id: &GroupRegistrationId ) -> Option<Arc<GroupDefinition>> {
		self.tables.read().groups.get( id ).map(|( group, _ )| Arc::clone( group ))
	}

	fn groups( &self ) -> Vec<Arc<GroupDefinition>> {
		self.tables.read().groups.values()
			.map(|( group, _ )| Arc::clone( group ))
			.sorted_by(| a, b | a.id().cmp( b.id() ))
			.collect()
	}

}

/// Error returned by [`TypeRepository::ingest`].
#[derive( Debug, Error )]
pub enum IngestError<E: std::error::Error> {
	#[error( "Scan failed: {0}" )] Scan( E ),
	#[error( "Registration failed: {0}" )] Repository( RepositoryError ),
}
