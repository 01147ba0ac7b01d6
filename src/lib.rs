//! A plugin composition runtime for building modular applications.
//!
//! Plugins are discovered as **parts**: types that declare which capabilities they
//! offer (exports) and which they need (imports). Parts are assembled into
//! **groups** with internal wiring and an external surface, and live groups are
//! connected to each other at runtime. `plugin_link` decides which exports can
//! satisfy which imports, constructs the part instances in dependency order and
//! keeps them consistent as connections come and go.
//!
//! # Core Concepts
//!
//! - [`TypeIdentity`]: A structural type identity, compared by name and generic shape.
//! 	All type questions go through a [`TypeStore`]; [`TypeRepository`] is the
//! 	in-memory implementation that also stores parts and groups.
//!
//! - [`PartDefinition`]: One discoverable type with its [`ExportDefinition`]s,
//! 	[`ImportDefinition`]s and schedulable methods. Constructor imports are
//! 	**prerequisites** and must be bound before the part can be constructed.
//! 	How many exports an import binds is expressed with a [`Cardinality`].
//!
//! - [`PartImportEngine`]: Decides whether an export satisfies an import, looking
//! 	through the recognised [`WrapperShape`]s ( `Deferred<T>`, `Factory<..>`,
//! 	`Action<..>`, `Sequence<T>` ).
//!
//! - [`GroupDefinition`]: A named composite of parts built with the
//! 	[`GroupDefinitionBuilder`]. The [`GroupImportEngine`] matches group imports
//! 	to group exports and generates the part-level connection maps.
//!
//! - [`CompositionLayer`]: The live set of groups and [`GroupConnection`]s,
//! 	guarded by a read/write lock. Every mutation returns the aggregated list of
//! 	[`InstanceUpdate`]s it caused.
//!
//! - [`InstanceLayer`]: The arena of constructed part instances. On every binding
//! 	change it decides between doing nothing, updating an instance in place, or
//! 	rebuilding it, and cascades the decision to dependents. Objects themselves
//! 	are built by a [`PartActivator`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc ;
//! use plugin_link::{
//! 	CompositionLayer, CompositionOptions, ComposedObject, DefaultActivator, ExportDefinition,
//! 	GroupDefinitionBuilder, ImportDefinition, InstanceChange, ModuleOrigin, ParameterDefinition,
//! 	PartCompositionId, PartDefinition, TypeDefinition, TypeIdentity, TypeRepository,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Discovery reports types and parts per origin. Here `FileStore` implements `Store`.
//! let store = TypeIdentity::new( "Store" );
//! let file_store = TypeIdentity::new( "FileStore" );
//! let cache = TypeIdentity::new( "Cache" );
//!
//! let repository = Arc::new( TypeRepository::new() );
//! repository.add_batch(
//! 	ModuleOrigin::new( "storage.plugin" ),
//! 	[
//! 		TypeDefinition::new( store.clone(), []),
//! 		TypeDefinition::new( file_store.clone(), [ store.clone() ]),
//! 		TypeDefinition::new( cache.clone(), []),
//! 	],
//! 	[
//! 		PartDefinition::new( file_store.clone() )
//! 			.with_export( ExportDefinition::for_type( file_store.clone(), Some( "Store".into() ))),
//! 		// The cache cannot exist without a store: its import is a prerequisite.
//! 		PartDefinition::new( cache.clone() )
//! 			.with_import( ImportDefinition::for_constructor(
//! 				cache.clone(), ParameterDefinition::new( "store", store.clone() ), None,
//! 			)),
//! 	],
//! )?;
//!
//! // The storage group offers its store to whoever imports "storage".
//! let mut builder = GroupDefinitionBuilder::new( repository.as_ref() );
//! let file_store_part = builder.register_part( &file_store )?;
//! builder.define_export( "storage", &file_store_part.exports, [] )?;
//! let storage = Arc::new( builder.register( "storage" )? );
//!
//! // The caching group needs a store from another group.
//! let mut builder = GroupDefinitionBuilder::new( repository.as_ref() );
//! let cache_part = builder.register_part( &cache )?;
//! builder.define_import( "storage", None, &cache_part.imports )?;
//! let caching = Arc::new( builder.register( "caching" )? );
//!
//! let composition = CompositionLayer::new( Arc::clone( &repository ), DefaultActivator, CompositionOptions::default() );
//! let storage = composition.add( storage )?;
//! let caching = composition.add( caching )?;
//!
//! // Until it is connected, the cache waits for its store.
//! let cache_id = PartCompositionId::new( caching, cache_part.registration.clone() );
//! assert!( composition.instance_for( &cache_id ).is_none() );
//!
//! composition.connect_groups( caching, "storage", storage )?;
//! let object = composition.object_for( &cache_id ).unwrap();
//! let cache_object = object.downcast_ref::<ComposedObject>().unwrap();
//! assert_eq!( cache_object.sources( "Store" ).len(), 1 );
//!
//! // Removing the storage group takes the dependent cache down with it.
//! let changes = composition.remove( storage )?;
//! assert_eq!( changes.len(), 2 );
//! assert!( changes.iter().all(| update | update.change == InstanceChange::Removed ));
//! assert!( composition.instance_for( &cache_id ).is_none() );
//! # Ok(())
//! # }
//! ```
//!
//! # Reconciliation
//!
//! When the bindings of an instance change, the [`InstanceLayer`] classifies the
//! change:
//!
//! - **No-op**: the bindings are identical, nothing happens.
//! - [`InstanceChange::Updated`]: only property imports changed; the new values
//! 	are pushed onto the existing object through [`PartActivator::update`].
//! - [`InstanceChange::Reconstructed`]: a prerequisite changed; a new object is
//! 	built under the same instance id and the old one released.
//! - [`InstanceChange::Removed`]: a required prerequisite is gone; the instance is
//! 	released.
//!
//! Every change propagates to the instances bound to the changed one, sources
//! before dependents. The returned list names every touched instance once, with
//! the most severe change it went through.
//!
//! # Logging
//!
//! `plugin_link` reports registration, composition changes and reconciliation
//! decisions through [`tracing`](https://docs.rs/tracing). It never installs a
//! subscriber; that is left to the application.

mod type_identity ;
pub mod wrapper ;
mod cardinality ;
mod capability ;
mod registration ;
mod part ;
mod type_store ;
mod discovery ;
mod part_import_engine ;
mod group ;
mod ids ;
mod connection ;
mod config ;
mod instance ;
mod composition ;

#[doc( no_inline )]
pub use nonempty_collections::NEVec ;

pub use type_identity::{ TypeIdentity, GenericShape };
pub use wrapper::WrapperShape ;
pub use cardinality::Cardinality ;
pub use capability::{
	ParameterDefinition, MethodDefinition, ExportSite, ExportDefinition, ImportSite, CreationPolicy, ImportDefinition,
};
pub use registration::{
	PartRegistrationId, ExportRegistrationId, ImportRegistrationId, ScheduleActionRegistrationId,
	ScheduleConditionRegistrationId, GroupRegistrationId, InsertionPointId,
};
pub use part::{ PartDefinition, ScheduleActionDefinition, ScheduleConditionDefinition, ConditionSite };
pub use type_store::{
	TypeStore, PartRepository, TypeRepository, TypeDefinition, ModuleOrigin, RepositoryError, RemovedDefinitions, IngestError,
};
pub use discovery::{ PartScanner, ScanBatch };
pub use part_import_engine::PartImportEngine ;
pub use group::{
	GroupDefinition, GroupPartDefinition, GroupExportDefinition, GroupImportDefinition,
	ScheduleDefinition, InsertionPointDefinition,
	GroupDefinitionBuilder, GroupBuildError, RegisteredPart,
	GroupImportEngine, CONTRACT_CRITERION, GROUP_CRITERION,
};
pub use ids::{ GroupCompositionId, PartCompositionId, PartInstanceId };
pub use connection::{ GroupConnection, PartImportToPartExportMap };
pub use config::{ CompositionOptions, ConfigError };
pub use instance::{
	InstanceLayer, InstanceError, InstanceBinding, InstanceChange, InstanceUpdate, ChangeSet,
	PartActivator, PartObject, ActivationError, BoundExport, ResolvedImport, DefaultActivator, ComposedObject,
};
pub use composition::{
	CompositionLayer, CompositionError, CompositionObserver, CompositionSnapshot,
	GroupSnapshot, PartSnapshot, ConnectionSnapshot, PartState,
};
