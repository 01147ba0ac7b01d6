use std::sync::Arc ;
use plugin_link::{ GroupDefinition, GroupDefinitionBuilder, RegisteredPart, TypeRepository };
use crate::fixture_composition::{
	constructor_import, property_import, provider, provider_as, repository_with, single_part_group, ty, type_definition,
};

/// Definitions shared by the composition scenarios.
///
/// `storage` exports a `FileStore` under contract `Store`, `caching` holds a
/// `Cache` whose constructor needs a `Store` from a group import, `logging`
/// exports a `Logger` and `app` holds a `Service` with a `Logger` property import.
#[allow( dead_code )]
pub struct Fixture {
	pub repository: Arc<TypeRepository>,
	pub storage: Arc<GroupDefinition>,
	pub caching: Arc<GroupDefinition>,
	pub logging: Arc<GroupDefinition>,
	pub app: Arc<GroupDefinition>,
	pub store: RegisteredPart,
	pub cache: RegisteredPart,
	pub logger: RegisteredPart,
	pub service: RegisteredPart,
}

pub fn fixture() -> Fixture {

	let repository = repository_with(
		[
			type_definition( "Store", &[] ),
			type_definition( "FileStore", &[ "Store" ]),
			type_definition( "Cache", &[] ),
			type_definition( "Logger", &[] ),
			type_definition( "Service", &[] ),
		],
		[
			provider_as( "FileStore", "Store" ),
			provider( "Cache" ).with_import( constructor_import( "Cache", "Store" )),
			provider( "Logger" ),
			provider( "Service" ).with_import( property_import( "Service", "Logger" )),
		],
	);

	let ( storage, store ) = single_part_group( &repository, "storage", "FileStore", Some( "storage" ), None );
	let ( caching, cache ) = single_part_group( &repository, "caching", "Cache", Some( "cache" ), Some( "storage" ));
	let ( logging, logger ) = single_part_group( &repository, "logging", "Logger", Some( "logging" ), None );
	let ( app, service ) = single_part_group( &repository, "app", "Service", None, Some( "logging" ));

	Fixture { repository, storage, caching, logging, app, store, cache, logger, service }

}

/// A group holding a `FileStore` wired to a `Cache` internally.
pub fn wired_storage( fixture: &Fixture ) -> ( Arc<GroupDefinition>, RegisteredPart, RegisteredPart ) {
	let mut builder = GroupDefinitionBuilder::new( fixture.repository.as_ref() );
	let store = builder.register_part( &ty( "FileStore" )).expect( "Failed to register store" );
	let cache = builder.register_part( &ty( "Cache" )).expect( "Failed to register cache" );
	builder.connect( &cache.imports[0], &store.exports ).expect( "Failed to wire cache" );
	builder.define_export( "cache", &cache.exports, [] ).expect( "Failed to define export" );
	( Arc::new( builder.register( "wired-storage" ).expect( "Failed to register group" )), store, cache )
}
