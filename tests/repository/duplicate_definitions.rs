use plugin_link::{ ModuleOrigin, PartRepository, RepositoryError, TypeRepository };
use crate::fixture_composition::{ provider, repository_with, single_part_group, ty, type_definition };

#[test]
fn duplicate_definitions_part_registered_twice_is_rejected() {

	let repository = repository_with([ type_definition( "Logger", &[] )], [ provider( "Logger" )]);

	let result = repository.add_batch( ModuleOrigin::new( "other.plugin" ), [], [ provider( "Logger" )]);
	assert_eq!( result, Err( RepositoryError::DuplicateDefinition( "Logger".to_string() )));

}

#[test]
fn duplicate_definitions_failed_batch_stores_nothing() {

	let repository = TypeRepository::new();
	let result = repository.add_batch(
		ModuleOrigin::new( "broken.plugin" ),
		[ type_definition( "Logger", &[] )],
		[ provider( "Logger" ), provider( "Clock" )],
	);

	assert_eq!( result, Err( RepositoryError::UnknownPluginType( ty( "Clock" ))));
	assert!( repository.parts().is_empty() );
	assert!( repository.origins_of( &ty( "Logger" )).is_empty() );

}

#[test]
fn duplicate_definitions_group_registered_twice_is_rejected() {

	let repository = repository_with([ type_definition( "Logger", &[] )], [ provider( "Logger" )]);
	let ( group, _ ) = single_part_group( &repository, "logging", "Logger", Some( "logging" ), None );

	repository.add_group( ModuleOrigin::new( "fixture.plugin" ), ( *group ).clone() ).expect( "First registration failed" );
	let result = repository.add_group( ModuleOrigin::new( "fixture.plugin" ), ( *group ).clone() );

	assert_eq!( result.map(|_| ()), Err( RepositoryError::DuplicateDefinition( "logging".to_string() )));
	assert_eq!( repository.groups().len(), 1 );

}
