use std::sync::Arc ;
use plugin_link::{ ComposedObject, CompositionError, CompositionOptions, PartCompositionId };
use crate::fixture_composition::{ composition, composition_with };
use super::setup::fixture ;

#[test]
fn cardinality_rejects_a_second_export_for_a_single_import() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let first = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let second = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );

	composition.connect_groups( app, "logging", first ).expect( "Failed to connect first logging group" );
	let result = composition.connect_groups( app, "logging", second );

	assert!( matches!( result, Err( CompositionError::CannotMapExportToImport { .. })));
	assert_eq!( composition.connections( app ).len(), 1 );
	assert!( composition.connections( second ).is_empty() );

}

#[test]
fn cardinality_is_not_checked_when_enforcement_is_off() {

	let fixture = fixture();
	let options = CompositionOptions { enforce_cardinality: false, ..CompositionOptions::default() };
	let ( composition, _ ) = composition_with( &fixture.repository, options );
	let first = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let second = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );
	let service = PartCompositionId::new( app, fixture.service.registration.clone() );
	let service_instance = composition.instance_for( &service ).expect( "Service not constructed" );

	composition.connect_groups( app, "logging", first ).expect( "Failed to connect first logging group" );
	let changes = composition.connect_groups( app, "logging", second ).expect( "Failed to connect second logging group" );

	assert_changes!( changes, [( service_instance, Updated )]);
	let object = composition.object_for( &service ).expect( "Service not constructed" );
	assert_eq!( object.downcast_ref::<ComposedObject>().map(| service | service.sources( "Logger" ).len() ), Some( 2 ));

}
