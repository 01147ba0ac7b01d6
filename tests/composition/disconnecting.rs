use std::sync::Arc ;
use plugin_link::{ CompositionError, GroupCompositionId, PartCompositionId, PartState };
use crate::fixture_composition::composition ;
use super::setup::fixture ;

#[test]
fn disconnecting_unbinds_property_imports() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let logging = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );
	let service = composition.instance_for( &PartCompositionId::new( app, fixture.service.registration.clone() ))
		.expect( "Service not constructed" );
	composition.connect_groups( app, "logging", logging ).expect( "Failed to connect app to logging" );

	let changes = composition.disconnect( app, logging ).expect( "Failed to disconnect" );

	assert_changes!( changes, [( service, Updated )]);
	assert_eq!( composition.unsatisfied_imports( app ).len(), 1 );
	assert!( composition.disconnect( app, logging ).expect( "Failed to disconnect again" ).is_empty() );

}

#[test]
fn disconnecting_all_returns_prerequisite_dependents_to_pending() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let storage = composition.add( Arc::clone( &fixture.storage )).expect( "Failed to add storage" );
	let caching = composition.add( Arc::clone( &fixture.caching )).expect( "Failed to add caching" );
	let cache = PartCompositionId::new( caching, fixture.cache.registration.clone() );
	composition.connect_groups( caching, "storage", storage ).expect( "Failed to connect caching to storage" );
	let cache_instance = composition.instance_for( &cache ).expect( "Cache not constructed" );

	let changes = composition.disconnect_all( storage ).expect( "Failed to disconnect storage" );

	assert_changes!( changes, [( cache_instance, Removed )]);
	assert!( composition.instance_for( &cache ).is_none() );
	let snapshot = composition.snapshot();
	assert_eq!( snapshot.group( caching ).map(| group | group.parts[0].state ), Some( PartState::Pending ));
	assert!( snapshot.connections.is_empty() );

}

#[test]
fn disconnecting_unknown_groups_fails() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );
	let missing = GroupCompositionId::new();

	assert!( matches!( composition.disconnect( app, missing ), Err( CompositionError::UnknownGroup( id )) if id == missing ));
	assert!( matches!( composition.disconnect_all( missing ), Err( CompositionError::UnknownGroup( _ ))));

}
