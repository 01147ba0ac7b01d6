use std::sync::Arc ;
use parking_lot::Mutex ;
use plugin_link::{ CompositionSnapshot, InstanceChange, InstanceUpdate, PartCompositionId };
use crate::fixture_composition::{ composition, recorder };
use super::setup::fixture ;

#[test]
fn observers_receive_each_change_list_once() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let ( received, observer ) = recorder();
	composition.subscribe( Arc::new( observer ));

	let logging = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );
	let service = composition.instance_for( &PartCompositionId::new( app, fixture.service.registration.clone() ))
		.expect( "Service not constructed" );
	assert!( received.lock().is_empty() );

	let changes = composition.connect_groups( app, "logging", logging ).expect( "Failed to connect app to logging" );
	composition.remove( logging ).expect( "Failed to remove logging" );

	let received = received.lock();
	assert_eq!( received.len(), 2 );
	assert_eq!( received[0], changes );
	assert!( received[1].contains( &InstanceUpdate { instance: service, change: InstanceChange::Updated }));

}

#[test]
fn observers_may_query_the_composition() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let composition = Arc::new( composition );
	let seen = Arc::new( Mutex::new( Vec::<CompositionSnapshot>::new() ));

	let queried = Arc::downgrade( &composition );
	let sink = Arc::clone( &seen );
	composition.subscribe( Arc::new( move | _: &[InstanceUpdate] | {
		if let Some( composition ) = queried.upgrade() {
			sink.lock().push( composition.snapshot() );
		}
	}));

	let logging = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let app = composition.add( Arc::clone( &fixture.app )).expect( "Failed to add app" );
	composition.connect_groups( app, "logging", logging ).expect( "Failed to connect app to logging" );

	let seen = seen.lock();
	assert_eq!( seen.len(), 1 );
	assert_eq!( seen[0].connections.len(), 1 );
	assert!( seen[0].group( app ).is_some_and(| group | group.unsatisfied_imports.is_empty() ));

}
