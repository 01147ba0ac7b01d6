use std::sync::Arc ;
use plugin_link::{
	ComposedObject, CompositionError, CompositionOptions, GroupCompositionId, InstanceError, PartCompositionId, PartState,
};
use crate::fixture_composition::{ composition, composition_with, single_part_group };
use super::setup::{ fixture, wired_storage };

#[test]
fn adding_groups_constructs_parts_without_prerequisites() {

	let fixture = fixture();
	let ( composition, control ) = composition( &fixture.repository );

	let storage = composition.add( Arc::clone( &fixture.storage )).expect( "Failed to add storage" );

	assert!( composition.contains( storage ));
	assert!( composition.instance_for( &PartCompositionId::new( storage, fixture.store.registration.clone() )).is_some() );
	assert_eq!( composition.snapshot().pending_parts(), 0 );
	assert_eq!( control.constructed(), 1 );

}

#[test]
fn adding_groups_keeps_parts_waiting_for_a_group_import_pending() {

	let fixture = fixture();
	let ( composition, control ) = composition( &fixture.repository );

	let caching = composition.add( Arc::clone( &fixture.caching )).expect( "Failed to add caching" );
	let snapshot = composition.snapshot();

	assert!( composition.instance_for( &PartCompositionId::new( caching, fixture.cache.registration.clone() )).is_none() );
	assert_eq!( snapshot.pending_parts(), 1 );
	assert_eq!( snapshot.group( caching ).map(| group | group.parts[0].state ), Some( PartState::Pending ));
	assert_eq!( snapshot.group( caching ).map(| group | group.unsatisfied_imports.clone() ), Some( vec![ "storage".to_string() ]));
	assert_eq!( composition.unsatisfied_imports( caching ).len(), 1 );
	assert_eq!( control.constructed(), 0 );

}

#[test]
fn adding_groups_rejects_pending_parts_when_disallowed() {

	let fixture = fixture();
	let options = CompositionOptions::from_toml_str( "allow_pending_parts = false" ).expect( "Invalid options" );
	let ( composition, _ ) = composition_with( &fixture.repository, options );

	let result = composition.add( Arc::clone( &fixture.caching ));

	assert!( matches!( result, Err( CompositionError::Instance( InstanceError::ConstructionFailed { .. }))));
	assert!( composition.groups().is_empty() );

}

#[test]
fn adding_groups_rejects_prerequisites_nothing_can_satisfy() {

	let fixture = fixture();
	let ( composition, control ) = composition( &fixture.repository );
	let ( isolated, _ ) = single_part_group( &fixture.repository, "isolated", "Cache", Some( "cache" ), None );

	let result = composition.add( isolated );

	assert!( matches!( result, Err( CompositionError::Instance( InstanceError::ConstructionFailed { .. }))));
	assert!( composition.groups().is_empty() );
	assert_eq!( control.constructed(), 0 );

}

#[test]
fn adding_groups_releases_constructed_parts_when_a_part_fails() {

	let fixture = fixture();
	let ( composition, control ) = composition( &fixture.repository );
	let ( wired, _, _ ) = wired_storage( &fixture );
	control.fail_on( "Cache" );

	let result = composition.add( wired );

	assert!( matches!( result, Err( CompositionError::Instance( InstanceError::ActivationFailed { .. }))));
	assert!( composition.groups().is_empty() );
	assert_eq!( control.constructed(), 1 );
	assert_eq!( control.released(), 1 );

}

#[test]
fn adding_groups_wires_parts_inside_the_group() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let ( wired, store, cache ) = wired_storage( &fixture );

	let group = composition.add( wired ).expect( "Failed to add wired storage" );

	let store = composition.instance_for( &PartCompositionId::new( group, store.registration )).expect( "Store not constructed" );
	let object = composition.object_for( &PartCompositionId::new( group, cache.registration )).expect( "Cache not constructed" );
	assert_eq!( object.downcast_ref::<ComposedObject>().map(| cache | cache.sources( "Store" )), Some( vec![ store ]));

}

#[test]
fn adding_groups_twice_under_one_id_is_rejected() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );
	let id = GroupCompositionId::new();

	composition.add_with_id( id, Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let result = composition.add_with_id( id, Arc::clone( &fixture.logging ));

	assert!( matches!( result, Err( CompositionError::DuplicateDefinition( _ ))));
	assert_eq!( composition.groups(), vec![ id ]);

}

#[test]
fn adding_groups_shares_one_definition_between_instances() {

	let fixture = fixture();
	let ( composition, _ ) = composition( &fixture.repository );

	let first = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );
	let second = composition.add( Arc::clone( &fixture.logging )).expect( "Failed to add logging" );

	assert_ne!( first, second );
	assert_eq!( composition.groups(), vec![ first, second ]);
	assert!( Arc::ptr_eq(
		&composition.definition( first ).expect( "First group missing" ),
		&composition.definition( second ).expect( "Second group missing" ),
	));

}
