use std::sync::Arc ;
use plugin_link::{ ComposedObject, DefaultActivator, InstanceError, InstanceLayer, PartDefinition };
use crate::fixture_composition::{ binding, constructor_import, init_tracing, property_import, provider, ty, TestActivator };

#[test]
fn construction_without_required_prerequisite_leaves_no_instance() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let timer = Arc::new( provider( "Timer" ).with_import( constructor_import( "Timer", "Clock" )));

	match layer.construct( timer, Vec::new() ) {
		Err( InstanceError::ConstructionFailed { part, .. }) => assert_eq!( part, ty( "Timer" )),
		result => panic!( "Expected ConstructionFailed, found: {:?}", result ),
	}
	assert!( layer.is_empty() );

}

#[test]
fn construction_allows_unbound_property_imports() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let service = Arc::new( PartDefinition::new( ty( "Service" )).with_import( property_import( "Service", "Logger" )));

	let instance = layer.construct( service, Vec::new() ).expect( "Failed to construct service" );
	let object = layer.object( instance ).expect( "Instance has no object" );
	let composed = object.downcast_ref::<ComposedObject>().expect( "Unexpected object type" );

	assert_eq!( composed.part(), &ty( "Service" ));
	assert!( composed.sources( "Logger" ).is_empty() );

}

#[test]
fn construction_hands_bound_sources_to_the_activator() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let clock = layer.construct( Arc::new( provider( "Clock" )), Vec::new() ).expect( "Failed to construct clock" );
	let timer = layer.construct(
		Arc::new( provider( "Timer" ).with_import( constructor_import( "Timer", "Clock" ))),
		vec![ binding( "Timer", 0, "Clock", clock, "Clock" )],
	).expect( "Failed to construct timer" );

	let object = layer.object( timer ).expect( "Instance has no object" );
	assert_eq!( object.downcast_ref::<ComposedObject>().map(| composed | composed.sources( "Clock" )), Some( vec![ clock ]));
	assert_eq!( layer.dependents( clock ), vec![ timer ]);
	assert_eq!( layer.bindings( timer ).map(| bindings | bindings.len() ), Some( 1 ));

}

#[test]
fn construction_refused_by_activator_leaves_no_instance() {

	init_tracing();
	let ( activator, control ) = TestActivator::new();
	let mut layer = InstanceLayer::new( activator );
	control.fail_on( "Clock" );

	let result = layer.construct( Arc::new( provider( "Clock" )), Vec::new() );

	assert!( matches!( result, Err( InstanceError::ActivationFailed { .. })));
	assert!( layer.is_empty() );
	assert_eq!( control.constructed(), 0 );

}

#[test]
fn construction_rejects_bindings_to_unknown_sources_or_imports() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let clock = layer.construct( Arc::new( provider( "Clock" )), Vec::new() ).expect( "Failed to construct clock" );
	let timer = Arc::new( provider( "Timer" ).with_import( property_import( "Timer", "Clock" )));

	let ghost = layer.construct( Arc::new( provider( "Clock" )), Vec::new() ).expect( "Failed to construct clock" );
	layer.release( ghost ).expect( "Failed to release clock" );
	assert!( matches!(
		layer.construct( Arc::clone( &timer ), vec![ binding( "Timer", 0, "Clock", ghost, "Clock" )]),
		Err( InstanceError::UnknownInstance( id )) if id == ghost,
	));
	assert!( matches!(
		layer.construct( Arc::clone( &timer ), vec![ binding( "Timer", 3, "Clock", clock, "Clock" )]),
		Err( InstanceError::ConstructionFailed { .. }),
	));
	assert!( matches!(
		layer.construct( timer, vec![ binding( "Timer", 0, "Calendar", clock, "Clock" )]),
		Err( InstanceError::ConstructionFailed { .. }),
	));
	assert_eq!( layer.len(), 1 );

}
