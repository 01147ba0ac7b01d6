use std::sync::Arc ;
use plugin_link::{ ComposedObject, DefaultActivator, InstanceError, InstanceLayer, PartDefinition };
use crate::fixture_composition::{ binding, constructor_import, init_tracing, property_import, provider, ty };

fn service() -> Arc<PartDefinition> {
	Arc::new( provider( "Service" ).with_import( property_import( "Service", "Logger" )))
}

#[test]
fn update_classification_identical_bindings_change_nothing() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let logger = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let service = layer.construct( service(), vec![ binding( "Service", 0, "Logger", logger, "Logger" )])
		.expect( "Failed to construct service" );

	let changes = layer.update_if_required( service, vec![ binding( "Service", 0, "Logger", logger, "Logger" )])
		.expect( "Failed to update service" );

	assert!( changes.is_empty() );

}

#[test]
fn update_classification_rebinding_a_property_updates_in_place() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let first = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let second = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let service = layer.construct( service(), vec![ binding( "Service", 0, "Logger", first, "Logger" )])
		.expect( "Failed to construct service" );
	let before = layer.object( service ).map( Arc::clone ).expect( "Instance has no object" );

	let changes = layer.update_if_required( service, vec![ binding( "Service", 0, "Logger", second, "Logger" )])
		.expect( "Failed to update service" );

	assert_changes!( changes, [( service, Updated )]);
	let after = layer.object( service ).expect( "Instance has no object" );
	assert!( Arc::ptr_eq( &before, after ));
	let composed = after.downcast_ref::<ComposedObject>().expect( "Unexpected object type" );
	assert_eq!( composed.sources( "Logger" ), vec![ second ]);
	assert_eq!( composed.update_count(), 1 );

}

#[test]
fn update_classification_unbinding_a_property_updates_in_place() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let logger = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let service = layer.construct( service(), vec![ binding( "Service", 0, "Logger", logger, "Logger" )])
		.expect( "Failed to construct service" );

	let changes = layer.update_if_required( service, Vec::new() ).expect( "Failed to update service" );

	assert_changes!( changes, [( service, Updated )]);
	assert!( layer.dependents( logger ).is_empty() );

}

#[test]
fn update_classification_updates_do_not_cascade() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let first = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let second = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	let service = layer.construct( service(), vec![ binding( "Service", 0, "Logger", first, "Logger" )])
		.expect( "Failed to construct service" );
	let dashboard = layer.construct(
		Arc::new( PartDefinition::new( ty( "Dashboard" )).with_import( constructor_import( "Dashboard", "Service" ))),
		vec![ binding( "Dashboard", 0, "Service", service, "Service" )],
	).expect( "Failed to construct dashboard" );

	let changes = layer.update_if_required( service, vec![ binding( "Service", 0, "Logger", second, "Logger" )])
		.expect( "Failed to update service" );

	assert_changes!( changes, [( service, Updated )]);
	assert!( layer.has_instance_for( dashboard ));

}

#[test]
fn update_classification_rejects_unknown_and_self_bound_instances() {

	init_tracing();
	let mut layer = InstanceLayer::new( DefaultActivator );
	let service = layer.construct( service(), Vec::new() ).expect( "Failed to construct service" );
	let gone = layer.construct( Arc::new( provider( "Logger" )), Vec::new() ).expect( "Failed to construct logger" );
	layer.release( gone ).expect( "Failed to release logger" );

	assert!( matches!( layer.update_if_required( gone, Vec::new() ), Err( InstanceError::UnknownInstance( _ ))));
	assert!( matches!(
		layer.update_if_required( service, vec![ binding( "Service", 0, "Logger", service, "Service" )]),
		Err( InstanceError::ConstructionFailed { .. }),
	));
	assert!( layer.bindings( service ).is_some_and(| bindings | bindings.is_empty() ));

}
