use plugin_link::{
	Cardinality, ExportDefinition, ImportDefinition, MethodDefinition, PartImportEngine, TypeIdentity, WrapperShape,
};
use crate::fixture_composition::{ repository_with, ty, type_definition };

fn wrapped( wrapper: &str, inner: TypeIdentity ) -> TypeIdentity {
	TypeIdentity::closed( wrapper, [ inner ])
}

#[test]
fn wrapper_shapes_deferred_import_matches_plain_export() {

	let repository = repository_with([ type_definition( "Logger", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Service" ), "logger", wrapped( "Deferred", ty( "Logger" )), None );
	assert_eq!( import.contract_name(), "Logger" );
	assert_eq!( import.cardinality(), Cardinality::ExactlyOne );

	assert!( engine.accepts( &import, &ExportDefinition::for_type( ty( "Logger" ), None )));

}

#[test]
fn wrapper_shapes_sequence_of_factories_unwraps_two_layers() {

	let repository = repository_with([ type_definition( "Logger", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let required = wrapped( "Sequence", wrapped( "Factory", ty( "Logger" )));
	let import = ImportDefinition::for_property( ty( "Service" ), "loggers", required, None );

	assert_eq!( import.contract_name(), "Logger" );
	assert_eq!( import.cardinality(), Cardinality::Many );
	assert!( import.shape().is_collection() );
	assert!( import.shape().is_zero_argument_factory() );
	assert!( engine.accepts( &import, &ExportDefinition::for_type( ty( "Logger" ), None )));

}

#[test]
fn wrapper_shapes_only_two_layers_are_unwrapped() {

	let required = wrapped( "Sequence", wrapped( "Sequence", ty( "Logger" )));
	let shape = WrapperShape::of( &required );

	assert!( shape.is_collection() );
	assert_eq!( shape.effective_type(), wrapped( "Sequence", ty( "Logger" )));

}

#[test]
fn wrapper_shapes_zero_argument_factory_accepts_method_by_return_type() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "LogHost", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property(
		ty( "Service" ), "make_logger", wrapped( "Factory", ty( "Logger" )), Some( "logger-factory".to_string() ),
	);
	let export = ExportDefinition::for_method(
		ty( "LogHost" ),
		MethodDefinition::new( "create", [], Some( ty( "Logger" ))),
		Some( "logger-factory".to_string() ),
	);

	assert!( engine.accepts( &import, &export ));

}

#[test]
fn wrapper_shapes_method_returning_nothing_has_no_value_to_offer() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "LogHost", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Service" ), "logger", ty( "Logger" ), Some( "flush".to_string() ));
	let export = ExportDefinition::for_method( ty( "LogHost" ), MethodDefinition::new( "flush", [], None ), Some( "flush".to_string() ));

	assert!( !engine.accepts( &import, &export ));

}
