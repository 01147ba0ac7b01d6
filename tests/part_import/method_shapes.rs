use plugin_link::{ ExportDefinition, ImportDefinition, MethodDefinition, ParameterDefinition, PartImportEngine, TypeIdentity };
use crate::fixture_composition::{ repository_with, ty, type_definition };

fn make_logger( parameter: &str ) -> MethodDefinition {
	MethodDefinition::new( "make", [ ParameterDefinition::new( "level", ty( parameter ))], Some( ty( "Logger" )))
}

#[test]
fn method_shapes_factory_matches_method_with_same_signature() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "LogHost", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let required = TypeIdentity::closed( "Factory", [ ty( "Int" ), ty( "Logger" )]);
	let import = ImportDefinition::for_property( ty( "Service" ), "make", required, None );
	let export = ExportDefinition::for_method( ty( "LogHost" ), make_logger( "Int" ), None );

	assert_eq!( import.contract_name(), "Factory<Int, Logger>" );
	assert_eq!( export.contract_name(), "Factory<Int, Logger>" );
	assert!( engine.accepts( &import, &export ));

}

#[test]
fn method_shapes_parameter_types_must_match_exactly() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "LogHost", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let required = TypeIdentity::closed( "Factory", [ ty( "Int" ), ty( "Logger" )]);
	let import = ImportDefinition::for_property( ty( "Service" ), "make", required, Some( "make".to_string() ));
	let export = ExportDefinition::for_method( ty( "LogHost" ), make_logger( "String" ), Some( "make".to_string() ));

	assert!( !engine.accepts( &import, &export ));

}

#[test]
fn method_shapes_action_requires_method_without_return_value() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "LogHost", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let required = TypeIdentity::closed( "Action", [ ty( "Int" )]);
	let import = ImportDefinition::for_property( ty( "Service" ), "make", required, Some( "make".to_string() ));

	let returning = ExportDefinition::for_method( ty( "LogHost" ), make_logger( "Int" ), Some( "make".to_string() ));
	let silent = ExportDefinition::for_method(
		ty( "LogHost" ),
		MethodDefinition::new( "set_level", [ ParameterDefinition::new( "level", ty( "Int" ))], None ),
		Some( "make".to_string() ),
	);

	assert!( !engine.accepts( &import, &returning ));
	assert!( engine.accepts( &import, &silent ));

}

#[test]
fn method_shapes_never_match_value_exports() {

	let repository = repository_with([ type_definition( "Logger", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let required = TypeIdentity::closed( "Factory", [ ty( "Int" ), ty( "Logger" )]);
	let import = ImportDefinition::for_property( ty( "Service" ), "make", required, Some( "Logger".to_string() ));

	assert!( !engine.accepts( &import, &ExportDefinition::for_type( ty( "Logger" ), None )));

}
