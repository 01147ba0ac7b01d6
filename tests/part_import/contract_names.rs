use plugin_link::{ ExportDefinition, ImportDefinition, PartImportEngine };
use crate::fixture_composition::{ repository_with, ty, type_definition };

#[test]
fn part_import_rejects_different_contract() {

	let repository = repository_with([ type_definition( "Logger", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Service" ), "logger", ty( "Logger" ), Some( "audit".to_string() ));
	let export = ExportDefinition::for_type( ty( "Logger" ), None );

	assert!( !engine.accepts( &import, &export ));

}

#[test]
fn part_import_accepts_explicit_matching_contract() {

	let repository = repository_with([ type_definition( "Logger", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Service" ), "logger", ty( "Logger" ), Some( "audit".to_string() ));
	let export = ExportDefinition::for_type( ty( "Logger" ), Some( "audit".to_string() ));

	assert!( engine.accepts( &import, &export ));

}

#[test]
fn part_import_default_contract_is_the_effective_type() {
	let import = ImportDefinition::for_property( ty( "Service" ), "logger", ty( "Logger" ), None );
	assert_eq!( import.contract_name(), "Logger" );
	assert_eq!( ExportDefinition::for_type( ty( "Logger" ), None ).contract_name(), "Logger" );
}
