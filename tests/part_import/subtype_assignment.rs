use plugin_link::{ ExportDefinition, ImportDefinition, PartImportEngine, TypeDefinition, TypeIdentity };
use crate::fixture_composition::{ repository_with, ty, type_definition };

#[test]
fn part_import_accepts_export_of_a_subtype() {

	let repository = repository_with([
		type_definition( "Store", &[] ),
		type_definition( "FileStore", &[ "Store" ]),
	], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Cache" ), "store", ty( "Store" ), None );
	let export = ExportDefinition::for_type( ty( "FileStore" ), Some( "Store".to_string() ));

	assert!( engine.accepts( &import, &export ));

}

#[test]
fn part_import_rejects_export_of_a_supertype() {

	let repository = repository_with([
		type_definition( "Store", &[] ),
		type_definition( "FileStore", &[ "Store" ]),
	], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Cache" ), "store", ty( "FileStore" ), Some( "Store".to_string() ));
	let export = ExportDefinition::for_type( ty( "Store" ), None );

	assert!( !engine.accepts( &import, &export ));

}

#[test]
fn part_import_follows_transitive_bases() {

	let repository = repository_with([
		type_definition( "Animal", &[] ),
		type_definition( "Dog", &[ "Animal" ]),
		type_definition( "Puppy", &[ "Dog" ]),
	], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Kennel" ), "animal", ty( "Animal" ), None );
	let export = ExportDefinition::for_type( ty( "Puppy" ), Some( "Animal".to_string() ));

	assert!( engine.accepts( &import, &export ));

}

#[test]
fn part_import_closed_generic_inherits_bases_of_its_definition() {

	let list = TypeIdentity::open( "List", 1 );
	let repository = repository_with([
		type_definition( "Collection", &[] ),
		TypeDefinition::new( list, [ ty( "Collection" )]),
	], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let closed = TypeIdentity::closed( "List", [ ty( "Int" )]);
	let import = ImportDefinition::for_property( ty( "Report" ), "rows", ty( "Collection" ), None );
	let export = ExportDefinition::for_type( closed, Some( "Collection".to_string() ));

	assert!( engine.accepts( &import, &export ));

}

#[test]
fn part_import_rejects_unrelated_type() {

	let repository = repository_with([ type_definition( "Logger", &[] ), type_definition( "Clock", &[] )], []);
	let engine = PartImportEngine::new( repository.as_ref() );

	let import = ImportDefinition::for_property( ty( "Service" ), "logger", ty( "Logger" ), None );
	let export = ExportDefinition::for_type( ty( "Clock" ), Some( "Logger".to_string() ));

	assert!( !engine.accepts( &import, &export ));

}
