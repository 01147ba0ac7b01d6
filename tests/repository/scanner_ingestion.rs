use std::path::PathBuf ;
use plugin_link::{ IngestError, ModuleOrigin, PartRepository, PartScanner, ScanBatch, TypeRepository };
use crate::fixture_composition::{ provider, ty, type_definition };

#[derive( Debug, thiserror::Error )]
#[error( "cannot read {0}" )]
struct UnreadableModule( String );

/// Reports one batch per path; paths ending in `.broken` fail the scan.
struct StaticScanner ;

impl PartScanner for StaticScanner {

	type Error = UnreadableModule ;

	fn scan( &self, paths: &[PathBuf] ) -> Result<Vec<ScanBatch>, Self::Error> {
		paths.iter().map(| path | {
			let name = path.file_stem().and_then(| stem | stem.to_str() ).unwrap_or_default().to_string();
			match path.extension().is_some_and(| extension | extension == "broken" ) {
				true => Err( UnreadableModule( name )),
				false => Ok( ScanBatch {
					origin: ModuleOrigin::new( path.display().to_string() ),
					types: vec![ type_definition( &name, &[] )],
					parts: vec![ provider( &name )],
				}),
			}
		}).collect()
	}

}

#[test]
fn scanner_ingestion_registers_every_batch() {

	let repository = TypeRepository::new();
	let count = repository.ingest( &StaticScanner, &[ PathBuf::from( "Logger.plugin" ), PathBuf::from( "Clock.plugin" )])
		.expect( "Ingestion failed" );

	assert_eq!( count, 2 );
	assert!( repository.part( &ty( "Logger" )).is_some() );
	assert_eq!( repository.origins_of( &ty( "Clock" )), vec![ ModuleOrigin::new( "Clock.plugin" )]);

}

#[test]
fn scanner_ingestion_reports_scan_failures() {

	let repository = TypeRepository::new();
	let result = repository.ingest( &StaticScanner, &[ PathBuf::from( "Logger.broken" )]);

	assert!( matches!( result, Err( IngestError::Scan( UnreadableModule( name ))) if name == "Logger" ));
	assert!( repository.parts().is_empty() );

}
