use std::collections::BTreeMap ;
use plugin_link::{ GroupImportEngine, CONTRACT_CRITERION, GROUP_CRITERION };
use super::import_acceptance::{ exporting_group, logging_repository };

fn criteria( pairs: &[( &str, &str )] ) -> BTreeMap<String, String> {
	pairs.iter().map(|( key, value )| ( key.to_string(), value.to_string() )).collect()
}

#[test]
fn selection_criteria_filter_by_contract_group_and_metadata() {

	let repository = logging_repository();
	let gold = exporting_group( &repository, "gold-logging", &[ "Logger" ], "gold" );
	let _ = exporting_group( &repository, "silver-logging", &[ "FileLogger" ], "silver" );
	let engine = GroupImportEngine::new( repository.as_ref() );

	let names = | selected: &BTreeMap<String, String> | engine.matching_groups( selected ).iter()
		.map(| group | group.id().name().to_string() )
		.collect::<Vec<_>>();

	assert_eq!( names( &criteria( &[] )), vec![ "gold-logging", "silver-logging" ]);
	assert_eq!( names( &criteria( &[( CONTRACT_CRITERION, "logging" )])), vec![ "gold-logging", "silver-logging" ]);
	assert_eq!( names( &criteria( &[( "tier", "silver" )])), vec![ "silver-logging" ]);
	assert_eq!( names( &criteria( &[( GROUP_CRITERION, "gold-logging" ), ( "tier", "silver" )])), Vec::<String>::new() );

	let export = gold.group_export().expect( "No export" );
	assert!( GroupImportEngine::<plugin_link::TypeRepository>::export_passes_selection_criteria(
		export, &criteria( &[( "tier", "gold" )]),
	));

}
