//! Part definitions.
//!
//! A part is one discoverable type together with the capabilities it declares:
//! what it exports, what it imports, and which of its methods may be scheduled
//! as actions or conditions. Part definitions are produced by discovery, never
//! change afterwards, and are shared by reference between the repository and
//! every group that registers them.

use serde::{ Deserialize, Serialize };

use crate::{ ExportDefinition, ImportDefinition, MethodDefinition, TypeIdentity };



/// A method a schedule may execute.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct ScheduleActionDefinition {
	contract_name: String,
	method: MethodDefinition,
}

impl ScheduleActionDefinition {
	pub fn new( contract_name: impl Into<String>, method: MethodDefinition ) -> Self {
		Self { contract_name: contract_name.into(), method }
	}
	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn method( &self ) -> &MethodDefinition { &self.method }
}

/// Where a schedule condition is read from.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum ConditionSite {
	Method( MethodDefinition ),
	Property { name: String },
}

/// A boolean guard a schedule may evaluate.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct ScheduleConditionDefinition {
	contract_name: String,
	site: ConditionSite,
}

impl ScheduleConditionDefinition {
	pub fn new( contract_name: impl Into<String>, site: ConditionSite ) -> Self {
		Self { contract_name: contract_name.into(), site }
	}
	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn site( &self ) -> &ConditionSite { &self.site }
}

/// A discoverable part and its declared capabilities.
///
/// # Example
///
/// ```
/// use plugin_link::{ ExportDefinition, ImportDefinition, ParameterDefinition, PartDefinition, TypeIdentity };
///
/// let logger = TypeIdentity::new( "Logger" );
/// let service = TypeIdentity::new( "Service" );
///
/// let part = PartDefinition::new( service.clone() )
/// 	.with_export( ExportDefinition::for_type( service.clone(), None ))
/// 	.with_import( ImportDefinition::for_constructor(
/// 		service,
/// 		ParameterDefinition::new( "logger", logger ),
/// 		None,
/// 	));
///
/// assert_eq!( part.imports()[0].contract_name(), "Logger" );
/// assert!( part.imports()[0].is_prerequisite() );
/// ```
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct PartDefinition {
	identity: TypeIdentity,
	exports: Vec<ExportDefinition>,
	imports: Vec<ImportDefinition>,
	actions: Vec<ScheduleActionDefinition>,
	conditions: Vec<ScheduleConditionDefinition>,
}

impl PartDefinition {

	/// A part declaring no capabilities yet.
	pub fn new( identity: TypeIdentity ) -> Self {
		Self {
			identity,
			exports: Vec::with_capacity( 0 ),
			imports: Vec::with_capacity( 0 ),
			actions: Vec::with_capacity( 0 ),
			conditions: Vec::with_capacity( 0 ),
		}
	}

	pub fn with_export( mut self, export: ExportDefinition ) -> Self {
		self.exports.push( export );
		self
	}

	pub fn with_import( mut self, import: ImportDefinition ) -> Self {
		self.imports.push( import );
		self
	}

	pub fn with_action( mut self, action: ScheduleActionDefinition ) -> Self {
		self.actions.push( action );
		self
	}

	pub fn with_condition( mut self, condition: ScheduleConditionDefinition ) -> Self {
		self.conditions.push( condition );
		self
	}

	#[inline] pub fn identity( &self ) -> &TypeIdentity { &self.identity }
	#[inline] pub fn exports( &self ) -> &[ExportDefinition] { &self.exports }
	#[inline] pub fn imports( &self ) -> &[ImportDefinition] { &self.imports }
	#[inline] pub fn actions( &self ) -> &[ScheduleActionDefinition] { &self.actions }
	#[inline] pub fn conditions( &self ) -> &[ScheduleConditionDefinition] { &self.conditions }

	/// Imports that must be bound before the part can be constructed.
	pub fn prerequisite_imports( &self ) -> impl Iterator<Item = &ImportDefinition> {
		self.imports.iter().filter(| import | import.is_prerequisite() )
	}

}
