//! Import and export definitions.
//!
//! A capability definition describes one point on a part where a value is offered
//! (an export) or requested (an import). The site of the declaration decides what
//! the definition carries: a type-based export is the declaring type itself, a
//! property-based one carries the property's type, a method-based one carries the
//! method's signature. Imports are declared on properties or on constructor
//! parameters; constructor imports are prerequisites and must be satisfied before
//! the owning part can be constructed.
//!
//! All definitions are immutable values compared structurally over every field.

use serde::{ Deserialize, Serialize };

use crate::{ Cardinality, TypeIdentity };
use crate::wrapper::{ MethodShape, WrapperShape };



/// One parameter of a method or constructor.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct ParameterDefinition {
	name: String,
	parameter_type: TypeIdentity,
}

impl ParameterDefinition {
	pub fn new( name: impl Into<String>, parameter_type: TypeIdentity ) -> Self {
		Self { name: name.into(), parameter_type }
	}
	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn parameter_type( &self ) -> &TypeIdentity { &self.parameter_type }
}

/// Signature of a method that is exported or used as a schedule action/condition.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct MethodDefinition {
	name: String,
	parameters: Vec<ParameterDefinition>,
	return_type: Option<TypeIdentity>,
}

impl MethodDefinition {

	pub fn new(
		name: impl Into<String>,
		parameters: impl IntoIterator<Item = ParameterDefinition>,
		return_type: Option<TypeIdentity>,
	) -> Self {
		Self { name: name.into(), parameters: parameters.into_iter().collect(), return_type }
	}

	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn parameters( &self ) -> &[ParameterDefinition] { &self.parameters }
	/// `None` when the method returns nothing.
	#[inline] pub fn return_type( &self ) -> Option<&TypeIdentity> { self.return_type.as_ref() }

	/// The delegate shape that can call this method.
	pub fn shape( &self ) -> MethodShape {
		MethodShape::new(
			self.parameters.iter().map(| parameter | parameter.parameter_type().clone() ),
			self.return_type.clone(),
		)
	}

}

/// Where an export is declared.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum ExportSite {
	/// The export is the declaring type itself.
	Type,
	/// The export is the value of a property.
	Property { name: String, property_type: TypeIdentity },
	/// The export is a method, exposed as a delegate.
	Method( MethodDefinition ),
}

/// A capability offered by a part.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct ExportDefinition {
	contract_name: String,
	declaring_type: TypeIdentity,
	site: ExportSite,
}

impl ExportDefinition {

	/// An export of the declaring type itself.
	///
	/// The contract name defaults to the declaring type's name.
	pub fn for_type( declaring_type: TypeIdentity, contract_name: Option<String> ) -> Self {
		Self {
			contract_name: contract_name.unwrap_or_else(|| declaring_type.to_string() ),
			declaring_type,
			site: ExportSite::Type,
		}
	}

	/// An export of a property value.
	///
	/// The contract name defaults to the property type's name.
	pub fn for_property(
		declaring_type: TypeIdentity,
		name: impl Into<String>,
		property_type: TypeIdentity,
		contract_name: Option<String>,
	) -> Self {
		Self {
			contract_name: contract_name.unwrap_or_else(|| property_type.to_string() ),
			declaring_type,
			site: ExportSite::Property { name: name.into(), property_type },
		}
	}

	/// An export of a method.
	///
	/// The contract name defaults to the name of the method's delegate shape,
	/// `Factory<P.., R>` or `Action<P..>`, whatever the method's arity.
	pub fn for_method( declaring_type: TypeIdentity, method: MethodDefinition, contract_name: Option<String> ) -> Self {
		Self {
			contract_name: contract_name.unwrap_or_else(|| method.shape().delegate_identity().to_string() ),
			declaring_type,
			site: ExportSite::Method( method ),
		}
	}

	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn declaring_type( &self ) -> &TypeIdentity { &self.declaring_type }
	#[inline] pub fn site( &self ) -> &ExportSite { &self.site }

	/// The type of the exported value.
	///
	/// This is the declaring type, the property type or the method's return type.
	/// Methods returning nothing have no exported value type.
	pub fn exported_type( &self ) -> Option<&TypeIdentity> {
		match &self.site {
			ExportSite::Type => Some( &self.declaring_type ),
			ExportSite::Property { property_type, .. } => Some( property_type ),
			ExportSite::Method( method ) => method.return_type(),
		}
	}

	/// The exported method, if this is a method-based export.
	pub fn method( &self ) -> Option<&MethodDefinition> {
		match &self.site {
			ExportSite::Method( method ) => Some( method ),
			ExportSite::Type | ExportSite::Property { .. } => None,
		}
	}

}

/// Where an import is declared.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum ImportSite {
	/// Bound after construction through a property.
	Property { name: String },
	/// Bound at construction through a constructor parameter.
	Constructor { parameter: ParameterDefinition },
}

/// How the importing side wants the exporting part to be created.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize )]
pub enum CreationPolicy {
	/// No preference.
	#[default] Any,
	/// One instance shared by every importer.
	Shared,
	/// A dedicated instance per importer.
	NonShared,
}

/// A capability requested by a part.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct ImportDefinition {
	contract_name: String,
	declaring_type: TypeIdentity,
	required_type: TypeIdentity,
	cardinality: Cardinality,
	is_recomposable: bool,
	creation_policy: CreationPolicy,
	site: ImportSite,
}

impl ImportDefinition {

	/// An import bound through a property after construction.
	///
	/// The contract name defaults to [`default_contract_name`]( Self::default_contract_name ).
	/// The cardinality defaults to `Many` for sequence shapes and `ExactlyOne` otherwise.
	pub fn for_property(
		declaring_type: TypeIdentity,
		name: impl Into<String>,
		required_type: TypeIdentity,
		contract_name: Option<String>,
	) -> Self {
		Self::build( declaring_type, required_type, contract_name, ImportSite::Property { name: name.into() })
	}

	/// An import bound through a constructor parameter.
	///
	/// Constructor imports are prerequisites and are never recomposable.
	pub fn for_constructor(
		declaring_type: TypeIdentity,
		parameter: ParameterDefinition,
		contract_name: Option<String>,
	) -> Self {
		let required_type = parameter.parameter_type().clone();
		Self::build( declaring_type, required_type, contract_name, ImportSite::Constructor { parameter })
	}

	fn build(
		declaring_type: TypeIdentity,
		required_type: TypeIdentity,
		contract_name: Option<String>,
		site: ImportSite,
	) -> Self {
		let shape = WrapperShape::of( &required_type );
		Self {
			contract_name: contract_name.unwrap_or_else(|| Self::default_contract_name( &required_type )),
			cardinality: match shape.is_collection() { true => Cardinality::Many, false => Cardinality::ExactlyOne },
			is_recomposable: matches!( site, ImportSite::Property { .. } ),
			creation_policy: CreationPolicy::Any,
			declaring_type,
			required_type,
			site,
		}
	}

	/// The contract name an import of `required_type` gets when none is given.
	///
	/// Method shapes use the name of the delegate shape; everything else uses the
	/// name of the unwrapped, effective type.
	pub fn default_contract_name( required_type: &TypeIdentity ) -> String {
		WrapperShape::of( required_type ).effective_type().to_string()
	}

	/// Overrides the cardinality.
	pub fn with_cardinality( mut self, cardinality: Cardinality ) -> Self {
		self.cardinality = cardinality ;
		self
	}

	/// Overrides the recomposable flag. Constructor imports stay non-recomposable.
	pub fn with_recomposable( mut self, is_recomposable: bool ) -> Self {
		self.is_recomposable = is_recomposable && !self.is_prerequisite();
		self
	}

	pub fn with_creation_policy( mut self, creation_policy: CreationPolicy ) -> Self {
		self.creation_policy = creation_policy ;
		self
	}

	#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
	#[inline] pub fn declaring_type( &self ) -> &TypeIdentity { &self.declaring_type }
	#[inline] pub fn required_type( &self ) -> &TypeIdentity { &self.required_type }
	#[inline] pub fn cardinality( &self ) -> Cardinality { self.cardinality }
	#[inline] pub fn is_recomposable( &self ) -> bool { self.is_recomposable }
	#[inline] pub fn creation_policy( &self ) -> CreationPolicy { self.creation_policy }
	#[inline] pub fn site( &self ) -> &ImportSite { &self.site }

	/// Returns `true` if the import must be satisfied before construction.
	#[inline] pub fn is_prerequisite( &self ) -> bool { matches!( self.site, ImportSite::Constructor { .. } )}

	/// Returns `true` if construction cannot proceed while this import is unbound.
	#[inline] pub fn is_required_prerequisite( &self ) -> bool {
		self.is_prerequisite() && !self.cardinality.is_optional()
	}

	/// The wrapper shape of the required type.
	#[inline] pub fn shape( &self ) -> WrapperShape { WrapperShape::of( &self.required_type ) }

}

/// Returns `true` if `import` and `export` carry the same contract name.
pub(crate) fn contracts_match( import: &ImportDefinition, export: &ExportDefinition ) -> bool {
	import.contract_name() == export.contract_name()
}
