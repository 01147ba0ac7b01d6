//! Matching a single import against a single export.

use itertools::Itertools ;
use thiserror::Error ;

use crate::{ ExportDefinition, ImportDefinition, MethodDefinition, ParameterDefinition, TypeIdentity, TypeStore };
use crate::capability::contracts_match ;
use crate::wrapper::{ MethodShape, WrapperShape };



/// Decides whether an export can satisfy an import.
///
/// The engine is a pure function of its inputs plus read-only subtype queries
/// against the [`TypeStore`]. A mismatch is reported as `false`, never as an error.
///
/// The rules, in order:
///
/// 1. The contract names must be equal.
/// 2. The required type is unwrapped structurally: `Deferred<T>`, `Factory<T>` and
/// 	`Sequence<T>` yield `T`; `Sequence<Deferred<T>>` and `Sequence<Factory<T>>`
/// 	yield `T` as well.
/// 3. The exported value type must equal the effective type or be one of its
/// 	subtypes.
/// 4. Method shapes (`Factory<P.., R>` with parameters, `Action<P..>`) only match a
/// 	method export with exactly the same parameter types and a compatible return.
///
/// A zero-argument factory may be accepted against a method export by its return
/// type alone; the full signature is checked again when the importing part is
/// constructed.
pub struct PartImportEngine<'a, S: TypeStore + ?Sized> {
	store: &'a S,
}

impl<'a, S: TypeStore + ?Sized> PartImportEngine<'a, S> {

	pub fn new( store: &'a S ) -> Self { Self { store }}

	/// Returns `true` if `export` can satisfy `import`.
	pub fn accepts( &self, import: &ImportDefinition, export: &ExportDefinition ) -> bool {

		if !contracts_match( import, export ) { return false }

		match import.shape() {
			WrapperShape::Method( shape ) => export.method()
				.is_some_and(| method | self.method_matches( &shape, method )),
			shape => export.exported_type()
				.is_some_and(| exported | self.is_assignable( &shape.effective_type(), exported )),
		}

	}

	/// Returns `true` if a value of type `exported` can be used where `required` is expected.
	pub fn is_assignable( &self, required: &TypeIdentity, exported: &TypeIdentity ) -> bool {
		required == exported || self.store.is_subtype_of( required, exported )
	}

	fn method_matches( &self, shape: &MethodShape, method: &MethodDefinition ) -> bool {
		parameters_match( shape, method ) && match ( shape.return_type(), method.return_type() ) {
			( None, None ) => true,
			( Some( required ), Some( returned )) => self.is_assignable( required, returned ),
			( None, Some( _ )) | ( Some( _ ), None ) => false,
		}
	}

}

fn parameters_match( shape: &MethodShape, method: &MethodDefinition ) -> bool {
	shape.parameters().len() == method.parameters().len()
		&& shape.parameters().iter()
			.zip( method.parameters() )
			.all(|( required, parameter )| required == parameter.parameter_type() )
}

/// Why a bound method cannot serve a method-shaped import.
#[derive( Debug, Clone, PartialEq, Eq, Error )]
pub(crate) enum SignatureMismatch {

	#[error( "import '{contract}' expects a delegate with {expected} parameter(s), but method '{method}' takes {actual}" )]
	ParameterCount { contract: String, method: String, expected: usize, actual: usize },

	#[error( "import '{contract}' expects a delegate with parameters ({expected}), but method '{method}' takes ({actual})" )]
	ParameterTypes { contract: String, method: String, expected: String, actual: String },

	#[error( "import '{contract}' and method '{method}' disagree on whether a value is returned" )]
	ReturnValue { contract: String, method: String },

}

/// Re-checks an accepted import/export pair against the concrete export method.
///
/// Only method exports are checked. A method-shaped import must match the method's
/// parameter list exactly; any other import shape can only call a method that
/// takes no parameters.
///
/// # Errors
/// Returns the first [`SignatureMismatch`] found.
pub(crate) fn validate_binding_signature( import: &ImportDefinition, export: &ExportDefinition ) -> Result<(), SignatureMismatch> {

	let Some( method ) = export.method() else { return Ok(()) };

	let required = match import.shape() {
		WrapperShape::Method( shape ) => shape,
		shape => MethodShape::new( std::iter::empty(), Some( shape.effective_type() )),
	};

	if required.parameters().len() != method.parameters().len() {
		return Err( SignatureMismatch::ParameterCount {
			contract: import.contract_name().to_string(),
			method: method.name().to_string(),
			expected: required.parameters().len(),
			actual: method.parameters().len(),
		});
	}

	if !parameters_match( &required, method ) {
		return Err( SignatureMismatch::ParameterTypes {
			contract: import.contract_name().to_string(),
			method: method.name().to_string(),
			expected: required.parameters().iter().join( ", " ),
			actual: method.parameters().iter().map( ParameterDefinition::parameter_type ).join( ", " ),
		});
	}

	if required.return_type().is_some() != method.return_type().is_some() {
		return Err( SignatureMismatch::ReturnValue {
			contract: import.contract_name().to_string(),
			method: method.name().to_string(),
		});
	}

	Ok(())

}

#[cfg( test )]
mod tests {

	use super::* ;

	fn factory_import( required: TypeIdentity ) -> ImportDefinition {
		ImportDefinition::for_property( TypeIdentity::new( "Service" ), "make_logger", required, Some( "loggers".to_string() ))
	}

	fn method_export( parameters: &[&str], return_type: Option<&str> ) -> ExportDefinition {
		let method = MethodDefinition::new(
			"create",
			parameters.iter().map(| parameter | ParameterDefinition::new( parameter.to_lowercase(), TypeIdentity::new( *parameter ))),
			return_type.map( TypeIdentity::new ),
		);
		ExportDefinition::for_method( TypeIdentity::new( "Host" ), method, Some( "loggers".to_string() ))
	}

	#[test]
	fn signature_mismatch_reports_what_disagrees() {

		let zero_argument = factory_import( TypeIdentity::closed( "Factory", [ TypeIdentity::new( "Logger" )]));
		let one_argument = factory_import( TypeIdentity::closed( "Factory", [ TypeIdentity::new( "Int" ), TypeIdentity::new( "Logger" )]));

		assert_eq!( validate_binding_signature( &zero_argument, &method_export( &[], Some( "Logger" ))), Ok(()) );
		assert_eq!(
			validate_binding_signature( &zero_argument, &method_export( &[ "Int" ], Some( "Logger" ))),
			Err( SignatureMismatch::ParameterCount { contract: "loggers".into(), method: "create".into(), expected: 0, actual: 1 }),
		);
		assert_eq!(
			validate_binding_signature( &one_argument, &method_export( &[ "Text" ], Some( "Logger" ))),
			Err( SignatureMismatch::ParameterTypes {
				contract: "loggers".into(), method: "create".into(), expected: "Int".into(), actual: "Text".into(),
			}),
		);
		assert_eq!(
			validate_binding_signature( &zero_argument, &method_export( &[], None )),
			Err( SignatureMismatch::ReturnValue { contract: "loggers".into(), method: "create".into() }),
		);

	}

}
