//! Recognition of the wrapper shapes an import may request.
//!
//! An import rarely asks for a bare value. It may ask for a deferred value, a
//! factory producing the value, a sequence of values, or a method-shaped
//! delegate. These shapes are recognised purely structurally, by generic name
//! and arity, and form a closed set: new shapes are added to [`WrapperShape`],
//! never inferred from the wrapped type.

use crate::TypeIdentity ;



/// Generic name of a deferred value, `Deferred<T>`.
pub const DEFERRED: &str = "Deferred" ;
/// Generic name of a factory, `Factory<P1, .., Pn, R>`; the last argument is the result.
pub const FACTORY: &str = "Factory" ;
/// Generic name of an action, `Action<P1, .., Pn>`.
pub const ACTION: &str = "Action" ;
/// Generic name of a sequence, `Sequence<T>`.
pub const SEQUENCE: &str = "Sequence" ;

/// A recognised wrapper shape around a required type.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum WrapperShape {
	/// `Deferred<T>`: the value is produced on first use.
	Deferred( TypeIdentity ),
	/// `Factory<T>`: a zero-argument factory producing `T`.
	Factory( TypeIdentity ),
	/// `Sequence<T>`, `Sequence<Deferred<T>>` or `Sequence<Factory<T>>`.
	Sequence { element: TypeIdentity, item: Box<WrapperShape> },
	/// `Factory<P1, .., Pn, R>` with at least one parameter, or any `Action<..>`.
	Method( MethodShape ),
	/// Not wrapped.
	Plain( TypeIdentity ),
}

/// Signature of a method-shaped delegate.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct MethodShape {
	parameters: Vec<TypeIdentity>,
	return_type: Option<TypeIdentity>,
}

impl MethodShape {

	/// Creates a method shape; `return_type` is `None` for actions.
	pub fn new( parameters: impl IntoIterator<Item = TypeIdentity>, return_type: Option<TypeIdentity> ) -> Self {
		Self { parameters: parameters.into_iter().collect(), return_type }
	}

	#[inline] pub fn parameters( &self ) -> &[TypeIdentity] { &self.parameters }
	#[inline] pub fn return_type( &self ) -> Option<&TypeIdentity> { self.return_type.as_ref() }

	/// The delegate identity describing this shape: `Factory<P.., R>` or `Action<P..>`.
	pub fn delegate_identity( &self ) -> TypeIdentity {
		match &self.return_type {
			Some( return_type ) => TypeIdentity::closed(
				FACTORY,
				self.parameters.iter().cloned().chain( std::iter::once( return_type.clone() )),
			),
			None => TypeIdentity::closed( ACTION, self.parameters.iter().cloned() ),
		}
	}

}

impl WrapperShape {

	/// Classifies a required type.
	///
	/// At most two layers are unwrapped, and only for a sequence of deferred
	/// values or a sequence of zero-argument factories.
	pub fn of( required: &TypeIdentity ) -> Self {
		match Self::single_layer( required ) {
			Self::Sequence { element, .. } => {
				let item = match Self::single_layer( &element ) {
					inner @ ( Self::Deferred( _ ) | Self::Factory( _ )) => inner,
					_ => Self::Plain( element.clone() ),
				};
				Self::Sequence { element, item: Box::new( item ) }
			},
			shape => shape,
		}
	}

	fn single_layer( required: &TypeIdentity ) -> Self {
		let arguments = required.type_arguments();
		match ( required.name(), arguments ) {
			( DEFERRED, [ inner ]) => Self::Deferred( inner.clone() ),
			( SEQUENCE, [ inner ]) => Self::Sequence { element: inner.clone(), item: Box::new( Self::Plain( inner.clone() )) },
			( FACTORY, [ inner ]) => Self::Factory( inner.clone() ),
			( FACTORY, [ parameters @ .., result ]) if !parameters.is_empty() =>
				Self::Method( MethodShape::new( parameters.iter().cloned(), Some( result.clone() ))),
			( ACTION, parameters ) => Self::Method( MethodShape::new( parameters.iter().cloned(), None )),
			_ => Self::Plain( required.clone() ),
		}
	}

	/// The type an export must be assignable to in order to satisfy this shape.
	///
	/// Method shapes have no single effective type; their delegate identity is returned.
	pub fn effective_type( &self ) -> TypeIdentity {
		match self {
			Self::Deferred( inner ) | Self::Factory( inner ) | Self::Plain( inner ) => inner.clone(),
			Self::Sequence { item, .. } => item.effective_type(),
			Self::Method( shape ) => shape.delegate_identity(),
		}
	}

	/// Returns `true` if one import of this shape may bind several exports.
	#[inline] pub fn is_collection( &self ) -> bool { matches!( self, Self::Sequence { .. } )}

	/// The method signature this shape requires, if it is method-shaped.
	pub fn method( &self ) -> Option<&MethodShape> {
		match self {
			Self::Method( shape ) => Some( shape ),
			_ => None,
		}
	}

	/// Returns `true` if this shape is a zero-argument factory, possibly inside a sequence.
	pub fn is_zero_argument_factory( &self ) -> bool {
		match self {
			Self::Factory( _ ) => true,
			Self::Sequence { item, .. } => item.is_zero_argument_factory(),
			_ => false,
		}
	}

}
