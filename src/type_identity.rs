//! Structural type identities.
//!
//! A [`TypeIdentity`] is the only way the runtime refers to a type. It carries the
//! type's name and its generic shape: non-generic, an open generic definition
//! (`Sequence<>` with a known arity) or a closed generic (`Sequence<Int>`). Two
//! identities are equal iff their names match and their generic shapes match,
//! including every type argument in order.
//!
//! Identities are owned by the [`TypeStore`]( crate::TypeStore ) but are plain
//! values; everything else stores them by value.

use serde::{ Deserialize, Serialize };



/// Generic shape of a [`TypeIdentity`].
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub enum GenericShape {
	/// Not a generic type.
	None,
	/// An open generic definition with the given number of type parameters.
	Open( usize ),
	/// A closed generic with its type arguments in declaration order.
	Closed( Vec<TypeIdentity> ),
}

/// An opaque, structurally comparable handle to a type.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct TypeIdentity {
	name: String,
	shape: GenericShape,
}

impl TypeIdentity {

	/// Identity of a non-generic type.
	pub fn new( name: impl Into<String> ) -> Self {
		Self { name: name.into(), shape: GenericShape::None }
	}

	/// Identity of an open generic definition, e.g. `Sequence<>`.
	///
	/// An arity of zero describes a non-generic type.
	pub fn open( name: impl Into<String>, arity: usize ) -> Self {
		Self {
			name: name.into(),
			shape: match arity { 0 => GenericShape::None, arity => GenericShape::Open( arity ) },
		}
	}

	/// Identity of a closed generic, e.g. `Sequence<Int>`.
	///
	/// An empty argument list describes a non-generic type.
	pub fn closed( name: impl Into<String>, arguments: impl IntoIterator<Item = TypeIdentity> ) -> Self {
		let arguments = arguments.into_iter().collect::<Vec<_>>();
		Self {
			name: name.into(),
			shape: match arguments.is_empty() {
				true => GenericShape::None,
				false => GenericShape::Closed( arguments ),
			},
		}
	}

	/// The type's name without any generic arguments.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// The type's generic shape.
	#[inline] pub fn shape( &self ) -> &GenericShape { &self.shape }

	/// Number of generic parameters, `0` for non-generic types.
	pub fn arity( &self ) -> usize {
		match &self.shape {
			GenericShape::None => 0,
			GenericShape::Open( arity ) => *arity,
			GenericShape::Closed( arguments ) => arguments.len(),
		}
	}

	/// Type arguments of a closed generic; empty for every other shape.
	pub fn type_arguments( &self ) -> &[TypeIdentity] {
		match &self.shape {
			GenericShape::Closed( arguments ) => arguments,
			GenericShape::None | GenericShape::Open( _ ) => &[],
		}
	}

	#[inline] pub fn is_generic( &self ) -> bool { self.shape != GenericShape::None }
	#[inline] pub fn is_open_generic( &self ) -> bool { matches!( self.shape, GenericShape::Open( _ )) }

	/// The open generic definition this identity was closed from.
	///
	/// Returns `None` for non-generic types and open definitions.
	pub fn generic_definition( &self ) -> Option<TypeIdentity> {
		match &self.shape {
			GenericShape::Closed( arguments ) => Some( Self::open( self.name.clone(), arguments.len() )),
			GenericShape::None | GenericShape::Open( _ ) => None,
		}
	}

	/// Returns `true` if this identity has the given name and arity.
	#[inline] pub fn has_shape( &self, name: &str, arity: usize ) -> bool {
		self.name == name && self.arity() == arity
	}

}

impl std::fmt::Display for TypeIdentity {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match &self.shape {
			GenericShape::None => write!( f, "{}", self.name ),
			GenericShape::Open( arity ) => write!( f, "{}<{}>", self.name, ",".repeat( arity.saturating_sub( 1 ))),
			GenericShape::Closed( arguments ) => {
				write!( f, "{}<", self.name )?;
				arguments.iter().enumerate().try_for_each(|( index, argument )| match index {
					0 => write!( f, "{}", argument ),
					_ => write!( f, ", {}", argument ),
				})?;
				write!( f, ">" )
			}
		}
	}
}

impl From<&str> for TypeIdentity {
	fn from( name: &str ) -> Self { Self::new( name ) }
}
