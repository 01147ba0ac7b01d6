use serde::{ Deserialize, Serialize };



/// Specifies how many exports may or must satisfy an import.
///
/// Cardinality expresses what the importing part expects:
///
/// - `ExactlyOne`: The part needs a single export. Construction fails when a
///   prerequisite import with this cardinality is left unbound.
///
/// - `AtMostOne`: The part can work with zero or one export.
///
/// - `Many`: The part takes every compatible export, including none. This is the
///   cardinality of sequence-shaped imports.
#[derive( Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord, Default, Serialize, Deserialize )]
pub enum Cardinality {
	/// Exactly one export required.
	#[default] ExactlyOne,
	/// Zero or one export allowed.
	AtMostOne,
	/// Zero or more exports allowed.
	Many,
}

impl Cardinality {

	/// Returns `true` if `count` bound exports satisfy this cardinality.
	pub fn admits( self, count: usize ) -> bool {
		match self {
			Self::ExactlyOne => count == 1,
			Self::AtMostOne => count <= 1,
			Self::Many => true,
		}
	}

	/// Returns `true` if `count` bound exports exceed what this cardinality allows.
	pub fn is_exceeded_by( self, count: usize ) -> bool {
		match self {
			Self::ExactlyOne | Self::AtMostOne => count > 1,
			Self::Many => false,
		}
	}

	/// Returns `true` if this cardinality is satisfied without any export.
	#[inline] pub fn is_optional( self ) -> bool { self.admits( 0 ) }

}

impl std::fmt::Display for Cardinality {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{:?}", self )}
}
