//! Registration identifiers.
//!
//! Registration ids address one capability of one part inside a group
//! definition, independently of any live object. They are totally ordered
//! (declaring type name, then ordinal, then contract name) so that maps keyed by
//! them iterate deterministically.

use serde::{ Deserialize, Serialize };

use crate::TypeIdentity ;



/// Identifies a part registered in a group: its type plus its ordinal in the group.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct PartRegistrationId {
	declaring_type: String,
	ordinal: u32,
}

impl PartRegistrationId {

	pub fn new( declaring_type: &TypeIdentity, ordinal: u32 ) -> Self {
		Self { declaring_type: declaring_type.to_string(), ordinal }
	}

	/// Display name of the registered part's type.
	#[inline] pub fn declaring_type( &self ) -> &str { &self.declaring_type }
	#[inline] pub fn ordinal( &self ) -> u32 { self.ordinal }

}

impl std::fmt::Display for PartRegistrationId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		write!( f, "{}#{}", self.declaring_type, self.ordinal )
	}
}

macro_rules! capability_registration_id {
	( $( #[$meta:meta] )* $name:ident ) => {
		$( #[$meta] )*
		///
		/// `position` is the capability's index on the part, which keeps two
		/// capabilities with the same contract name apart.
		#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
		pub struct $name {
			owner: PartRegistrationId,
			contract_name: String,
			position: u32,
		}

		impl $name {

			pub fn new( owner: PartRegistrationId, contract_name: impl Into<String>, position: u32 ) -> Self {
				Self { owner, contract_name: contract_name.into(), position }
			}

			/// The part registration that owns this capability.
			#[inline] pub fn owner( &self ) -> &PartRegistrationId { &self.owner }
			#[inline] pub fn contract_name( &self ) -> &str { &self.contract_name }
			#[inline] pub fn position( &self ) -> u32 { self.position }

		}

		impl std::fmt::Display for $name {
			fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
				write!( f, "{}:{}[{}]", self.owner, self.contract_name, self.position )
			}
		}
	};
}

capability_registration_id!(
	/// Identifies one export of a registered part.
	ExportRegistrationId
);
capability_registration_id!(
	/// Identifies one import of a registered part.
	ImportRegistrationId
);
capability_registration_id!(
	/// Identifies one schedule action of a registered part.
	ScheduleActionRegistrationId
);
capability_registration_id!(
	/// Identifies one schedule condition of a registered part.
	ScheduleConditionRegistrationId
);

/// Identifies a group definition by name.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct GroupRegistrationId( String );

impl GroupRegistrationId {
	pub fn new( name: impl Into<String> ) -> Self { Self( name.into() )}
	#[inline] pub fn name( &self ) -> &str { &self.0 }
}

impl std::fmt::Display for GroupRegistrationId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { f.write_str( &self.0 )}
}

/// Identifies an insertion point in a group's schedule.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct InsertionPointId( u32 );

impl InsertionPointId {
	pub const fn new( id: u32 ) -> Self { Self( id )}
}

impl std::fmt::Display for InsertionPointId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		std::fmt::Display::fmt( &self.0, f )
	}
}

impl From<InsertionPointId> for u32 {
	fn from( id: InsertionPointId ) -> Self { id.0 }
}
