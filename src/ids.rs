//! Identifiers minted for live groups and part instances.
//!
//! Unlike registration ids, these address objects that exist at runtime. They
//! are minted on construction, never reused, and must not be used after the
//! object they name has been released.

use std::sync::atomic::{ AtomicU64, Ordering };
use serde::{ Deserialize, Serialize };
use uuid::Uuid ;

use crate::PartRegistrationId ;



/// Identifies one group instance in a composition.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct GroupCompositionId( Uuid );

impl GroupCompositionId {
	/// Mints a fresh random identifier.
	pub fn new() -> Self { Self( Uuid::new_v4() )}
	#[inline] pub fn as_uuid( &self ) -> &Uuid { &self.0 }
}

impl Default for GroupCompositionId {
	fn default() -> Self { Self::new() }
}

impl std::fmt::Display for GroupCompositionId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		std::fmt::Display::fmt( &self.0, f )
	}
}

/// Addresses one part of one group instance.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct PartCompositionId {
	group: GroupCompositionId,
	part: PartRegistrationId,
}

impl PartCompositionId {
	pub fn new( group: GroupCompositionId, part: PartRegistrationId ) -> Self { Self { group, part }}
	#[inline] pub fn group( &self ) -> GroupCompositionId { self.group }
	#[inline] pub fn part( &self ) -> &PartRegistrationId { &self.part }
}

impl std::fmt::Display for PartCompositionId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		write!( f, "{}/{}", self.group, self.part )
	}
}

/// Identifies one constructed part instance.
///
/// Reconstruction keeps the id; only release retires it.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct PartInstanceId( u64 );

impl PartInstanceId {
	#[inline] pub(crate) const fn from_raw( value: u64 ) -> Self { Self( value )}
	#[inline] pub const fn value( self ) -> u64 { self.0 }
}

impl std::fmt::Display for PartInstanceId {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		std::fmt::Display::fmt( &self.0, f )
	}
}

/// Mints strictly increasing [`PartInstanceId`]s.
#[derive( Debug, Default )]
pub(crate) struct InstanceIdGenerator( AtomicU64 );

impl InstanceIdGenerator {
	pub(crate) fn next( &self ) -> PartInstanceId {
		PartInstanceId::from_raw( self.0.fetch_add( 1, Ordering::Relaxed ))
	}
}
