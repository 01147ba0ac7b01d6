use std::collections::HashMap ;
use serde::{ Deserialize, Serialize };

use crate::PartInstanceId ;



/// What happened to an instance during reconciliation.
///
/// Variants are ordered by severity, so `Removed > Reconstructed > Updated`.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub enum InstanceChange {
	/// New values were pushed onto the existing object.
	Updated,
	/// The object was rebuilt; the instance id is unchanged.
	Reconstructed,
	/// The instance was released.
	Removed,
}

impl std::fmt::Display for InstanceChange {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		write!( f, "{:?}", self )
	}
}

/// One entry of an aggregated change list.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct InstanceUpdate {
	pub instance: PartInstanceId,
	pub change: InstanceChange,
}

/// Collects the changes of one operation.
///
/// Each instance appears once, at the position it was first touched, carrying the
/// most severe change it went through.
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct ChangeSet {
	updates: Vec<InstanceUpdate>,
	positions: HashMap<PartInstanceId, usize>,
}

impl ChangeSet {

	pub fn new() -> Self { Self::default() }

	/// Records `change` for `instance`, escalating an earlier, milder record.
	pub fn record( &mut self, instance: PartInstanceId, change: InstanceChange ) {
		match self.positions.get( &instance ) {
			Some( &position ) => {
				let update = &mut self.updates[position];
				update.change = update.change.max( change );
			},
			None => {
				self.positions.insert( instance, self.updates.len() );
				self.updates.push( InstanceUpdate { instance, change });
			},
		}
	}

	/// Appends every record of `other`, escalating where instances overlap.
	pub fn merge( &mut self, other: ChangeSet ) {
		other.updates.into_iter().for_each(| update | self.record( update.instance, update.change ));
	}

	pub fn change_for( &self, instance: PartInstanceId ) -> Option<InstanceChange> {
		self.positions.get( &instance ).map(| &position | self.updates[position].change )
	}

	#[inline] pub fn is_empty( &self ) -> bool { self.updates.is_empty() }
	#[inline] pub fn len( &self ) -> usize { self.updates.len() }
	#[inline] pub fn updates( &self ) -> &[InstanceUpdate] { &self.updates }
	pub fn into_updates( self ) -> Vec<InstanceUpdate> { self.updates }

}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn keeps_first_touch_order_and_worst_change() {
		let ( a, b ) = ( PartInstanceId::from_raw( 1 ), PartInstanceId::from_raw( 2 ));
		let mut changes = ChangeSet::new();
		changes.record( a, InstanceChange::Updated );
		changes.record( b, InstanceChange::Removed );
		changes.record( a, InstanceChange::Reconstructed );
		changes.record( b, InstanceChange::Updated );
		assert_eq!( changes.into_updates(), vec![
			InstanceUpdate { instance: a, change: InstanceChange::Reconstructed },
			InstanceUpdate { instance: b, change: InstanceChange::Removed },
		]);
	}

}
