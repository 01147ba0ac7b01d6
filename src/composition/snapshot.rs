use serde::{ Deserialize, Serialize };

use crate::{ GroupCompositionId, GroupRegistrationId, PartRegistrationId };
use super::PartState ;



/// Serializable view of a composition at one point in time.
#[derive( Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize )]
pub struct CompositionSnapshot {
	/// Live groups in the order they were added.
	pub groups: Vec<GroupSnapshot>,
	/// Connections in the order they were made.
	pub connections: Vec<ConnectionSnapshot>,
}

#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct GroupSnapshot {
	pub id: GroupCompositionId,
	pub definition: GroupRegistrationId,
	/// Parts in declaration order.
	pub parts: Vec<PartSnapshot>,
	/// Contract names of group imports no connection satisfies.
	pub unsatisfied_imports: Vec<String>,
}

#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct PartSnapshot {
	pub part: PartRegistrationId,
	pub state: PartState,
}

#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct ConnectionSnapshot {
	pub importing_group: GroupCompositionId,
	pub exporting_group: GroupCompositionId,
	/// Contract name of the satisfied group import.
	pub import: String,
	/// Number of part level import to export bindings.
	pub bindings: usize,
}

impl CompositionSnapshot {

	pub fn group( &self, id: GroupCompositionId ) -> Option<&GroupSnapshot> {
		self.groups.iter().find(| group | group.id == id )
	}

	/// Number of parts still waiting for a prerequisite.
	pub fn pending_parts( &self ) -> usize {
		self.groups.iter()
			.flat_map(| group | &group.parts )
			.filter(| part | part.state == PartState::Pending )
			.count()
	}

}
