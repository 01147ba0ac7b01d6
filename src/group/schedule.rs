use serde::{ Deserialize, Serialize };

use crate::{ InsertionPointId, ScheduleActionRegistrationId, ScheduleConditionRegistrationId };



/// A place in a group's schedule where another group's schedule can be inserted.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct InsertionPointDefinition {
	id: InsertionPointId,
	name: String,
	capacity: Option<usize>,
}

impl InsertionPointDefinition {

	/// An insertion point accepting at most `capacity` schedules, or any number if `None`.
	pub fn new( id: InsertionPointId, name: impl Into<String>, capacity: Option<usize> ) -> Self {
		Self { id, name: name.into(), capacity }
	}

	#[inline] pub fn id( &self ) -> InsertionPointId { self.id }
	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn capacity( &self ) -> Option<usize> { self.capacity }

	/// Returns `true` if one more schedule fits when `used` are already inserted.
	pub fn has_room( &self, used: usize ) -> bool {
		self.capacity.is_none_or(| capacity | used < capacity )
	}

}

/// The execution plan a group carries.
///
/// Only what composition needs is modelled here: which actions and conditions the
/// plan uses, and where other groups' plans may be inserted. Building the plan
/// graph itself is left to the schedule builder.
#[derive( Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize )]
pub struct ScheduleDefinition {
	insertion_points: Vec<InsertionPointDefinition>,
	actions: Vec<ScheduleActionRegistrationId>,
	conditions: Vec<ScheduleConditionRegistrationId>,
}

impl ScheduleDefinition {

	pub fn new(
		insertion_points: impl IntoIterator<Item = InsertionPointDefinition>,
		actions: impl IntoIterator<Item = ScheduleActionRegistrationId>,
		conditions: impl IntoIterator<Item = ScheduleConditionRegistrationId>,
	) -> Self {
		Self {
			insertion_points: insertion_points.into_iter().collect(),
			actions: actions.into_iter().collect(),
			conditions: conditions.into_iter().collect(),
		}
	}

	#[inline] pub fn insertion_points( &self ) -> &[InsertionPointDefinition] { &self.insertion_points }
	#[inline] pub fn actions( &self ) -> &[ScheduleActionRegistrationId] { &self.actions }
	#[inline] pub fn conditions( &self ) -> &[ScheduleConditionRegistrationId] { &self.conditions }

	pub fn insertion_point( &self, id: InsertionPointId ) -> Option<&InsertionPointDefinition> {
		self.insertion_points.iter().find(| point | point.id() == id )
	}

}
