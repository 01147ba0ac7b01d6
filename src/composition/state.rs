use std::collections::{ BTreeMap, HashMap, HashSet };
use std::sync::Arc ;
use serde::{ Deserialize, Serialize };
use tracing::{ debug, warn };

use crate::{
	GroupCompositionId, GroupConnection, GroupDefinition, GroupImportDefinition, GroupPartDefinition,
	ImportRegistrationId, InsertionPointId, PartCompositionId, PartInstanceId, PartRegistrationId,
};
use crate::instance::{ ChangeSet, InstanceBinding, InstanceError, InstanceLayer, PartActivator };



/// Lifecycle state of one part of a live group.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum PartState {
	/// Waiting for a prerequisite that only a group import can provide.
	Pending,
	/// Backed by a live instance.
	Constructed( PartInstanceId ),
}

impl PartState {
	pub fn instance( self ) -> Option<PartInstanceId> {
		match self {
			Self::Constructed( instance ) => Some( instance ),
			Self::Pending => None,
		}
	}
}

pub(super) struct GroupRecord {
	pub(super) definition: Arc<GroupDefinition>,
	pub(super) parts: BTreeMap<PartRegistrationId, PartState>,
	/// Constructed parts, oldest first.
	pub(super) construction_order: Vec<PartRegistrationId>,
}

impl GroupRecord {
	pub(super) fn new( definition: Arc<GroupDefinition> ) -> Self {
		let parts = definition.parts().iter()
			.map(| part | ( part.registration().clone(), PartState::Pending ))
			.collect();
		Self { definition, parts, construction_order: Vec::new() }
	}
}

/// Everything the composition layer guards with its lock.
pub(super) struct CompositionState<A: PartActivator> {
	pub(super) instances: InstanceLayer<A>,
	pub(super) groups: HashMap<GroupCompositionId, GroupRecord>,
	/// Live groups in the order they were added.
	pub(super) order: Vec<GroupCompositionId>,
	pub(super) connections: Vec<GroupConnection>,
}

impl<A: PartActivator> CompositionState<A> {

	pub(super) fn new( activator: A ) -> Self {
		Self {
			instances: InstanceLayer::new( activator ),
			groups: HashMap::new(),
			order: Vec::new(),
			connections: Vec::new(),
		}
	}

	pub(super) fn part_state( &self, group: GroupCompositionId, part: &PartRegistrationId ) -> Option<PartState> {
		self.groups.get( &group ).and_then(| record | record.parts.get( part )).copied()
	}

	pub(super) fn instance_of( &self, group: GroupCompositionId, part: &PartRegistrationId ) -> Option<PartInstanceId> {
		self.part_state( group, part ).and_then( PartState::instance )
	}

	pub(super) fn part_for( &self, instance: PartInstanceId ) -> Option<PartCompositionId> {
		self.order.iter().find_map(| group | self.groups.get( group )
			.and_then(| record | record.parts.iter().find(|( _, state )| state.instance() == Some( instance )))
			.map(|( part, _ )| PartCompositionId::new( *group, part.clone() ))
		)
	}

	/// The bindings `part` should hold given the group's wiring and current connections.
	///
	/// Internal wiring comes first, then connections in the order they were made.
	/// Exports of parts that are not constructed are skipped.
	pub(super) fn derive_bindings( &self, group: GroupCompositionId, part: &PartRegistrationId ) -> Vec<InstanceBinding> {

		let Some( record ) = self.groups.get( &group ) else { return Vec::new() };

		let internal = record.definition.internal_connections().iter()
			.filter(|( import, _ )| import.owner() == part )
			.flat_map( move |( import, exports )| exports.iter().filter_map( move | export |
				self.instance_of( group, export.owner() )
					.map(| source | InstanceBinding::new( import.clone(), source, export.clone() ))
			));

		let external = self.connections.iter()
			.filter(| connection | connection.importing_group() == group )
			.flat_map( move | connection | connection.part_connections().iter()
				.filter( move | map | map.import().owner() == part )
				.flat_map( move | map | map.export_ids().filter_map( move | export |
					self.instance_of( connection.exporting_group(), export.owner() )
						.map(| source | InstanceBinding::new( map.import().clone(), source, export.clone() ))
				))
			);

		internal.chain( external ).collect()

	}

	/// Returns `true` if every required prerequisite of `part` has a live source.
	fn is_ready( &self, group: GroupCompositionId, part: &GroupPartDefinition ) -> bool {
		let bindings = self.derive_bindings( group, part.registration() );
		part.imports()
			.filter(|( _, import )| import.is_required_prerequisite() )
			.all(|( id, _ )| bindings.iter().any(| binding | binding.import() == id ))
	}

	/// Returns `true` if every part `part` is wired to inside its group is constructed.
	fn internal_sources_constructed( &self, group: GroupCompositionId, part: &GroupPartDefinition ) -> bool {
		let Some( record ) = self.groups.get( &group ) else { return false };
		record.definition.internal_connections().iter()
			.filter(|( import, _ )| import.owner() == part.registration() )
			.flat_map(|( _, exports )| exports )
			.all(| export | self.instance_of( group, export.owner() ).is_some() )
	}

	/// Constructs every pending part of `group` whose prerequisites are available.
	///
	/// Parts whose internal sources are all live go first, so that property wiring
	/// inside a group is usually complete at construction.
	pub(super) fn construct_ready_parts( &mut self, group: GroupCompositionId ) -> Result<Vec<PartRegistrationId>, InstanceError> {

		let Some( definition ) = self.groups.get( &group ).map(| record | Arc::clone( &record.definition )) else {
			return Ok( Vec::new() );
		};

		let mut constructed = Vec::new();
		loop {

			let pending = definition.parts().iter()
				.filter(| part | self.part_state( group, part.registration() ) == Some( PartState::Pending ))
				.filter(| part | self.is_ready( group, part ))
				.collect::<Vec<_>>();
			let next = pending.iter()
				.find(| part | self.internal_sources_constructed( group, part ))
				.or_else(|| pending.first() );
			let Some( part ) = next else { break };

			let bindings = self.derive_bindings( group, part.registration() );
			let instance = self.instances.construct( Arc::clone( part.part() ), bindings )?;
			debug!( %group, part = %part.registration(), %instance, "Constructed group part" );
			if let Some( record ) = self.groups.get_mut( &group ) {
				record.parts.insert( part.registration().clone(), PartState::Constructed( instance ));
				record.construction_order.push( part.registration().clone() );
			}
			constructed.push( part.registration().clone() );

		}
		Ok( constructed )

	}

	/// The first pending part of `group` that no group import can ever unblock.
	///
	/// A pending part is viable if each missing required prerequisite is part of
	/// a group import or is wired to a part that is itself constructed or viable.
	pub(super) fn unviable_part( &self, group: GroupCompositionId ) -> Option<&GroupPartDefinition> {

		let record = self.groups.get( &group )?;
		let definition = &record.definition ;
		let external = definition.group_imports().iter()
			.flat_map( GroupImportDefinition::imports )
			.collect::<HashSet<&ImportRegistrationId>>();

		let mut viable = record.parts.iter()
			.filter(|( _, state )| state.instance().is_some() )
			.map(|( part, _ )| part.clone() )
			.collect::<HashSet<_>>();

		loop {
			let unblocked = definition.parts().iter()
				.filter(| part | !viable.contains( part.registration() ))
				.filter(| part | part.imports()
					.filter(|( _, import )| import.is_required_prerequisite() )
					.all(|( id, _ )| external.contains( id ) || definition.internal_connections().get( id )
						.is_some_and(| exports | exports.iter().any(| export | viable.contains( export.owner() )))
					)
				)
				.map(| part | part.registration().clone() )
				.collect::<Vec<_>>();
			if unblocked.is_empty() { break }
			viable.extend( unblocked );
		}

		definition.parts().iter().find(| part | !viable.contains( part.registration() ))

	}

	/// Marks parts whose instance was released by a cascade as pending again.
	pub(super) fn sync_released( &mut self ) {
		let instances = &self.instances ;
		for record in self.groups.values_mut() {
			for state in record.parts.values_mut() {
				if state.instance().is_some_and(| instance | !instances.has_instance_for( instance )) {
					*state = PartState::Pending ;
				}
			}
			record.construction_order.retain(| part | matches!( record.parts.get( part ), Some( PartState::Constructed( _ ))));
		}
	}

	/// Brings every live instance in line with the current wiring and constructs
	/// whatever became constructible, until nothing changes.
	pub(super) fn reconcile_all( &mut self, except: Option<GroupCompositionId>, changes: &mut ChangeSet ) -> Result<(), InstanceError> {

		let rounds = self.groups.values().map(| record | record.parts.len() ).sum::<usize>() + 1 ;
		for _ in 0..rounds {

			let mut progressed = false ;
			for group in self.order.clone() {

				if except == Some( group ) { continue }
				let constructed = self.groups.get( &group )
					.map(| record | record.definition.parts().iter()
						.filter_map(| part | record.parts.get( part.registration() )
							.and_then(| state | state.instance() )
							.map(| instance | ( part.registration().clone(), instance )))
						.collect::<Vec<_>>())
					.unwrap_or_default();

				for ( part, instance ) in constructed {
					if !self.instances.has_instance_for( instance ) { continue }
					let desired = self.derive_bindings( group, &part );
					let updates = self.instances.update_if_required( instance, desired );
					self.sync_released();
					let updates = updates?;
					progressed |= !updates.is_empty();
					updates.into_iter().for_each(| update | changes.record( update.instance, update.change ));
				}

				progressed |= !self.construct_ready_parts( group )?.is_empty();

			}
			if !progressed { return Ok(()) }

		}

		warn!( "Reconciliation did not settle" );
		Ok(())

	}

	/// Releases every instance of `group`, newest first, and forgets the group.
	///
	/// Releasing continues past failures; the first one is returned.
	pub(super) fn release_group( &mut self, group: GroupCompositionId, changes: &mut ChangeSet ) -> Result<(), InstanceError> {

		let order = self.groups.get( &group )
			.map(| record | record.construction_order.clone() )
			.unwrap_or_default();

		let mut failure = None ;
		for part in order.iter().rev() {
			let Some( instance ) = self.instance_of( group, part ) else { continue };
			if !self.instances.has_instance_for( instance ) { continue }
			match self.instances.release( instance ) {
				Ok( updates ) => updates.into_iter().for_each(| update | changes.record( update.instance, update.change )),
				Err( error ) => {
					warn!( %group, %part, %error, "Failed to release group part" );
					failure.get_or_insert( error );
				},
			}
			self.sync_released();
		}

		self.groups.remove( &group );
		self.order.retain(| id | *id != group );
		failure.map_or( Ok(()), Err )

	}

	/// Number of connections currently inserted at `point` of `group`'s schedule.
	pub(super) fn used_insertions( &self, group: GroupCompositionId, point: InsertionPointId ) -> usize {
		self.connections.iter()
			.filter(| connection | connection.importing_group() == group && connection.import().insertion_point() == Some( point ))
			.count()
	}

	/// Number of exports bound to `import` through wiring and connections.
	pub(super) fn bound_export_count( &self, group: GroupCompositionId, import: &ImportRegistrationId ) -> usize {
		let internal = self.groups.get( &group )
			.and_then(| record | record.definition.internal_connections().get( import ))
			.map_or( 0, Vec::len );
		let external = self.connections.iter()
			.filter(| connection | connection.importing_group() == group )
			.map(| connection | connection.exports_for( import ).count() )
			.sum::<usize>();
		internal + external
	}

	/// Group imports of `group`, split into satisfied and unsatisfied.
	pub(super) fn import_satisfaction( &self, group: GroupCompositionId ) -> ( Vec<GroupImportDefinition>, Vec<GroupImportDefinition> ) {
		let Some( record ) = self.groups.get( &group ) else { return ( Vec::new(), Vec::new() ) };
		record.definition.group_imports().iter()
			.cloned()
			.partition(| import | self.connections.iter()
				.any(| connection | connection.importing_group() == group && connection.import() == import ))
	}

}
