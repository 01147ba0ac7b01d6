use std::collections::{ HashMap, HashSet, VecDeque };
use std::sync::Arc ;
use itertools::Itertools ;
use thiserror::Error ;
use tracing::{ debug, info };

use crate::{ ImportDefinition, PartDefinition, PartInstanceId, TypeIdentity };
use crate::ids::InstanceIdGenerator ;
use crate::part_import_engine::validate_binding_signature ;
use super::{ ActivationError, BoundExport, ChangeSet, InstanceBinding, InstanceChange, InstanceUpdate, PartActivator, PartObject, ResolvedImport };
use super::binding::normalise ;



/// Errors raised while constructing or reconciling instances.
#[derive( Debug, Error )]
pub enum InstanceError {

	/// A required prerequisite import is unbound, a binding names a capability the
	/// part or its source does not have, or a method-shaped import does not match
	/// the signature of the method it is bound to.
	#[error( "Construction of '{part}' failed: {reason}" )]
	ConstructionFailed { part: TypeIdentity, reason: String },

	/// The instance id does not name a live instance.
	#[error( "Unknown instance: {0}" )]
	UnknownInstance( PartInstanceId ),

	/// The activator refused to build or update the object.
	#[error( "Activation of '{part}' failed: {source}" )]
	ActivationFailed { part: TypeIdentity, #[source] source: ActivationError },

}

fn construction_failed( part: &PartDefinition, reason: impl Into<String> ) -> InstanceError {
	InstanceError::ConstructionFailed { part: part.identity().clone(), reason: reason.into() }
}

fn activation_failed( part: &PartDefinition ) -> impl FnOnce( ActivationError ) -> InstanceError + '_ {
	move | source | InstanceError::ActivationFailed { part: part.identity().clone(), source }
}

/// A binding together with the generation its source had when it was bound.
#[derive( Debug, Clone, PartialEq, Eq )]
struct RecordedBinding {
	binding: InstanceBinding,
	generation: u64,
}

struct InstanceRecord {
	part: Arc<PartDefinition>,
	object: PartObject,
	bindings: Vec<RecordedBinding>,
	/// Bumped whenever the object is rebuilt, so dependents notice the new value.
	generation: u64,
}

/// Arena of live part instances.
///
/// All operations assume exclusive access; the composition layer provides it
/// through its write lock.
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use plugin_link::{
/// 	DefaultActivator, ExportDefinition, ExportRegistrationId, ImportDefinition,
/// 	ImportRegistrationId, InstanceBinding, InstanceChange, InstanceLayer,
/// 	ParameterDefinition, PartDefinition, PartRegistrationId, TypeIdentity,
/// };
///
/// let clock = TypeIdentity::new( "Clock" );
/// let timer = TypeIdentity::new( "Timer" );
/// let clock_part = Arc::new( PartDefinition::new( clock.clone() )
/// 	.with_export( ExportDefinition::for_type( clock.clone(), None )));
/// let timer_part = Arc::new( PartDefinition::new( timer.clone() )
/// 	.with_import( ImportDefinition::for_constructor(
/// 		timer.clone(), ParameterDefinition::new( "clock", clock.clone() ), None,
/// 	)));
///
/// let mut layer = InstanceLayer::new( DefaultActivator );
/// let clock_instance = layer.construct( clock_part, Vec::new() ).unwrap();
/// let timer_instance = layer.construct( timer_part, vec![ InstanceBinding::new(
/// 	ImportRegistrationId::new( PartRegistrationId::new( &timer, 0 ), "Clock", 0 ),
/// 	clock_instance,
/// 	ExportRegistrationId::new( PartRegistrationId::new( &clock, 0 ), "Clock", 0 ),
/// )]).unwrap();
///
/// let changes = layer.release( clock_instance ).unwrap();
/// assert_eq!( changes.len(), 2 );
/// assert_eq!( changes[1].instance, timer_instance );
/// assert_eq!( changes[1].change, InstanceChange::Removed );
/// assert!( !layer.has_instance_for( timer_instance ));
/// ```
pub struct InstanceLayer<A: PartActivator> {
	activator: A,
	instances: HashMap<PartInstanceId, InstanceRecord>,
	ids: InstanceIdGenerator,
}

impl<A: PartActivator> InstanceLayer<A> {

	pub fn new( activator: A ) -> Self {
		Self { activator, instances: HashMap::new(), ids: InstanceIdGenerator::default() }
	}

	#[inline] pub fn activator( &self ) -> &A { &self.activator }

	/// Constructs an instance of `part` with `bindings` applied.
	///
	/// Every required prerequisite import must be bound. Property imports may be
	/// left unbound and bound later through [`update_if_required`]( Self::update_if_required ).
	/// A failed construction leaves no instance behind.
	///
	/// # Errors
	/// - [`InstanceError::ConstructionFailed`] if a required prerequisite is missing
	/// 	or a binding is invalid.
	/// - [`InstanceError::UnknownInstance`] if a binding's source is not live.
	/// - [`InstanceError::ActivationFailed`] if the activator fails.
	pub fn construct( &mut self, part: Arc<PartDefinition>, bindings: Vec<InstanceBinding> ) -> Result<PartInstanceId, InstanceError> {

		let bindings = normalise( bindings );
		let resolved = self.resolve( &part, &bindings )?;
		if let Some( import ) = missing_prerequisite( &part, &bindings ) {
			return Err( construction_failed( &part, format!( "prerequisite import '{}' is not satisfied", import.contract_name() )));
		}

		let object = self.activator.construct( &part, &resolved ).map_err( activation_failed( &part ))?;
		let id = self.ids.next();
		info!( instance = %id, part = %part.identity(), bindings = bindings.len(), "Constructed part instance" );
		let bindings = self.record( bindings );
		self.instances.insert( id, InstanceRecord { part, object, bindings, generation: 0 });
		Ok( id )

	}

	/// Applies a new binding set to `instance` and reconciles every dependent.
	///
	/// Returns one record per touched instance, the updated instance first and
	/// each source before its dependents. Identical bindings produce no records.
	///
	/// # Errors
	/// Returns the first failure. Instances reconciled before it keep their new
	/// state; the failing instance keeps its previous one.
	pub fn update_if_required( &mut self, instance: PartInstanceId, bindings: Vec<InstanceBinding> ) -> Result<Vec<InstanceUpdate>, InstanceError> {

		if !self.instances.contains_key( &instance ) {
			return Err( InstanceError::UnknownInstance( instance ));
		}

		let affected = self.dependents_closure( instance );
		let mut changes = ChangeSet::new();
		match self.reconcile( instance, normalise( bindings ))? {
			Some( change ) => changes.record( instance, change ),
			None => return Ok( Vec::new() ),
		}
		self.cascade( affected, &mut changes )?;
		Ok( changes.into_updates() )

	}

	/// Releases `instance` and reconciles every dependent.
	///
	/// Dependents that lose a required prerequisite are released as well; others
	/// are updated or rebuilt without the lost binding.
	///
	/// # Errors
	/// [`InstanceError::UnknownInstance`] if the instance is not live, or the first
	/// failure while rebuilding a dependent.
	pub fn release( &mut self, instance: PartInstanceId ) -> Result<Vec<InstanceUpdate>, InstanceError> {

		let affected = self.dependents_closure( instance );
		let record = self.instances.remove( &instance ).ok_or( InstanceError::UnknownInstance( instance ))?;
		info!( %instance, part = %record.part.identity(), dependents = affected.len(), "Released part instance" );
		self.activator.release( &record.part, record.object );

		let mut changes = ChangeSet::new();
		changes.record( instance, InstanceChange::Removed );
		self.cascade( affected, &mut changes )?;
		Ok( changes.into_updates() )

	}

	#[inline] pub fn has_instance_for( &self, instance: PartInstanceId ) -> bool { self.instances.contains_key( &instance ) }

	pub fn part( &self, instance: PartInstanceId ) -> Option<&Arc<PartDefinition>> {
		self.instances.get( &instance ).map(| record | &record.part )
	}

	pub fn object( &self, instance: PartInstanceId ) -> Option<&PartObject> {
		self.instances.get( &instance ).map(| record | &record.object )
	}

	/// The bindings `instance` currently holds, ordered by import position.
	pub fn bindings( &self, instance: PartInstanceId ) -> Option<Vec<InstanceBinding>> {
		self.instances.get( &instance ).map(| record | record.bindings.iter().map(| recorded | recorded.binding.clone() ).collect() )
	}

	/// Live instances holding a binding sourced from `instance`, in id order.
	pub fn dependents( &self, instance: PartInstanceId ) -> Vec<PartInstanceId> {
		self.instances.iter()
			.filter(|( _, record )| record.bindings.iter().any(| recorded | recorded.binding.source() == instance ))
			.map(|( id, _ )| *id )
			.sorted()
			.collect()
	}

	/// Every live instance, in id order.
	pub fn instance_ids( &self ) -> Vec<PartInstanceId> {
		self.instances.keys().copied().sorted().collect()
	}

	#[inline] pub fn len( &self ) -> usize { self.instances.len() }
	#[inline] pub fn is_empty( &self ) -> bool { self.instances.is_empty() }

	/// Decides and applies what `instance` needs for `proposed` bindings.
	fn reconcile( &mut self, instance: PartInstanceId, proposed: Vec<InstanceBinding> ) -> Result<Option<InstanceChange>, InstanceError> {

		let ( part, current ) = match self.instances.get( &instance ) {
			Some( record ) => ( Arc::clone( &record.part ), record.bindings.clone() ),
			None => return Err( InstanceError::UnknownInstance( instance )),
		};

		if proposed.iter().any(| binding | binding.source() == instance ) {
			return Err( construction_failed( &part, "an instance cannot be bound to itself" ));
		}

		let recorded = self.record( proposed.clone() );
		if recorded == current {
			debug!( %instance, "Bindings unchanged" );
			return Ok( None );
		}

		let lost = lost_prerequisite( &part, &current, &proposed ).or_else(|| missing_prerequisite( &part, &proposed ));
		if let Some( import ) = lost {
			info!( %instance, import = import.contract_name(), "Releasing instance that lost a prerequisite" );
			if let Some( record ) = self.instances.remove( &instance ) {
				self.activator.release( &record.part, record.object );
			}
			return Ok( Some( InstanceChange::Removed ));
		}

		let resolved = self.resolve( &part, &proposed )?;
		let rebuild = prerequisite_bindings( &part, &recorded ) != prerequisite_bindings( &part, &current );

		if rebuild {
			let object = self.activator.construct( &part, &resolved ).map_err( activation_failed( &part ))?;
			let Some( record ) = self.instances.get_mut( &instance ) else {
				return Err( InstanceError::UnknownInstance( instance ));
			};
			let previous = std::mem::replace( &mut record.object, object );
			record.bindings = recorded ;
			record.generation += 1 ;
			self.activator.release( &part, previous );
			info!( %instance, part = %part.identity(), "Reconstructed part instance" );
			Ok( Some( InstanceChange::Reconstructed ))
		} else {
			let Some( record ) = self.instances.get_mut( &instance ) else {
				return Err( InstanceError::UnknownInstance( instance ));
			};
			self.activator.update( &part, &record.object, &resolved ).map_err( activation_failed( &part ))?;
			record.bindings = recorded ;
			debug!( %instance, part = %part.identity(), "Updated part instance in place" );
			Ok( Some( InstanceChange::Updated ))
		}

	}

	/// Re-evaluates `affected` instances against their surviving bindings.
	fn cascade( &mut self, affected: Vec<PartInstanceId>, changes: &mut ChangeSet ) -> Result<(), InstanceError> {
		for dependent in affected {
			let Some( record ) = self.instances.get( &dependent ) else { continue };
			let proposed = record.bindings.iter()
				.map(| recorded | recorded.binding.clone() )
				.filter(| binding | self.instances.contains_key( &binding.source() ))
				.collect::<Vec<_>>();
			if let Some( change ) = self.reconcile( dependent, proposed )? {
				debug!( instance = %dependent, %change, "Cascaded change to dependent" );
				changes.record( dependent, change );
			}
		}
		Ok(())
	}

	/// Every instance transitively depending on `root`, sources before dependents.
	///
	/// Instances caught in a binding cycle keep their discovery order.
	fn dependents_closure( &self, root: PartInstanceId ) -> Vec<PartInstanceId> {

		let mut discovered = Vec::new();
		let mut seen = HashSet::from([ root ]);
		let mut pending = VecDeque::from([ root ]);
		while let Some( instance ) = pending.pop_front() {
			for dependent in self.dependents( instance ) {
				if seen.insert( dependent ) {
					discovered.push( dependent );
					pending.push_back( dependent );
				}
			}
		}

		let members = discovered.iter().copied().collect::<HashSet<_>>();
		let sources_in_closure = | instance: PartInstanceId | -> HashSet<PartInstanceId> {
			self.instances.get( &instance )
				.map(| record | record.bindings.iter()
					.map(| recorded | recorded.binding.source() )
					.filter(| source | members.contains( source ))
					.collect())
				.unwrap_or_default()
		};

		let mut ordered = Vec::with_capacity( discovered.len() );
		let mut placed = HashSet::with_capacity( discovered.len() );
		while ordered.len() < discovered.len() {
			let next = discovered.iter()
				.filter(| instance | !placed.contains( *instance ))
				.find(| instance | sources_in_closure( **instance ).is_subset( &placed ))
				.or_else(|| discovered.iter().find(| instance | !placed.contains( *instance )))
				.copied();
			let Some( next ) = next else { break };
			placed.insert( next );
			ordered.push( next );
		}
		ordered

	}

	/// Stamps each binding with its source's current generation.
	fn record( &self, bindings: Vec<InstanceBinding> ) -> Vec<RecordedBinding> {
		bindings.into_iter()
			.map(| binding | RecordedBinding {
				generation: self.instances.get( &binding.source() ).map_or( 0, | source | source.generation ),
				binding,
			})
			.collect()
	}

	/// Resolves bindings into what the activator receives, validating each one.
	fn resolve( &self, part: &PartDefinition, bindings: &[InstanceBinding] ) -> Result<Vec<ResolvedImport>, InstanceError> {

		let mut resolved = part.imports().iter()
			.map(| import | ResolvedImport { import: import.clone(), exports: Vec::new() })
			.collect::<Vec<_>>();

		for binding in bindings {

			let entry = resolved.get_mut( binding.import().position() as usize )
				.filter(| entry | entry.import.contract_name() == binding.import().contract_name() )
				.ok_or_else(|| construction_failed( part, format!( "part has no import '{}'", binding.import() )))?;

			let source = self.instances.get( &binding.source() )
				.ok_or( InstanceError::UnknownInstance( binding.source() ))?;

			let export = source.part.exports().get( binding.export().position() as usize )
				.filter(| export | export.contract_name() == binding.export().contract_name() )
				.ok_or_else(|| construction_failed( part, format!(
					"instance {} has no export '{}'", binding.source(), binding.export(),
				)))?;

			validate_binding_signature( &entry.import, export ).map_err(| mismatch | construction_failed( part, mismatch.to_string() ))?;

			entry.exports.push( BoundExport {
				instance: binding.source(),
				export: export.clone(),
				object: Arc::clone( &source.object ),
			});

		}

		Ok( resolved )

	}

}

impl<A: PartActivator> std::fmt::Debug for InstanceLayer<A> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "InstanceLayer" )
			.field( "instances", &self.instance_ids() )
			.finish_non_exhaustive()
	}
}

/// The first required prerequisite import of `part` that `bindings` leave unbound.
fn missing_prerequisite<'a>( part: &'a PartDefinition, bindings: &[InstanceBinding] ) -> Option<&'a ImportDefinition> {
	part.imports().iter().enumerate()
		.filter(|( _, import )| import.is_required_prerequisite() )
		.find(|( position, _ )| !bindings.iter().any(| binding | binding.import().position() as usize == *position ))
		.map(|( _, import )| import )
}

/// The first prerequisite import of `part` bound in `current` that `proposed` leaves unbound.
///
/// Optional prerequisites count too.
fn lost_prerequisite<'a>( part: &'a PartDefinition, current: &[RecordedBinding], proposed: &[InstanceBinding] ) -> Option<&'a ImportDefinition> {
	part.imports().iter().enumerate()
		.filter(|( _, import )| import.is_prerequisite() )
		.find(|( position, _ )| current.iter().any(| recorded | recorded.binding.import().position() as usize == *position )
			&& !proposed.iter().any(| binding | binding.import().position() as usize == *position ))
		.map(|( _, import )| import )
}

fn prerequisite_bindings<'a>( part: &PartDefinition, bindings: &'a [RecordedBinding] ) -> Vec<&'a RecordedBinding> {
	bindings.iter()
		.filter(| recorded | part.imports().get( recorded.binding.import().position() as usize )
			.is_some_and( ImportDefinition::is_prerequisite ))
		.collect()
}
