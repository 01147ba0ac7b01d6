use std::any::Any ;
use std::collections::BTreeMap ;
use std::sync::Arc ;
use parking_lot::Mutex ;

use crate::{ ExportDefinition, ImportDefinition, PartDefinition, PartInstanceId, TypeIdentity };



/// A constructed part object, opaque to the composition core.
pub type PartObject = Arc<dyn Any + Send + Sync> ;

/// Error type activators report failures with.
pub type ActivationError = Box<dyn std::error::Error + Send + Sync> ;

/// One export of a live instance feeding an import.
#[derive( Clone )]
pub struct BoundExport {
	pub instance: PartInstanceId,
	pub export: ExportDefinition,
	pub object: PartObject,
}

impl std::fmt::Debug for BoundExport {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "BoundExport" )
			.field( "instance", &self.instance )
			.field( "export", &self.export )
			.finish_non_exhaustive()
	}
}

/// An import of the part being activated together with everything bound to it.
///
/// Activators receive one entry per import of the part, in declaration order;
/// an unbound import has no exports.
#[derive( Debug, Clone )]
pub struct ResolvedImport {
	pub import: ImportDefinition,
	pub exports: Vec<BoundExport>,
}

/// Creates, updates and disposes of part objects.
///
/// The instance layer decides *when* an object is built, updated or dropped; the
/// activator decides *how*. Activators are called while the composition layer
/// holds its write lock and must not call back into it.
pub trait PartActivator: Send + Sync {

	/// Builds a new object for `part`.
	///
	/// # Errors
	/// Any error aborts the construction or reconstruction that requested it.
	fn construct( &self, part: &PartDefinition, imports: &[ResolvedImport] ) -> Result<PartObject, ActivationError> ;

	/// Pushes changed non-prerequisite imports onto an existing object.
	///
	/// # Errors
	/// Any error aborts the update; the instance keeps its previous bindings.
	fn update( &self, part: &PartDefinition, object: &PartObject, imports: &[ResolvedImport] ) -> Result<(), ActivationError> ;

	/// Disposes of an object that is no longer part of the composition.
	fn release( &self, _part: &PartDefinition, _object: PartObject ) {}

}

/// The object [`DefaultActivator`] constructs.
///
/// It records, per import contract, which instances currently feed it and how
/// many in-place updates it received.
#[derive( Debug )]
pub struct ComposedObject {
	part: TypeIdentity,
	state: Mutex<ComposedState>,
}

#[derive( Debug, Default )]
struct ComposedState {
	sources: BTreeMap<String, Vec<PartInstanceId>>,
	updates: usize,
}

impl ComposedObject {

	fn new( part: TypeIdentity, imports: &[ResolvedImport] ) -> Self {
		Self { part, state: Mutex::new( ComposedState { sources: sources_of( imports ), updates: 0 })}
	}

	#[inline] pub fn part( &self ) -> &TypeIdentity { &self.part }

	/// Instances currently bound to imports with `contract_name`, in binding order.
	pub fn sources( &self, contract_name: &str ) -> Vec<PartInstanceId> {
		self.state.lock().sources.get( contract_name ).cloned().unwrap_or_default()
	}

	/// Number of in-place updates applied since construction.
	pub fn update_count( &self ) -> usize { self.state.lock().updates }

}

fn sources_of( imports: &[ResolvedImport] ) -> BTreeMap<String, Vec<PartInstanceId>> {
	imports.iter().fold( BTreeMap::new(), | mut sources, resolved | {
		sources.entry( resolved.import.contract_name().to_string() )
			.or_insert_with( Vec::new )
			.extend( resolved.exports.iter().map(| export | export.instance ));
		sources
	})
}

/// An activator that builds [`ComposedObject`]s.
#[derive( Debug, Clone, Copy, Default )]
pub struct DefaultActivator ;

impl PartActivator for DefaultActivator {

	fn construct( &self, part: &PartDefinition, imports: &[ResolvedImport] ) -> Result<PartObject, ActivationError> {
		Ok( Arc::new( ComposedObject::new( part.identity().clone(), imports )))
	}

	fn update( &self, part: &PartDefinition, object: &PartObject, imports: &[ResolvedImport] ) -> Result<(), ActivationError> {
		let composed = object.downcast_ref::<ComposedObject>()
			.ok_or_else(|| format!( "object of '{}' was not built by the default activator", part.identity() ))?;
		let mut state = composed.state.lock();
		state.sources = sources_of( imports );
		state.updates += 1 ;
		Ok(())
	}

}
