//! Live part instances and their reconciliation.
//!
//! The [`InstanceLayer`] is an arena of constructed parts keyed by
//! [`PartInstanceId`]. Each instance records the bindings it was built with: which
//! import is fed by which export of which source instance. Instances never hold
//! references to each other, only ids, so a released instance simply stops
//! being reachable.
//!
//! Whenever an instance's bindings change, the layer decides between doing
//! nothing, pushing new values onto the existing object, or rebuilding the object
//! from scratch, and propagates that decision to every dependent instance. The
//! outcome of one call is a single ordered list of [`InstanceUpdate`]s.
//!
//! Object creation is delegated to a [`PartActivator`]; [`DefaultActivator`] is a
//! host-independent implementation that records its bindings in a
//! [`ComposedObject`].
//!
//! [`PartInstanceId`]: crate::PartInstanceId

mod activator ;
mod binding ;
mod update ;
mod layer ;

pub use activator::{ PartActivator, PartObject, ActivationError, BoundExport, ResolvedImport, DefaultActivator, ComposedObject };
pub use binding::InstanceBinding ;
pub use update::{ InstanceChange, InstanceUpdate, ChangeSet };
pub use layer::{ InstanceLayer, InstanceError };
