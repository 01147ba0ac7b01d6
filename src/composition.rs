//! Live groups and the connections between them.
//!
//! The [`CompositionLayer`] is the only synchronisation boundary of the runtime.
//! Queries take its read lock, mutations its write lock, and every lock is
//! released before a call returns. Within one mutation, all cascading instance
//! changes are applied before the lock is released, so nobody observes a
//! half-reconciled graph.
//!
//! A group instance goes through `Added → Connected(0..n) → Removed`. Its
//! [`GroupDefinition`]( crate::GroupDefinition ) is shared by reference and
//! never changes; only the set of connections does. Which imports are satisfied
//! is always derived from the current connections, never stored.

mod state ;
mod observer ;
mod snapshot ;
mod layer ;

pub use state::PartState ;
pub use observer::CompositionObserver ;
pub use snapshot::{ CompositionSnapshot, GroupSnapshot, PartSnapshot, ConnectionSnapshot };
pub use layer::{ CompositionLayer, CompositionError };
