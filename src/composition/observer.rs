use crate::InstanceUpdate ;



/// Receives the aggregated change list of every mutation that touched instances.
///
/// Observers are called after the mutation is fully applied and the composition
/// lock is released, so they may query the composition layer.
pub trait CompositionObserver: Send + Sync {
	fn on_changes( &self, updates: &[InstanceUpdate] );
}

impl<F: Fn( &[InstanceUpdate] ) + Send + Sync> CompositionObserver for F {
	fn on_changes( &self, updates: &[InstanceUpdate] ) { self( updates ) }
}
