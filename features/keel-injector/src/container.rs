use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    builder::InjectorBuilder,
    dependency_graph::DependencyGraph,
    errors::{RequireError, StopErrors},
    initiator::Initiator,
    state::State,
    types::{Injectable, TypeInfo},
};

/// Registry of started components, one instance per type
///
/// Produced by [InjectorBuilder::build]. Lookups never construct anything, the
/// registry is read-only until [Injector::stop].
pub struct Injector {
    initiator: Initiator,
}
impl Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Injector");
        for (_, node) in self.graph().nodes() {
            let state = match node.state() {
                Some(state) => state.name(),
                None => "PENDING",
            };
            map.field(node.info().type_name, &state);
        }
        map.finish()
    }
}

impl Injector {
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    pub(crate) fn new(initiator: Initiator) -> Self {
        let injector = Self { initiator };
        tracing::info!("Injector ready with {} components", injector.len());
        injector
    }

    /// Returns the instance of `T`, or None if the type is unknown
    pub fn get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.require().ok()
    }

    /// Attempts to get the requested type
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        let instance = self
            .initiator
            .instance_of(TypeInfo::of::<T>())
            .ok_or(RequireError::TypeMissing(type_name::<T>()))?;

        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    pub fn contains<T: Injectable>(&self) -> bool {
        self.graph().contains(TypeInfo::of::<T>().type_id)
    }

    /// Current state of `T`, None if the type is unknown
    pub fn state_of<T: Injectable>(&self) -> Option<State> {
        let id = self.graph().index_of(TypeInfo::of::<T>().type_id)?;
        self.graph().node(id).state()
    }

    pub fn graph(&self) -> &DependencyGraph {
        self.initiator.graph()
    }

    pub fn len(&self) -> usize {
        self.graph().len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph().is_empty()
    }

    /// Stops every component
    ///
    /// Runs the `Stopped` hooks and executions once per component. Instances stay
    /// available for lookups afterwards. Calling it again does nothing.
    pub async fn stop(&mut self) -> Result<(), StopErrors> {
        let result = self.initiator.stop().await;
        if result.is_ok() {
            tracing::info!("Injector stopped");
        }
        result
    }
}
