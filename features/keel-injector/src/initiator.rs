use std::{cmp::Reverse, sync::Arc};

use crate::{
    component::{dispatch_hook, Recipe},
    container::Injector,
    dependency_graph::{DependencyGraph, NodeId},
    errors::{InjectorError, Operation, StopErrors},
    invoker::Invoker,
    resolver::Args,
    state::State,
    types::{DependencyInfo, Instance, TypeInfo},
};

/// Drives every node of a graph through its states
///
/// Holds the materialized instances. Owned by the [Injector] once the build completed.
pub(crate) struct Initiator {
    graph: DependencyGraph,
    /// Indexed by [NodeId]
    recipes: Vec<Recipe>,
    /// Indexed by [NodeId], None until constructed
    instances: Vec<Option<Instance>>,
    invoker: Arc<dyn Invoker>,
}

impl Initiator {
    pub(crate) fn new(graph: DependencyGraph, recipes: Vec<Recipe>, invoker: Arc<dyn Invoker>) -> Self {
        let instances = vec![None; recipes.len()];
        Initiator {
            graph,
            recipes,
            instances,
            invoker,
        }
    }

    /// Runs the whole state machine up to `Started`
    ///
    /// All or nothing: the first failure aborts the build.
    pub(crate) async fn initiate(mut self) -> Result<Injector, InjectorError> {
        tracing::debug!("Initiating {} components", self.graph.len());

        while let Some((level, batch)) = self.next_batch(State::Started) {
            tracing::debug!("Advancing {} components to {level}", batch.len());
            for id in batch {
                self.transition(id, level).await?;
            }
        }

        if let Some((_, stalled)) = self.graph.nodes().find(|(_, node)| !node.is(State::Started)) {
            tracing::error!("Scheduling stalled at '{}'", stalled.info());
            return Err(self.graph.trace_cycle(State::Started));
        }

        tracing::debug!("All components started");
        Ok(Injector::new(self))
    }

    /// Moves every node to `Stopped`
    ///
    /// Dependents stop before the components they depend on.
    /// Failures are collected, the failing node still counts as stopped.
    pub(crate) async fn stop(&mut self) -> Result<(), StopErrors> {
        let mut errors = Vec::new();

        while let Some((level, batch)) = self.next_batch(State::Stopped) {
            for id in self.stop_order(batch) {
                if let Err(error) = self.transition(id, level).await {
                    tracing::error!("{error}");
                    errors.push(error);
                    self.graph.set_state(id, level);
                }
            }
        }

        if self.graph.nodes().any(|(_, node)| !node.is(State::Stopped)) {
            let error = self.graph.trace_cycle(State::Stopped);
            tracing::error!("{error}");
            errors.push(error);
        }

        if !errors.is_empty() {
            return Err(StopErrors { errors });
        }
        Ok(())
    }

    /// Finds the lowest state at which any node can take its next step
    ///
    /// Returns that state with every node ready to enter it.
    fn next_batch(&self, target: State) -> Option<(State, Vec<NodeId>)> {
        for level in State::ALL.into_iter().filter(|level| *level <= target) {
            let ready: Vec<NodeId> = self
                .graph
                .nodes()
                .filter(|(id, node)| {
                    node.next_state() == Some(level) && self.graph.can_enter(*id, level)
                })
                .map(|(id, _)| id)
                .collect();

            if !ready.is_empty() {
                return Some((level, ready));
            }
        }
        None
    }

    /// Enters `state` on one node: construct, inject, hook, execute
    async fn transition(&mut self, id: NodeId, state: State) -> Result<(), InjectorError> {
        let info = self.graph.node(id).info();

        if state == State::Created {
            let instance = self.construct(id).await?;
            self.instances[id.0] = Some(instance);
        }

        let Some(owner) = self.instances[id.0].clone() else {
            return Err(InjectorError::NoViableConstructor {
                component: info,
                required_by: None,
            });
        };
        let recipe = &self.recipes[id.0];

        for point in recipe.injections.iter().filter(|point| point.phase() == state) {
            let field = point.dependency.type_info;
            // Absent only for optional requirements on unknown types
            let Some(value) = self.instance_of(field) else {
                continue;
            };

            self.invoker
                .inject(&owner, point, &value)
                .map_err(|cause| InjectorError::invocation(info, Operation::Inject { field }, cause))?;
            tracing::debug!("Injected '{field}' into '{info}'");
        }

        if let Some(hooks) = recipe.hooks(&owner) {
            dispatch_hook(hooks.as_ref(), state)
                .map_err(|cause| InjectorError::invocation(info, Operation::Hook(state), cause))?;
        }

        for execution in recipe.executions.iter().filter(|execution| execution.state == state) {
            let args = self.args_for(&execution.dependencies);
            tracing::debug!("Executing '{}' on '{info}'", execution.name);

            self.invoker
                .execute(&owner, execution, args)
                .await
                .map_err(|cause| {
                    let operation = Operation::Execute {
                        name: execution.name,
                        state,
                    };
                    InjectorError::invocation(info, operation, cause)
                })?;
        }

        self.graph.set_state(id, state);
        tracing::debug!("'{info}' is {state}");
        Ok(())
    }

    async fn construct(&self, id: NodeId) -> Result<Instance, InjectorError> {
        let recipe = &self.recipes[id.0];

        if let Some(instance) = &recipe.instance {
            return Ok(instance.clone());
        }

        let Some(constructor) = recipe.constructor() else {
            return Err(InjectorError::NoViableConstructor {
                component: recipe.info,
                required_by: None,
            });
        };

        let args = self.args_for(&recipe.constructor_dependencies);
        let instance = self
            .invoker
            .construct(recipe.info, &constructor, args)
            .await
            .map_err(|cause| InjectorError::invocation(recipe.info, Operation::Construct, cause))?;

        tracing::debug!("Constructed instance of '{}'", recipe.info);
        Ok(instance)
    }

    /// Collects the instances a callable declared
    fn args_for(&self, dependencies: &[DependencyInfo]) -> Args {
        let mut args = Args::new();
        for dependency in dependencies {
            if let Some(instance) = self.instance_of(dependency.type_info) {
                args.insert(instance);
            }
        }
        args
    }

    /// Orders a stop batch so that every node comes after the nodes depending on it
    ///
    /// Ties and mutual dependencies fall back to reverse [NodeId] order.
    fn stop_order(&self, mut pending: Vec<NodeId>) -> Vec<NodeId> {
        pending.sort_by_key(|id| Reverse(*id));

        let mut ordered = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|id| {
                    !pending
                        .iter()
                        .any(|other| other != id && self.graph.depends_on(*other, *id))
                })
                .unwrap_or(0);
            ordered.push(pending.remove(next));
        }
        ordered
    }

    pub(crate) fn instance_of(&self, info: TypeInfo) -> Option<Instance> {
        let id = self.graph.index_of(info.type_id)?;
        self.instances[id.0].clone()
    }

    pub(crate) fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}
