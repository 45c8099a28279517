use std::sync::Arc;

use crate::{
    bundle::Bundle,
    component::{Component, Recipe},
    container::Injector,
    dependency_graph::DependencyGraph,
    errors::InjectorError,
    initiator::Initiator,
    invoker::{DirectInvoker, Invoker},
    types::{Injectable, Instance},
};

/// Collects components, bundles and instances before a single build pass
///
/// The Injector consists of three parts.
/// 1. The builder where one registers all components and instances
/// 2. The build pass, which wires the dependency graph and runs every component up to `Started`
/// 3. The [Injector] holding the started components
pub struct InjectorBuilder {
    /// Registered component recipes
    components: Vec<Recipe>,
    /// Registered already created instances
    instances: Vec<Recipe>,
    invoker: Arc<dyn Invoker>,
}
impl Default for InjectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectorBuilder {
    pub fn new() -> Self {
        InjectorBuilder {
            components: Vec::new(),
            instances: Vec::new(),
            invoker: Arc::new(DirectInvoker),
        }
    }
}
impl InjectorBuilder {
    pub fn with_component<T: Component>(mut self) -> Self {
        self.components.push(Recipe::of::<T>());
        self
    }

    /// Adds every component of the bundle
    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        tracing::debug!(
            "Adding bundle '{}' with {} components",
            bundle.name(),
            bundle.len()
        );
        self.components.extend(bundle.recipes());
        self
    }

    /// Adds an already created instance, it skips construction
    pub fn with_instance<T: Injectable>(mut self, instance: T) -> Self {
        self.instances
            .push(Recipe::from_instance(Instance::new(instance)));
        self
    }

    /// Replaces the [DirectInvoker]
    pub fn with_invoker<I: Invoker + 'static>(mut self, invoker: I) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    /// Builds the graph and runs every component up to `Started`
    pub async fn build(self) -> Result<Injector, InjectorError> {
        let InjectorBuilder {
            components,
            mut instances,
            invoker,
        } = self;

        tracing::debug!(
            "Building injector with {} components and {} instances",
            components.len(),
            instances.len()
        );

        // Instances go first, so they win over discovered components of the same type
        instances.extend(components);

        let result = match DependencyGraph::build(instances) {
            Ok((graph, recipes)) => Initiator::new(graph, recipes, invoker).initiate().await,
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            tracing::error!("Injector build failed: {error}");
        }
        result
    }
}
