use std::{
    any::TypeId,
    collections::{HashMap, HashSet, VecDeque},
};

use crate::{
    component::Recipe,
    errors::InjectorError,
    state::State,
    types::TypeInfo,
};

/// Index of a node inside its [DependencyGraph]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Edge of the graph: the owning node cannot enter `phase` until `target` is at least `required`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub target: NodeId,
    pub required: State,
    pub phase: State,
}

/// One component type and its progress through the lifecycle
#[derive(Debug, Clone)]
pub struct DependencyNode {
    info: TypeInfo,
    /// None until the instance has been constructed
    state: Option<State>,
    dependencies: Vec<Dependency>,
}

impl DependencyNode {
    fn new(info: TypeInfo) -> Self {
        Self {
            info,
            state: None,
            dependencies: Vec::new(),
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn state(&self) -> Option<State> {
        self.state
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Returns true once the node has reached at least `state`
    pub fn is(&self, state: State) -> bool {
        self.state.is_some_and(|current| current.is(state))
    }

    /// The state the node would enter with its next transition
    pub fn next_state(&self) -> Option<State> {
        match self.state {
            None => Some(State::Created),
            Some(current) => current.next(),
        }
    }
}

/// Graph of all components of an injector
///
/// Nodes live in an arena, edges point at [NodeId]s of the same graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    index: HashMap<TypeId, NodeId>,
}

impl DependencyGraph {
    /// Builds the graph from the registered recipes
    ///
    /// Components referenced through discoverable requirements are pulled in as well.
    /// Returns the recipes ordered by [NodeId]. Nothing is instantiated here.
    pub(crate) fn build(roots: Vec<Recipe>) -> Result<(Self, Vec<Recipe>), InjectorError> {
        let mut graph = Self::default();
        let mut recipes: Vec<Recipe> = Vec::new();
        let mut pending: VecDeque<Recipe> = roots.into();

        while let Some(recipe) = pending.pop_front() {
            let (id, created) = graph.get_or_create(recipe.info);
            if !created {
                if recipe.instance.is_some() && recipes[id.0].instance.is_some() {
                    return Err(InjectorError::Duplicate(recipe.info));
                }
                // First registration wins, registering a type again is a no-op
                continue;
            }

            for (_, dependency) in recipe.gated_dependencies() {
                if let Some(discover) = dependency.discover {
                    if !graph.contains(dependency.type_info.type_id) {
                        pending.push_back(discover());
                    }
                }
            }

            recipes.push(recipe);
        }

        for (position, recipe) in recipes.iter().enumerate() {
            if recipe.constructor.is_none() && recipe.instance.is_none() {
                return Err(InjectorError::NoViableConstructor {
                    component: recipe.info,
                    required_by: None,
                });
            }

            for (phase, dependency) in recipe.gated_dependencies() {
                let target = match graph.index_of(dependency.type_info.type_id) {
                    Some(target) => target,
                    None if dependency.optional => {
                        tracing::debug!(
                            "Optional dependency '{}' of '{}' is not registered",
                            dependency.type_info,
                            recipe.info
                        );
                        continue;
                    }
                    None => {
                        return Err(InjectorError::NoViableConstructor {
                            component: dependency.type_info,
                            required_by: Some(recipe.info),
                        })
                    }
                };

                if dependency.state == State::Stopped && phase < State::Stopped {
                    return Err(InjectorError::UnreachableRequirement {
                        component: recipe.info,
                        dependency: dependency.type_info,
                        phase,
                    });
                }

                graph.nodes[position].dependencies.push(Dependency {
                    target,
                    required: dependency.state,
                    phase,
                });
            }
        }

        tracing::debug!("Dependency graph built with {} nodes", graph.len());
        Ok((graph, recipes))
    }

    /// Returns the node for `info`, creating it on first reference
    ///
    /// The flag is true if the node was created by this call.
    pub fn get_or_create(&mut self, info: TypeInfo) -> (NodeId, bool) {
        if let Some(id) = self.index.get(&info.type_id) {
            return (*id, false);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(DependencyNode::new(info));
        self.index.insert(info.type_id, id);
        (id, true)
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.index.contains_key(&type_id)
    }

    pub fn index_of(&self, type_id: TypeId) -> Option<NodeId> {
        self.index.get(&type_id).copied()
    }

    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DependencyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (NodeId(position), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: State) {
        let node = &mut self.nodes[id.0];
        debug_assert!(
            node.state == state.previous(),
            "states only advance one step at a time"
        );
        node.state = Some(state);
    }

    /// Dependencies keeping `id` from entering `state`
    pub fn unsatisfied(&self, id: NodeId, state: State) -> impl Iterator<Item = &Dependency> {
        self.node(id)
            .dependencies
            .iter()
            .filter(move |dependency| dependency.phase <= state)
            .filter(move |dependency| !self.node(dependency.target).is(dependency.required))
    }

    /// Returns true if `owner` declared any dependency on `target`
    pub fn depends_on(&self, owner: NodeId, target: NodeId) -> bool {
        self.node(owner)
            .dependencies
            .iter()
            .any(|dependency| dependency.target == target)
    }

    /// Returns true if `id` may enter `state`
    pub fn can_enter(&self, id: NodeId, state: State) -> bool {
        self.unsatisfied(id, state).next().is_none()
    }

    /// Explains a stalled schedule
    ///
    /// Walks from the first node below `target` through its unsatisfied dependencies
    /// until a type repeats, and reports the repeating part of the chain.
    pub(crate) fn trace_cycle(&self, target: State) -> InjectorError {
        let Some((start, _)) = self.nodes().find(|(_, node)| !node.is(target)) else {
            return InjectorError::CyclicDependency { chain: Vec::new() };
        };

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start);

        let ids = trace_recurse(self, target, start, &mut chain, &mut visited)
            .unwrap_or_else(|| vec![start]);

        return InjectorError::CyclicDependency {
            chain: ids.into_iter().map(|id| self.node(id).info).collect(),
        };

        fn trace_recurse(
            graph: &DependencyGraph,
            target: State,
            id: NodeId,
            chain: &mut Vec<NodeId>,
            visited: &mut HashSet<NodeId>,
        ) -> Option<Vec<NodeId>> {
            let next_state = graph.node(id).next_state().filter(|next| *next <= target)?;
            chain.push(id);
            for dependency in graph.unsatisfied(id, next_state) {
                if let Some(position) = chain.iter().position(|seen| *seen == dependency.target) {
                    return Some(chain[position..].to_vec());
                }

                if visited.insert(dependency.target) {
                    if let Some(cycle) = trace_recurse(graph, target, dependency.target, chain, visited)
                    {
                        return Some(cycle);
                    }
                }
            }

            chain.pop();
            None
        }
    }
}
