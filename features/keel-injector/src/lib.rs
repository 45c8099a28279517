//! Keel Injector wires singleton components and runs them through a phased lifecycle.
//!
//! Every component passes `Created -> Initialized -> Resolved -> Started`, and
//! `Stopped` on shutdown. Components declare in code what they need and in which
//! state they need it:
//!
//! 1. [Definition] - constructor, injected fields and phase executions of a component
//! 2. [Requirement] - a typed dependency, optionally gated on a [State] of the target
//! 3. [InjectorBuilder] - collects components, [Bundle]s and instances, then builds
//! 4. [Injector] - the started components, looked up by type
//!
//! The build pass advances all components state by state. A component enters a
//! state only once everything it declared for that state has reached the
//! required state. If no component can move, the build fails with the chain of
//! components waiting on each other.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use keel_injector::{Component, Definition, Execution, Inject, Injector, Requirement, State};
//!
//! #[derive(Default)]
//! struct Database;
//! impl Component for Database {
//!     fn definition() -> Definition<Self> {
//!         Definition::with_default()
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Repository {
//!     database: Inject<Database>,
//! }
//! impl Component for Repository {
//!     fn definition() -> Definition<Self> {
//!         Definition::<Self>::with_default()
//!             .inject(Requirement::component(), |repository| &repository.database)
//!             .execute(Execution::new("warm_up", State::Resolved, |_this: Arc<Repository>, _args| async {
//!                 Ok::<_, std::convert::Infallible>(())
//!             }))
//!     }
//! }
//!
//! let injector = futures::executor::block_on(
//!     Injector::builder().with_component::<Repository>().build(),
//! )
//! .unwrap();
//!
//! assert!(injector.get::<Database>().is_some());
//! assert_eq!(injector.state_of::<Repository>(), Some(State::Started));
//! ```

pub mod builder;
pub mod bundle;
pub mod component;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub(crate) mod initiator;
pub mod invoker;
pub mod resolver;
pub mod state;
pub mod types;

pub use builder::InjectorBuilder;
pub use bundle::Bundle;
pub use component::{Component, Constructor, Definition, Execution, Lifecycle, Requirement};
pub use container::Injector;
pub use dependency_graph::{Dependency, DependencyGraph, DependencyNode, NodeId};
pub use errors::{InjectError, InjectorError, Operation, RequireError, StopErrors};
pub use invoker::{DirectInvoker, Invoker};
pub use resolver::{inject::Inject, Args, Resolver};
pub use state::State;
pub use types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo};
