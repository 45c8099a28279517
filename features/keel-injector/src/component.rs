use std::{future::Future, marker::PhantomData, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    errors::{InjectError, RequireError},
    resolver::{inject::Inject, Args},
    state::State,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// A singleton managed by the [crate::Injector]
///
/// Components describe how they are built and wired in code instead of through
/// runtime introspection. Any component named by a [Requirement::component] is
/// registered automatically when first referenced.
///
/// ```rust
/// use keel_injector::{Component, Definition, Inject, Requirement, State};
///
/// #[derive(Default)]
/// struct Repository;
/// impl Component for Repository {
///     fn definition() -> Definition<Self> {
///         Definition::with_default()
///     }
/// }
///
/// #[derive(Default)]
/// struct Service {
///     repository: Inject<Repository>,
/// }
/// impl Component for Service {
///     fn definition() -> Definition<Self> {
///         Definition::<Self>::with_default().inject(
///             Requirement::component().at(State::Resolved),
///             |service: &Service| &service.repository,
///         )
///     }
/// }
/// ```
pub trait Component: Injectable + Sized {
    fn definition() -> Definition<Self>;
}

/// Phase hooks, one per transition
///
/// Enabled with [Definition::lifecycle]. A hook runs after the fields gated on its
/// phase have been injected and before the executions of that phase.
pub trait Lifecycle: Injectable {
    fn initialize(&self) -> Result<(), DynError> {
        Ok(())
    }
    fn resolve(&self) -> Result<(), DynError> {
        Ok(())
    }
    fn start(&self) -> Result<(), DynError> {
        Ok(())
    }
    fn stop(&self) -> Result<(), DynError> {
        Ok(())
    }
}

/// Calls the hook belonging to `state`, `Created` has none
pub(crate) fn dispatch_hook(hooks: &dyn Lifecycle, state: State) -> Result<(), DynError> {
    match state {
        State::Created => Ok(()),
        State::Initialized => hooks.initialize(),
        State::Resolved => hooks.resolve(),
        State::Started => hooks.start(),
        State::Stopped => hooks.stop(),
    }
}

/// Typed requirement on another injectable
pub struct Requirement<T> {
    info: DependencyInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> Requirement<T> {
    /// Requires a component, registering it if nobody else did
    pub fn component() -> Self {
        Self::with_discovery(Some(discover::<T>))
    }
}

impl<T: Injectable> Requirement<T> {
    /// Requires a type which has to be supplied to the builder, e.g. through
    /// [crate::InjectorBuilder::with_instance]
    pub fn instance() -> Self {
        Self::with_discovery(None)
    }

    fn with_discovery(discover: Option<fn() -> Recipe>) -> Self {
        Requirement {
            info: DependencyInfo {
                type_info: TypeInfo::of::<T>(),
                state: State::Created,
                optional: false,
                discover,
            },
            _marker: PhantomData,
        }
    }

    /// The state the required type has to reach first, defaults to `Created`
    pub fn at(mut self, state: State) -> Self {
        self.info.state = state;
        self
    }

    /// Do not fail if the type is unknown to the injector
    pub fn optional(mut self) -> Self {
        self.info.optional = true;
        self
    }

    pub fn info(&self) -> DependencyInfo {
        self.info
    }
}

fn discover<T: Component>() -> Recipe {
    T::definition().into_recipe()
}

type ConstructFn = dyn Fn(Args) -> BoxFuture<'static, Result<Instance, DynError>> + Send + Sync;
type WriteFn = dyn Fn(&Instance, &Instance) -> Result<(), InjectError> + Send + Sync;
type ExecuteFn = dyn Fn(&Instance, Args) -> BoxFuture<'static, Result<(), DynError>> + Send + Sync;
type HooksFn = dyn Fn(&Instance) -> Option<Arc<dyn Lifecycle>> + Send + Sync;

/// Asynchronous constructor with declared arguments
pub struct Constructor<T> {
    dependencies: Vec<DependencyInfo>,
    call: Arc<ConstructFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Constructor<T> {
    pub fn new<F, Fut, E>(constructor: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<DynError>,
    {
        let call = move |args: Args| -> BoxFuture<'static, Result<Instance, DynError>> {
            constructor(args)
                .map(|result| result.map(Instance::new).map_err(Into::into))
                .boxed()
        };

        Constructor {
            dependencies: Vec::new(),
            call: Arc::new(call),
            _marker: PhantomData,
        }
    }

    /// Declares an argument, gating construction on it
    pub fn arg<B: Injectable>(mut self, requirement: Requirement<B>) -> Self {
        self.dependencies.push(requirement.info);
        self
    }
}

/// A phase callback of a component
pub struct Execution<T> {
    name: &'static str,
    state: State,
    dependencies: Vec<DependencyInfo>,
    call: Arc<ExecuteFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Execution<T> {
    /// Runs `callback` while the component enters `state`
    pub fn new<F, Fut, E>(name: &'static str, state: State, callback: F) -> Self
    where
        F: Fn(Arc<T>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<DynError>,
    {
        let call = move |owner: &Instance,
                         args: Args|
              -> BoxFuture<'static, Result<(), DynError>> {
            match owner.downcast::<T>() {
                Ok(this) => callback(this, args)
                    .map(|result| result.map_err(Into::into))
                    .boxed(),
                Err(actual_type) => {
                    let error: DynError = Box::new(InjectError::from(RequireError::DowncastFailed {
                        required_type: std::any::type_name::<T>(),
                        actual_type,
                    }));
                    futures::future::ready(Err(error)).boxed()
                }
            }
        };

        Execution {
            name,
            state,
            dependencies: Vec::new(),
            call: Arc::new(call),
            _marker: PhantomData,
        }
    }

    /// Declares an argument, the execution only runs once it is satisfied
    pub fn arg<B: Injectable>(mut self, requirement: Requirement<B>) -> Self {
        self.dependencies.push(requirement.info);
        self
    }
}

/// Everything the injector needs to know about a component
pub struct Definition<T> {
    constructor: Option<Constructor<T>>,
    injections: Vec<InjectionPoint>,
    executions: Vec<ExecutionPoint>,
    hooks: Option<Arc<HooksFn>>,
}

impl<T: Injectable> Default for Definition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Injectable + Default> Definition<T> {
    /// Definition using `T::default()` as zero argument constructor
    pub fn with_default() -> Self {
        Self::new().constructor(Constructor::new(|_| async {
            Ok::<_, std::convert::Infallible>(T::default())
        }))
    }
}

impl<T: Injectable> Definition<T> {
    /// Definition without a constructor
    ///
    /// Building fails with [crate::InjectorError::NoViableConstructor] unless a
    /// constructor is added or an instance is supplied to the builder.
    pub fn new() -> Self {
        Definition {
            constructor: None,
            injections: Vec::new(),
            executions: Vec::new(),
            hooks: None,
        }
    }

    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Declares a field injection point
    ///
    /// The field is filled while the component enters `max(requirement state, Initialized)`.
    pub fn inject<B: Injectable>(
        mut self,
        requirement: Requirement<B>,
        field: fn(&T) -> &Inject<B>,
    ) -> Self {
        let write = move |owner: &Instance, value: &Instance| -> Result<(), InjectError> {
            let owner = owner
                .downcast::<T>()
                .map_err(|actual_type| RequireError::DowncastFailed {
                    required_type: std::any::type_name::<T>(),
                    actual_type,
                })?;
            let value = value
                .downcast::<B>()
                .map_err(|actual_type| RequireError::DowncastFailed {
                    required_type: std::any::type_name::<B>(),
                    actual_type,
                })?;
            field(owner.as_ref()).set(value)
        };

        self.injections.push(InjectionPoint {
            dependency: requirement.info,
            write: Arc::new(write),
        });
        self
    }

    pub fn execute(mut self, execution: Execution<T>) -> Self {
        self.executions.push(ExecutionPoint {
            name: execution.name,
            state: execution.state,
            dependencies: execution.dependencies,
            call: execution.call,
        });
        self
    }

    /// Enables the [Lifecycle] hooks of `T`
    pub fn lifecycle(mut self) -> Self
    where
        T: Lifecycle,
    {
        let hooks = |instance: &Instance| -> Option<Arc<dyn Lifecycle>> {
            instance
                .downcast::<T>()
                .ok()
                .map(|this| this as Arc<dyn Lifecycle>)
        };
        self.hooks = Some(Arc::new(hooks));
        self
    }

    pub(crate) fn into_recipe(self) -> Recipe {
        let (constructor, constructor_dependencies) = match self.constructor {
            Some(constructor) => (Some(constructor.call), constructor.dependencies),
            None => (None, Vec::new()),
        };

        Recipe {
            info: TypeInfo::of::<T>(),
            instance: None,
            constructor,
            constructor_dependencies,
            injections: self.injections,
            executions: self.executions,
            hooks: self.hooks,
        }
    }
}

/// A type erased field injection
#[derive(Clone)]
pub struct InjectionPoint {
    pub dependency: DependencyInfo,
    write: Arc<WriteFn>,
}
impl InjectionPoint {
    /// Writes `value` into the field of `owner`
    pub fn write(&self, owner: &Instance, value: &Instance) -> Result<(), InjectError> {
        (self.write)(owner, value)
    }

    /// Phase in which the field is injected
    pub fn phase(&self) -> State {
        self.dependency.state.max(State::Initialized)
    }
}

/// A type erased execution
#[derive(Clone)]
pub struct ExecutionPoint {
    pub name: &'static str,
    pub state: State,
    pub dependencies: Vec<DependencyInfo>,
    call: Arc<ExecuteFn>,
}
impl ExecutionPoint {
    pub fn call(&self, owner: &Instance, args: Args) -> BoxFuture<'static, Result<(), DynError>> {
        (self.call)(owner, args)
    }
}

/// A type erased constructor
#[derive(Clone)]
pub struct ConstructorPoint {
    call: Arc<ConstructFn>,
}
impl ConstructorPoint {
    pub fn call(&self, args: Args) -> BoxFuture<'static, Result<Instance, DynError>> {
        (self.call)(args)
    }
}

/// Type erased [Definition], or a supplied instance
pub struct Recipe {
    pub(crate) info: TypeInfo,
    pub(crate) instance: Option<Instance>,
    pub(crate) constructor: Option<Arc<ConstructFn>>,
    pub(crate) constructor_dependencies: Vec<DependencyInfo>,
    pub(crate) injections: Vec<InjectionPoint>,
    pub(crate) executions: Vec<ExecutionPoint>,
    pub(crate) hooks: Option<Arc<HooksFn>>,
}

impl Recipe {
    pub(crate) fn of<T: Component>() -> Self {
        discover::<T>()
    }

    pub(crate) fn from_instance(instance: Instance) -> Self {
        Recipe {
            info: instance.info,
            instance: Some(instance),
            constructor: None,
            constructor_dependencies: Vec::new(),
            injections: Vec::new(),
            executions: Vec::new(),
            hooks: None,
        }
    }

    pub(crate) fn constructor(&self) -> Option<ConstructorPoint> {
        self.constructor.clone().map(|call| ConstructorPoint { call })
    }

    pub(crate) fn hooks(&self, instance: &Instance) -> Option<Arc<dyn Lifecycle>> {
        self.hooks.as_ref().and_then(|hooks| hooks(instance))
    }

    /// Every declared dependency together with the phase it gates
    pub(crate) fn gated_dependencies(&self) -> impl Iterator<Item = (State, &DependencyInfo)> {
        let constructor = self
            .constructor_dependencies
            .iter()
            .map(|dependency| (State::Created, dependency));
        let injections = self
            .injections
            .iter()
            .map(|point| (point.phase(), &point.dependency));
        let executions = self.executions.iter().flat_map(|execution| {
            execution
                .dependencies
                .iter()
                .map(move |dependency| (execution.state, dependency))
        });

        constructor.chain(injections).chain(executions)
    }
}
