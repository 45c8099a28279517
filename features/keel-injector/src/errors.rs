use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    state::State,
    types::{DynError, TypeInfo},
};

/// Errors while building the injector
///
/// Every variant is fatal: the build is aborted and no injector is produced.
#[derive(Error, Debug, Clone)]
pub enum InjectorError {
    /// The component can neither be constructed nor was an instance supplied
    #[error("No viable constructor for '{component}'{}", required_by_suffix(.required_by))]
    NoViableConstructor {
        component: TypeInfo,
        required_by: Option<TypeInfo>,
    },

    /// Scheduling stalled, the chain lists the types waiting on each other
    #[error("Cyclic dependency detected: {}", ChainDisplay(.chain))]
    CyclicDependency { chain: Vec<TypeInfo> },

    /// A constructor, injection, hook or execution failed or was denied
    #[error("Failed to {operation} on '{component}' - error: {cause}")]
    InvocationFailed {
        component: TypeInfo,
        operation: Operation,
        cause: Arc<DynError>,
    },

    /// A dependency requires its target to be `Stopped` before the owner is
    #[error("'{component}' requires '{dependency}' to be STOPPED before it can be {phase}")]
    UnreachableRequirement {
        component: TypeInfo,
        dependency: TypeInfo,
        phase: State,
    },

    #[error("A Type has been registered twice: '{0}'")]
    Duplicate(TypeInfo),
}

impl InjectorError {
    pub(crate) fn invocation(component: TypeInfo, operation: Operation, cause: DynError) -> Self {
        Self::InvocationFailed {
            component,
            operation,
            cause: Arc::new(cause),
        }
    }
}

fn required_by_suffix(required_by: &Option<TypeInfo>) -> String {
    match required_by {
        Some(owner) => format!(" (required by '{owner}')"),
        None => String::new(),
    }
}

struct ChainDisplay<'a>(&'a [TypeInfo]);
impl fmt::Display for ChainDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, info) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(info.type_name)?;
        }
        f.write_str("]")
    }
}

/// What the injector was doing when an invocation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Construct,
    Inject { field: TypeInfo },
    Hook(State),
    Execute { name: &'static str, state: State },
}
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Construct => f.write_str("construct"),
            Operation::Inject { field } => write!(f, "inject '{field}'"),
            Operation::Hook(state) => write!(f, "run {state} hook"),
            Operation::Execute { name, state } => write!(f, "execute '{name}' ({state})"),
        }
    }
}

/// Errors when trying to require a certain type
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required type is not known
    #[error("The required type '{0}' is not known.")]
    TypeMissing(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum InjectError {
    /// Could not require the type
    #[error(transparent)]
    RequireError(#[from] RequireError),
    /// A field slot was written twice
    #[error("'{0}' has already been injected")]
    AlreadyInjected(&'static str),
    /// Generic error during Injection
    #[error("Error during injection: {0}")]
    Other(DynError),
}

/// Failures collected while stopping the injector
#[derive(Error, Debug, Clone)]
pub struct StopErrors {
    pub errors: Vec<InjectorError>,
}
impl fmt::Display for StopErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = Vec::new();
        display.push("Stopping the injector had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}
