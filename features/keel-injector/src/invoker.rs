use futures::future::BoxFuture;

use crate::{
    component::{ConstructorPoint, ExecutionPoint, InjectionPoint},
    resolver::Args,
    types::{DynError, Instance, TypeInfo},
};

/// Performs constructor calls, field writes and executions on behalf of the injector
///
/// Every method defaults to calling straight through. Implementations can deny
/// an operation by returning an error, which aborts the build with
/// [crate::InjectorError::InvocationFailed], or wrap the call.
pub trait Invoker: Send + Sync {
    fn construct(
        &self,
        component: TypeInfo,
        constructor: &ConstructorPoint,
        args: Args,
    ) -> BoxFuture<'static, Result<Instance, DynError>> {
        let _ = component;
        constructor.call(args)
    }

    fn inject(
        &self,
        owner: &Instance,
        point: &InjectionPoint,
        value: &Instance,
    ) -> Result<(), DynError> {
        point.write(owner, value).map_err(Into::into)
    }

    fn execute(
        &self,
        owner: &Instance,
        execution: &ExecutionPoint,
        args: Args,
    ) -> BoxFuture<'static, Result<(), DynError>> {
        execution.call(owner, args)
    }
}

/// Calls everything directly
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectInvoker;
impl Invoker for DirectInvoker {}
