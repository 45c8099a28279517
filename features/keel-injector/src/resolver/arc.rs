use std::sync::Arc;

use crate::{
    errors::{InjectError, RequireError},
    resolver::{Args, Resolver},
    types::Injectable,
};

impl<T: Injectable> Resolver for Arc<T> {
    fn resolve(args: &Args) -> Result<Self, InjectError> {
        args.get::<T>()
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(args: &Args) -> Result<Self, InjectError>
    where
        Self: Sized,
    {
        match Resolvable::resolve(args) {
            Ok(resolved) => Ok(Some(resolved)),
            // An optional requirement on an unknown type is left out of the arguments
            Err(InjectError::RequireError(RequireError::TypeMissing(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
