use std::{
    any::{type_name, TypeId},
    collections::HashMap,
};

use crate::{
    errors::{InjectError, RequireError},
    types::{Injectable, Instance},
};

pub mod arc;
pub mod inject;

/// Allows custom behaviour when pulling a value out of [Args]
pub trait Resolver {
    fn resolve(args: &Args) -> Result<Self, InjectError>
    where
        Self: Sized;
}

/// Arguments handed to constructors and executions
///
/// Only holds the instances the callable declared, each at the state it asked for.
/// Optional requirements whose type is unknown are simply absent.
#[derive(Clone, Default)]
pub struct Args {
    instances: HashMap<TypeId, Instance>,
}

impl Args {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.info.type_id, instance);
    }

    /// Returns the declared instance of `T`
    pub fn get<T: Injectable>(&self) -> Result<std::sync::Arc<T>, InjectError> {
        let instance = self
            .instances
            .get(&TypeId::of::<T>())
            .ok_or(RequireError::TypeMissing(type_name::<T>()))?;

        let downcasted = instance
            .downcast::<T>()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })?;

        Ok(downcasted)
    }

    /// Resolves any [Resolver] from the arguments, e.g. `Option<Arc<T>>`
    pub fn resolve<R: Resolver>(&self) -> Result<R, InjectError> {
        R::resolve(self)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
