use std::{
    any::type_name,
    fmt::Debug,
    ops::Deref,
    sync::{Arc, OnceLock},
};

use crate::{
    errors::{InjectError, RequireError},
    types::Injectable,
};

/// Field slot written by the injector
///
/// Declared on a component with [crate::Definition::inject]. The injector fills the
/// slot exactly once, while the owning component enters the phase the requirement is
/// gated on. Optional requirements on unknown types leave the slot empty.
///
/// ### Panics
///
/// Dereferencing panics if the slot has not been filled yet. This only happens if
/// the field is read in a phase before its requirement, or if it is optional and
/// the type was never registered - use [Inject::get] in those cases.
pub struct Inject<T: Injectable>(OnceLock<Arc<T>>);

impl<T: Injectable> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T: Injectable + Debug> Debug for Inject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Inject").field(value).finish(),
            None => f.debug_tuple("Inject").field(&"<empty>").finish(),
        }
    }
}
impl<T: Injectable> Deref for Inject<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Self::Target {
        match self.get() {
            Some(value) => value,
            None => panic!("'{}' accessed before it was injected", type_name::<T>()),
        }
    }
}

impl<T: Injectable> Inject<T> {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the injected value, if any
    pub fn get(&self) -> Option<&Arc<T>> {
        self.0.get()
    }

    /// Like [Inject::get], but reports an empty slot as [RequireError::TypeMissing]
    pub fn try_get(&self) -> Result<&Arc<T>, RequireError> {
        self.0.get().ok_or(RequireError::TypeMissing(type_name::<T>()))
    }

    pub fn is_injected(&self) -> bool {
        self.0.get().is_some()
    }

    /// Fills the slot, fails if it was already filled
    pub fn set(&self, value: Arc<T>) -> Result<(), InjectError> {
        self.0
            .set(value)
            .map_err(|_| InjectError::AlreadyInjected(type_name::<T>()))
    }
}
