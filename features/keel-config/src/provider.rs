use std::{any::TypeId, collections::HashMap, fmt::Debug, sync::Arc};

use keel_injector::{Injectable, Instance, TypeInfo};

use crate::errors::ConfigError;

/// Registry of all configs, keyed by type
///
/// Handed to the injector as an instance, components read their configs through
/// [crate::Config] or by injecting the provider itself.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, Instance>,
}
impl Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.configs.values().map(|config| config.info.type_name))
            .finish()
    }
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the config of type `T`, or None if it was never added
    pub fn get_config<T: Injectable>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        let Some(config) = self.configs.get(&TypeId::of::<T>()) else {
            return Ok(None);
        };

        config
            .downcast::<T>()
            .map(Some)
            .map_err(|actual_type| ConfigError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    /// Adds a config to the registry
    ///
    /// Fails with [ConfigError::AlreadyRegistered] if a config of the same type exists.
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();
        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        self.configs.insert(info.type_id, Instance::new(config));
        Ok(self)
    }

    /// Same as [ConfigProvider::add_config] for `Some`, does nothing for `None`
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(config) => self.add_config(config),
            None => Ok(self),
        }
    }

    pub fn contains<T: Injectable>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
