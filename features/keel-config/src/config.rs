use std::{any::type_name, fmt::Debug, ops::Deref, sync::Arc};

use keel_injector::{Args, InjectError, Injectable, RequireError, Requirement, Resolver};

use crate::provider::ConfigProvider;

/// A config pulled out of the [ConfigProvider]
///
/// Constructors and executions declare [Config::requirement] and resolve the
/// config from their arguments.
///
/// # Example
/// ```rust
/// use keel_config::Config;
/// use keel_injector::{Component, Constructor, Definition, InjectError};
///
/// struct ServerConfig {
///     port: u16,
/// }
///
/// struct Server {
///     port: u16,
/// }
/// impl Component for Server {
///     fn definition() -> Definition<Self> {
///         Definition::new().constructor(
///             Constructor::new(|args| async move {
///                 let config = args.resolve::<Config<ServerConfig>>()?;
///                 Ok::<_, InjectError>(Server { port: config.port })
///             })
///             .arg(Config::<ServerConfig>::requirement()),
///         )
///     }
/// }
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T: Debug> Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Injectable> Config<T> {
    /// The argument declaration needed to resolve a config
    ///
    /// Configs live in the provider, so this requires the provider instance.
    pub fn requirement() -> Requirement<ConfigProvider> {
        Requirement::instance()
    }
}

impl<T: Injectable> Resolver for Config<T> {
    fn resolve(args: &Args) -> Result<Self, InjectError>
    where
        Self: Sized,
    {
        let config_provider = args.get::<ConfigProvider>()?;

        let config = config_provider
            .get_config::<T>()
            .map_err(|e| InjectError::Other(Box::new(e)))?
            .ok_or(RequireError::TypeMissing(type_name::<T>()))?;

        Ok(Config { inner: config })
    }
}
