//! Keel Config provides a registry of configs that can be injected into components.
//!
//! Keel Config is split into two major parts:
//! 1. [ConfigProvider]: the registry of all configs, handed to the injector as an instance
//! 2. [Config]: a wrapper type to resolve configs from the arguments of a callable
//!
//! # Examples
//!
//! ```rust
//! use keel_config::ConfigProvider;
//!
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut config_provider = ConfigProvider::new();
//! config_provider
//!     .add_config(AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .expect("first registration");
//!
//! let retrieved = config_provider
//!     .get_config::<AppConfig>()
//!     .expect("same type")
//!     .expect("registered");
//!
//! assert_eq!(retrieved.host, "localhost");
//! assert_eq!(retrieved.port, 8080);
//! ```

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::ConfigProvider;
