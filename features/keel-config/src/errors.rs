use keel_injector::TypeInfo;

/// Errors when registering or reading a config
#[derive(thiserror::Error, Debug, Clone)]
pub enum ConfigError {
    /// A config of this type is already registered
    #[error("The config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),

    #[error("Failed to downcast config, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}
