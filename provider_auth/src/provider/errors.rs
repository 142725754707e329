use thiserror::Error;

use crate::provider::HttpMethod;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    /// Malformed or incomplete provider configuration
    #[error("Configuration error for provider '{provider}': {message}")]
    Configuration { provider: String, message: String },

    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("Provider '{0}' not found")]
    NotFound(String),

    /// Two enabled providers claim the same route
    #[error("Route {method} {path} is claimed by both '{first}' and '{second}'")]
    RouteCollision {
        method: HttpMethod,
        path: String,
        first: String,
        second: String,
    },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },
}

impl ProviderError {
    pub(crate) fn configuration(provider: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
