//! Error types for the provider_auth crate

use thiserror::Error;

use crate::flow::FlowError;
use crate::provider::ProviderError;
use crate::session::SessionError;
use crate::strategy::StrategyError;
use crate::utils::UtilError;

/// Errors surfaced by bootstrapping and by the request flows
#[derive(Error, Debug, Clone)]
pub enum CoordinationError {
    /// Missing collaborator or invalid global option
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from provider resolution or registration
    #[error("Provider error: {0}")]
    ProviderError(ProviderError),

    /// Error from strategy construction or verification
    #[error("Strategy error: {0}")]
    StrategyError(StrategyError),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from a login or link flow
    #[error("Flow error: {0}")]
    FlowError(FlowError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            Self::ProviderError(err) => tracing::error!("Provider error: {}", err),
            Self::StrategyError(err) => tracing::error!("Strategy error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::FlowError(err) => tracing::error!("Flow error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<ProviderError> for CoordinationError {
    fn from(err: ProviderError) -> Self {
        let error = Self::ProviderError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StrategyError> for CoordinationError {
    fn from(err: StrategyError) -> Self {
        let error = Self::StrategyError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<FlowError> for CoordinationError {
    fn from(err: FlowError) -> Self {
        let error = Self::FlowError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_error() {
        let err: CoordinationError = ProviderError::DuplicateProvider("github".to_string()).into();
        assert!(matches!(
            err,
            CoordinationError::ProviderError(ProviderError::DuplicateProvider(_))
        ));
        assert_eq!(
            err.to_string(),
            "Provider error: Provider 'github' is already registered"
        );
    }

    #[test]
    fn test_from_flow_error() {
        let err: CoordinationError = FlowError::UnauthenticatedLink.into();
        assert_eq!(
            err.to_string(),
            "Flow error: No accessToken found in request object"
        );
    }

    #[test]
    fn test_log_returns_self() {
        let err = CoordinationError::Configuration("no identity store".to_string()).log();
        assert!(matches!(err, CoordinationError::Configuration(_)));
    }
}
