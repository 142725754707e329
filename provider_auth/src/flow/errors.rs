use thiserror::Error;

use crate::session::SessionError;
use crate::strategy::StrategyError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// The session collaborator failed after a successful verification
    #[error("Failed to establish session: {0}")]
    SessionEstablishment(String),

    #[error("Strategy error: {0}")]
    Strategy(StrategyError),

    /// The identity store rejected a login
    #[error("Identity error: {0}")]
    Identity(String),

    #[error("No accessToken found in request object")]
    UnauthenticatedLink,

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Header error: {0}")]
    Header(String),

    #[error("Provider '{0}' is a link provider without a link cookie")]
    MissingLinkCookie(String),
}

impl From<StrategyError> for FlowError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::Identity(message) => Self::Identity(message),
            other => Self::Strategy(other),
        }
    }
}

impl From<UtilError> for FlowError {
    fn from(err: UtilError) -> Self {
        Self::Header(err.to_string())
    }
}
