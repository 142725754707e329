use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("No strategy module configured for provider '{0}'")]
    MissingModule(String),

    #[error("Strategy '{strategy}' not found in module '{module}'")]
    UnknownStrategy { module: String, strategy: String },

    #[error("Unknown auth scheme '{0}'")]
    UnknownScheme(String),

    /// The external strategy failed while talking to its provider
    #[error("Strategy error: {0}")]
    Strategy(String),

    /// The identity store could not complete the login
    #[error("Identity error: {0}")]
    Identity(String),
}
