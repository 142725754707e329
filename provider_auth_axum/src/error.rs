use http::StatusCode;
use provider_auth::{CoordinationError, FlowError, ProviderError};

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match &e {
                CoordinationError::ProviderError(ProviderError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                CoordinationError::FlowError(FlowError::Identity(_)) => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
    }
}
