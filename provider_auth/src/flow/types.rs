use http::header::LOCATION;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;

use crate::strategy::Verified;
use crate::utils::append_headers;

use super::errors::FlowError;

pub const AUTHENTICATION_FAILED: &str = "authentication failed";

/// Why a handshake ended without a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub code: u16,
    pub message: String,
}

impl AuthFailure {
    pub fn unauthenticated() -> Self {
        Self {
            code: 401,
            message: AUTHENTICATION_FAILED.to_string(),
        }
    }

    /// Provider identity could not be attached to the caller's account.
    pub fn link_rejected(message: impl Into<String>) -> Self {
        Self {
            code: 403,
            message: message.into(),
        }
    }
}

/// Result threaded through verify, establish_session and respond.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    Success(Verified),
    AuthFailure(AuthFailure),
    Fatal(FlowError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowBody {
    Empty,
    Json(Value),
    Text(String),
}

/// Framework-neutral HTTP response produced by a flow.
#[derive(Debug, Clone)]
pub struct FlowResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: FlowBody,
}

impl FlowResponse {
    /// 302 to `location`.
    pub fn redirect(location: &str) -> Result<Self, FlowError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            HeaderValue::from_str(location)
                .map_err(|e| FlowError::Header(format!("Invalid redirect location: {e}")))?,
        );
        Ok(Self {
            status: StatusCode::FOUND,
            headers,
            body: FlowBody::Empty,
        })
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: FlowBody::Json(body),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: FlowBody::Text(body.into()),
        }
    }

    /// Add `headers` on top of the response's own, keeping duplicates.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        append_headers(&mut self.headers, headers);
        self
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}
