use axum::Json;
use axum::response::{IntoResponse, Response};
use provider_auth::{FlowBody, FlowResponse};

/// Framework-neutral flow response as an axum response. Flow headers, such as
/// several `Set-Cookie` values, are appended on top of the body's own.
pub(super) fn into_response(flow: FlowResponse) -> Response {
    let FlowResponse {
        status,
        headers,
        body,
    } = flow;

    let mut response = match body {
        FlowBody::Empty => status.into_response(),
        FlowBody::Json(value) => (status, Json(value)).into_response(),
        FlowBody::Text(text) => (status, text).into_response(),
    };

    let mut last = None;
    for (name, value) in headers {
        if let Some(name) = name {
            last = Some(name);
        }
        if let Some(name) = &last {
            response.headers_mut().append(name.clone(), value);
        }
    }
    response
}
