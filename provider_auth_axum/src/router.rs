//! Router installing every enabled provider's routes

use std::collections::BTreeMap;

use axum::Router;
use axum::extract::Request;
use axum::routing::{MethodFilter, MethodRouter, get, on};
use provider_auth::{HttpMethod, ProviderAuth};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::config::AUTH_LISTING_ROOT;
use super::handlers::{Stage, flow_handler, list_link_providers, list_login_providers};

/// Create a router for all provider endpoints
///
/// For each enabled provider this installs `METHOD authPath` and
/// `METHOD callbackPath` exactly as resolved, plus the listing endpoints:
/// - GET {AUTH_LISTING_ROOT}/login
/// - GET {AUTH_LISTING_ROOT}/link
///
/// Paths are absolute, so merge the router into the application rather than
/// nesting it.
pub fn provider_auth_router(auth: &ProviderAuth) -> Router {
    provider_auth_router_no_trace(auth).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(true),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `provider_auth_router()` but without the HTTP tracing middleware.
pub fn provider_auth_router_no_trace(auth: &ProviderAuth) -> Router {
    let mut routes: BTreeMap<String, MethodRouter> = BTreeMap::new();

    for flow in auth.flows() {
        let provider = flow.provider();
        for (route, stage) in [
            (&provider.auth, Stage::Auth),
            (&provider.callback, Stage::Callback),
        ] {
            let flow = flow.clone();
            let handler = move |req: Request| flow_handler(flow, stage, req);
            let filter = method_filter(route.method);

            tracing::debug!(
                "Installing {} {} for provider '{}'",
                route.method,
                route.path,
                provider.name
            );

            // The registry already rejected two providers claiming one method and path.
            let method_router = match routes.remove(&route.path) {
                Some(existing) => existing.on(filter, handler),
                None => on(filter, handler),
            };
            routes.insert(route.path.clone(), method_router);
        }
    }

    let router = routes
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router.route(&path, method_router)
        });

    router.merge(listing_router(auth, AUTH_LISTING_ROOT.as_str()))
}

/// Provider listing endpoints mounted under `root`.
pub fn listing_router(auth: &ProviderAuth, root: &str) -> Router {
    let root = root.trim_end_matches('/');
    Router::new()
        .route(&format!("{root}/login"), get(list_login_providers))
        .route(&format!("{root}/link"), get(list_link_providers))
        .with_state(auth.registry().clone())
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
    }
}
