use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, Request, State};
use axum::response::Response;
use http::StatusCode;
use provider_auth::{FlowController, ProviderRegistry, ProviderSummary};
use serde::Deserialize;

use super::error::IntoResponseError;
use super::extract::strategy_request;
use super::response::into_response;

/// Which of a provider's two routes a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Stage {
    Auth,
    Callback,
}

pub(super) async fn flow_handler(
    flow: FlowController,
    stage: Stage,
    req: Request,
) -> Result<Response, (StatusCode, String)> {
    let provider = flow.provider().clone();
    let route = match stage {
        Stage::Auth => &provider.auth,
        Stage::Callback => &provider.callback,
    };
    let request = strategy_request(req, route).await?;

    tracing::debug!(
        "{:?} request for provider '{}' on {}",
        stage,
        provider.name,
        request.path
    );

    let response = match stage {
        Stage::Auth => flow.initiate(request).await,
        Stage::Callback => flow.callback(request).await,
    }
    .into_response_error()?;

    Ok(into_response(response))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListingQuery {
    #[serde(default)]
    include_disabled: bool,
}

pub(super) async fn list_login_providers(
    State(registry): State<Arc<ProviderRegistry>>,
    Query(query): Query<ListingQuery>,
) -> Json<Vec<ProviderSummary>> {
    Json(registry.login_providers(query.include_disabled))
}

pub(super) async fn list_link_providers(
    State(registry): State<Arc<ProviderRegistry>>,
    Query(query): Query<ListingQuery>,
) -> Json<Vec<ProviderSummary>> {
    Json(registry.link_providers(query.include_disabled))
}
