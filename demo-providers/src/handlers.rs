use std::collections::BTreeMap;
use std::sync::Arc;

use askama::Template;
use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use provider_auth_axum::AUTH_LISTING_ROOT;
use provider_auth_axum::SessionUser;
use provider_auth_axum::provider_auth::{ProviderRegistry, ProviderSummary};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    providers: Vec<ProviderSummary>,
    listing_root: &'a str,
}

#[derive(Template)]
#[template(path = "protected.html")]
struct ProtectedTemplate<'a> {
    user_id: &'a str,
}

#[derive(Template)]
#[template(path = "account.html")]
struct AccountTemplate<'a> {
    title: &'a str,
    params: BTreeMap<String, String>,
}

#[derive(Template)]
#[template(path = "idp_authorize.html")]
struct IdpAuthorizeTemplate {
    provider: String,
    redirect_uri: String,
}

fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template
        .render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub(crate) async fn index(
    State(registry): State<Arc<ProviderRegistry>>,
) -> Result<Html<String>, (StatusCode, String)> {
    render(&IndexTemplate {
        providers: registry.login_providers(false),
        listing_root: AUTH_LISTING_ROOT.as_str(),
    })
}

pub(crate) async fn protected(
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>, (StatusCode, String)> {
    render(&ProtectedTemplate { user_id: &user.id })
}

/// Landing page for the success and failure redirects.
pub(crate) async fn account(
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let title = match params.get("state").map(String::as_str) {
        Some("success") => "Signed in",
        Some("failure") => "Sign-in failed",
        _ => "Account",
    };
    render(&AccountTemplate { title, params })
}

/// Stand-in for an external identity provider's consent page.
pub(crate) async fn idp_authorize(
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let redirect_uri = params
        .remove("redirect_uri")
        .ok_or((StatusCode::BAD_REQUEST, "Missing redirect_uri".to_string()))?;
    render(&IdpAuthorizeTemplate {
        provider: params.remove("provider").unwrap_or_default(),
        redirect_uri,
    })
}
