use axum::{Router, middleware, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use provider_auth_axum::provider_auth::{ComponentOptions, ProviderAuth};
use provider_auth_axum::{provider_auth_router, require_login};

mod handlers;
mod strategy;

use crate::handlers::{account, idp_authorize, index, protected};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,provider_auth=debug,provider_auth_axum=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = ComponentOptions::from_env()?.with_session_support(true);
    let port = options.server_base_url.port_or_known_default().unwrap_or(3000);

    let auth = ProviderAuth::builder(options)
        .with_in_memory_stores()
        .register_strategy("demo-idp", "Strategy", strategy::build)
        .configure_from_dir()?;

    let guarded = Router::new()
        .route("/protected", get(protected))
        .route_layer(middleware::from_fn_with_state(
            auth.sessions().clone(),
            require_login,
        ));

    let app = Router::new()
        .route("/", get(index))
        .with_state(auth.registry().clone())
        .route("/account", get(account))
        .route("/account/login", get(account))
        .route("/account/authorize/result", get(account))
        .route("/idp/authorize", get(idp_authorize))
        .merge(guarded)
        .merge(provider_auth_router(&auth));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
