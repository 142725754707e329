use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::get;
use axum::{Extension, Router, middleware};
use provider_auth_axum::provider_auth::{
    AuthStrategy, AuthenticateOptions, ComponentOptions, Credentials, ProviderAuth,
    ProviderConfig, Profile, ResolvedProvider, StrategyError, StrategyOutcome, StrategyRequest,
    VerifyFunction, append_query,
};
use provider_auth_axum::{SessionUser, provider_auth_router, require_login};
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use serde_json::json;
use tokio::task::JoinHandle;
use url::Url;

pub const FAKE_IDP: &str = "https://idp.example.com/authorize";

/// Identity provider stand-in: without a `code` it redirects to the IdP, with
/// one it treats the code as the external account id. The code `deny` yields
/// no profile.
pub struct FakeStrategy {
    verify: Arc<dyn VerifyFunction>,
}

#[async_trait]
impl AuthStrategy for FakeStrategy {
    fn name(&self) -> &str {
        "fake"
    }

    async fn authenticate(
        &self,
        request: &StrategyRequest,
        options: &AuthenticateOptions,
    ) -> Result<StrategyOutcome, StrategyError> {
        let Some(code) = request.param("code") else {
            let location = append_query(
                FAKE_IDP,
                &[("redirect_uri", options.callback_url.as_str())],
            )
            .map_err(|e| StrategyError::Strategy(e.to_string()))?;
            return Ok(StrategyOutcome::Redirect(location));
        };

        let profile = (code != "deny").then(|| Profile {
            provider: "fake".to_string(),
            id: code.clone(),
            display_name: Some(code.clone()),
            emails: vec![format!("{code}@example.com")],
            raw: json!({"sub": code}),
        });
        let mut credentials = Credentials::new();
        credentials.insert("accessToken".to_string(), json!(format!("idp-{code}")));

        let verified = self.verify.verify(request, profile, credentials).await?;
        Ok(StrategyOutcome::Complete(verified))
    }
}

fn providers() -> Vec<(String, ProviderConfig)> {
    let configs = json!({
        "fake": {"module": "fake", "session": true},
        "fake-api": {"module": "fake", "json": true},
        "fake-link": {"module": "fake", "link": true},
        "ldap": {
            "module": "fake",
            "json": true,
            "authHTTPMethod": "POST",
            "authBodyParser": "urlencoded"
        },
        "retired": {"module": "fake", "disabled": true}
    });

    configs
        .as_object()
        .unwrap()
        .iter()
        .map(|(name, config)| {
            (
                name.clone(),
                serde_json::from_value(config.clone()).unwrap(),
            )
        })
        .collect()
}

async fn protected(Extension(user): Extension<SessionUser>) -> String {
    format!("hello {}", user.id)
}

/// Test server bound to an ephemeral port, serving the provider routes and a
/// `/protected` page behind the login guard.
pub struct TestServer {
    server_handle: JoinHandle<()>,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let options = ComponentOptions::new(Url::parse(&base_url).unwrap())
            .with_session_support(true)
            .with_cookie_secret("integration-secret");

        let auth = ProviderAuth::builder(options)
            .with_in_memory_stores()
            .register_strategy(
                "fake",
                "Strategy",
                |_provider: Arc<ResolvedProvider>, verify: Arc<dyn VerifyFunction>| {
                    Ok(Arc::new(FakeStrategy { verify }) as Arc<dyn AuthStrategy>)
                },
            )
            .configure(providers())
            .unwrap();

        let app = Router::new()
            .route("/protected", get(protected))
            .layer(middleware::from_fn_with_state(
                auth.sessions().clone(),
                require_login,
            ))
            .merge(provider_auth_router(&auth));

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            server_handle,
            base_url,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn get_with_cookies(&self, path: &str, cookies: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(COOKIE, cookies)
            .send()
            .await
            .unwrap()
    }

    pub fn shutdown(self) {
        self.server_handle.abort();
    }
}

/// `name=value` pairs of every `Set-Cookie` header, ready to send back.
pub fn cookie_pairs(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(|pair| pair.trim().to_string())
        .collect()
}

/// Full `Set-Cookie` line for cookie `name`.
pub fn set_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
}

pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
