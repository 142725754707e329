use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value, json};

use crate::errors::CoordinationError;
use crate::link_cookie::LinkCookieBridge;
use crate::provider::{CookieSpec, ResolvedProvider};
use crate::session::{SessionManager, TokenResolver};
use crate::strategy::{
    AccessToken, AuthStrategy, AuthenticateOptions, StrategyOutcome, StrategyRequest, User,
    Verified,
};
use crate::utils::{append_headers, append_query, header_set_cookie};

use super::errors::FlowError;
use super::token::{ACCESS_TOKEN_COOKIE, USER_ID_COOKIE, token_id_from_request};
use super::types::{AuthFailure, FlowOutcome, FlowResponse};

/// Collaborators shared by every provider's flow.
#[derive(Clone)]
pub struct FlowContext {
    pub sessions: Arc<dyn SessionManager>,
    pub tokens: Arc<dyn TokenResolver>,
    pub bridge: LinkCookieBridge,
    /// Sign the `access_token` and `userId` cookies.
    pub sign_cookies: bool,
    pub secure_cookies: bool,
}

/// Request handling for one enabled provider: `initiate` serves the auth
/// route, `callback` the callback route.
#[derive(Clone)]
pub struct FlowController {
    provider: Arc<ResolvedProvider>,
    strategy: Arc<dyn AuthStrategy>,
    context: FlowContext,
}

impl FlowController {
    pub fn new(
        provider: Arc<ResolvedProvider>,
        strategy: Arc<dyn AuthStrategy>,
        context: FlowContext,
    ) -> Self {
        Self {
            provider,
            strategy,
            context,
        }
    }

    pub fn provider(&self) -> &Arc<ResolvedProvider> {
        &self.provider
    }

    /// Access token of the already authenticated caller, if any.
    pub async fn caller(
        &self,
        request: &StrategyRequest,
    ) -> Result<Option<AccessToken>, FlowError> {
        if let Some(token) = &request.caller {
            return Ok(Some(token.clone()));
        }
        match token_id_from_request(request, self.context.bridge.signer()) {
            Some(token_id) => Ok(self.context.tokens.resolve(&token_id).await?),
            None => Ok(None),
        }
    }

    /// Handle a request on the provider's auth path.
    pub async fn initiate(
        &self,
        mut request: StrategyRequest,
    ) -> Result<FlowResponse, CoordinationError> {
        let mut headers = HeaderMap::new();

        if self.provider.link {
            let spec = self.link_cookie()?;
            match self.caller(&request).await? {
                None => {
                    tracing::warn!(
                        "Link attempt for provider '{}' without an authenticated caller",
                        self.provider.name
                    );
                    let cleared = self.context.bridge.clear(spec)?;
                    return Ok(FlowResponse::text(
                        StatusCode::UNAUTHORIZED,
                        FlowError::UnauthenticatedLink.to_string(),
                    )
                    .with_headers(&cleared));
                }
                Some(token) => {
                    append_headers(&mut headers, &self.context.bridge.issue(spec, &token.id)?);
                    request.caller = Some(token);
                }
            }
        }

        match self.verify(&request).await {
            Ok(StrategyOutcome::Redirect(location)) => {
                Ok(FlowResponse::redirect(&location)?.with_headers(&headers))
            }
            Ok(StrategyOutcome::Complete(verified)) => {
                self.finish(&request, Self::classify(verified), headers).await
            }
            Err(outcome) => self.respond(outcome, None, headers).await,
        }
    }

    /// Handle a request on the provider's callback path.
    pub async fn callback(
        &self,
        mut request: StrategyRequest,
    ) -> Result<FlowResponse, CoordinationError> {
        let mut headers = HeaderMap::new();

        if self.provider.link {
            let spec = self.link_cookie()?;
            // Cleared on first access whatever happens next.
            append_headers(&mut headers, &self.context.bridge.clear(spec)?);

            let restored = match self.context.bridge.restore(spec, &request.headers) {
                Some(token_id) => self.context.tokens.resolve(&token_id).await?,
                None => None,
            };
            match restored {
                Some(token) => request.caller = Some(token),
                None => {
                    tracing::warn!(
                        "No restorable link identity on callback for provider '{}'",
                        self.provider.name
                    );
                    return self
                        .respond(FlowOutcome::AuthFailure(AuthFailure::unauthenticated()), None, headers)
                        .await;
                }
            }
        }

        match self.verify(&request).await {
            Ok(StrategyOutcome::Redirect(location)) => {
                Ok(FlowResponse::redirect(&location)?.with_headers(&headers))
            }
            Ok(StrategyOutcome::Complete(verified)) => {
                self.finish(&request, Self::classify(verified), headers).await
            }
            Err(outcome) => self.respond(outcome, None, headers).await,
        }
    }

    fn link_cookie(&self) -> Result<&CookieSpec, FlowError> {
        self.provider
            .link_cookie
            .as_ref()
            .ok_or_else(|| FlowError::MissingLinkCookie(self.provider.name.clone()))
    }

    /// Run the strategy. Failures come back as the outcome to respond with.
    async fn verify(&self, request: &StrategyRequest) -> Result<StrategyOutcome, FlowOutcome> {
        let options = AuthenticateOptions {
            session: self.provider.session,
            authorize: self.provider.link,
            callback_url: self.provider.callback_url.clone(),
        };

        self.strategy
            .authenticate(request, &options)
            .await
            .map_err(|err| match FlowError::from(err) {
                // A rejected link is reported to the user, not raised.
                FlowError::Identity(message) if self.provider.link => {
                    FlowOutcome::AuthFailure(AuthFailure::link_rejected(message))
                }
                err => FlowOutcome::Fatal(err),
            })
    }

    fn classify(verified: Verified) -> FlowOutcome {
        if verified.user.is_some() {
            FlowOutcome::Success(verified)
        } else {
            FlowOutcome::AuthFailure(AuthFailure::unauthenticated())
        }
    }

    async fn finish(
        &self,
        request: &StrategyRequest,
        outcome: FlowOutcome,
        mut headers: HeaderMap,
    ) -> Result<FlowResponse, CoordinationError> {
        let (outcome, session_id) = self.establish_session(request, outcome, &mut headers).await;
        self.respond(outcome, session_id, headers).await
    }

    /// Log the user into a session when the provider asks for one. Returns the
    /// session id in effect afterwards.
    async fn establish_session(
        &self,
        request: &StrategyRequest,
        outcome: FlowOutcome,
        headers: &mut HeaderMap,
    ) -> (FlowOutcome, Option<String>) {
        let current = self.context.sessions.session_id(&request.headers).await;

        let user = match &outcome {
            FlowOutcome::Success(Verified {
                user: Some(user), ..
            }) if self.provider.session => Some(user.clone()),
            _ => None,
        };
        let Some(user) = user else {
            return (outcome, current);
        };

        match self.context.sessions.establish(current.as_deref(), &user).await {
            Ok(handle) => {
                append_headers(headers, &handle.headers);
                (outcome, Some(handle.id))
            }
            Err(e) => (
                FlowOutcome::Fatal(FlowError::SessionEstablishment(e.to_string())),
                current,
            ),
        }
    }

    async fn respond(
        &self,
        outcome: FlowOutcome,
        session_id: Option<String>,
        headers: HeaderMap,
    ) -> Result<FlowResponse, CoordinationError> {
        let name = self.provider.name.as_str();

        match outcome {
            FlowOutcome::Fatal(err) => Err(err.into()),
            FlowOutcome::AuthFailure(failure) => {
                tracing::debug!(
                    "Authentication with provider '{}' failed: {}",
                    name,
                    failure.message
                );
                let response = match (&self.provider.failure_redirect_url, self.provider.json) {
                    (Some(url), false) => {
                        let code = failure.code.to_string();
                        let location = append_query(
                            url.as_str(),
                            &[
                                ("state", "failure"),
                                ("provider_name", name),
                                ("error_code", code.as_str()),
                                ("error_message", failure.message.as_str()),
                            ],
                        )?;
                        FlowResponse::redirect(&location)?
                    }
                    _ => FlowResponse::json(
                        StatusCode::from_u16(failure.code).unwrap_or(StatusCode::UNAUTHORIZED),
                        json!({
                            "state": "failure",
                            "provider_name": name,
                            "error_code": failure.code,
                            "error_message": failure.message,
                        }),
                    ),
                };
                Ok(response.with_headers(&headers))
            }
            FlowOutcome::Success(verified) => {
                let Some(user) = &verified.user else {
                    return Err(FlowError::Identity("verified outcome without user".to_string()).into());
                };
                let token = verified.access_token();

                if self.provider.json {
                    let mut body = Map::new();
                    body.insert("state".to_string(), json!("success"));
                    body.insert("provider_name".to_string(), json!(name));
                    body.insert("userId".to_string(), json!(user.id));
                    if let Some(token) = token {
                        body.insert("access_token".to_string(), json!(token.id));
                    }
                    return Ok(FlowResponse::json(StatusCode::OK, Value::Object(body))
                        .with_headers(&headers));
                }

                let mut headers = headers;
                if let Some(token) = token {
                    self.set_token_cookies(&mut headers, user, token)?;
                }

                let return_to = match &session_id {
                    Some(id) => self.context.sessions.take_return_to(id).await?,
                    None => None,
                };
                let target = match (return_to, &self.provider.success_redirect_url) {
                    (Some(return_to), _) => return_to,
                    (None, Some(url)) => url.to_string(),
                    (None, None) => "/".to_string(),
                };
                let location = append_query(
                    &target,
                    &[("state", "success"), ("provider_name", name)],
                )?;

                tracing::info!("User {} authenticated with provider '{}'", user.id, name);
                Ok(FlowResponse::redirect(&location)?.with_headers(&headers))
            }
        }
    }

    fn set_token_cookies(
        &self,
        headers: &mut HeaderMap,
        user: &User,
        token: &AccessToken,
    ) -> Result<(), FlowError> {
        let signer = self.context.bridge.signer();
        for (name, value) in [(ACCESS_TOKEN_COOKIE, &token.id), (USER_ID_COOKIE, &user.id)] {
            let spec = CookieSpec {
                name: name.to_string(),
                path: "/".to_string(),
                max_age_ms: Some(token.ttl_ms()),
                http_only: false,
                signed: self.context.sign_cookies,
                secure: self.context.secure_cookies,
                domain: self.provider.domain.clone(),
            };
            let value = if spec.signed {
                signer.sign(value)?
            } else {
                value.clone()
            };
            header_set_cookie(headers, &spec, &value)?;
        }
        Ok(())
    }
}
