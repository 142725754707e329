use url::Url;

use crate::config::{ComponentOptions, LinkCookiePath};
use crate::link_cookie::{LINK_COOKIE_MAX_AGE_MS, link_cookie_name};
use crate::provider::config::MergedRoute;
use crate::provider::{
    BodyParser, CookieSpec, HttpMethod, ProviderConfig, ProviderError, ResolvedProvider, RouteSpec,
};

const DEFAULT_STRATEGY: &str = "Strategy";

const LOGIN_SUCCESS_REDIRECT: &str = "/account";
const LOGIN_FAILURE_REDIRECT: &str = "/account/login";
const LINK_RESULT_REDIRECT: &str = "/account/authorize/result";

/// Turn raw provider options into a complete descriptor.
///
/// Pure: no I/O, and the same inputs always produce the same descriptor.
pub fn resolve(
    name: &str,
    config: &ProviderConfig,
    options: &ComponentOptions,
) -> Result<ResolvedProvider, ProviderError> {
    if name.trim().is_empty() {
        return Err(ProviderError::configuration(name, "provider name is empty"));
    }

    let root = options.normalized_context_root();
    let segment = if config.link { "link" } else { "login" };
    let default_path = format!("{root}/{name}/{segment}");

    let auth_route = config.auth_route();
    let auth_path = match &auth_route.path {
        Some(path) => under_root(&root, path),
        None => default_path.clone(),
    };

    let callback_route = config.callback_route();
    let callback_path = match &callback_route.path {
        Some(path) => under_root(&root, path),
        None => format!("{default_path}/callback"),
    };

    let auth = route_spec(name, "auth", auth_path, &auth_route, options)?;
    let callback = route_spec(name, "callback", callback_path, &callback_route, options)?;

    if auth.method == callback.method && auth.path == callback.path {
        return Err(ProviderError::configuration(
            name,
            format!(
                "auth and callback routes are both {} {}",
                auth.method, auth.path
            ),
        ));
    }

    let callback_url = join_url(name, &options.server_base_url, &callback.path)?;

    let (success_redirect_url, failure_redirect_url) = if config.json {
        (None, None)
    } else {
        let (success_default, failure_default) = if config.link {
            (LINK_RESULT_REDIRECT, LINK_RESULT_REDIRECT)
        } else {
            (LOGIN_SUCCESS_REDIRECT, LOGIN_FAILURE_REDIRECT)
        };
        let success = config.success_redirect();
        let failure = config.failure_redirect();
        (
            Some(join_url(
                name,
                &options.ui_base_url,
                success.as_deref().unwrap_or(success_default),
            )?),
            Some(join_url(
                name,
                &options.ui_base_url,
                failure.as_deref().unwrap_or(failure_default),
            )?),
        )
    };

    let session = if config.session && !options.enable_session_support {
        tracing::warn!(
            "Provider '{}' requests session support but sessions are disabled; continuing without sessions",
            name
        );
        false
    } else {
        config.session
    };

    let link_cookie = config.link.then(|| CookieSpec {
        name: link_cookie_name(name),
        path: match options.policy.link_cookie_path {
            LinkCookiePath::CallbackParent => callback_parent(&callback.path),
            LinkCookiePath::AuthPath => auth.path.clone(),
        },
        max_age_ms: Some(LINK_COOKIE_MAX_AGE_MS),
        http_only: true,
        signed: true,
        secure: options.secure_cookies(),
        domain: None,
    });

    Ok(ResolvedProvider {
        name: name.to_string(),
        module: config.module.clone(),
        strategy: config
            .strategy
            .clone()
            .unwrap_or_else(|| DEFAULT_STRATEGY.to_string()),
        auth_scheme: config.auth_scheme.as_ref().map(|s| s.trim().to_lowercase()),
        link: config.link,
        session,
        json: config.json,
        disabled: config.disabled,
        auth,
        callback,
        callback_url,
        success_redirect_url,
        failure_redirect_url,
        domain: config.domain.clone(),
        link_cookie,
        strategy_options: config.merged_strategy_options(),
        scheme_options: config.scheme_options.clone(),
    })
}

fn route_spec(
    name: &str,
    route: &str,
    path: String,
    merged: &MergedRoute,
    options: &ComponentOptions,
) -> Result<RouteSpec, ProviderError> {
    let method = HttpMethod::from_configured(merged.method.as_deref(), options.policy.default_method);

    let body_parser = match merged.body_parser.as_deref() {
        Some(parser) => Some(parser.parse::<BodyParser>().map_err(|e| {
            ProviderError::configuration(name, format!("{route} route: {e}"))
        })?),
        None => None,
    };

    if method == HttpMethod::Post && body_parser.is_none() {
        return Err(ProviderError::configuration(
            name,
            format!("{route} route uses POST but no body parser type is configured"),
        ));
    }

    Ok(RouteSpec {
        path,
        method,
        body_parser,
        body_parser_options: merged.body_parser_options.clone(),
    })
}

/// Prefix `path` with the context root unless it already sits under it.
fn under_root(root: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if root.is_empty() || path == root || path.starts_with(&format!("{root}/")) {
        path
    } else {
        format!("{root}{path}")
    }
}

fn callback_parent(callback_path: &str) -> String {
    match callback_path.strip_suffix("/callback") {
        Some("") => "/".to_string(),
        Some(parent) => parent.to_string(),
        None => callback_path.to_string(),
    }
}

fn join_url(name: &str, base: &Url, location: &str) -> Result<Url, ProviderError> {
    base.join(location).map_err(|e| {
        ProviderError::configuration(name, format!("cannot resolve '{location}' against {base}: {e}"))
    })
}
