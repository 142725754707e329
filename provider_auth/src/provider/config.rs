use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw per-provider options as they appear in a providers file.
///
/// Every recognized key is enumerated here. Keys the resolver does not know
/// about are collected in `extra` and forwarded to the strategy factory
/// (client ids, secrets, scopes and so on).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    pub module: Option<String>,
    pub strategy: Option<String>,
    pub auth_scheme: Option<String>,
    pub link: bool,
    pub session: bool,
    pub json: bool,
    pub disabled: bool,

    pub auth_path: Option<String>,
    pub callback_path: Option<String>,
    #[serde(rename = "authHTTPMethod")]
    pub auth_http_method: Option<String>,
    #[serde(rename = "callbackHTTPMethod")]
    pub callback_http_method: Option<String>,
    pub auth_body_parser: Option<String>,
    pub callback_body_parser: Option<String>,
    pub auth_body_parser_options: Option<Value>,
    pub callback_body_parser_options: Option<Value>,

    pub success_redirect: Option<String>,
    pub failure_redirect: Option<String>,
    pub domain: Option<String>,

    /// Nested legacy shape; flat keys take precedence.
    pub route_options: Option<RouteOptions>,
    pub strategy_options: Map<String, Value>,
    pub scheme_options: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub auth: Option<RouteConfig>,
    pub callback: Option<RouteConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    pub path: Option<String>,
    pub method: Option<String>,
    pub body_parser: Option<String>,
    pub body_parser_options: Option<Value>,
}

/// One route's options after flat keys have been laid over the nested ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MergedRoute {
    pub path: Option<String>,
    pub method: Option<String>,
    pub body_parser: Option<String>,
    pub body_parser_options: Option<Value>,
}

impl ProviderConfig {
    pub(crate) fn auth_route(&self) -> MergedRoute {
        let nested = self.route_options.as_ref().and_then(|r| r.auth.as_ref());
        merge_route(
            nested,
            &self.auth_path,
            &self.auth_http_method,
            &self.auth_body_parser,
            &self.auth_body_parser_options,
        )
    }

    pub(crate) fn callback_route(&self) -> MergedRoute {
        let nested = self.route_options.as_ref().and_then(|r| r.callback.as_ref());
        merge_route(
            nested,
            &self.callback_path,
            &self.callback_http_method,
            &self.callback_body_parser,
            &self.callback_body_parser_options,
        )
    }

    /// Success redirect, falling back to the legacy `strategyOptions` key.
    pub(crate) fn success_redirect(&self) -> Option<String> {
        self.success_redirect
            .clone()
            .or_else(|| string_option(&self.strategy_options, "successRedirect"))
    }

    pub(crate) fn failure_redirect(&self) -> Option<String> {
        self.failure_redirect
            .clone()
            .or_else(|| string_option(&self.strategy_options, "failureRedirect"))
    }

    /// Options handed to the strategy factory; unrecognized top-level keys win
    /// over the nested `strategyOptions` block.
    pub(crate) fn merged_strategy_options(&self) -> Map<String, Value> {
        let mut merged = self.strategy_options.clone();
        for (key, value) in &self.extra {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

fn merge_route(
    nested: Option<&RouteConfig>,
    path: &Option<String>,
    method: &Option<String>,
    body_parser: &Option<String>,
    body_parser_options: &Option<Value>,
) -> MergedRoute {
    MergedRoute {
        path: path.clone().or_else(|| nested.and_then(|n| n.path.clone())),
        method: method.clone().or_else(|| nested.and_then(|n| n.method.clone())),
        body_parser: body_parser
            .clone()
            .or_else(|| nested.and_then(|n| n.body_parser.clone())),
        body_parser_options: body_parser_options
            .clone()
            .or_else(|| nested.and_then(|n| n.body_parser_options.clone())),
    }
}

fn string_option(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
