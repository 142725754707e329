use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// HTTP verbs a provider route may be installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    /// `POST` only when configured as "post" in any case, `default` otherwise.
    pub(crate) fn from_configured(configured: Option<&str>, default: HttpMethod) -> Self {
        match configured {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => HttpMethod::Post,
            Some(m) if m.trim().eq_ignore_ascii_case("get") => HttpMethod::Get,
            _ => default,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a POST route body is decoded before reaching the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyParser {
    Json,
    Urlencoded,
    Text,
    Raw,
}

impl BodyParser {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyParser::Json => "json",
            BodyParser::Urlencoded => "urlencoded",
            BodyParser::Text => "text",
            BodyParser::Raw => "raw",
        }
    }
}

impl FromStr for BodyParser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(BodyParser::Json),
            "urlencoded" => Ok(BodyParser::Urlencoded),
            "text" => Ok(BodyParser::Text),
            "raw" => Ok(BodyParser::Raw),
            other => Err(format!("unsupported body parser '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSpec {
    pub path: String,
    pub method: HttpMethod,
    pub body_parser: Option<BodyParser>,
    pub body_parser_options: Option<Value>,
}

/// Attributes of a cookie the flow sets or clears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieSpec {
    pub name: String,
    pub path: String,
    /// Lifetime in milliseconds; session cookie when `None`.
    pub max_age_ms: Option<i64>,
    pub http_only: bool,
    pub signed: bool,
    pub secure: bool,
    pub domain: Option<String>,
}

impl CookieSpec {
    /// Render a `Set-Cookie` header value.
    pub fn render(&self, value: &str) -> String {
        let mut cookie = format!(
            "{}={}; SameSite=Lax; Path={}",
            self.name,
            urlencoding::encode(value),
            self.path
        );
        if let Some(max_age_ms) = self.max_age_ms {
            cookie.push_str(&format!("; Max-Age={}", max_age_ms.max(0) / 1000));
        }
        self.push_attributes(&mut cookie);
        cookie
    }

    /// Render a `Set-Cookie` header value that removes the cookie.
    pub fn render_expired(&self) -> String {
        let mut cookie = format!(
            "{}=; SameSite=Lax; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, self.path
        );
        self.push_attributes(&mut cookie);
        cookie
    }

    fn push_attributes(&self, cookie: &mut String) {
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
    }
}

/// Fully resolved, immutable description of one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProvider {
    pub name: String,
    pub module: Option<String>,
    pub strategy: String,
    /// Lower-cased scheme; `None` means the OAuth 2.0 default.
    pub auth_scheme: Option<String>,
    pub link: bool,
    pub session: bool,
    pub json: bool,
    pub disabled: bool,
    pub auth: RouteSpec,
    pub callback: RouteSpec,
    pub callback_url: Url,
    pub success_redirect_url: Option<Url>,
    pub failure_redirect_url: Option<Url>,
    pub domain: Option<String>,
    pub link_cookie: Option<CookieSpec>,
    pub strategy_options: Map<String, Value>,
    pub scheme_options: Map<String, Value>,
}

impl ResolvedProvider {
    pub fn response_type(&self) -> &'static str {
        if self.json { "json" } else { "redirect" }
    }

    /// Listing projection of this provider.
    pub fn summary(&self) -> ProviderSummary {
        ProviderSummary {
            name: self.name.clone(),
            auth_path: self.auth.path.clone(),
            auth_method: self.auth.method,
            link: self.link,
            disabled: self.disabled,
            response_type: self.response_type().to_string(),
            auth_body_format: match self.auth.method {
                HttpMethod::Post => self.auth.body_parser.map(|p| p.as_str().to_string()),
                HttpMethod::Get => None,
            },
            success_redirect_url: self.success_redirect_url.as_ref().map(Url::to_string),
            failure_redirect_url: self.failure_redirect_url.as_ref().map(Url::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub name: String,
    pub auth_path: String,
    pub auth_method: HttpMethod,
    pub link: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub disabled: bool,
    pub response_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auth_body_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_redirect_url: Option<String>,
}
