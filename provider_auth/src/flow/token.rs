use http::header::AUTHORIZATION;

use crate::link_cookie::CookieSigner;
use crate::strategy::StrategyRequest;
use crate::utils::cookie_value;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const USER_ID_COOKIE: &str = "userId";

const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Access token id presented by the request: `Authorization` header (with or
/// without a `Bearer` prefix), then the `access_token` query parameter, then
/// the `access_token` cookie.
pub(crate) fn token_id_from_request(
    request: &StrategyRequest,
    signer: &CookieSigner,
) -> Option<String> {
    if let Some(value) = request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        let value = value.trim();
        let token = match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
            _ => value,
        };
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    if let Some(token) = request.query.get(ACCESS_TOKEN_PARAM).filter(|t| !t.is_empty()) {
        return Some(token.clone());
    }

    let cookie = cookie_value(&request.headers, ACCESS_TOKEN_COOKIE)?;
    if cookie.starts_with("s:") {
        signer.unsign(&cookie)
    } else {
        Some(cookie)
    }
}
