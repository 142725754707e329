use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use headers::HeaderMapExt;
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;
use url::Url;

use crate::provider::CookieSpec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&buf))
}

/// Append a `Set-Cookie` header rendered from `spec` carrying `value`.
pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    spec: &CookieSpec,
    value: &str,
) -> Result<(), UtilError> {
    let cookie = spec.render(value);
    tracing::trace!("Set-Cookie: {}", cookie);
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to parse cookie {}", spec.name)))?,
    );
    Ok(())
}

/// Append a `Set-Cookie` header that expires the cookie described by `spec`.
pub(crate) fn header_clear_cookie(headers: &mut HeaderMap, spec: &CookieSpec) -> Result<(), UtilError> {
    let cookie = spec.render_expired();
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to parse cookie {}", spec.name)))?,
    );
    Ok(())
}

/// Copy every header of `src` into `dst` without replacing existing values.
pub(crate) fn append_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src.iter() {
        dst.append(name.clone(), value.clone());
    }
}

/// Read a cookie from the request's `Cookie` header(s), percent-decoded.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.typed_get::<headers::Cookie>()?;
    let raw = cookies.get(name)?;
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Append query parameters to a URL.
///
/// Works for absolute URLs as well as for path-only locations such as a
/// `returnTo` value captured from a previous request.
pub fn append_query(location: &str, params: &[(&str, &str)]) -> Result<String, UtilError> {
    if let Ok(mut url) = Url::parse(location) {
        url.query_pairs_mut().extend_pairs(params);
        return Ok(url.to_string());
    }

    let base = Url::parse("http://relative.invalid/")
        .map_err(|e| UtilError::Format(e.to_string()))?;
    let mut url = base
        .join(location)
        .map_err(|e| UtilError::Format(format!("Invalid location {location}: {e}")))?;
    url.query_pairs_mut().extend_pairs(params);

    let mut relative = url.path().to_string();
    if let Some(query) = url.query() {
        relative.push('?');
        relative.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        relative.push('#');
        relative.push_str(fragment);
    }
    Ok(relative)
}
