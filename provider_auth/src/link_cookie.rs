//! Carries an authenticated caller's token id across the provider redirect.
//!
//! Before a link flow leaves for the provider, the caller's access token id is
//! written into a short-lived, signed, httpOnly cookie scoped to the
//! provider's routes. The callback reads it back to know which account the
//! new identity belongs to, and clears it whatever the outcome.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::ComponentOptions;
use crate::provider::CookieSpec;
use crate::utils::{
    UtilError, base64url_encode, cookie_value, gen_random_string, header_clear_cookie,
    header_set_cookie,
};

type HmacSha256 = Hmac<Sha256>;

pub const LINK_COOKIE_PREFIX: &str = "linkWithProvider_";
pub const LINK_COOKIE_MAX_AGE_MS: i64 = 300_000;

const SIGNED_PREFIX: &str = "s:";

pub fn link_cookie_name(provider: &str) -> String {
    format!("{LINK_COOKIE_PREFIX}{provider}")
}

/// HMAC-SHA256 cookie signer producing `s:<value>.<signature>`.
#[derive(Clone)]
pub struct CookieSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    /// Signer with a key that only lives as long as the process.
    pub fn random() -> Result<Self, UtilError> {
        Ok(Self::new(gen_random_string(32)?))
    }

    pub fn from_options(options: &ComponentOptions) -> Result<Self, UtilError> {
        match &options.cookie_secret {
            Some(secret) => Ok(Self::new(secret)),
            None => {
                tracing::warn!(
                    "No cookie secret configured; signed cookies will not survive a restart"
                );
                Self::random()
            }
        }
    }

    fn signature(&self, value: &str) -> Result<String, UtilError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| UtilError::Crypto(format!("Invalid HMAC key: {e}")))?;
        mac.update(value.as_bytes());
        Ok(base64url_encode(&mac.finalize().into_bytes()))
    }

    pub fn sign(&self, value: &str) -> Result<String, UtilError> {
        Ok(format!("{SIGNED_PREFIX}{value}.{}", self.signature(value)?))
    }

    /// Return the inner value when the signature matches.
    pub fn unsign(&self, signed: &str) -> Option<String> {
        let (value, signature) = signed.strip_prefix(SIGNED_PREFIX)?.rsplit_once('.')?;
        let expected = self.signature(value).ok()?;
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Some(value.to_string())
        } else {
            None
        }
    }
}

/// Issues, clears and restores link cookies.
#[derive(Debug, Clone)]
pub struct LinkCookieBridge {
    signer: CookieSigner,
}

impl LinkCookieBridge {
    pub fn new(signer: CookieSigner) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> &CookieSigner {
        &self.signer
    }

    pub fn issue(&self, spec: &CookieSpec, token_id: &str) -> Result<HeaderMap, UtilError> {
        self.issue_at(spec, token_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        spec: &CookieSpec,
        token_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HeaderMap, UtilError> {
        if token_id.is_empty() || token_id.contains('|') {
            return Err(UtilError::Format("invalid access token id".to_string()));
        }
        let payload = format!("{token_id}|{}", now.timestamp());
        let value = if spec.signed {
            self.signer.sign(&payload)?
        } else {
            payload
        };

        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, spec, &value)?;
        Ok(headers)
    }

    pub fn clear(&self, spec: &CookieSpec) -> Result<HeaderMap, UtilError> {
        let mut headers = HeaderMap::new();
        header_clear_cookie(&mut headers, spec)?;
        Ok(headers)
    }

    /// Token id carried by the request's link cookie, if it is present,
    /// correctly signed and younger than the cookie's max age.
    pub fn restore(&self, spec: &CookieSpec, headers: &HeaderMap) -> Option<String> {
        self.restore_at(spec, headers, Utc::now())
    }

    pub fn restore_at(
        &self,
        spec: &CookieSpec,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let raw = cookie_value(headers, &spec.name)?;
        let payload = if spec.signed {
            match self.signer.unsign(&raw) {
                Some(payload) => payload,
                None => {
                    tracing::warn!("Rejected link cookie {} with a bad signature", spec.name);
                    return None;
                }
            }
        } else {
            raw
        };

        let (token_id, issued_at) = payload.rsplit_once('|')?;
        let issued_at: i64 = issued_at.parse().ok()?;
        let age_ms = (now.timestamp() - issued_at).saturating_mul(1000);
        let max_age_ms = spec.max_age_ms.unwrap_or(LINK_COOKIE_MAX_AGE_MS);

        if age_ms < 0 || age_ms > max_age_ms {
            tracing::debug!("Link cookie {} expired ({} ms old)", spec.name, age_ms);
            return None;
        }
        if token_id.is_empty() {
            return None;
        }
        Some(token_id.to_string())
    }
}
