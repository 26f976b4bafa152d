//! Caller credentials for the HTTP transports.
//!
//! The credential is the caller's own Perigon API key, accepted as
//! `Authorization: Bearer <key>`, an `x-api-key` header, or an `apiKey`
//! query parameter (browser `EventSource` cannot set headers).

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use super::api::ApiError;
use crate::error::DispatchError;

/// A caller-supplied Perigon API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw key; blank keys are rejected.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    /// The raw key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible identifier safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }

    /// Read the credential from request parts.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        if let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() {
            return Self::new(bearer.token());
        }

        if let Some(key) = parts.headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
            return Self::new(key);
        }

        let query = parts.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == "apiKey")
            .and_then(|(_, value)| Self::new(value.into_owned()))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.fingerprint()).finish()
    }
}

/// First 12 characters of the URL-safe base64 SHA-256 of a key.
#[must_use]
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}

/// Rejection for routes that require a credential.
#[derive(Debug)]
pub struct MissingCredential;

impl IntoResponse for MissingCredential {
    fn into_response(self) -> Response {
        ApiError::from(DispatchError::AuthenticationRequired).into_response()
    }
}

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = MissingCredential;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or(MissingCredential)
    }
}

impl<S> OptionalFromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
