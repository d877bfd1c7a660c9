/// Authorization header parsing
///
/// Accepts exactly `<Scheme> <credential>`: scheme matched case-insensitively,
/// one space, then a non-empty credential without whitespace.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use subtle::ConstantTimeEq;

use crate::error::CredentialError;

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str, CredentialError> {
    extract_scheme(header, BEARER_SCHEME)
}

/// Extract the key from an `ApiKey <key>` header value
pub fn extract_api_key(header: Option<&str>) -> Result<&str, CredentialError> {
    extract_scheme(header, API_KEY_SCHEME)
}

fn extract_scheme<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, CredentialError> {
    let value = header.ok_or(CredentialError::MissingHeader)?;

    let (presented_scheme, credential) = value
        .split_once(' ')
        .ok_or(CredentialError::MalformedHeader)?;

    if !presented_scheme.eq_ignore_ascii_case(scheme)
        || credential.is_empty()
        || credential.chars().any(char::is_whitespace)
    {
        return Err(CredentialError::MalformedHeader);
    }

    Ok(credential)
}

/// Read the `Authorization` header as text
///
/// A header that is present but not visible ASCII is malformed, not missing.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, CredentialError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| CredentialError::MalformedHeader))
        .transpose()
}

/// Compare two API keys without leaking where they differ
pub fn api_keys_match(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
