//! Authorization headers for the JIRA Cloud REST API
//!
//! JIRA Cloud accepts Basic auth with an account email and an API token.

use crate::{Result, SyncError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE};

/// Base64 of `username:api_token`, the payload of a Basic auth header
pub fn basic_credentials(username: &str, api_token: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, api_token))
}

/// Build the fixed header set sent with every JIRA request
///
/// Produces `Authorization: Basic <b64>`, `Content-Type: application/json`,
/// `Accept: */*` and `Accept-Encoding: gzip, deflate, br`.
pub fn build_headers(username: &str, api_token: &str) -> Result<HeaderMap> {
    let mut authorization = HeaderValue::from_str(&format!(
        "Basic {}",
        basic_credentials(username, api_token)
    ))
    .map_err(|e| SyncError::Auth(format!("Invalid authorization header: {}", e)))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_is_basic_base64() {
        let pairs = [
            ("jane@example.com", "ATATT3xFfGF0"),
            ("bot", ""),
            ("", "token-only"),
            ("ünïcødé@example.com", "p:a:s:s"),
        ];

        for (username, token) in pairs {
            let headers = build_headers(username, token).unwrap();
            let expected = format!("Basic {}", STANDARD.encode(format!("{}:{}", username, token)));
            assert_eq!(headers.get(AUTHORIZATION).unwrap().to_str().unwrap(), expected);
        }
    }

    #[test]
    fn test_known_encoding() {
        // "user:token" in base64
        assert_eq!(basic_credentials("user", "token"), "dXNlcjp0b2tlbg==");
    }

    #[test]
    fn test_fixed_headers() {
        let headers = build_headers("user", "token").unwrap();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "*/*");
        assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "gzip, deflate, br");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }
}
