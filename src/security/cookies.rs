// ABOUTME: Signed session cookie utilities for the assistant's anonymous sessions
// ABOUTME: Builds HttpOnly SameSite cookies and signs session keys with HMAC-SHA256
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Secure cookie utilities
//!
//! The session cookie value is `{session_key}.{hex(hmac)}`. A cookie whose
//! signature does not verify is treated as absent and the caller starts a
//! new session.

use std::fmt::Write;

use axum::http::{header, HeaderMap, HeaderValue};
use ring::hmac;
use uuid::Uuid;

/// Cookie security configuration
pub struct SecureCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Max-Age in seconds
    pub max_age_secs: i64,
    /// `HttpOnly` flag (prevents JavaScript access)
    pub http_only: bool,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// `SameSite` policy
    pub same_site: SameSitePolicy,
    /// Cookie path
    pub path: String,
}

/// `SameSite` cookie policy
#[derive(Debug, Clone, Copy)]
pub enum SameSitePolicy {
    /// Strict: Cookie only sent in first-party context
    Strict,
    /// Lax: Cookie sent on top-level navigation
    Lax,
    /// None: Cookie sent in all contexts (requires Secure=true)
    None,
}

impl SecureCookieConfig {
    /// `HttpOnly`, `SameSite=Lax`, `Path=/` cookie
    ///
    /// `secure` should be false only for plain HTTP deployments, where
    /// browsers refuse to store `Secure` cookies.
    #[must_use]
    pub fn new(name: &str, value: String, max_age_secs: i64, secure: bool) -> Self {
        Self {
            name: name.to_owned(),
            value,
            max_age_secs,
            http_only: true,
            secure,
            same_site: SameSitePolicy::Lax,
            path: "/".to_owned(),
        }
    }

    /// Build the Set-Cookie header value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!("{}={}", self.name, self.value);

        let _ = write!(cookie, "; Max-Age={}", self.max_age_secs);
        let _ = write!(cookie, "; Path={}", self.path);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }

        match self.same_site {
            SameSitePolicy::Strict => cookie.push_str("; SameSite=Strict"),
            SameSitePolicy::Lax => cookie.push_str("; SameSite=Lax"),
            SameSitePolicy::None => cookie.push_str("; SameSite=None"),
        }

        cookie
    }

    /// Append this cookie to response headers
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(header_value) = HeaderValue::from_str(&self.build()) {
            headers.append(header::SET_COOKIE, header_value);
        }
    }
}

/// Signs and verifies session keys carried in cookies
pub struct SessionCookieSigner {
    key: hmac::Key,
}

impl SessionCookieSigner {
    /// Create a signer from a secret
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    /// Fresh random session key
    #[must_use]
    pub fn new_session_key() -> String {
        Uuid::new_v4().to_string()
    }

    /// Cookie value for `session_key`
    #[must_use]
    pub fn sign(&self, session_key: &str) -> String {
        let tag = hmac::sign(&self.key, session_key.as_bytes());
        format!("{session_key}.{}", hex::encode(tag.as_ref()))
    }

    /// Session key carried by `cookie_value` if its signature verifies
    #[must_use]
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (session_key, signature) = cookie_value.rsplit_once('.')?;
        if session_key.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        hmac::verify(&self.key, session_key.as_bytes(), &signature).ok()?;
        Some(session_key.to_owned())
    }
}

/// Extract cookie value from request headers
///
/// # Arguments
/// * `headers` - Request headers
/// * `cookie_name` - Name of cookie to extract
///
/// # Returns
/// Cookie value if found, None otherwise
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_owned())
        })
}
