// ABOUTME: Security utilities for session handling
// ABOUTME: Exposes signed session cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Secure cookie utilities
pub mod cookies;

pub use cookies::{get_cookie_value, SameSitePolicy, SecureCookieConfig, SessionCookieSigner};
