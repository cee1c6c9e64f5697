// ABOUTME: ip-api.com client resolving a caller's approximate location from an IP address
// ABOUTME: Returns city, country, timezone and coordinates, or None when the lookup fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! IP geolocation via <https://ip-api.com>

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};
use crate::external::LocationLookup;

/// Location client configuration
#[derive(Debug, Clone)]
pub struct LocationClientConfig {
    /// Base URL (default: <http://ip-api.com>; the free tier is HTTP only)
    pub base_url: String,
    /// HTTP timeout in seconds (default: 5)
    pub timeout_secs: u64,
}

impl Default for LocationClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ip-api.com".to_owned(),
            timeout_secs: timeouts::LOCATION_HTTP_SECS,
        }
    }
}

/// Location resolved from an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLocation {
    /// City name
    pub city: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// IANA timezone (e.g. "Europe/London")
    pub timezone: Option<String>,
    /// Latitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    city: Option<String>,
    country: Option<String>,
    timezone: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// ip-api.com client
pub struct LocationClient {
    config: LocationClientConfig,
    http_client: Client,
}

impl LocationClient {
    /// Create a new location client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: LocationClientConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build location HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn lookup(&self, client_ip: Option<IpAddr>) -> AppResult<DetectedLocation> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = match client_ip {
            Some(ip) => format!("{base}/json/{ip}"),
            None => format!("{base}/json/"),
        };

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::external_service("ip-api", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                "ip-api",
                format!("Location request failed with HTTP {status}"),
            ));
        }

        let payload: IpApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("ip-api", format!("JSON parse error: {e}")))?;

        if payload.status.as_deref() == Some("fail") {
            let reason = payload.message.unwrap_or_else(|| "unknown".to_owned());
            return Err(AppError::external_service(
                "ip-api",
                format!("Lookup failed: {reason}"),
            ));
        }

        Ok(DetectedLocation {
            city: payload.city,
            country: payload.country,
            timezone: payload.timezone,
            lat: payload.lat,
            lon: payload.lon,
        })
    }
}

#[async_trait]
impl LocationLookup for LocationClient {
    async fn detect(&self, client_ip: Option<IpAddr>) -> Option<DetectedLocation> {
        match self.lookup(client_ip).await {
            Ok(location) => Some(location),
            Err(e) => {
                warn!("Location lookup failed: {}", e.message);
                None
            }
        }
    }
}
