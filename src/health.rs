// ABOUTME: Service health reporting for load balancer health checks and operators
// ABOUTME: Reports uptime and whether the completion and weather collaborators are configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check responses

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::SERVICE_NAME;

/// Overall health status
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Service is up but some collaborators are unusable
    Degraded,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Service information
    pub service: ServiceInfo,
    /// Individual component checks
    pub checks: Vec<ComponentHealth>,
    /// Response timestamp (Unix seconds)
    pub timestamp: u64,
}

/// Service information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Service uptime in seconds
    pub uptime_seconds: u64,
}

/// Individual component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Status description
    pub message: String,
}

impl ComponentHealth {
    fn configured(name: &str, configured: bool, missing_variable: &str) -> Self {
        if configured {
            Self {
                name: name.to_owned(),
                status: HealthStatus::Healthy,
                message: "Configured".to_owned(),
            }
        } else {
            Self {
                name: name.to_owned(),
                status: HealthStatus::Degraded,
                message: format!("{missing_variable} is not set"),
            }
        }
    }
}

/// Health checker for the assistant backend
pub struct HealthChecker {
    start_time: Instant,
    completion_configured: bool,
    weather_configured: bool,
}

impl HealthChecker {
    /// Create a health checker; uptime counts from now
    #[must_use]
    pub fn new(completion_configured: bool, weather_configured: bool) -> Self {
        Self {
            start_time: Instant::now(),
            completion_configured,
            weather_configured,
        }
    }

    /// Cheap health check without network calls
    #[must_use]
    pub fn basic_health(&self) -> HealthResponse {
        let checks = vec![
            ComponentHealth {
                name: "service".to_owned(),
                status: HealthStatus::Healthy,
                message: "Service is running".to_owned(),
            },
            ComponentHealth::configured(
                "completion_api",
                self.completion_configured,
                "OPENAI_API_KEY",
            ),
            ComponentHealth::configured(
                "weather_api",
                self.weather_configured,
                "OPENWEATHER_API_KEY",
            ),
        ];

        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthResponse {
            status,
            service: ServiceInfo {
                name: SERVICE_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                uptime_seconds: self.start_time.elapsed().as_secs(),
            },
            checks,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }
}
