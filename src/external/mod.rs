// ABOUTME: External API collaborators consumed by the chat core and the route layer
// ABOUTME: Defines lookup traits for weather, location and radio plus their HTTP implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External service clients
//!
//! Every collaborator here is unreliable by nature. The traits expose
//! failure as absence (`None` or an empty list) rather than as an error, and
//! each consumer decides its own fallback.

use std::net::IpAddr;

use async_trait::async_trait;

/// ip-api.com geolocation client
pub mod location_client;
/// Radio Browser station directory client
pub mod radio_client;
/// speedtest-cli subprocess runner
pub mod speed_test;
/// OpenWeatherMap current weather client
pub mod weather_client;

pub use location_client::{DetectedLocation, LocationClient, LocationClientConfig};
pub use radio_client::{RadioClient, RadioClientConfig, RadioStation};
pub use speed_test::{SpeedTestConfig, SpeedTestOutcome, SpeedTestReport, SpeedTestRunner};
pub use weather_client::{WeatherClient, WeatherClientConfig, WeatherRecord};

/// Current weather by city name
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Current conditions for `city`, or `None` when they cannot be obtained
    async fn fetch(&self, city: &str) -> Option<WeatherRecord>;
}

/// Approximate location of a client
#[async_trait]
pub trait LocationLookup: Send + Sync {
    /// Location for `client_ip` (or the caller's own address when `None`)
    async fn detect(&self, client_ip: Option<IpAddr>) -> Option<DetectedLocation>;
}

/// Radio stations by country
#[async_trait]
pub trait RadioDirectory: Send + Sync {
    /// Playable stations for `country`; empty when the directory is unreachable
    async fn stations(&self, country: &str) -> Vec<RadioStation>;
}
