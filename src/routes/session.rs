// ABOUTME: Session bootstrap routes and signed-cookie session resolution shared by handlers
// ABOUTME: Serves /api/init and /api/detect-location
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::constants::{SESSION_COOKIE_MAX_AGE_SECS, SESSION_COOKIE_NAME};
use crate::external::{RadioStation, WeatherRecord};
use crate::greeting::greeting_line;
use crate::resources::ServerResources;
use crate::security::{get_cookie_value, SecureCookieConfig, SessionCookieSigner};

/// City used in the greeting when none is known
const UNKNOWN_CITY: &str = "Unknown";

// ============================================================================
// Session resolution
// ============================================================================

/// Session key of the current request
pub struct SessionHandle {
    /// Opaque session key
    pub key: String,
    /// Whether the key was minted for this request
    pub is_new: bool,
}

impl SessionHandle {
    /// Session from a verified cookie, or a fresh one
    #[must_use]
    pub fn resolve(signer: &SessionCookieSigner, headers: &HeaderMap) -> Self {
        if let Some(key) = get_cookie_value(headers, SESSION_COOKIE_NAME)
            .and_then(|value| signer.verify(&value))
        {
            return Self { key, is_new: false };
        }
        debug!("Starting new session");
        Self {
            key: SessionCookieSigner::new_session_key(),
            is_new: true,
        }
    }

    /// Attach the session cookie to a response when the session is new
    pub fn attach_cookie(&self, resources: &ServerResources, response: &mut Response) {
        if !self.is_new {
            return;
        }
        SecureCookieConfig::new(
            SESSION_COOKIE_NAME,
            resources.cookie_signer.sign(&self.key),
            SESSION_COOKIE_MAX_AGE_SECS,
            resources.cookie_secure,
        )
        .apply(response.headers_mut());
    }
}

/// First public address in `X-Forwarded-For`
#[must_use]
pub fn forwarded_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .filter_map(|part| part.trim().parse::<IpAddr>().ok())
        .find(is_public)
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            // fc00::/7 unique local, fe80::/10 link local
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

/// Body of `POST /api/init`
#[derive(Debug, Default, Deserialize)]
pub struct InitRequest {
    /// City chosen or detected by the UI
    #[serde(default)]
    pub city: Option<String>,
    /// Country name
    #[serde(default)]
    pub country: Option<String>,
    /// IANA timezone
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Response of `POST /api/init`
#[derive(Debug, Serialize, Deserialize)]
pub struct InitResponse {
    /// Always true
    pub success: bool,
    /// City used for weather and greeting
    pub city: String,
    /// Country, if known
    pub country: Option<String>,
    /// Current weather (mock record when unavailable)
    pub weather: WeatherRecord,
    /// Time-of-day greeting
    pub greeting: String,
    /// Local hour used for the greeting
    pub hour: u32,
    /// Stations for the country
    pub radio_stations: Vec<RadioStation>,
}

// ============================================================================
// Session Routes
// ============================================================================

/// Session bootstrap routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/init", post(Self::init))
            .route("/api/detect-location", get(Self::detect_location))
            .with_state(resources)
    }

    /// Initialize the session with a location and return the dashboard payload
    ///
    /// Weather and radio are fetched before the session lock is taken so a slow
    /// upstream never blocks chat turns of the same session.
    async fn init(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<InitRequest>>,
    ) -> Response {
        let request = body.map(|Json(r)| r).unwrap_or_default();
        let session = SessionHandle::resolve(&resources.cookie_signer, &headers);

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let city_update = non_empty(request.city);
        let country_update = non_empty(request.country);
        let timezone_update = non_empty(request.timezone);

        let stored = match resources.sessions.get(&session.key).await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => return Self::init_failure(&e),
        };
        let city = city_update.clone().or(stored.city);
        let country = country_update.clone().or(stored.country);

        let weather_fut = async {
            match city.as_deref() {
                Some(city) => resources.weather.fetch(city).await,
                None => None,
            }
        };
        let radio_fut = async {
            match country.as_deref() {
                Some(country) => resources.radio.stations(country).await,
                None => Vec::new(),
            }
        };
        let (weather, radio_stations) = tokio::join!(weather_fut, radio_fut);

        let hour = Local::now().hour();
        let city = city.unwrap_or_else(|| UNKNOWN_CITY.to_owned());
        let payload = InitResponse {
            success: true,
            greeting: greeting_line(hour, &city),
            city,
            country,
            weather: weather.unwrap_or_else(WeatherRecord::mock),
            hour,
            radio_stations,
        };

        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(e) => return Self::init_failure(&e),
        };

        {
            let _turn = resources.session_locks.acquire(&session.key).await;
            // Reload: a chat turn may have saved history while upstreams were queried
            let mut state = match resources.sessions.get(&session.key).await {
                Ok(state) => state.unwrap_or_default(),
                Err(e) => return Self::init_failure(&e),
            };
            if city_update.is_some() {
                state.city = city_update;
            }
            if country_update.is_some() {
                state.country = country_update;
            }
            if timezone_update.is_some() {
                state.timezone = timezone_update;
            }
            if let Err(e) = resources.sessions.set(&session.key, state).await {
                return Self::init_failure(&e);
            }
        }

        info!(
            city = %payload.city,
            stations = payload.radio_stations.len(),
            new_session = session.is_new,
            "Session initialized"
        );

        let mut response = Json(body).into_response();
        session.attach_cookie(&resources, &mut response);
        response
    }

    fn init_failure(e: &dyn std::error::Error) -> Response {
        error!("Session init failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e.to_string() })),
        )
            .into_response()
    }

    /// Approximate location of the caller, or `{}`
    async fn detect_location(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let client_ip = forwarded_client_ip(&headers);
        let Some(location) = resources.location.detect(client_ip).await else {
            return Json(json!({})).into_response();
        };

        // Only sessions that already exist remember the detected location
        let session = SessionHandle::resolve(&resources.cookie_signer, &headers);
        if !session.is_new {
            let _turn = resources.session_locks.acquire(&session.key).await;
            let saved = match resources.sessions.get(&session.key).await {
                Ok(Some(mut state)) => {
                    state.set_location(&location);
                    resources.sessions.set(&session.key, state).await
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = saved {
                warn!(error = %e, "Detected location not saved to session");
            }
        }

        Json(location).into_response()
    }
}
