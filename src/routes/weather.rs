// ABOUTME: Weather route returning current conditions for a city
// ABOUTME: Serves /api/weather/:city with an error body when the lookup fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::constants::replies;
use crate::resources::ServerResources;

/// Weather routes handler
pub struct WeatherRoutes;

impl WeatherRoutes {
    /// Create all weather routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/weather/:city", get(Self::current_weather))
            .with_state(resources)
    }

    /// Failures answer 200 with `{"error": ...}`; the UI branches on the body
    async fn current_weather(
        State(resources): State<Arc<ServerResources>>,
        Path(city): Path<String>,
    ) -> Response {
        match resources.weather.fetch(&city).await {
            Some(record) => Json(record).into_response(),
            None => Json(json!({ "error": replies::WEATHER_UNAVAILABLE })).into_response(),
        }
    }
}
