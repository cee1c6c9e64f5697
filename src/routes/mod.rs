// ABOUTME: Route module organization for the assistant HTTP endpoints
// ABOUTME: Merges per-domain routers and applies tracing, request id, CORS and timeout layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the assistant backend
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the chat core and the collaborators held in
//! [`ServerResources`].

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::HeaderName;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::constants::timeouts;
use crate::resources::ServerResources;

// ═══════════════════════════════════════════════════════════════
// Core infrastructure
// ═══════════════════════════════════════════════════════════════

/// Health check route
pub mod health;
/// Embedded index page
pub mod page;

// ═══════════════════════════════════════════════════════════════
// Assistant API
// ═══════════════════════════════════════════════════════════════

/// Chat turn route
pub mod chat;
/// Radio station route
pub mod radio;
/// Session bootstrap routes and cookie session resolution
pub mod session;
/// Weather route
pub mod weather;

pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use page::PageRoutes;
pub use radio::RadioRoutes;
pub use session::SessionRoutes;
pub use speed_test::SpeedTestRoutes;
pub use weather::WeatherRoutes;

/// Request id header set on every request and echoed on every response
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Complete application router with middleware
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(PageRoutes::routes())
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(SessionRoutes::routes(Arc::clone(resources)))
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(WeatherRoutes::routes(Arc::clone(resources)))
        .merge(RadioRoutes::routes(Arc::clone(resources)))
        .merge(SpeedTestRoutes::routes(Arc::clone(resources)))
        // Layers apply bottom-up: the request id exists before the trace span opens
        .layer(TimeoutLayer::new(Duration::from_secs(
            timeouts::HTTP_REQUEST_SECS,
        )))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
