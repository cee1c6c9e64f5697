// ABOUTME: Radio route listing playable stations for a country
// ABOUTME: Serves /api/radio/:country, empty list when the directory is unreachable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::external::RadioStation;
use crate::resources::ServerResources;

/// Radio routes handler
pub struct RadioRoutes;

impl RadioRoutes {
    /// Create all radio routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/radio/:country", get(Self::stations))
            .with_state(resources)
    }

    async fn stations(
        State(resources): State<Arc<ServerResources>>,
        Path(country): Path<String>,
    ) -> Json<Vec<RadioStation>> {
        Json(resources.radio.stations(&country).await)
    }
}
