// ABOUTME: Chat route handler for the assistant conversation endpoint
// ABOUTME: Loads session history, runs one orchestrated turn and saves the updated history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Chat routes
//!
//! `POST /api/chat` runs one turn for the caller's session. Turns of the same
//! session are serialized so concurrent requests cannot lose history appends.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::session::SessionHandle;
use crate::constants::replies;
use crate::errors::{AppError, ErrorCode};
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message text
    #[serde(default)]
    pub message: String,
}

/// Chat reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply text
    pub response: String,
    /// Local time of the reply, RFC 3339
    pub timestamp: String,
}

impl ChatResponse {
    fn now(response: String) -> Self {
        Self {
            response,
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::send_message))
            .with_state(resources)
    }

    /// Handle one chat message
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<ChatRequest>, JsonRejection>,
    ) -> Response {
        let message = body.map(|Json(r)| r.message).unwrap_or_default();
        if message.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": replies::NO_MESSAGE_PROVIDED })),
            )
                .into_response();
        }

        let session = SessionHandle::resolve(&resources.cookie_signer, &headers);
        let mut response = match Self::run_turn(&resources, &session, &message).await {
            Ok(reply) => Json(ChatResponse::now(reply)).into_response(),
            Err(e) if e.code == ErrorCode::InvalidInput => e.into_response(),
            Err(e) => {
                error!(error = %e, "Chat turn failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ChatResponse::now(replies::INTERNAL_ERROR_APOLOGY.to_owned())),
                )
                    .into_response()
            }
        };

        session.attach_cookie(&resources, &mut response);
        response
    }

    /// Load, run and save one turn while holding the session lock
    async fn run_turn(
        resources: &ServerResources,
        session: &SessionHandle,
        message: &str,
    ) -> Result<String, AppError> {
        let start_time = Instant::now();
        let _turn = resources.session_locks.acquire(&session.key).await;

        let mut state = resources
            .sessions
            .get(&session.key)
            .await?
            .unwrap_or_default();
        let history = std::mem::take(&mut state.history);

        let outcome = resources.orchestrator.handle_turn(message, history).await?;

        state.history = outcome.history;
        resources.sessions.set(&session.key, state).await?;

        info!(
            intent = ?outcome.intent,
            new_session = session.is_new,
            elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Chat turn completed"
        );
        Ok(outcome.reply)
    }
}
