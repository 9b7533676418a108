//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{CampaignSummary, EventRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub campaign_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /campaigns/:id/events`
///
/// Returns all indexed events for the given campaign identifier.
pub async fn get_campaign_events(
    State(state): State<Arc<ApiState>>,
    Path(campaign_id): Path<String>,
) -> impl IntoResponse {
    match db::get_events_for_campaign(&state.pool, &campaign_id).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(serde_json::json!(EventsResponse {
                    campaign_id,
                    count,
                    events,
                })),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /campaigns/:id/summary`
///
/// Folds the campaign's events into its current totals. 404 when no event
/// for the campaign has been indexed.
pub async fn get_campaign_summary(
    State(state): State<Arc<ApiState>>,
    Path(campaign_id): Path<String>,
) -> impl IntoResponse {
    match db::get_events_for_campaign(&state.pool, &campaign_id).await {
        Ok(events) => match CampaignSummary::from_events(&campaign_id, &events) {
            Some(summary) => (StatusCode::OK, Json(serde_json::json!(summary))).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!(ErrorResponse {
                    error: format!("no events indexed for campaign {campaign_id}"),
                })),
            )
                .into_response(),
        },
        Err(e) => internal_error(e),
    }
}

/// `GET /events`
///
/// Returns all indexed events across all campaigns.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match db::get_all_events(&state.pool).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(serde_json::json!(AllEventsResponse { count, events })),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: IndexerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!(ErrorResponse {
            error: e.to_string()
        })),
    )
        .into_response()
}
