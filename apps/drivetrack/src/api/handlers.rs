//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every operation is a single atomic document operation against the
//! roster; there are no multi-step transactions. Success responses carry
//! the pupil document; failures carry `{"error": message}` via `ApiError`.

use super::{
    AppState,
    types::{
        ApiError, ApiJson, CreatePupilRequest, HealthResponse, PupilJson, SendReportRequest,
        SendReportResponse, UpdatePupilRequest, pupil_id,
    },
};
use crate::mail::MailMessage;
use axum::{
    Json,
    extract::{Path, State},
};
use drivetrack_core::format_progress_report;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

// =============================================================================
// PUPIL CRUD HANDLERS
// =============================================================================

/// `GET /api/pupils` - all pupils in ascending id order.
pub async fn list_pupils_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PupilJson>>, ApiError> {
    let roster = state.roster.read().await;
    let pupils = roster.list()?;
    Ok(Json(pupils.into_iter().map(PupilJson::from).collect()))
}

/// `GET /api/pupils/{id}` - one pupil.
pub async fn get_pupil_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PupilJson>, ApiError> {
    let roster = state.roster.read().await;
    let pupil = roster.get(pupil_id(id))?;
    Ok(Json(pupil.into()))
}

/// `POST /api/pupils` - create a pupil.
pub async fn create_pupil_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePupilRequest>,
) -> Result<Json<PupilJson>, ApiError> {
    let draft = request.to_draft()?;
    let mut roster = state.roster.write().await;
    let pupil = roster.create(draft)?;
    tracing::info!(id = pupil.id.0, "pupil created");
    Ok(Json(pupil.into()))
}

/// `PATCH /api/pupils/{id}` - partial update; a supplied progress list
/// replaces the stored one wholesale.
pub async fn update_pupil_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ApiJson(request): ApiJson<UpdatePupilRequest>,
) -> Result<Json<PupilJson>, ApiError> {
    let patch = request.to_patch()?;
    let mut roster = state.roster.write().await;
    let pupil = roster.update(pupil_id(id), patch)?;
    Ok(Json(pupil.into()))
}

/// `DELETE /api/pupils/{id}` - remove and return the deleted pupil.
pub async fn delete_pupil_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PupilJson>, ApiError> {
    let mut roster = state.roster.write().await;
    let pupil = roster.delete(pupil_id(id))?;
    tracing::info!(id = pupil.id.0, "pupil deleted");
    Ok(Json(pupil.into()))
}

// =============================================================================
// REPORT HANDLERS
// =============================================================================

/// `POST /api/pupils/send-report` - dispatch a caller-rendered report.
///
/// Wire-compatible with the historic client, which renders the HTML itself
/// and posts `{to, subject, html}`. Sits behind the API-key middleware like
/// every other route; new clients should prefer the by-id variant below.
pub async fn send_report_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendReportRequest>,
) -> Result<Json<SendReportResponse>, ApiError> {
    let message = request.to_message()?;
    state.mailer.send(&message).await?;
    Ok(Json(SendReportResponse::ok()))
}

/// `POST /api/pupils/{id}/send-report` - render the report server-side
/// from the stored pupil and mail it to the pupil's own address.
pub async fn send_pupil_report_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SendReportResponse>, ApiError> {
    let pupil = {
        let roster = state.roster.read().await;
        roster.get(pupil_id(id))?
    };

    let html = format_progress_report(&pupil);
    let message = MailMessage::new(pupil.email, "Your Progress Report", html)?;
    state.mailer.send(&message).await?;
    Ok(Json(SendReportResponse::ok()))
}
