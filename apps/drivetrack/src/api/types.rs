//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! The wire format keeps the historic field names (`firstName`, `lastName`,
//! `eMail`, `progressRecords`, `createdAt`, `updatedAt`), and stages travel
//! as their fixed labels. Stage membership is checked here, at the API
//! boundary, so an unknown label is a 400 rather than a deserializer error.

use crate::mail::MailMessage;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use drivetrack_core::{
    DrivetrackError, ProgressRecord, Pupil, PupilDraft, PupilId, PupilPatch, Stage,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// PROGRESS RECORD (wire)
// =============================================================================

/// Wire representation of a progress record; the stage is a label string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecordJson {
    pub variable: String,
    pub stage: String,
}

impl ProgressRecordJson {
    /// Convert to a domain record, validating stage membership.
    pub fn to_record(&self) -> Result<ProgressRecord, DrivetrackError> {
        let stage: Stage = self.stage.parse()?;
        Ok(ProgressRecord::new(self.variable.clone(), stage))
    }
}

impl From<&ProgressRecord> for ProgressRecordJson {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            variable: record.variable.clone(),
            stage: record.stage.label().to_string(),
        }
    }
}

fn to_records(records: &[ProgressRecordJson]) -> Result<Vec<ProgressRecord>, DrivetrackError> {
    records.iter().map(|r| r.to_record()).collect()
}

// =============================================================================
// PUPIL (wire)
// =============================================================================

/// Wire representation of a pupil document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PupilJson {
    pub id: u64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "eMail")]
    pub email: String,
    #[serde(rename = "progressRecords")]
    pub progress_records: Vec<ProgressRecordJson>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Pupil> for PupilJson {
    fn from(pupil: Pupil) -> Self {
        Self {
            id: pupil.id.0,
            first_name: pupil.first_name,
            last_name: pupil.last_name,
            email: pupil.email,
            progress_records: pupil.progress_records.iter().map(Into::into).collect(),
            created_at: pupil.created_at,
            updated_at: pupil.updated_at,
        }
    }
}

// =============================================================================
// CREATE / UPDATE REQUESTS
// =============================================================================

/// `POST /api/pupils` body. Required fields are `Option` so that absence
/// maps to a validation error, not a deserializer rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePupilRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "eMail")]
    pub email: Option<String>,
    #[serde(rename = "progressRecords")]
    pub progress_records: Option<Vec<ProgressRecordJson>>,
}

impl CreatePupilRequest {
    /// Convert to a validated draft.
    ///
    /// Missing/empty required fields and unknown stage labels are
    /// `Validation` errors. An absent progress list yields an empty one.
    pub fn to_draft(&self) -> Result<PupilDraft, DrivetrackError> {
        let records = match &self.progress_records {
            Some(records) => to_records(records)?,
            None => Vec::new(),
        };

        let draft = PupilDraft::new(
            self.first_name.clone().unwrap_or_default(),
            self.last_name.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
        )
        .with_progress_records(records);
        draft.validate()?;
        Ok(draft)
    }
}

/// `PATCH /api/pupils/{id}` body; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePupilRequest {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "eMail")]
    pub email: Option<String>,
    #[serde(rename = "progressRecords")]
    pub progress_records: Option<Vec<ProgressRecordJson>>,
}

impl UpdatePupilRequest {
    /// Convert to a domain patch, validating any supplied stage labels.
    pub fn to_patch(&self) -> Result<PupilPatch, DrivetrackError> {
        let progress_records = match &self.progress_records {
            Some(records) => Some(to_records(records)?),
            None => None,
        };
        Ok(PupilPatch {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            progress_records,
        })
    }
}

// =============================================================================
// SEND REPORT
// =============================================================================

/// `POST /api/pupils/send-report` body: a fully-rendered report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendReportRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
}

impl SendReportRequest {
    /// Convert to a mail message, validating recipient and subject.
    pub fn to_message(&self) -> Result<MailMessage, DrivetrackError> {
        MailMessage::new(
            self.to.clone().unwrap_or_default(),
            self.subject.clone().unwrap_or_default(),
            self.html.clone().unwrap_or_default(),
        )
    }
}

/// Successful report dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReportResponse {
    pub success: bool,
}

impl SendReportResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// =============================================================================
// ERROR ENVELOPE
// =============================================================================

/// All errors reach the client as `{"error": message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler-level error: a domain error plus its HTTP mapping.
///
/// Mapping: Validation → 400, NotFound → 404, Mail → 502, everything
/// else (storage/serialization/io) → 500. Auth failures are produced by
/// the middleware and never reach this type.
#[derive(Debug)]
pub struct ApiError(pub DrivetrackError);

impl From<DrivetrackError> for ApiError {
    fn from(err: DrivetrackError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DrivetrackError::Validation(_) => StatusCode::BAD_REQUEST,
            DrivetrackError::NotFound(_) => StatusCode::NOT_FOUND,
            DrivetrackError::Mail(_) => StatusCode::BAD_GATEWAY,
            DrivetrackError::Storage(_)
            | DrivetrackError::Serialization(_)
            | DrivetrackError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// JSON body extractor that reports rejections in the standard envelope.
///
/// axum's own `Json` rejection is plain text; wrapping it here turns a
/// malformed or wrong-typed body into `ApiError(Validation)`, so every
/// client-visible failure is `{"error": message}`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(DrivetrackError::Validation(rejection.body_text()))),
        }
    }
}

/// Convenience for handlers needing a typed id.
#[must_use]
pub fn pupil_id(raw: u64) -> PupilId {
    PupilId(raw)
}

// =============================================================================
// TESTS
// =============================================================================
