//! # Drivetrack HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /api/pupils` - All pupils
//! - `GET /api/pupils/{id}` - One pupil
//! - `POST /api/pupils` - Create a pupil
//! - `PATCH /api/pupils/{id}` - Partial update
//! - `DELETE /api/pupils/{id}` - Remove a pupil (returns the document)
//! - `POST /api/pupils/send-report` - Dispatch a caller-rendered report
//! - `POST /api/pupils/{id}/send-report` - Render and dispatch a report
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `DRIVETRACK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `DRIVETRACK_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `DRIVETRACK_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `drivetrack::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    create_pupil_handler, delete_pupil_handler, get_pupil_handler, health_handler,
    list_pupils_handler, send_pupil_report_handler, send_report_handler, update_pupil_handler,
};
#[allow(unused_imports)]
pub use types::{
    ApiError, ApiJson, CreatePupilRequest, ErrorResponse, HealthResponse, ProgressRecordJson,
    PupilJson, SendReportRequest, SendReportResponse, UpdatePupilRequest,
};

use crate::mail::Mailer;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use drivetrack_core::{DrivetrackError, Roster};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the roster and the mail dispatcher.
#[derive(Clone)]
pub struct AppState {
    /// The roster owning the pupil store.
    pub roster: Arc<RwLock<Roster>>,
    /// The configured mail dispatcher.
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create new app state around a roster and mailer.
    #[must_use]
    pub fn new(roster: Roster, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            roster: Arc::new(RwLock::new(roster)),
            mailer,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `DRIVETRACK_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("DRIVETRACK_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            // Explicit wildcard - warn about security implications
            tracing::warn!(
                "CORS: Allowing ALL origins (DRIVETRACK_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in DRIVETRACK_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PATCH,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            // No configuration - default to localhost only (restrictive)
            tracing::info!("CORS: No DRIVETRACK_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:4000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:4000".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set DRIVETRACK_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/pupils",
            get(handlers::list_pupils_handler).post(handlers::create_pupil_handler),
        )
        .route("/api/pupils/send-report", post(handlers::send_report_handler))
        .route(
            "/api/pupils/{id}",
            get(handlers::get_pupil_handler)
                .patch(handlers::update_pupil_handler)
                .delete(handlers::delete_pupil_handler),
        )
        .route(
            "/api/pupils/{id}/send-report",
            post(handlers::send_pupil_report_handler),
        );

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    roster: Roster,
    mailer: Arc<dyn Mailer>,
) -> Result<(), DrivetrackError> {
    let state = AppState::new(roster, mailer);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DrivetrackError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Drivetrack HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| DrivetrackError::Io(format!("Server error: {}", e)))
}
