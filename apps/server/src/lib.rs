//! # Madang Server
//!
//! JSON HTTP API for the bookstore.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/books?title=축구&page=2                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CorsLayer ─► TraceLayer ─► Router                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  handler(State<Arc<AppState>>, CurrentUser, Query<Params>)              │
//! │       │  1. capability check (writes only)                              │
//! │       │  2. validation (payloads, month)                                │
//! │       │  3. repository call                                             │
//! │       ▼                                                                 │
//! │  ApiResponse {"success": true, "data": ...}                             │
//! │  ApiError    {"success": false, "error": "...", "code": "..."}          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod session;

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderName, Method};
use axum::Router;
use chrono::{Local, NaiveDate};
use madang_db::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::session::{SessionStore, SESSION_HEADER};

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionStore>,
    pub config: ServerConfig,
    pub started_at: Instant,
    /// Overrides the local calendar date (tests).
    pub fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_timeout()));
        AppState {
            db,
            sessions,
            config,
            started_at: Instant::now(),
            fixed_today: None,
        }
    }

    /// Pins "today" for order dates and relative reports.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The date new orders are stamped with.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Builds the application router with CORS and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    let session_header = HeaderName::from_static(SESSION_HEADER);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, session_header.clone()])
        .expose_headers([session_header]);

    Router::new()
        .nest("/api", routes::api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
