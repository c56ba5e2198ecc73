//! Success envelope: `{"success": true, "data": ...}`.

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Successful handler result.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip)]
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
            headers: Vec::new(),
        }
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let ApiResponse {
            success,
            data,
            headers,
        } = self;
        let mut response = Json(ApiResponse {
            success,
            data,
            headers: Vec::new(),
        })
        .into_response();
        for (name, value) in headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}
