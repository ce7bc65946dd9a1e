//! Error responses.
//!
//! Batch-level failures become plain-text 4xx responses. Per-URL failures
//! never reach this module; they travel inside a 200 result array.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::fetch::RequestError;
use crate::observability::metrics;

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::InvalidJson(_)
            | RequestError::NoUrls
            | RequestError::TooManyUrls { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        metrics::record_rejection(self.reason());
        let status = self.status_code();
        let body = self.to_string();

        if status == StatusCode::METHOD_NOT_ALLOWED {
            (status, [(header::ALLOW, "POST")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = RequestError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Only POST requests are allowed");
    }

    #[test]
    fn test_bad_request_statuses() {
        assert_eq!(RequestError::NoUrls.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RequestError::InvalidJson("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::TooManyUrls { count: 3, max: 2 }.status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
