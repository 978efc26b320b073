//! Application-level error type returned by handlers.
//!
//! All variants serialise to the shared [`ErrorResponse`] JSON format and
//! map to the appropriate HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hypermedia_mediatype::error::{codes, ErrorResponse};
use tracing::warn;

use crate::assembler::AssemblyError;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// A failure raised while building or reading a hypermedia document.
    Hypermedia(hypermedia::Error),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(codes::NOT_FOUND, msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(codes::INVALID_DOCUMENT, msg))
            }
            AppError::Hypermedia(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    warn!("hypermedia rendering failed: {err}");
                }
                (status, ErrorResponse::from(&err))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(codes::INTERNAL_ERROR, msg),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &hypermedia::Error) -> StatusCode {
    match err {
        hypermedia::Error::InvalidDocument(_) | hypermedia::Error::Json(_) => StatusCode::BAD_REQUEST,
        hypermedia::Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        hypermedia::Error::AffordanceMismatch { .. }
        | hypermedia::Error::MissingLink(_)
        | hypermedia::Error::EmptyEmbeddedCollection => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<hypermedia::Error> for AppError {
    fn from(e: hypermedia::Error) -> Self {
        AppError::Hypermedia(e)
    }
}

impl From<AssemblyError> for AppError {
    fn from(e: AssemblyError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn affordance_mismatch_is_a_server_error() {
        let (status, body) = body_of(AppError::from(hypermedia::Error::AffordanceMismatch {
            affordance_uri: "/a".into(),
            self_uri: "/b".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "affordance_mismatch");
    }

    #[tokio::test]
    async fn invalid_document_is_a_client_error() {
        let (status, body) =
            body_of(AppError::from(hypermedia::Error::InvalidDocument("no items".into()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid_document");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_of(AppError::NotFound("employee 9 not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "not_found");
        assert_eq!(body.error, "employee 9 not found");
    }
}
