//! Rendering models as HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hypermedia::{CollectionModel, EntityModel, MediaType, RepresentationModel};
use hypermedia_mediatype::HypermediaCodec;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// A rendered hypermedia document plus its status and `Content-Type`.
///
/// Rendering happens eagerly in the constructors so that assembly failures
/// surface as [`AppError`]s instead of half-written bodies.
#[derive(Debug, Clone)]
pub struct Hypermedia {
    status: StatusCode,
    media: MediaType,
    location: Option<String>,
    body: Value,
}

impl Hypermedia {
    fn rendered(media: MediaType, body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            media,
            location: None,
            body,
        }
    }

    pub fn model(
        codec: &HypermediaCodec,
        media: MediaType,
        model: &RepresentationModel,
    ) -> Result<Self, AppError> {
        Ok(Self::rendered(media, codec.write_model(media, model)?))
    }

    pub fn entity<T: Serialize>(
        codec: &HypermediaCodec,
        media: MediaType,
        model: &EntityModel<T>,
    ) -> Result<Self, AppError> {
        Ok(Self::rendered(media, codec.write_entity(media, model)?))
    }

    pub fn collection<T: Serialize + 'static>(
        codec: &HypermediaCodec,
        media: MediaType,
        model: &CollectionModel<T>,
    ) -> Result<Self, AppError> {
        Ok(Self::rendered(media, codec.write_collection(media, model)?))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// `201 Created` with a `Location` header.
    pub fn created(mut self, location: impl Into<String>) -> Self {
        self.status = StatusCode::CREATED;
        self.location = Some(location.into());
        self
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for Hypermedia {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body.to_string()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.media.mime()),
        );
        if let Some(location) = self.location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            headers.insert(header::LOCATION, location);
        }
        response
    }
}
