//! Error type shared by the model and every representation format.

use thiserror::Error;

/// Errors raised while building, rendering, or reading hypermedia documents.
///
/// Most "no data" situations are not errors: a missing self link, an empty
/// affordance list, or absent page metadata simply render as omitted fields.
#[derive(Debug, Error)]
pub enum Error {
    /// An affordance attached to a resource's self link targets a different
    /// URI. HAL-FORMS templates only describe operations on the resource
    /// itself, so this is a configuration error and is never skipped.
    #[error(
        "affordance URI {affordance_uri:?} doesn't match self link {self_uri:?} \
         as expected in HAL-FORMS"
    )]
    AffordanceMismatch {
        affordance_uri: String,
        self_uri: String,
    },

    /// An empty collection was embedded without an explicit relation, so
    /// there is no element type to derive one from.
    #[error("cannot embed an empty collection without an explicit relation")]
    EmptyEmbeddedCollection,

    /// A link required by the caller is not present.
    #[error("no link with rel {0:?} found")]
    MissingLink(String),

    /// A document could be parsed as JSON but does not have the shape of the
    /// format it claims to be.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The media type is unknown or cannot carry the requested model.
    #[error("unsupported media type {0:?}")]
    UnsupportedMediaType(String),

    /// The payload could not be converted to or from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the hypermedia crates.
pub type Result<T> = std::result::Result<T, Error>;
