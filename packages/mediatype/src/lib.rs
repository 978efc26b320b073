//! Wire formats for hypermedia documents.
//!
//! Each module turns the format-agnostic models from the `hypermedia` crate
//! into one concrete JSON dialect and back. [`HypermediaCodec`] dispatches on
//! [`hypermedia::MediaType`] so callers rarely need the modules directly.
//!
//! # Crate layout
//!
//! | Module | Media type |
//! |--------|------------|
//! | [`hal`] | `application/hal+json` |
//! | [`hal_forms`] | `application/prs.hal-forms+json` |
//! | [`uber`] | `application/vnd.amundsen-uber+json` |
//! | [`collection_json`] | `application/vnd.collection+json` |
//! | [`alps`] | `application/alps+json` profile descriptors |
//! | [`codec`] | Dispatch over the four representation formats |
//! | [`error`] | JSON error body shared with the HTTP layer |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use hypermedia::{EntityModel, Link, MediaType};
//! use hypermedia_mediatype::HypermediaCodec;
//!
//! let codec = HypermediaCodec::new();
//! let model = EntityModel::of(employee).add(Link::new("/employees/1"));
//! let json = codec.write_entity(MediaType::HalForms, &model)?;
//! ```

pub mod alps;
pub mod codec;
pub mod collection_json;
pub mod error;
pub mod hal;
pub mod hal_forms;
pub mod uber;

pub use alps::{AlpsDocument, Descriptor};
pub use codec::HypermediaCodec;
pub use collection_json::CollectionJsonDocument;
pub use error::ErrorResponse;
pub use hal::{HalConfiguration, HalContext, HalLinkDiscoverer, HalLinkObject, RenderSingleLinks};
pub use hal_forms::{HalFormsDocument, HalFormsProperty, HalFormsTemplate};
pub use uber::{UberData, UberDocument};
