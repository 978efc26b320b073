//! Hypermedia building blocks.
//!
//! This crate provides the format-agnostic model behind every hypermedia
//! document the workspace renders: links and relations, affordances and their
//! per-format projections, curies, and representation models. It is the
//! foundation for `hypermedia-mediatype` (wire formats), `hypermedia-server`
//! (axum integration) and the `hyperdoc` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`link`] | [`Link`], [`Links`], [`LinkRelation`], [`IanaLinkRelations`] |
//! | [`uri_template`] | RFC 6570 [`UriTemplate`] expansion |
//! | [`affordance`] | [`Affordance`], [`AffordanceBuilder`], [`HttpMethod`], [`QueryParameter`] |
//! | [`affordance_model`] | Per-format [`AffordanceModel`] projections |
//! | [`property`] | Input-type description via [`Describe`] and [`TypeDescriptor`] |
//! | [`relation`] | Type-to-relation mapping through [`LinkRelationProvider`] chains |
//! | [`curie`] | [`HalLinkRelation`] and [`CurieProvider`] namespacing |
//! | [`representation`] | [`EntityModel`], [`CollectionModel`], [`PageMetadata`] |
//! | [`embedded`] | [`EmbeddedWrapper`]s for explicitly keyed `_embedded` content |
//! | [`media_type`] | The supported [`MediaType`]s |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use hypermedia::{Affordance, EntityModel, HttpMethod, Link};
//!
//! let self_link = Link::new("/employees/1");
//! let update = Affordance::builder(&self_link)
//!     .method(HttpMethod::Put)
//!     .input_of::<Employee>()
//!     .build();
//!
//! let model = EntityModel::of(employee).add(self_link.and_affordance(update));
//! ```

pub mod affordance;
pub mod affordance_model;
pub mod curie;
pub mod embedded;
pub mod error;
pub mod link;
pub mod media_type;
pub mod property;
pub mod relation;
pub mod representation;
pub mod uri_template;

pub use affordance::{Affordance, AffordanceBuilder, HttpMethod, QueryParameter};
pub use affordance_model::{AffordanceModel, PropertyDescriptor, UberAction};
pub use curie::{Curie, CurieProvider, DefaultCurieProvider, HalLinkRelation};
pub use embedded::{EmbeddedWrapper, EmbeddedWrappers};
pub use error::{Error, Result};
pub use link::{IanaLinkRelations, Link, LinkRelation, Links};
pub use media_type::MediaType;
pub use property::{
    find_properties, simple_type_name, uncapitalize, Describe, PropertyMetadata, PropertyValue,
    TypeDescriptor,
};
pub use relation::{
    AnnotatedLinkRelationProvider, DefaultLinkRelationProvider, DelegatingLinkRelationProvider,
    EvoInflectorLinkRelationProvider, LinkRelationProvider, ResourceType,
};
pub use representation::{CollectionModel, EntityModel, HasLinks, PageMetadata, RepresentationModel};
pub use uri_template::UriTemplate;
