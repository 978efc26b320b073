//! Public surface for the `hypermedia-server` crate.
//!
//! Exposes the axum integration pieces (request context, link builders,
//! assemblers, response wrapper) and the demo router so that external crates
//! (e.g. the conformance test suite) can spin up an in-process service
//! without spawning a subprocess.

pub mod assembler;
pub mod config;
pub mod context;
pub mod demo;
pub mod error;
pub mod link_builder;
pub mod response;
pub mod router;

pub use assembler::{
    Identifiable, IdentifiableModelAssembler, ReactiveAssembler,
    ReactiveRepresentationModelAssembler, RepresentationModelAssembler,
    SimpleRepresentationModelAssembler,
};
pub use config::{ConfigError, HypermediaConfig};
pub use context::RequestContext;
pub use demo::EmployeeStore;
pub use error::AppError;
pub use link_builder::{afford, LinkBuilder, Route};
pub use response::Hypermedia;
pub use router::build_router;
