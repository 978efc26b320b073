//! Format-dispatching entry point.
//!
//! [`HypermediaCodec`] is immutable after construction and meant to be built
//! once at startup and shared (`Arc<HypermediaCodec>`) across request
//! handlers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use hypermedia::{
    CollectionModel, CurieProvider, DelegatingLinkRelationProvider, EmbeddedWrapper, EntityModel,
    Error, LinkRelationProvider, Links, MediaType, RepresentationModel, Result,
};

use crate::hal::{self, HalConfiguration, HalContext};
use crate::{collection_json, hal_forms, uber};

/// Renders and reads models in any supported [`MediaType`].
#[derive(Clone)]
pub struct HypermediaCodec {
    hal: HalConfiguration,
    curie_provider: Option<Arc<dyn CurieProvider>>,
    relation_provider: Arc<dyn LinkRelationProvider>,
}

impl Default for HypermediaCodec {
    fn default() -> Self {
        Self {
            hal: HalConfiguration::default(),
            curie_provider: None,
            relation_provider: Arc::new(DelegatingLinkRelationProvider::default()),
        }
    }
}

impl std::fmt::Debug for HypermediaCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypermediaCodec")
            .field("hal", &self.hal)
            .field("curies", &self.curie_provider.is_some())
            .finish()
    }
}

impl HypermediaCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hal_configuration(mut self, configuration: HalConfiguration) -> Self {
        self.hal = configuration;
        self
    }

    pub fn with_curie_provider(mut self, provider: Arc<dyn CurieProvider>) -> Self {
        self.curie_provider = Some(provider);
        self
    }

    pub fn with_relation_provider(mut self, provider: Arc<dyn LinkRelationProvider>) -> Self {
        self.relation_provider = provider;
        self
    }

    pub fn hal_configuration(&self) -> &HalConfiguration {
        &self.hal
    }

    fn hal_context(&self) -> HalContext<'_> {
        HalContext {
            configuration: &self.hal,
            curie_provider: self.curie_provider.as_deref(),
            relation_provider: self.relation_provider.as_ref(),
        }
    }

    // --- writing ---

    pub fn write_model(&self, media: MediaType, model: &RepresentationModel) -> Result<Value> {
        debug!(media = %media, links = model.links.len(), "writing model");
        match media {
            MediaType::Hal => hal::write_model(model, &self.hal_context()),
            MediaType::HalForms => hal_forms::write_model(model, &self.hal_context()),
            MediaType::Uber => uber::write_model(model),
            MediaType::CollectionJson => collection_json::write_model(model),
        }
    }

    pub fn write_entity<T: Serialize>(
        &self,
        media: MediaType,
        model: &EntityModel<T>,
    ) -> Result<Value> {
        debug!(media = %media, links = model.links.len(), "writing entity");
        match media {
            MediaType::Hal => hal::write_entity(model, &self.hal_context()),
            MediaType::HalForms => hal_forms::write_entity(model, &self.hal_context()),
            MediaType::Uber => uber::write_entity(model),
            MediaType::CollectionJson => collection_json::write_entity(model),
        }
    }

    pub fn write_collection<T: Serialize + 'static>(
        &self,
        media: MediaType,
        model: &CollectionModel<T>,
    ) -> Result<Value> {
        debug!(media = %media, items = model.len(), "writing collection");
        match media {
            MediaType::Hal => hal::write_collection(model, &self.hal_context()),
            MediaType::HalForms => hal_forms::write_collection(model, &self.hal_context()),
            MediaType::Uber => uber::write_collection(model),
            MediaType::CollectionJson => collection_json::write_collection(model),
        }
    }

    /// Render explicitly keyed `_embedded` content. Only the HAL family has
    /// an `_embedded` container.
    pub fn write_wrapped(
        &self,
        media: MediaType,
        wrappers: &[EmbeddedWrapper],
        links: &Links,
    ) -> Result<Value> {
        debug!(media = %media, wrappers = wrappers.len(), "writing embedded wrappers");
        match media {
            MediaType::Hal => hal::write_wrapped(wrappers, links, &self.hal_context()),
            MediaType::HalForms => hal_forms::write_wrapped(wrappers, links, &self.hal_context()),
            MediaType::Uber | MediaType::CollectionJson => Err(Error::UnsupportedMediaType(format!(
                "{media} cannot carry embedded wrappers"
            ))),
        }
    }

    // --- reading ---

    pub fn read_model(&self, media: MediaType, text: &str) -> Result<RepresentationModel> {
        let value: Value = serde_json::from_str(text)?;
        match media {
            MediaType::Hal => hal::read_model(&value),
            MediaType::HalForms => hal_forms::read_model(&value),
            MediaType::Uber => uber::read_model(&value),
            MediaType::CollectionJson => collection_json::read_model(&value),
        }
    }

    pub fn read_entity<T: DeserializeOwned>(
        &self,
        media: MediaType,
        text: &str,
    ) -> Result<EntityModel<T>> {
        let value: Value = serde_json::from_str(text)?;
        match media {
            MediaType::Hal => hal::read_entity(&value),
            MediaType::HalForms => hal_forms::read_entity(&value),
            MediaType::Uber => uber::read_entity(&value),
            MediaType::CollectionJson => collection_json::read_entity(&value),
        }
    }

    pub fn read_collection<T: DeserializeOwned>(
        &self,
        media: MediaType,
        text: &str,
    ) -> Result<CollectionModel<T>> {
        let value: Value = serde_json::from_str(text)?;
        match media {
            MediaType::Hal => hal::read_collection(&value),
            MediaType::HalForms => hal_forms::read_collection(&value),
            MediaType::Uber => uber::read_collection(&value),
            MediaType::CollectionJson => collection_json::read_collection(&value),
        }
    }

    pub fn to_string_pretty(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

// --- tests -------------------------------------------------------------------
