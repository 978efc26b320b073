//! HAL-FORMS (`application/prs.hal-forms+json`).
//!
//! HAL plus a `_templates` object describing the non-GET transitions
//! available on the resource itself. Only affordances attached to the
//! resource's `self` link are considered, and each must target the self URI;
//! anything else is a configuration error surfaced as
//! [`Error::AffordanceMismatch`].
//!
//! ```json
//! {
//!   "name": "Frodo",
//!   "_links": { "self": { "href": "/employees/1" } },
//!   "_templates": {
//!     "default": { "method": "PUT", "properties": [ { "name": "name", "required": true } ] },
//!     "patchEmployee": { "method": "PATCH", "properties": [ { "name": "name" } ] }
//!   }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use hypermedia::{
    AffordanceModel, CollectionModel, EmbeddedWrapper, EntityModel, Error, HttpMethod, IanaLinkRelations, Link,
    Links, MediaType, PageMetadata, PropertyDescriptor, RepresentationModel, Result,
};

use crate::hal::{self, HalContext, EMBEDDED, LINKS, PAGE};

pub const TEMPLATES: &str = "_templates";

/// Key of the first template.
pub const DEFAULT_KEY: &str = "default";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One input field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalFormsProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl HalFormsProperty {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            value: None,
            prompt: None,
            regex: None,
            required: false,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<&PropertyDescriptor> for HalFormsProperty {
    fn from(descriptor: &PropertyDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            read_only: descriptor.read_only,
            value: None,
            prompt: descriptor.prompt.clone(),
            regex: descriptor.regex.clone(),
            required: descriptor.required,
        }
    }
}

/// A single `_templates` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalFormsTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<HalFormsProperty>,
}

impl HalFormsTemplate {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            title: None,
            method,
            content_type: None,
            properties: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_properties(mut self, properties: Vec<HalFormsProperty>) -> Self {
        self.properties = properties;
        self
    }

    pub fn and_property(mut self, property: HalFormsProperty) -> Self {
        self.properties.push(property);
        self
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An immutable HAL-FORMS document. Every `with_*`/`and_*` call returns a
/// new document and leaves the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalFormsDocument {
    content: Map<String, Value>,
    embedded: Vec<(String, Vec<Value>)>,
    links: Links,
    templates: Vec<(String, HalFormsTemplate)>,
    page: Option<PageMetadata>,
}

impl HalFormsDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A document whose top-level fields are `content`'s fields.
    pub fn for_resource<T: Serialize>(content: &T) -> Result<Self> {
        Ok(Self {
            content: hal::content_fields(content)?,
            ..Self::default()
        })
    }

    /// A document embedding already-rendered `items` under `rel`.
    pub fn for_resources(rel: impl Into<String>, items: Vec<Value>) -> Self {
        Self::empty().with_embedded(vec![(rel.into(), items)])
    }

    pub fn with_links(&self, links: Links) -> Self {
        Self {
            links,
            ..self.clone()
        }
    }

    pub fn and_link(&self, link: Link) -> Self {
        self.with_links(self.links.and(link))
    }

    pub fn with_templates(&self, templates: Vec<(String, HalFormsTemplate)>) -> Self {
        Self {
            templates,
            ..self.clone()
        }
    }

    /// Add or replace the template stored under `key`.
    pub fn and_template(&self, key: impl Into<String>, template: HalFormsTemplate) -> Self {
        let key = key.into();
        let mut templates = self.templates.clone();
        match templates.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = template,
            None => templates.push((key, template)),
        }
        self.with_templates(templates)
    }

    pub fn with_embedded(&self, embedded: Vec<(String, Vec<Value>)>) -> Self {
        Self {
            embedded,
            ..self.clone()
        }
    }

    pub fn and_embedded(&self, rel: impl Into<String>, item: Value) -> Self {
        let rel = rel.into();
        let mut embedded = self.embedded.clone();
        match embedded.iter_mut().find(|(r, _)| *r == rel) {
            Some((_, items)) => items.push(item),
            None => embedded.push((rel, vec![item])),
        }
        self.with_embedded(embedded)
    }

    pub fn with_page_metadata(&self, page: Option<PageMetadata>) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    pub fn page_metadata(&self) -> Option<&PageMetadata> {
        self.page.as_ref()
    }

    pub fn templates(&self) -> &[(String, HalFormsTemplate)] {
        &self.templates
    }

    pub fn default_template(&self) -> Option<&HalFormsTemplate> {
        self.template(DEFAULT_KEY)
    }

    pub fn template(&self, key: &str) -> Option<&HalFormsTemplate> {
        self.templates
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, t)| t)
    }

    /// Render with key order: content, `_embedded`, `_links`, `_templates`,
    /// `page`. Empty parts are omitted.
    pub fn to_value(&self, ctx: &HalContext<'_>) -> Result<Value> {
        let mut doc = self.content.clone();
        if !self.embedded.is_empty() {
            let embedded: Map<String, Value> = self
                .embedded
                .iter()
                .map(|(rel, items)| (rel.clone(), Value::Array(items.clone())))
                .collect();
            doc.insert(EMBEDDED.to_string(), Value::Object(embedded));
        }
        hal::insert_links(&mut doc, &self.links, ctx)?;
        if !self.templates.is_empty() {
            let mut templates = Map::new();
            for (key, template) in &self.templates {
                templates.insert(key.clone(), serde_json::to_value(template)?);
            }
            doc.insert(TEMPLATES.to_string(), Value::Object(templates));
        }
        if let Some(page) = &self.page {
            doc.insert(PAGE.to_string(), serde_json::to_value(page)?);
        }
        Ok(Value::Object(doc))
    }

    /// Parse a document. Templates that fail to parse are skipped with a
    /// warning rather than failing the whole document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let doc = hal::as_object(value, "HAL-FORMS document")?;
        let links = hal::read_links(doc.get(LINKS))?;

        let mut embedded = Vec::new();
        if let Some(value) = doc.get(EMBEDDED) {
            for (rel, items) in hal::as_object(value, EMBEDDED)? {
                let items = match items {
                    Value::Array(items) => items.clone(),
                    single => vec![single.clone()],
                };
                embedded.push((rel.clone(), items));
            }
        }

        let mut templates = Vec::new();
        if let Some(Value::Object(raw)) = doc.get(TEMPLATES) {
            for (key, raw_template) in raw {
                match serde_json::from_value::<HalFormsTemplate>(raw_template.clone()) {
                    Ok(template) => templates.push((key.clone(), template)),
                    Err(err) => warn!(template = %key, error = %err, "skipping unreadable template"),
                }
            }
        }

        let page = match doc.get(PAGE) {
            Some(page) => Some(serde_json::from_value(page.clone())?),
            None => None,
        };

        let content = doc
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), LINKS | EMBEDDED | TEMPLATES | PAGE))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            content,
            embedded,
            links,
            templates,
            page,
        })
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build `_templates` from the affordances on the self link.
///
/// GET affordances are skipped. Every remaining affordance must target the
/// self URI (compared after stripping optional template parts). The first
/// template is keyed `"default"`, later ones by affordance name.
pub fn find_templates(links: &Links) -> Result<Vec<(String, HalFormsTemplate)>> {
    let Some(self_link) = links.get_link(IanaLinkRelations::SELF) else {
        return Ok(Vec::new());
    };
    let self_uri = self_link.expand_empty().href;

    let mut templates: Vec<(String, HalFormsTemplate)> = Vec::new();
    for affordance in self_link.affordances() {
        if affordance.has_http_method(HttpMethod::Get) {
            continue;
        }
        let affordance_uri = affordance.uri();
        if affordance_uri != self_uri {
            return Err(Error::AffordanceMismatch {
                affordance_uri,
                self_uri,
            });
        }
        let Some(AffordanceModel::HalForms(model)) = affordance.model(MediaType::HalForms) else {
            continue;
        };

        let template = HalFormsTemplate::new(affordance.http_method())
            .with_properties(model.input_properties.iter().map(HalFormsProperty::from).collect());
        let key = if templates.is_empty() {
            DEFAULT_KEY.to_string()
        } else {
            affordance.name().to_string()
        };
        debug!(key = %key, method = %affordance.http_method(), "HAL-FORMS template");
        templates.push((key, template));
    }
    Ok(templates)
}

pub fn write_model(model: &RepresentationModel, ctx: &HalContext<'_>) -> Result<Value> {
    HalFormsDocument::empty()
        .with_links(model.links.clone())
        .with_templates(find_templates(&model.links)?)
        .to_value(ctx)
}

pub fn write_entity<T: Serialize>(model: &EntityModel<T>, ctx: &HalContext<'_>) -> Result<Value> {
    HalFormsDocument::for_resource(&model.content)?
        .with_links(model.links.clone())
        .with_templates(find_templates(&model.links)?)
        .to_value(ctx)
}

/// Items are rendered as HAL-FORMS entities, so each may carry its own
/// `_templates`.
pub fn write_collection<T: Serialize + 'static>(
    model: &CollectionModel<T>,
    ctx: &HalContext<'_>,
) -> Result<Value> {
    let mut doc = HalFormsDocument::empty();
    if !model.content.is_empty() {
        let items = model
            .content
            .iter()
            .map(|item| write_entity(item, ctx))
            .collect::<Result<Vec<_>>>()?;
        doc = HalFormsDocument::for_resources(hal::collection_rel::<T>(ctx), items);
    }
    doc.with_links(model.links.clone())
        .with_templates(find_templates(&model.links)?)
        .with_page_metadata(model.metadata)
        .to_value(ctx)
}

/// Wrapped `_embedded` content plus the self link's templates. Every
/// embedded relation renders as an array.
pub fn write_wrapped(
    wrappers: &[EmbeddedWrapper],
    links: &Links,
    ctx: &HalContext<'_>,
) -> Result<Value> {
    let embedded = hal::embedded_from_wrappers(wrappers, ctx)?
        .into_iter()
        .map(|(rel, value)| match value {
            Value::Array(items) => (rel, items),
            single => (rel, vec![single]),
        })
        .collect();
    HalFormsDocument::empty()
        .with_embedded(embedded)
        .with_links(links.clone())
        .with_templates(find_templates(links)?)
        .to_value(ctx)
}

/// Reading ignores `_templates`: they describe requests, not state.
pub fn read_model(value: &Value) -> Result<RepresentationModel> {
    hal::read_model(value)
}

pub fn read_entity<T: DeserializeOwned>(value: &Value) -> Result<EntityModel<T>> {
    hal::read_entity(value)
}

pub fn read_collection<T: DeserializeOwned>(value: &Value) -> Result<CollectionModel<T>> {
    hal::read_collection(value)
}

// --- tests -------------------------------------------------------------------
