//! HAL (`application/hal+json`).
//!
//! # Document shape
//!
//! | Key | Present when |
//! |-----|--------------|
//! | content fields | entity documents; scalar content goes under `value` |
//! | `_embedded` | collection documents with at least one item |
//! | `_links` | at least one link |
//! | `page` | collection documents with page metadata |
//!
//! `_links` groups links by (possibly curied) relation in first-occurrence
//! order. A relation with a single link renders as an object unless the
//! [`HalConfiguration`] asks for an array; `curies` is appended only when a
//! curie provider is configured and at least one key actually got curied.

pub mod discoverer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use hypermedia::{
    CollectionModel, CurieProvider, EmbeddedWrapper, EntityModel, Error, HalLinkRelation, Link, LinkRelation,
    LinkRelationProvider, Links, PageMetadata, RepresentationModel, ResourceType, Result,
};

pub use discoverer::HalLinkDiscoverer;

pub const LINKS: &str = "_links";
pub const EMBEDDED: &str = "_embedded";
pub const CURIES: &str = "curies";
pub const PAGE: &str = "page";

/// Key used for scalar entity content.
pub const VALUE: &str = "value";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a relation with exactly one link is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderSingleLinks {
    /// `"rel": { "href": ... }`
    #[default]
    AsSingle,
    /// `"rel": [ { "href": ... } ]`
    AsArray,
}

impl std::str::FromStr for RenderSingleLinks {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" | "as_single" => Ok(RenderSingleLinks::AsSingle),
            "array" | "as_array" => Ok(RenderSingleLinks::AsArray),
            _ => Err(format!(
                "unknown link rendering {:?}; expected one of: single, array",
                s
            )),
        }
    }
}

/// HAL rendering options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalConfiguration {
    render_single_links: RenderSingleLinks,
    single_link_overrides: Vec<(String, RenderSingleLinks)>,
}

impl HalConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_single_links(&self, render: RenderSingleLinks) -> Self {
        Self {
            render_single_links: render,
            single_link_overrides: self.single_link_overrides.clone(),
        }
    }

    /// Override the rendering for one relation. The relation is matched
    /// against the rendered `_links` key, so curied relations need their
    /// prefix.
    pub fn with_render_single_links_for(
        &self,
        rel: impl Into<String>,
        render: RenderSingleLinks,
    ) -> Self {
        let rel = rel.into();
        let mut overrides: Vec<_> = self
            .single_link_overrides
            .iter()
            .filter(|(r, _)| *r != rel)
            .cloned()
            .collect();
        overrides.push((rel, render));
        Self {
            render_single_links: self.render_single_links,
            single_link_overrides: overrides,
        }
    }

    pub fn render_single_links(&self) -> RenderSingleLinks {
        self.render_single_links
    }

    pub fn single_link_render_for(&self, rel: &str) -> RenderSingleLinks {
        self.single_link_overrides
            .iter()
            .find(|(r, _)| r == rel)
            .map(|(_, render)| *render)
            .unwrap_or(self.render_single_links)
    }
}

/// Everything HAL rendering consults besides the model itself.
#[derive(Clone, Copy)]
pub struct HalContext<'a> {
    pub configuration: &'a HalConfiguration,
    pub curie_provider: Option<&'a dyn CurieProvider>,
    pub relation_provider: &'a dyn LinkRelationProvider,
}

impl HalContext<'_> {
    fn namespaced(&self, rel: &LinkRelation) -> HalLinkRelation {
        match self.curie_provider {
            Some(provider) => provider.namespaced_rel_from_relation(rel),
            None => HalLinkRelation::of(rel),
        }
    }
}

// ---------------------------------------------------------------------------
// Link objects
// ---------------------------------------------------------------------------

/// A HAL link object. The relation lives in the enclosing `_links` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLinkObject {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rendered only when `true`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl HalLinkObject {
    pub fn from_link(link: &Link) -> Self {
        Self {
            href: link.href.clone(),
            hreflang: link.hreflang.clone(),
            media: link.media.clone(),
            title: link.title.clone(),
            media_type: link.media_type.clone(),
            deprecation: link.deprecation.clone(),
            profile: link.profile.clone(),
            name: link.name.clone(),
            templated: link.is_templated(),
        }
    }

    pub fn into_link(self, rel: &str) -> Link {
        let mut link = Link::with_rel_of(self.href, rel);
        link.hreflang = self.hreflang;
        link.media = self.media;
        link.title = self.title;
        link.media_type = self.media_type;
        link.deprecation = self.deprecation;
        link.profile = self.profile;
        link.name = self.name;
        link
    }
}

/// Render the `_links` object. Empty when there are no links.
pub fn write_links(links: &Links, ctx: &HalContext<'_>) -> Result<Map<String, Value>> {
    let mut groups: Vec<(String, Vec<&Link>)> = Vec::new();
    let mut any_curied = false;

    for link in links {
        let rel = ctx.namespaced(&link.rel);
        any_curied |= rel.is_curied();
        let key = rel.value();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(link),
            None => groups.push((key, vec![link])),
        }
    }

    let mut map = Map::new();
    for (key, group) in groups {
        let mut objects = group
            .into_iter()
            .map(|l| serde_json::to_value(HalLinkObject::from_link(l)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let single = objects.len() == 1
            && ctx.configuration.single_link_render_for(&key) == RenderSingleLinks::AsSingle;
        let value = match objects.pop() {
            Some(only) if single => only,
            Some(last) => {
                objects.push(last);
                Value::Array(objects)
            }
            None => continue,
        };
        map.insert(key, value);
    }

    if any_curied {
        if let Some(provider) = ctx.curie_provider {
            let curies = provider.curie_information(links);
            if !curies.is_empty() {
                map.insert(CURIES.to_string(), serde_json::to_value(curies)?);
            }
        }
    }
    Ok(map)
}

/// Parse a `_links` object. A missing container means no links; `curies`
/// entries are definitions, not links, and are skipped.
pub fn read_links(value: Option<&Value>) -> Result<Links> {
    let map = match value {
        None | Some(Value::Null) => return Ok(Links::none()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(Error::InvalidDocument(format!(
                "{LINKS} must be an object, got {}",
                json_kind(other)
            )))
        }
    };

    let mut links = Links::none();
    for (rel, entry) in map {
        if rel == CURIES {
            continue;
        }
        match entry {
            Value::Array(items) => {
                for item in items {
                    links.push(read_link_object(rel, item)?);
                }
            }
            Value::Object(_) => links.push(read_link_object(rel, entry)?),
            other => {
                return Err(Error::InvalidDocument(format!(
                    "link {rel:?} must be an object or array, got {}",
                    json_kind(other)
                )))
            }
        }
    }
    Ok(links)
}

fn read_link_object(rel: &str, value: &Value) -> Result<Link> {
    let object: HalLinkObject = serde_json::from_value(value.clone())?;
    Ok(object.into_link(rel))
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Serialise content into top-level document fields. Non-object content is
/// wrapped as `{"value": ...}`.
pub(crate) fn content_fields<T: Serialize>(content: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(content)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert(VALUE.to_string(), other);
            Ok(map)
        }
    }
}

/// Inverse of [`content_fields`].
pub(crate) fn content_from_fields<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T> {
    let wrapped = if fields.len() == 1 {
        fields.get(VALUE).cloned()
    } else {
        None
    };
    match serde_json::from_value(Value::Object(fields)) {
        Ok(content) => Ok(content),
        Err(err) => match wrapped {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(err.into()),
        },
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn as_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        Error::InvalidDocument(format!(
            "{what} must be a JSON object, got {}",
            json_kind(value)
        ))
    })
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub fn write_model(model: &RepresentationModel, ctx: &HalContext<'_>) -> Result<Value> {
    let mut doc = Map::new();
    insert_links(&mut doc, &model.links, ctx)?;
    Ok(Value::Object(doc))
}

pub fn write_entity<T: Serialize>(model: &EntityModel<T>, ctx: &HalContext<'_>) -> Result<Value> {
    let mut doc = content_fields(&model.content)?;
    insert_links(&mut doc, &model.links, ctx)?;
    Ok(Value::Object(doc))
}

pub fn write_collection<T: Serialize + 'static>(
    model: &CollectionModel<T>,
    ctx: &HalContext<'_>,
) -> Result<Value> {
    let mut doc = Map::new();
    if let Some(embedded) = write_embedded(model, ctx)? {
        doc.insert(EMBEDDED.to_string(), embedded);
    }
    insert_links(&mut doc, &model.links, ctx)?;
    if let Some(page) = &model.metadata {
        doc.insert(PAGE.to_string(), serde_json::to_value(page)?);
    }
    Ok(Value::Object(doc))
}

/// `{ "<collection rel>": [ items ] }`, or `None` for an empty collection.
pub(crate) fn write_embedded<T: Serialize + 'static>(
    model: &CollectionModel<T>,
    ctx: &HalContext<'_>,
) -> Result<Option<Value>> {
    if model.content.is_empty() {
        return Ok(None);
    }
    let key = collection_rel::<T>(ctx);
    debug!(rel = %key, items = model.content.len(), "embedding collection");

    let items = model
        .content
        .iter()
        .map(|item| write_entity(item, ctx))
        .collect::<Result<Vec<_>>>()?;
    let mut embedded = Map::new();
    embedded.insert(key, Value::Array(items));
    Ok(Some(Value::Object(embedded)))
}

/// `_embedded` built from wrappers, keyed by each wrapper's explicit or
/// derived relation. Wrappers sharing a relation are concatenated; a lone
/// single value stays an object, an empty collection stays `[]`.
pub fn embedded_from_wrappers(
    wrappers: &[EmbeddedWrapper],
    ctx: &HalContext<'_>,
) -> Result<Map<String, Value>> {
    let mut embedded = Map::new();
    for wrapper in wrappers {
        let rel = wrapper
            .resolve_rel(ctx.relation_provider)
            .ok_or(Error::EmptyEmbeddedCollection)?;
        let key = ctx.namespaced(&rel).value();
        match embedded.get_mut(&key) {
            Some(Value::Array(existing)) => existing.extend(wrapper.values()),
            Some(existing) => {
                let mut items = vec![existing.take()];
                items.extend(wrapper.values());
                *existing = Value::Array(items);
            }
            None => {
                embedded.insert(key, wrapper.value());
            }
        }
    }
    Ok(embedded)
}

/// A document holding only wrapped `_embedded` content and `_links`.
/// `_embedded` is omitted only when there are no wrappers at all.
pub fn write_wrapped(
    wrappers: &[EmbeddedWrapper],
    links: &Links,
    ctx: &HalContext<'_>,
) -> Result<Value> {
    let mut doc = Map::new();
    if !wrappers.is_empty() {
        let embedded = embedded_from_wrappers(wrappers, ctx)?;
        doc.insert(EMBEDDED.to_string(), Value::Object(embedded));
    }
    insert_links(&mut doc, links, ctx)?;
    Ok(Value::Object(doc))
}

/// The (possibly curied) relation a collection of `T` is embedded under.
pub(crate) fn collection_rel<T: 'static>(ctx: &HalContext<'_>) -> String {
    let rel = ctx
        .relation_provider
        .collection_resource_rel_for(&ResourceType::of::<T>());
    ctx.namespaced(&rel).value()
}

pub(crate) fn insert_links(doc: &mut Map<String, Value>, links: &Links, ctx: &HalContext<'_>) -> Result<()> {
    let rendered = write_links(links, ctx)?;
    if !rendered.is_empty() {
        doc.insert(LINKS.to_string(), Value::Object(rendered));
    }
    Ok(())
}

pub fn read_model(value: &Value) -> Result<RepresentationModel> {
    let doc = as_object(value, "HAL document")?;
    Ok(RepresentationModel::of(read_links(doc.get(LINKS))?))
}

/// Every key except the reserved `_`-prefixed containers is content.
pub fn read_entity<T: DeserializeOwned>(value: &Value) -> Result<EntityModel<T>> {
    let doc = as_object(value, "HAL document")?;
    let links = read_links(doc.get(LINKS))?;
    let fields: Map<String, Value> = doc
        .iter()
        .filter(|(k, _)| !is_reserved(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(EntityModel::with_links(content_from_fields(fields)?, links))
}

pub fn read_collection<T: DeserializeOwned>(value: &Value) -> Result<CollectionModel<T>> {
    let doc = as_object(value, "HAL document")?;
    let links = read_links(doc.get(LINKS))?;
    let content = read_embedded(doc.get(EMBEDDED))?;
    let mut model = CollectionModel::new(content, links);
    if let Some(page) = doc.get(PAGE) {
        model.metadata = Some(serde_json::from_value::<PageMetadata>(page.clone())?);
    }
    Ok(model)
}

/// Items of every embedded relation, in document order.
pub(crate) fn read_embedded<T: DeserializeOwned>(
    value: Option<&Value>,
) -> Result<Vec<EntityModel<T>>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let embedded = as_object(value, EMBEDDED)?;
    if embedded.len() > 1 {
        warn!(
            relations = embedded.len(),
            "multiple embedded relations; flattening into one collection"
        );
    }
    let mut items = Vec::new();
    for entry in embedded.values() {
        match entry {
            Value::Array(docs) => {
                for doc in docs {
                    items.push(read_entity(doc)?);
                }
            }
            single => items.push(read_entity(single)?),
        }
    }
    Ok(items)
}

fn is_reserved(key: &str) -> bool {
    matches!(key, LINKS | EMBEDDED | "_templates")
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hypermedia::{DefaultCurieProvider, DelegatingLinkRelationProvider, UriTemplate};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Employee {
        name: String,
        role: String,
    }

    fn frodo() -> Employee {
        Employee {
            name: "Frodo".into(),
            role: "ring bearer".into(),
        }
    }

    struct Fixture {
        configuration: HalConfiguration,
        curies: Option<DefaultCurieProvider>,
        relations: DelegatingLinkRelationProvider,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                configuration: HalConfiguration::default(),
                curies: None,
                relations: DelegatingLinkRelationProvider::default(),
            }
        }

        fn curied() -> Self {
            Self {
                curies: Some(DefaultCurieProvider::new(
                    "foo",
                    UriTemplate::new("http://localhost:8080/rels/{rel}"),
                )),
                ..Self::new()
            }
        }

        fn ctx(&self) -> HalContext<'_> {
            HalContext {
                configuration: &self.configuration,
                curie_provider: self.curies.as_ref().map(|c| c as &dyn CurieProvider),
                relation_provider: &self.relations,
            }
        }
    }

    #[test]
    fn renders_single_link_as_object() {
        let f = Fixture::new();
        let model = RepresentationModel::new().add(Link::new("localhost"));
        let json = write_model(&model, &f.ctx()).unwrap();
        assert_eq!(json, json!({ "_links": { "self": { "href": "localhost" } } }));
    }

    #[test]
    fn renders_multiple_links_of_one_rel_as_array() {
        let f = Fixture::new();
        let model = RepresentationModel::new()
            .add(Link::new("localhost"))
            .add(Link::new("localhost2"));
        let json = write_model(&model, &f.ctx()).unwrap();
        assert_eq!(
            json,
            json!({ "_links": { "self": [ { "href": "localhost" }, { "href": "localhost2" } ] } })
        );
    }

    #[test]
    fn renders_single_links_as_array_when_configured() {
        let mut f = Fixture::new();
        f.configuration = HalConfiguration::new().with_render_single_links(RenderSingleLinks::AsArray);
        let json = write_model(&RepresentationModel::new().add(Link::new("x")), &f.ctx()).unwrap();
        assert_eq!(json, json!({ "_links": { "self": [ { "href": "x" } ] } }));
    }

    #[test]
    fn per_relation_override_wins() {
        let mut f = Fixture::new();
        f.configuration = HalConfiguration::new()
            .with_render_single_links_for("item", RenderSingleLinks::AsArray);
        let model = RepresentationModel::new()
            .add(Link::new("/x"))
            .add(Link::with_rel_of("/y", "item"));
        let json = write_model(&model, &f.ctx()).unwrap();
        assert_eq!(json["_links"]["self"], json!({ "href": "/x" }));
        assert_eq!(json["_links"]["item"], json!([ { "href": "/y" } ]));
    }

    #[test]
    fn empty_model_renders_empty_object() {
        let f = Fixture::new();
        assert_eq!(write_model(&RepresentationModel::new(), &f.ctx()).unwrap(), json!({}));
    }

    #[test]
    fn templated_flag_only_when_true() {
        let f = Fixture::new();
        let model = RepresentationModel::new().add(Link::with_rel_of("/search{?q}", "search"));
        let json = write_model(&model, &f.ctx()).unwrap();
        assert_eq!(
            json["_links"]["search"],
            json!({ "href": "/search{?q}", "templated": true })
        );
    }

    #[test]
    fn renders_curies() {
        let f = Fixture::curied();
        let model = RepresentationModel::new()
            .add(Link::new("foo"))
            .add(Link::with_rel_of("bar", "myrel"));
        let rendered = serde_json::to_string(&write_model(&model, &f.ctx()).unwrap()).unwrap();
        assert_eq!(
            rendered,
            r#"{"_links":{"self":{"href":"foo"},"foo:myrel":{"href":"bar"},"curies":[{"href":"http://localhost:8080/rels/{rel}","name":"foo","templated":true}]}}"#
        );
    }

    #[test]
    fn no_curies_without_curied_link() {
        let f = Fixture::curied();
        let model = RepresentationModel::new().add(Link::new("foo"));
        let json = write_model(&model, &f.ctx()).unwrap();
        assert_eq!(json, json!({ "_links": { "self": { "href": "foo" } } }));
        assert_eq!(write_model(&RepresentationModel::new(), &f.ctx()).unwrap(), json!({}));
    }

    #[test]
    fn entity_content_is_flattened_before_links() {
        let f = Fixture::new();
        let model = EntityModel::of(frodo()).add(Link::new("/employees/1"));
        let rendered = serde_json::to_string(&write_entity(&model, &f.ctx()).unwrap()).unwrap();
        assert_eq!(
            rendered,
            r#"{"name":"Frodo","role":"ring bearer","_links":{"self":{"href":"/employees/1"}}}"#
        );
    }

    #[test]
    fn scalar_entity_content_goes_under_value() {
        let f = Fixture::new();
        let model = EntityModel::of("first".to_string()).add(Link::new("localhost"));
        let json = write_entity(&model, &f.ctx()).unwrap();
        assert_eq!(json, json!({ "value": "first", "_links": { "self": { "href": "localhost" } } }));
        let back: EntityModel<String> = read_entity(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn collection_embeds_items_under_collection_rel() {
        let f = Fixture::new();
        let model = CollectionModel::paged(
            vec![EntityModel::of(frodo()).add(Link::new("/employees/1"))],
            PageMetadata::new(1, 0, 2),
            Links::of([Link::new("/employees")]),
        );
        let json = write_collection(&model, &f.ctx()).unwrap();
        assert_eq!(
            json,
            json!({
                "_embedded": { "employees": [
                    { "name": "Frodo", "role": "ring bearer",
                      "_links": { "self": { "href": "/employees/1" } } }
                ] },
                "_links": { "self": { "href": "/employees" } },
                "page": { "size": 1, "number": 0, "totalElements": 2, "totalPages": 2 }
            })
        );
        let back: CollectionModel<Employee> = read_collection(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn empty_collection_omits_embedded() {
        let f = Fixture::new();
        let model: CollectionModel<Employee> = CollectionModel::empty().add(Link::new("/employees"));
        let json = write_collection(&model, &f.ctx()).unwrap();
        assert_eq!(json, json!({ "_links": { "self": { "href": "/employees" } } }));
    }

    #[test]
    fn links_round_trip_including_duplicate_relations() {
        let f = Fixture::new();
        for links in [
            vec![],
            vec![Link::new("/a")],
            vec![
                Link::new("/a"),
                Link::with_rel_of("/b", "item"),
                Link::with_rel_of("/c", "item"),
            ],
            vec![
                Link::with_rel_of("/a", "item"),
                Link::new("/s"),
                Link::with_rel_of("/b", "item"),
            ],
        ] {
            let model = RepresentationModel::of(Links::of(links));
            let back = read_model(&write_model(&model, &f.ctx()).unwrap()).unwrap();
            assert_eq!(back, model);
        }
    }

    #[test]
    fn reading_skips_curies_and_keeps_curied_rels() {
        let doc = json!({
            "_links": {
                "self": { "href": "foo" },
                "foo:myrel": { "href": "bar" },
                "curies": [ { "href": "http://localhost:8080/rels/{rel}", "name": "foo", "templated": true } ]
            }
        });
        let model = read_model(&doc).unwrap();
        assert_eq!(model.links.len(), 2);
        assert_eq!(model.links.get_link("foo:myrel").unwrap().href, "bar");
    }

    #[test]
    fn missing_containers_mean_empty() {
        let model: CollectionModel<Employee> = read_collection(&json!({})).unwrap();
        assert!(model.is_empty());
        assert!(model.links.is_empty());
        assert!(model.metadata.is_none());
    }

    #[test]
    fn malformed_links_are_rejected() {
        assert!(matches!(
            read_model(&json!({ "_links": [] })),
            Err(Error::InvalidDocument(_))
        ));
        assert!(matches!(
            read_model(&json!({ "_links": { "self": "nope" } })),
            Err(Error::InvalidDocument(_))
        ));
    }
}
