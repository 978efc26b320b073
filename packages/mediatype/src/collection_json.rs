//! Collection+JSON (`application/vnd.collection+json`).
//!
//! ```json
//! { "collection": {
//!     "version": "1.0",
//!     "href": "/employees",
//!     "links": [ { "rel": "profile", "href": "/profile/employees" } ],
//!     "items": [ { "href": "/employees/1", "data": [ { "name": "name", "value": "Frodo" } ] } ],
//!     "queries": [ { "rel": "search", "href": "/employees/search", "data": [ { "name": "name", "value": "" } ] } ],
//!     "template": { "data": [ { "name": "name", "value": "" } ] }
//! } }
//! ```
//!
//! `href` is the self link and `links` everything else. Queries come from GET
//! affordances with query parameters on the self link; the template comes from
//! the first entity-altering affordance on it. Collection+JSON has no place
//! for page metadata, so it is not rendered.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use hypermedia::{
    find_properties, AffordanceModel, CollectionModel, EntityModel, Error, HttpMethod,
    IanaLinkRelations, Link, Links, MediaType, RepresentationModel, Result,
};

pub const VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonDocument {
    pub collection: CollectionJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJson {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CollectionJsonLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<CollectionJsonItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<CollectionJsonQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<CollectionJsonTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CollectionJsonError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionJsonLink {
    pub rel: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<String>,
}

impl CollectionJsonLink {
    fn from_link(link: &Link) -> Self {
        Self {
            rel: link.rel.value().to_string(),
            href: link.href.clone(),
            name: link.name.clone(),
            prompt: link.title.clone(),
            render: None,
        }
    }

    fn to_link(&self) -> Link {
        let mut link = Link::with_rel_of(self.href.as_str(), self.rel.as_str());
        link.name = self.name.clone();
        link.title = self.prompt.clone();
        link
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<CollectionJsonData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CollectionJsonLink>,
}

/// A `name`/`value` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl CollectionJsonData {
    /// An empty form field as used by queries and templates.
    fn field(name: &str, prompt: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            value: Some(Value::String(String::new())),
            prompt: prompt.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonQuery {
    pub rel: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<CollectionJsonData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonTemplate {
    #[serde(default)]
    pub data: Vec<CollectionJsonData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionJsonError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn non_self_links(links: &Links) -> Vec<CollectionJsonLink> {
    links
        .iter()
        .filter(|l| !l.has_rel(IanaLinkRelations::SELF))
        .map(CollectionJsonLink::from_link)
        .collect()
}

fn data_of<T: Serialize>(content: &T) -> Result<Vec<CollectionJsonData>> {
    let value = serde_json::to_value(content)?;
    Ok(find_properties(&value)
        .into_iter()
        .map(|p| CollectionJsonData {
            name: p.name,
            value: Some(p.value),
            prompt: None,
        })
        .collect())
}

fn queries(links: &Links) -> Vec<CollectionJsonQuery> {
    let Some(self_link) = links.get_link(IanaLinkRelations::SELF) else {
        return Vec::new();
    };
    self_link
        .affordances()
        .iter()
        .filter(|a| a.has_http_method(HttpMethod::Get))
        .filter_map(|a| match a.model(MediaType::CollectionJson) {
            Some(AffordanceModel::CollectionJson(model)) if !model.query_properties.is_empty() => {
                Some(CollectionJsonQuery {
                    rel: a.name().to_string(),
                    href: a.uri(),
                    prompt: None,
                    data: model
                        .query_properties
                        .iter()
                        .map(|p| CollectionJsonData::field(&p.name, p.prompt.as_deref()))
                        .collect(),
                })
            }
            _ => None,
        })
        .collect()
}

fn template(links: &Links) -> Option<CollectionJsonTemplate> {
    let self_link = links.get_link(IanaLinkRelations::SELF)?;
    let affordance = self_link
        .affordances()
        .iter()
        .find(|a| a.http_method().is_entity_altering())?;
    debug!(affordance = affordance.name(), "Collection+JSON template");
    let model = affordance.model(MediaType::CollectionJson)?;
    Some(CollectionJsonTemplate {
        data: model
            .input_properties()
            .iter()
            .map(|p| CollectionJsonData::field(&p.name, p.prompt.as_deref()))
            .collect(),
    })
}

fn document(links: &Links, items: Vec<CollectionJsonItem>) -> CollectionJsonDocument {
    CollectionJsonDocument {
        collection: CollectionJson {
            version: VERSION.to_string(),
            href: links
                .get_link(IanaLinkRelations::SELF)
                .map(|l| l.href.clone()),
            links: non_self_links(links),
            items,
            queries: queries(links),
            template: template(links),
            error: None,
        },
    }
}

fn item_of<T: Serialize>(model: &EntityModel<T>, with_links: bool) -> Result<CollectionJsonItem> {
    Ok(CollectionJsonItem {
        href: model
            .links
            .get_link(IanaLinkRelations::SELF)
            .map(|l| l.href.clone()),
        data: data_of(&model.content)?,
        links: if with_links {
            non_self_links(&model.links)
        } else {
            Vec::new()
        },
    })
}

pub fn assemble_model(model: &RepresentationModel) -> CollectionJsonDocument {
    document(&model.links, Vec::new())
}

/// A single entity is one item; its links live on the collection.
pub fn assemble_entity<T: Serialize>(model: &EntityModel<T>) -> Result<CollectionJsonDocument> {
    Ok(document(&model.links, vec![item_of(model, false)?]))
}

pub fn assemble_collection<T: Serialize>(
    model: &CollectionModel<T>,
) -> Result<CollectionJsonDocument> {
    let items = model
        .content
        .iter()
        .map(|item| item_of(item, true))
        .collect::<Result<Vec<_>>>()?;
    Ok(document(&model.links, items))
}

pub fn write_model(model: &RepresentationModel) -> Result<Value> {
    Ok(serde_json::to_value(assemble_model(model))?)
}

pub fn write_entity<T: Serialize>(model: &EntityModel<T>) -> Result<Value> {
    Ok(serde_json::to_value(assemble_entity(model)?)?)
}

pub fn write_collection<T: Serialize>(model: &CollectionModel<T>) -> Result<Value> {
    Ok(serde_json::to_value(assemble_collection(model)?)?)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn parse(value: &Value) -> Result<CollectionJson> {
    if value.get("collection").is_none() {
        return Err(Error::InvalidDocument("missing \"collection\" root".into()));
    }
    let doc: CollectionJsonDocument = serde_json::from_value(value.clone())?;
    Ok(doc.collection)
}

fn links_of(href: Option<&str>, links: &[CollectionJsonLink]) -> Links {
    href.map(Link::new)
        .into_iter()
        .chain(links.iter().map(CollectionJsonLink::to_link))
        .collect()
}

fn content_of<T: DeserializeOwned>(data: &[CollectionJsonData]) -> Result<T> {
    if let [only] = data {
        if only.name.is_none() {
            return Ok(serde_json::from_value(only.value.clone().unwrap_or(Value::Null))?);
        }
    }
    let object: Map<String, Value> = data
        .iter()
        .filter_map(|d| Some((d.name.clone()?, d.value.clone().unwrap_or(Value::Null))))
        .collect();
    Ok(serde_json::from_value(Value::Object(object))?)
}

pub fn read_model(value: &Value) -> Result<RepresentationModel> {
    let collection = parse(value)?;
    Ok(RepresentationModel::of(links_of(
        collection.href.as_deref(),
        &collection.links,
    )))
}

pub fn read_entity<T: DeserializeOwned>(value: &Value) -> Result<EntityModel<T>> {
    let collection = parse(value)?;
    let Some(item) = collection.items.first() else {
        return Err(Error::InvalidDocument("Collection+JSON entity has no item".into()));
    };
    let links = links_of(collection.href.as_deref(), &collection.links)
        .merge(item.links.iter().map(CollectionJsonLink::to_link));
    Ok(EntityModel::with_links(content_of(&item.data)?, links))
}

pub fn read_collection<T: DeserializeOwned>(value: &Value) -> Result<CollectionModel<T>> {
    let collection = parse(value)?;
    let content = collection
        .items
        .iter()
        .map(|item| {
            Ok(EntityModel::with_links(
                content_of(&item.data)?,
                links_of(item.href.as_deref(), &item.links),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CollectionModel::new(
        content,
        links_of(collection.href.as_deref(), &collection.links),
    ))
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hypermedia::{Affordance, PropertyMetadata, QueryParameter, TypeDescriptor};
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

    #[test]
    fn entity_document() {
        let model = EntityModel::of(frodo())
            .add(Link::new("/employees/1"))
            .add(Link::with_rel_of("/employees", "employees"));
        let json = write_entity(&model).unwrap();
        assert_eq!(
            json,
            json!({ "collection": {
                "version": "1.0",
                "href": "/employees/1",
                "links": [ { "rel": "employees", "href": "/employees" } ],
                "items": [ {
                    "href": "/employees/1",
                    "data": [
                        { "name": "name", "value": "Frodo" },
                        { "name": "role", "value": "ring bearer" }
                    ]
                } ]
            } })
        );
        let back: EntityModel<Employee> = read_entity(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn collection_items_carry_their_links() {
        let model = CollectionModel::new(
            vec![EntityModel::of(frodo())
                .add(Link::new("/employees/1"))
                .add(Link::with_rel_of("/employees", "employees"))],
            Links::of([Link::new("/employees")]),
        );
        let json = write_collection(&model).unwrap();
        assert_eq!(
            json["collection"]["items"][0]["links"],
            json!([ { "rel": "employees", "href": "/employees" } ])
        );
        let back: CollectionModel<Employee> = read_collection(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn queries_and_template_from_self_affordances() {
        let self_link = Link::new("/employees");
        let search = Affordance::builder(&Link::with_rel_of("/employees/search", "search"))
            .name("search")
            .query_parameter(QueryParameter::optional("name"))
            .build();
        let create = Affordance::builder(&self_link)
            .method(HttpMethod::Post)
            .input(
                TypeDescriptor::new("Employee")
                    .property(PropertyMetadata::new("name").prompt("Full name"))
                    .field("role"),
            )
            .build();
        let model = RepresentationModel::new().add(self_link.and_affordances([search, create]));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["collection"]["queries"],
            json!([ { "rel": "search", "href": "/employees/search",
                      "data": [ { "name": "name", "value": "" } ] } ])
        );
        assert_eq!(
            json["collection"]["template"],
            json!({ "data": [
                { "name": "name", "value": "", "prompt": "Full name" },
                { "name": "role", "value": "" }
            ] })
        );
    }

    #[test]
    fn empty_parts_are_omitted() {
        let json = write_model(&RepresentationModel::new()).unwrap();
        assert_eq!(json, json!({ "collection": { "version": "1.0" } }));
    }

    #[test]
    fn scalar_items() {
        let model = CollectionModel::of(vec!["a".to_string(), "b".to_string()]);
        let json = write_collection(&model).unwrap();
        assert_eq!(json["collection"]["items"][0], json!({ "data": [ { "value": "a" } ] }));
        let back: CollectionModel<String> = read_collection(&json).unwrap();
        assert_eq!(back.values().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn entity_without_item_is_invalid() {
        let doc = json!({ "collection": { "version": "1.0", "href": "/x" } });
        let result: Result<EntityModel<Employee>> = read_entity(&doc);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }
}
