//! UBER (`application/vnd.amundsen-uber+json`).
//!
//! Everything is a `data` node. Links, affordances, content and page metadata
//! all become nodes in one list:
//!
//! | Node | `name` | `rel` | `url` | `data` |
//! |------|--------|-------|-------|--------|
//! | declared link | – | every rel pointing at the url | href | – |
//! | affordance | affordance name | `[name]` | target (+ `{?..}` for GET) | – |
//! | content | uncapitalised type name | – | – | one node per field |
//! | collection item | – | – | – | the item's own nodes |
//! | page | `page` | – | – | `number`, `size`, `totalElements`, `totalPages` |
//!
//! When an affordance node and a declared link share a url, the two are
//! merged: with the same action the relations are unioned (declared first)
//! and the node is renamed after the first relation; with different actions
//! the affordance node replaces the declared one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use hypermedia::{
    find_properties, simple_type_name, uncapitalize, AffordanceModel, CollectionModel,
    EntityModel, Error, HttpMethod, Link, Links, MediaType, PageMetadata, RepresentationModel,
    Result, UberAction,
};

pub const VERSION: &str = "1.0";

const PAGE: &str = "page";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UberDocument {
    pub uber: Uber,
}

impl UberDocument {
    pub fn new(data: Vec<UberData>) -> Self {
        Self {
            uber: Uber {
                version: VERSION.to_string(),
                data,
                error: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uber {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<UberData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<UberError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UberError {
    #[serde(default)]
    pub data: Vec<UberData>,
}

/// A single UBER node. All fields are optional and omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UberData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `true` when `url` carries a `{?..}` expression; set by [`UberData::with_url`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,
    /// `read` is the implied default and is never written.
    #[serde(default, skip_serializing_if = "omit_action")]
    pub action: Option<UberAction>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transclude: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sending: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepting: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "omit_value")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<UberData>>,
}

fn omit_action(action: &Option<UberAction>) -> bool {
    matches!(action, None | Some(UberAction::Read))
}

fn omit_value(value: &Option<Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

impl UberData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rel(mut self, rel: Vec<String>) -> Self {
        self.rel = Some(rel);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.templated = url.contains("{?").then_some(true);
        self.url = Some(url);
        self
    }

    pub fn with_action(mut self, action: Option<UberAction>) -> Self {
        self.action = action;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_data(mut self, data: Vec<UberData>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn rels(&self) -> &[String] {
        self.rel.as_deref().unwrap_or(&[])
    }

    /// The action with the implied `read` default applied.
    pub fn effective_action(&self) -> UberAction {
        self.action.unwrap_or(UberAction::Read)
    }

    /// One link per relation. Nodes without a url yield nothing.
    pub fn links(&self) -> Vec<Link> {
        match &self.url {
            Some(url) => self
                .rels()
                .iter()
                .map(|rel| Link::with_rel_of(url.as_str(), rel.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    fn is_content(&self) -> bool {
        self.name.is_some() && self.rel.is_none() && self.url.is_none()
    }

    fn is_collection_entry(&self) -> bool {
        self.name.is_none() && self.rel.is_none() && self.url.is_none()
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// One node per distinct href, carrying every relation that points at it in
/// declaration order.
fn declared_link_nodes(links: &Links) -> Vec<UberData> {
    let mut by_href: Vec<(&str, Vec<String>)> = Vec::new();
    for link in links {
        let rel = link.rel.value().to_string();
        match by_href.iter_mut().find(|(href, _)| *href == link.href) {
            Some((_, rels)) => {
                if !rels.contains(&rel) {
                    rels.push(rel);
                }
            }
            None => by_href.push((link.href.as_str(), vec![rel])),
        }
    }
    by_href
        .into_iter()
        .map(|(href, rels)| UberData::new().with_url(href).with_rel(rels))
        .collect()
}

/// Nodes for every affordance on every link.
fn affordance_nodes(links: &Links) -> Vec<UberData> {
    links
        .iter()
        .flat_map(|link| link.affordances())
        .filter_map(|affordance| {
            let Some(AffordanceModel::Uber(model)) = affordance.model(MediaType::Uber) else {
                return None;
            };
            let name = affordance.name().to_string();
            let node = UberData::new()
                .with_name(name.clone())
                .with_rel(vec![name])
                .with_action(model.action);

            if affordance.has_http_method(HttpMethod::Get) {
                let mut url = affordance.uri();
                if !model.query_properties.is_empty() {
                    let names: Vec<&str> =
                        model.query_properties.iter().map(|p| p.name.as_str()).collect();
                    url.push_str(&format!("{{?{}}}", names.join(",")));
                }
                Some(node.with_url(url))
            } else {
                let shape = model
                    .input_properties
                    .iter()
                    .map(|p| format!("{0}={{{0}}}", p.name))
                    .collect::<Vec<_>>()
                    .join("&");
                let node = node.with_url(affordance.uri());
                if shape.is_empty() {
                    Some(node)
                } else {
                    Some(node.with_model(shape))
                }
            }
        })
        .collect()
}

/// Combine declared-link nodes with affordance nodes covering the same url.
///
/// Declared nodes keep their position; each is replaced by the affordance
/// nodes sharing its url (union of rels when the action matches, the bare
/// affordance node otherwise). Affordance nodes without a declared
/// counterpart are appended in order.
fn merge(declared: Vec<UberData>, affordances: Vec<UberData>) -> Vec<UberData> {
    let mut consumed = vec![false; affordances.len()];
    let mut merged = Vec::with_capacity(declared.len() + affordances.len());

    for link in declared {
        let mut covered = false;
        for (i, affordance) in affordances.iter().enumerate() {
            if affordance.url != link.url {
                continue;
            }
            covered = true;
            consumed[i] = true;
            if affordance.effective_action() == link.effective_action() {
                let mut rels = link.rels().to_vec();
                for rel in affordance.rels() {
                    if !rels.contains(rel) {
                        rels.push(rel.clone());
                    }
                }
                merged.push(UberData {
                    name: rels.first().cloned(),
                    rel: Some(rels),
                    ..affordance.clone()
                });
            } else {
                merged.push(affordance.clone());
            }
        }
        if !covered {
            merged.push(link);
        }
    }

    merged.extend(
        affordances
            .into_iter()
            .zip(consumed)
            .filter(|(_, used)| !used)
            .map(|(node, _)| node),
    );
    merged
}

fn link_nodes(links: &Links) -> Vec<UberData> {
    let declared = declared_link_nodes(links);
    let affordances = affordance_nodes(links);
    if affordances.is_empty() {
        declared
    } else {
        debug!(
            declared = declared.len(),
            affordances = affordances.len(),
            "merging affordance nodes"
        );
        merge(declared, affordances)
    }
}

/// The content node, or `None` for null content.
fn content_node<T: Serialize>(content: &T) -> Result<Option<UberData>> {
    let value = serde_json::to_value(content)?;
    if value.is_null() {
        return Ok(None);
    }
    let data = find_properties(&value)
        .into_iter()
        .map(|property| {
            let node = UberData::new().with_value(property.value);
            match property.name {
                Some(name) => node.with_name(name),
                None => node,
            }
        })
        .collect();
    Ok(Some(
        UberData::new()
            .with_name(uncapitalize(simple_type_name::<T>()))
            .with_data(data),
    ))
}

fn entity_nodes<T: Serialize>(model: &EntityModel<T>) -> Result<Vec<UberData>> {
    let mut data = link_nodes(&model.links);
    data.extend(content_node(&model.content)?);
    Ok(data)
}

fn page_node(page: &PageMetadata) -> UberData {
    let field = |name: &str, value: u64| UberData::new().with_name(name).with_value(Value::from(value));
    UberData::new().with_name(PAGE).with_data(vec![
        field("number", page.number),
        field("size", page.size),
        field("totalElements", page.total_elements),
        field("totalPages", page.total_pages),
    ])
}

pub fn assemble_model(model: &RepresentationModel) -> UberDocument {
    UberDocument::new(link_nodes(&model.links))
}

pub fn assemble_entity<T: Serialize>(model: &EntityModel<T>) -> Result<UberDocument> {
    Ok(UberDocument::new(entity_nodes(model)?))
}

pub fn assemble_collection<T: Serialize>(model: &CollectionModel<T>) -> Result<UberDocument> {
    let mut data = link_nodes(&model.links);
    for item in &model.content {
        data.push(UberData::new().with_data(entity_nodes(item)?));
    }
    if let Some(page) = &model.metadata {
        data.push(page_node(page));
    }
    Ok(UberDocument::new(data))
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

fn parse(value: &Value) -> Result<UberDocument> {
    if value.get("uber").is_none() {
        return Err(Error::InvalidDocument("missing \"uber\" root".into()));
    }
    Ok(serde_json::from_value(value.clone())?)
}

fn links_from(nodes: &[UberData]) -> Links {
    let mut links = Links::none();
    for node in nodes {
        if node.url.is_none() && node.rel.is_some() {
            warn!(name = ?node.name, "UBER node has rel but no url; skipping");
        }
        for link in node.links() {
            links.push(link);
        }
    }
    links
}

fn content_from<T: DeserializeOwned>(nodes: &[UberData]) -> Result<T> {
    let Some(content) = nodes.iter().find(|n| n.is_content() && n.name.as_deref() != Some(PAGE))
    else {
        return Err(Error::InvalidDocument("no content node".into()));
    };
    let fields = content.data.as_deref().unwrap_or(&[]);

    if let [only] = fields {
        if only.name.is_none() {
            let value = only.value.clone().unwrap_or(Value::Null);
            return Ok(serde_json::from_value(value)?);
        }
    }

    let object: Map<String, Value> = fields
        .iter()
        .filter_map(|node| {
            let name = node.name.clone()?;
            Some((name, node.value.clone().unwrap_or(Value::Null)))
        })
        .collect();
    Ok(serde_json::from_value(Value::Object(object))?)
}

fn entity_from<T: DeserializeOwned>(nodes: &[UberData]) -> Result<EntityModel<T>> {
    Ok(EntityModel::with_links(content_from(nodes)?, links_from(nodes)))
}

fn page_from(nodes: &[UberData]) -> Result<Option<PageMetadata>> {
    let Some(page) = nodes
        .iter()
        .find(|n| n.is_content() && n.name.as_deref() == Some(PAGE))
    else {
        return Ok(None);
    };
    let object: Map<String, Value> = page
        .data
        .iter()
        .flatten()
        .filter_map(|node| Some((node.name.clone()?, node.value.clone()?)))
        .collect();
    Ok(Some(serde_json::from_value(Value::Object(object))?))
}

pub fn read_model(value: &Value) -> Result<RepresentationModel> {
    let doc = parse(value)?;
    Ok(RepresentationModel::of(links_from(&doc.uber.data)))
}

pub fn read_entity<T: DeserializeOwned>(value: &Value) -> Result<EntityModel<T>> {
    let doc = parse(value)?;
    entity_from(&doc.uber.data)
}

/// Collection entries with missing or empty `data` are invalid.
pub fn read_collection<T: DeserializeOwned>(value: &Value) -> Result<CollectionModel<T>> {
    let doc = parse(value)?;
    let nodes = &doc.uber.data;

    let mut content = Vec::new();
    for entry in nodes.iter().filter(|n| n.is_collection_entry()) {
        match entry.data.as_deref() {
            Some(item) if !item.is_empty() => content.push(entity_from(item)?),
            _ => {
                return Err(Error::InvalidDocument(
                    "UBER collection entry has no data".into(),
                ))
            }
        }
    }

    let mut model = CollectionModel::new(content, links_from(nodes));
    model.metadata = page_from(nodes)?;
    Ok(model)
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hypermedia::{Affordance, QueryParameter, TypeDescriptor};
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

    fn employee_type() -> TypeDescriptor {
        TypeDescriptor::new("Employee").field("name").field("role")
    }

    #[test]
    fn single_link() {
        let model = RepresentationModel::new().add(Link::new("localhost"));
        assert_eq!(
            write_model(&model).unwrap(),
            json!({ "uber": { "version": "1.0", "data": [
                { "rel": ["self"], "url": "localhost" }
            ] } })
        );
    }

    #[test]
    fn links_sharing_href_merge_into_one_node() {
        let model = RepresentationModel::new()
            .add(Link::new("localhost"))
            .add(Link::with_rel_of("localhost", "orders"));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["uber"]["data"],
            json!([ { "rel": ["self", "orders"], "url": "localhost" } ])
        );
    }

    #[test]
    fn get_affordance_renders_query_suffix_in_declaration_order() {
        let search = Link::with_rel_of("/search", "search");
        let find = Affordance::builder(&search)
            .name("find")
            .query_parameter(QueryParameter::optional("a"))
            .query_parameter(QueryParameter::optional("b"))
            .build();
        let model = RepresentationModel::new().add(Link::new("/").and_affordance(find));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["uber"]["data"],
            json!([
                { "rel": ["self"], "url": "/" },
                { "name": "find", "rel": ["find"], "url": "/search{?a,b}", "templated": true }
            ])
        );
    }

    #[test]
    fn get_affordance_without_params_has_no_suffix() {
        let target = Link::new("/employees");
        let list = Affordance::builder(&target).name("list").build();
        let nodes = affordance_nodes(&Links::of([target.and_affordance(list)]));
        assert_eq!(nodes[0].url.as_deref(), Some("/employees"));
        assert!(nodes[0].templated.is_none());
    }

    #[test]
    fn mutating_affordance_renders_model_and_replaces_declared_link() {
        let self_link = Link::new("/employees/1");
        let update = Affordance::builder(&self_link)
            .method(HttpMethod::Put)
            .input(employee_type())
            .build();
        let model = RepresentationModel::new().add(self_link.and_affordance(update));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["uber"]["data"],
            json!([
                { "name": "putEmployee", "rel": ["putEmployee"], "url": "/employees/1",
                  "action": "replace", "model": "name={name}&role={role}" }
            ])
        );
    }

    #[test]
    fn affordance_without_input_omits_model() {
        let self_link = Link::new("/employees/1");
        let delete = Affordance::builder(&self_link)
            .method(HttpMethod::Delete)
            .name("delete")
            .build();
        let model = RepresentationModel::new().add(self_link.and_affordance(delete));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["uber"]["data"],
            json!([
                { "name": "delete", "rel": ["delete"], "url": "/employees/1", "action": "remove" }
            ])
        );
    }

    #[test]
    fn same_action_unions_relations() {
        let self_link = Link::new("/employees");
        let list = Affordance::builder(&self_link).name("all").build();
        let model = RepresentationModel::new().add(self_link.and_affordance(list));
        let json = write_model(&model).unwrap();
        assert_eq!(
            json["uber"]["data"],
            json!([ { "name": "self", "rel": ["self", "all"], "url": "/employees" } ])
        );
    }

    #[test]
    fn uncovered_declared_links_are_kept_and_extra_affordances_appended() {
        let self_link = Link::new("/employees/1");
        let all = Link::with_rel_of("/employees", "employees");
        let create = Affordance::builder(&Link::new("/employees/new"))
            .method(HttpMethod::Post)
            .input(employee_type())
            .build();
        let model = RepresentationModel::new()
            .add(self_link.and_affordance(create))
            .add(all);
        let json = write_model(&model).unwrap();
        let urls: Vec<_> = json["uber"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["url"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(urls, vec!["/employees/1", "/employees", "/employees/new"]);
        assert_eq!(json["uber"]["data"][2]["action"], "append");
    }

    #[test]
    fn entity_content_node_named_after_type() {
        let model = EntityModel::of(frodo()).add(Link::new("/employees/1"));
        let json = write_entity(&model).unwrap();
        assert_eq!(
            json["uber"]["data"][1],
            json!({ "name": "employee", "data": [
                { "name": "name", "value": "Frodo" },
                { "name": "role", "value": "ring bearer" }
            ] })
        );
        let back: EntityModel<Employee> = read_entity(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn scalar_content_is_a_single_nameless_value() {
        let model = EntityModel::of("first".to_string()).add(Link::new("localhost"));
        let json = write_entity(&model).unwrap();
        assert_eq!(
            json["uber"]["data"][1],
            json!({ "name": "string", "data": [ { "value": "first" } ] })
        );
        let back: EntityModel<String> = read_entity(&json).unwrap();
        assert_eq!(back.content, "first");
    }

    #[test]
    fn paged_collection_round_trip() {
        let model = CollectionModel::paged(
            vec![
                EntityModel::of(frodo()).add(Link::new("/employees/1")),
                EntityModel::of(Employee {
                    name: "Sam".into(),
                    role: "gardener".into(),
                })
                .add(Link::new("/employees/2")),
            ],
            PageMetadata::new(2, 0, 4),
            Links::of([Link::new("/employees")]),
        );
        let json = write_collection(&model).unwrap();
        let data = json["uber"]["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        assert!(data[1].get("name").is_none());
        assert_eq!(
            data[3],
            json!({ "name": "page", "data": [
                { "name": "number", "value": 0 },
                { "name": "size", "value": 2 },
                { "name": "totalElements", "value": 4 },
                { "name": "totalPages", "value": 2 }
            ] })
        );

        let back: CollectionModel<Employee> = read_collection(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn empty_collection_entry_is_invalid() {
        let doc = json!({ "uber": { "version": "1.0", "data": [
            { "rel": ["self"], "url": "/employees" },
            { }
        ] } });
        let result: Result<CollectionModel<Employee>> = read_collection(&doc);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));

        let doc = json!({ "uber": { "version": "1.0", "data": [ { "data": [] } ] } });
        let result: Result<CollectionModel<Employee>> = read_collection(&doc);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn links_round_trip() {
        for links in [
            vec![],
            vec![Link::new("/a")],
            vec![
                Link::new("/a"),
                Link::with_rel_of("/a", "alias"),
                Link::with_rel_of("/b", "item"),
                Link::with_rel_of("/c", "item"),
            ],
            vec![
                Link::with_rel_of("/a", "x"),
                Link::with_rel_of("/b", "y"),
                Link::with_rel_of("/a", "z"),
            ],
        ] {
            let model = RepresentationModel::of(Links::of(links));
            let back = read_model(&write_model(&model).unwrap()).unwrap();
            assert_eq!(back, model);
        }
    }

    #[test]
    fn missing_root_is_invalid() {
        assert!(matches!(read_model(&json!({})), Err(Error::InvalidDocument(_))));
    }
}
