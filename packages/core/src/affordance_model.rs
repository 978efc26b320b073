//! Format-specific projections of an [`Affordance`].
//!
//! | Variant          | Inputs rendered as                           |
//! |------------------|----------------------------------------------|
//! | `HalForms`       | `_templates.*.properties`                    |
//! | `Uber`           | `model` string or `{?..}` url suffix, action |
//! | `CollectionJson` | `template.data` / `queries[].data`           |
//!
//! Each variant is produced by a pure function of the affordance; there is no
//! per-format type hierarchy.

use serde::{Deserialize, Serialize};

use crate::affordance::{Affordance, HttpMethod, QueryParameter};
use crate::media_type::MediaType;
use crate::property::{PropertyMetadata, TypeDescriptor};

/// One input field as a format renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub required: bool,
    pub read_only: bool,
    pub prompt: Option<String>,
    pub regex: Option<String>,
}

impl PropertyDescriptor {
    fn from_metadata(meta: &PropertyMetadata, required: bool) -> Self {
        Self {
            name: meta.name.clone(),
            required,
            read_only: meta.read_only,
            prompt: meta.prompt.clone(),
            regex: meta.pattern.clone(),
        }
    }

    fn from_query(param: &QueryParameter) -> Self {
        Self {
            name: param.name.clone(),
            required: param.required,
            read_only: false,
            prompt: None,
            regex: None,
        }
    }
}

/// UBER transition semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UberAction {
    Append,
    Partial,
    Read,
    Remove,
    Replace,
}

impl UberAction {
    /// POST → append, PATCH → partial, GET → read, DELETE → remove,
    /// PUT → replace. Anything else has no UBER action.
    pub fn for_method(method: HttpMethod) -> Option<Self> {
        match method {
            HttpMethod::Post => Some(UberAction::Append),
            HttpMethod::Patch => Some(UberAction::Partial),
            HttpMethod::Get => Some(UberAction::Read),
            HttpMethod::Delete => Some(UberAction::Remove),
            HttpMethod::Put => Some(UberAction::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalFormsAffordanceModel {
    pub input_properties: Vec<PropertyDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UberAffordanceModel {
    pub input_properties: Vec<PropertyDescriptor>,
    pub query_properties: Vec<PropertyDescriptor>,
    pub action: Option<UberAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionJsonAffordanceModel {
    pub input_properties: Vec<PropertyDescriptor>,
    pub query_properties: Vec<PropertyDescriptor>,
}

/// The read-only view of an affordance for one media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffordanceModel {
    HalForms(HalFormsAffordanceModel),
    Uber(UberAffordanceModel),
    CollectionJson(CollectionJsonAffordanceModel),
}

impl AffordanceModel {
    /// Project `affordance` for `media`. Returns `None` for formats that
    /// do not render affordances (plain HAL).
    pub fn build(media: MediaType, affordance: &Affordance) -> Option<Self> {
        let method = affordance.http_method();
        let input = input_properties(method, affordance.input_type());
        let query = query_properties(method, affordance.query_parameters());
        match media {
            MediaType::Hal => None,
            MediaType::HalForms => Some(AffordanceModel::HalForms(HalFormsAffordanceModel {
                input_properties: input,
            })),
            MediaType::Uber => Some(AffordanceModel::Uber(UberAffordanceModel {
                input_properties: input,
                query_properties: query,
                action: UberAction::for_method(method),
            })),
            MediaType::CollectionJson => {
                Some(AffordanceModel::CollectionJson(CollectionJsonAffordanceModel {
                    input_properties: input,
                    query_properties: query,
                }))
            }
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            AffordanceModel::HalForms(_) => MediaType::HalForms,
            AffordanceModel::Uber(_) => MediaType::Uber,
            AffordanceModel::CollectionJson(_) => MediaType::CollectionJson,
        }
    }

    pub fn input_properties(&self) -> &[PropertyDescriptor] {
        match self {
            AffordanceModel::HalForms(m) => &m.input_properties,
            AffordanceModel::Uber(m) => &m.input_properties,
            AffordanceModel::CollectionJson(m) => &m.input_properties,
        }
    }

    /// Query properties; always empty for HAL-FORMS.
    pub fn query_properties(&self) -> &[PropertyDescriptor] {
        match self {
            AffordanceModel::HalForms(_) => &[],
            AffordanceModel::Uber(m) => &m.query_properties,
            AffordanceModel::CollectionJson(m) => &m.query_properties,
        }
    }
}

// --- helpers -----------------------------------------------------------------

fn input_properties(method: HttpMethod, input: Option<&TypeDescriptor>) -> Vec<PropertyDescriptor> {
    let Some(input) = input else {
        return Vec::new();
    };
    if !method.is_entity_altering() {
        return Vec::new();
    }
    let required = method.implies_required();
    input
        .properties
        .iter()
        .map(|meta| PropertyDescriptor::from_metadata(meta, required))
        .collect()
}

fn query_properties(method: HttpMethod, params: &[QueryParameter]) -> Vec<PropertyDescriptor> {
    if !method.is_safe() {
        return Vec::new();
    }
    params.iter().map(PropertyDescriptor::from_query).collect()
}

// --- tests -------------------------------------------------------------------
