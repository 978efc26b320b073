//! Property enumeration for input types and payload samples.
//!
//! Rust has no runtime reflection, so input types describe themselves through
//! [`Describe`] (or [`TypeDescriptor::from_sample`]). The resulting
//! [`TypeDescriptor`] is the only thing affordance models look at: field
//! order is declaration order and is stable across calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Metadata for one input field, as declared by the owning type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,

    /// Server-managed field; clients may see it but not submit it.
    #[serde(default)]
    pub read_only: bool,

    /// Human-readable label for form rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Regular expression the value must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_only: false,
            prompt: None,
            pattern: None,
            min: None,
            max: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// The shape of an input or output type: its name and ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub properties: Vec<PropertyMetadata>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Append a plain field.
    pub fn field(self, name: impl Into<String>) -> Self {
        self.property(PropertyMetadata::new(name))
    }

    pub fn property(mut self, property: PropertyMetadata) -> Self {
        self.properties.push(property);
        self
    }

    /// Describe `T` by serialising a sample value and enumerating its
    /// top-level fields. A non-object sample yields no fields.
    pub fn from_sample<T: Serialize>(name: impl Into<String>, sample: &T) -> Result<Self> {
        let value = serde_json::to_value(sample)?;
        let properties = match value {
            Value::Object(map) => map.keys().map(PropertyMetadata::new).collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            name: name.into(),
            properties,
        })
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Implemented by domain types that can act as affordance inputs.
///
/// ```rust,ignore
/// impl Describe for Employee {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::new("Employee").field("name").field("role")
///     }
/// }
/// ```
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

/// One `(name, value)` pair extracted from a payload sample.
///
/// `name` is `None` for the synthetic entry produced from a scalar payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub name: Option<String>,
    pub value: Value,
}

/// Extract the top-level properties of a serialised payload.
///
/// Objects yield one entry per field, in field order. Scalars and arrays are
/// not expanded; they yield a single nameless entry holding the whole value.
pub fn find_properties(value: &Value) -> Vec<PropertyValue> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| PropertyValue {
                name: Some(k.clone()),
                value: v.clone(),
            })
            .collect(),
        other => vec![PropertyValue {
            name: None,
            value: other.clone(),
        }],
    }
}

/// The unqualified, non-generic name of `T` (e.g. `Employee` for
/// `my_app::model::Employee`, `EntityModel` for `EntityModel<Employee>`).
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    simple_name(std::any::type_name::<T>())
}

pub(crate) fn simple_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    let base = base.trim_start_matches('&').trim();
    base.rsplit("::").next().unwrap_or(base)
}

/// Lower-case the first character (`Employee` → `employee`).
pub fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

// --- tests -------------------------------------------------------------------
