//! ALPS profile documents (`application/alps+json`).
//!
//! ALPS describes the semantics of a resource rather than a representation
//! of it: every field and every transition is a [`Descriptor`].
//!
//! ```json
//! { "alps": { "version": "1.0", "descriptor": [
//!     { "id": "employee-representation", "descriptor": [
//!         { "name": "name", "type": "SEMANTIC", "doc": { "format": "TEXT", "value": "Full name" } }
//!     ] }
//! ] } }
//! ```
//!
//! Every field is optional and omitted when absent. Descriptor keys are
//! written in the order `id`, `href`, `name`, `type`, `doc`, `descriptor`,
//! `ext`, `rt`.

use serde::{Deserialize, Serialize};

use hypermedia::{uncapitalize, Affordance, HttpMethod, TypeDescriptor};

pub const MIME: &str = "application/alps+json";

pub const VERSION: &str = "1.0";

/// `{ "alps": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlpsDocument {
    pub alps: Alps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alps {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Doc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptor: Vec<Descriptor>,
}

impl Alps {
    pub fn new(descriptor: Vec<Descriptor>) -> Self {
        Self {
            version: VERSION.to_string(),
            doc: None,
            descriptor,
        }
    }

    pub fn with_doc(mut self, doc: Doc) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn into_document(self) -> AlpsDocument {
        AlpsDocument { alps: self }
    }
}

/// The kind of element a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Type {
    /// A state element, e.g. a field.
    Semantic,
    /// A transition that does not change state (GET, HEAD, OPTIONS).
    Safe,
    /// A repeatable state change (PUT, DELETE).
    Idempotent,
    /// A non-repeatable state change (POST, PATCH).
    Unsafe,
}

impl Type {
    pub fn for_method(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get | HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace => Type::Safe,
            HttpMethod::Put | HttpMethod::Delete => Type::Idempotent,
            HttpMethod::Post | HttpMethod::Patch => Type::Unsafe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    Text,
    Html,
    Asciidoc,
}

/// Human-readable documentation, inline or by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Doc {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            href: None,
            format: Some(Format::Text),
            value: Some(value.into()),
        }
    }

    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            format: None,
            value: None,
        }
    }
}

/// Extension data attached to a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Doc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptor: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Ext>,
    /// Return type of a transition, usually a reference such as `#employee`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt: Option<String>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, kind: Type) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_doc(mut self, doc: Doc) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn with_descriptors(mut self, descriptors: Vec<Descriptor>) -> Self {
        self.descriptor = descriptors;
        self
    }

    pub fn with_ext(mut self, ext: Ext) -> Self {
        self.ext = Some(ext);
        self
    }

    pub fn with_rt(mut self, rt: impl Into<String>) -> Self {
        self.rt = Some(rt.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// `<type>-representation`, with one semantic descriptor per property.
/// Prompts become text docs.
pub fn representation_descriptor(descriptor: &TypeDescriptor) -> Descriptor {
    let fields = descriptor
        .properties
        .iter()
        .map(|p| {
            let field = Descriptor::new().with_name(&p.name).with_type(Type::Semantic);
            match &p.prompt {
                Some(prompt) => field.with_doc(Doc::text(prompt)),
                None => field,
            }
        })
        .collect();
    Descriptor::new()
        .with_id(format!("{}-representation", uncapitalize(&descriptor.name)))
        .with_descriptors(fields)
}

/// One transition descriptor per affordance, typed by its HTTP method and
/// returning `rt`.
pub fn transition_descriptor(affordance: &Affordance, rt: &str) -> Descriptor {
    Descriptor::new()
        .with_id(affordance.name())
        .with_name(affordance.name())
        .with_type(Type::for_method(affordance.http_method()))
        .with_rt(rt)
}

/// A profile for `descriptor` and the transitions that act on it.
pub fn profile(descriptor: &TypeDescriptor, affordances: &[Affordance]) -> AlpsDocument {
    let representation = representation_descriptor(descriptor);
    let rt = format!("#{}", representation.id.as_deref().unwrap_or_default());
    let mut descriptors = vec![representation];
    descriptors.extend(affordances.iter().map(|a| transition_descriptor(a, &rt)));
    Alps::new(descriptors).into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypermedia::{Link, PropertyMetadata};
    use serde_json::json;

    #[test]
    fn descriptor_keys_follow_declared_order_and_omit_absent() {
        let descriptor = Descriptor::new()
            .with_ext(Ext {
                id: Some("ext".into()),
                href: None,
                value: Some("v".into()),
            })
            .with_descriptors(vec![Descriptor::new().with_name("inner")])
            .with_doc(Doc::text("docs"))
            .with_type(Type::Semantic)
            .with_name("name")
            .with_href("/href")
            .with_id("id");
        let text = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(
            text,
            r#"{"id":"id","href":"/href","name":"name","type":"SEMANTIC","doc":{"format":"TEXT","value":"docs"},"descriptor":[{"name":"inner"}],"ext":{"id":"ext","value":"v"}}"#
        );
    }

    #[test]
    fn empty_descriptor_is_an_empty_object() {
        assert_eq!(serde_json::to_value(Descriptor::new()).unwrap(), json!({}));
    }

    #[test]
    fn document_wraps_version_and_descriptors() {
        let doc = Alps::new(vec![Descriptor::new().with_id("x")])
            .with_doc(Doc::href("https://example.com/docs"))
            .into_document();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({ "alps": {
                "version": "1.0",
                "doc": { "href": "https://example.com/docs" },
                "descriptor": [ { "id": "x" } ]
            } })
        );
        let back: AlpsDocument = serde_json::from_value(serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn profile_describes_fields_and_transitions() {
        let employee = TypeDescriptor::new("Employee")
            .property(PropertyMetadata::new("name").prompt("Full name"))
            .field("role");
        let self_link = Link::new("/employees/1");
        let update = Affordance::builder(&self_link)
            .method(HttpMethod::Put)
            .input(employee.clone())
            .build();
        let delete = Affordance::builder(&self_link)
            .method(HttpMethod::Delete)
            .name("deleteEmployee")
            .build();

        let doc = serde_json::to_value(profile(&employee, &[update, delete])).unwrap();
        assert_eq!(
            doc["alps"]["descriptor"],
            json!([
                { "id": "employee-representation", "descriptor": [
                    { "name": "name", "type": "SEMANTIC", "doc": { "format": "TEXT", "value": "Full name" } },
                    { "name": "role", "type": "SEMANTIC" }
                ] },
                { "id": "putEmployee", "name": "putEmployee", "type": "IDEMPOTENT", "rt": "#employee-representation" },
                { "id": "deleteEmployee", "name": "deleteEmployee", "type": "IDEMPOTENT", "rt": "#employee-representation" }
            ])
        );
    }
}
