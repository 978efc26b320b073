//! Affordances: state transitions reachable from a resource.
//!
//! An [`Affordance`] couples a target [`Link`] with an HTTP method and the
//! shape of the expected input. Every affordance-aware [`MediaType`] gets its
//! own [`AffordanceModel`], built once inside the constructor and never
//! changed afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::affordance_model::AffordanceModel;
use crate::link::Link;
use crate::media_type::MediaType;
use crate::property::{Describe, TypeDescriptor};

/// HTTP request methods.
///
/// Serialises as the uppercase method name (e.g. `"POST"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    /// Methods that never change server state.
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            HttpMethod::Get | HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace
        )
    }

    /// Methods that create or modify an entity and therefore take a body.
    pub fn is_entity_altering(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Methods whose body must be complete, making every input field required.
    pub fn implies_required(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// Formats the method as its uppercase wire name (e.g. `"PATCH"`).
impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Options => write!(f, "OPTIONS"),
            HttpMethod::Trace => write!(f, "TRACE"),
        }
    }
}

/// Parses a method name case-insensitively.
impl FromStr for HttpMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(format!("unknown HTTP method {:?}", s)),
        }
    }
}

/// A query parameter accepted by a safe affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl QueryParameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            required: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// One possible state transition: method + target + input/output shape.
#[derive(Debug, Clone)]
pub struct Affordance {
    name: String,
    target: Link,
    http_method: HttpMethod,
    input_type: Option<TypeDescriptor>,
    query_parameters: Vec<QueryParameter>,
    output_type: Option<TypeDescriptor>,
    models: Vec<AffordanceModel>,
}

impl Affordance {
    /// Build an affordance and all of its format-specific models.
    ///
    /// The stored target never carries affordances of its own.
    pub fn new(
        name: impl Into<String>,
        target: &Link,
        http_method: HttpMethod,
        input_type: Option<TypeDescriptor>,
        query_parameters: Vec<QueryParameter>,
        output_type: Option<TypeDescriptor>,
    ) -> Self {
        let mut affordance = Self {
            name: name.into(),
            target: target.with_affordances(Vec::new()),
            http_method,
            input_type,
            query_parameters,
            output_type,
            models: Vec::new(),
        };
        affordance.models = MediaType::AFFORDANCE_AWARE
            .into_iter()
            .filter_map(|media| AffordanceModel::build(media, &affordance))
            .collect();
        affordance
    }

    pub fn builder(target: &Link) -> AffordanceBuilder {
        AffordanceBuilder::new(target)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Link {
        &self.target
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn has_http_method(&self, method: HttpMethod) -> bool {
        self.http_method == method
    }

    pub fn input_type(&self) -> Option<&TypeDescriptor> {
        self.input_type.as_ref()
    }

    pub fn query_parameters(&self) -> &[QueryParameter] {
        &self.query_parameters
    }

    pub fn output_type(&self) -> Option<&TypeDescriptor> {
        self.output_type.as_ref()
    }

    /// The target URI with optional template parts removed.
    pub fn uri(&self) -> String {
        self.target.expand_empty().href
    }

    /// The model for `media`, if that format renders affordances.
    pub fn model(&self, media: MediaType) -> Option<&AffordanceModel> {
        self.models.iter().find(|m| m.media_type() == media)
    }
}

/// Fluent construction of an [`Affordance`].
///
/// ```rust,ignore
/// let update = Affordance::builder(&self_link)
///     .method(HttpMethod::Put)
///     .input_of::<Employee>()
///     .name("updateEmployee")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct AffordanceBuilder {
    target: Link,
    method: HttpMethod,
    name: Option<String>,
    input: Option<TypeDescriptor>,
    query: Vec<QueryParameter>,
    output: Option<TypeDescriptor>,
}

impl AffordanceBuilder {
    fn new(target: &Link) -> Self {
        Self {
            target: target.clone(),
            method: HttpMethod::Get,
            name: None,
            input: None,
            query: Vec::new(),
            output: None,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn input(mut self, input: TypeDescriptor) -> Self {
        self.input = Some(input);
        self
    }

    pub fn input_of<T: Describe>(self) -> Self {
        self.input(T::describe())
    }

    pub fn query_parameter(mut self, parameter: QueryParameter) -> Self {
        self.query.push(parameter);
        self
    }

    pub fn query_parameters(mut self, parameters: impl IntoIterator<Item = QueryParameter>) -> Self {
        self.query.extend(parameters);
        self
    }

    pub fn output(mut self, output: TypeDescriptor) -> Self {
        self.output = Some(output);
        self
    }

    pub fn output_of<T: Describe>(self) -> Self {
        self.output(T::describe())
    }

    /// Name defaults to the lowercase method followed by the input type name
    /// (`postEmployee`), or the bare method when there is no input type.
    pub fn build(self) -> Affordance {
        let name = self.name.unwrap_or_else(|| {
            let method = self.method.to_string().to_lowercase();
            match &self.input {
                Some(input) => format!("{method}{}", input.name),
                None => method,
            }
        });
        Affordance::new(
            name,
            &self.target,
            self.method,
            self.input,
            self.query,
            self.output,
        )
    }
}

// --- tests -------------------------------------------------------------------
