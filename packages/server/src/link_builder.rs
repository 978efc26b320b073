//! Route-driven link and affordance construction.
//!
//! A [`Route`] describes one handler: its method, its axum path (the same
//! `{var}` syntax doubles as a URI template), and the shapes it consumes
//! and produces. [`LinkBuilder`] turns a route into an absolute [`Link`];
//! [`afford`] turns it into an [`Affordance`].

use std::collections::HashMap;
use std::fmt::Display;

use hypermedia::{
    Affordance, Describe, HttpMethod, Link, LinkRelation, QueryParameter, TypeDescriptor,
    UriTemplate,
};

use crate::context::RequestContext;

/// Metadata for one handler.
#[derive(Debug, Clone)]
pub struct Route {
    method: HttpMethod,
    path: &'static str,
    name: Option<String>,
    input: Option<TypeDescriptor>,
    output: Option<TypeDescriptor>,
    query_parameters: Vec<QueryParameter>,
}

impl Route {
    pub fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            name: None,
            input: None,
            output: None,
            query_parameters: Vec::new(),
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: &'static str) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: &'static str) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: &'static str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input(mut self, input: TypeDescriptor) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_input_of<T: Describe>(self) -> Self {
        self.with_input(T::describe())
    }

    pub fn with_output_of<T: Describe>(mut self) -> Self {
        self.output = Some(T::describe());
        self
    }

    pub fn with_query_parameter(mut self, parameter: QueryParameter) -> Self {
        self.query_parameters.push(parameter);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The axum path, e.g. `/employees/{id}`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn query_parameters(&self) -> &[QueryParameter] {
        &self.query_parameters
    }

    /// `{?a,b}` for the declared query parameters, empty when there are none.
    fn query_template(&self) -> String {
        if self.query_parameters.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = self
            .query_parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        format!("{{?{}}}", names.join(","))
    }
}

// ---------------------------------------------------------------------------
// LinkBuilder
// ---------------------------------------------------------------------------

/// Builds an absolute link to a [`Route`].
///
/// ```rust,ignore
/// let link = LinkBuilder::link_to(&ctx, &routes::employee())
///     .expand(&[("id", "7")])
///     .with_self_rel();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    path: String,
    query: String,
}

impl LinkBuilder {
    pub fn link_to(ctx: &RequestContext, route: &Route) -> Self {
        Self {
            path: ctx.uri_for(route.path),
            query: route.query_template(),
        }
    }

    /// Append one percent-encoded path segment.
    pub fn slash(mut self, segment: impl Display) -> Self {
        let segment = segment.to_string();
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            self.path.push('/');
            self.path.push_str(&urlencoding::encode(segment));
        }
        self
    }

    /// Expand path variables. The query template, if any, is kept.
    pub fn expand(mut self, params: &[(&str, &str)]) -> Self {
        self.path = UriTemplate::new(self.path).expand(&to_map(params));
        self
    }

    /// Expand path and query variables alike; unbound query variables are dropped.
    pub fn expand_all(self, params: &[(&str, &str)]) -> Self {
        Self {
            path: UriTemplate::new(self.to_uri()).expand(&to_map(params)),
            query: String::new(),
        }
    }

    pub fn to_uri(&self) -> String {
        format!("{}{}", self.path, self.query)
    }

    pub fn with_rel(&self, rel: impl Into<LinkRelation>) -> Link {
        Link::with_rel_of(self.to_uri(), rel)
    }

    pub fn with_self_rel(&self) -> Link {
        Link::new(self.to_uri())
    }
}

fn to_map(params: &[(&str, &str)]) -> HashMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Build an affordance for `route` with its path variables bound to `params`.
pub fn afford(ctx: &RequestContext, route: &Route, params: &[(&str, &str)]) -> Affordance {
    let target = LinkBuilder::link_to(ctx, route).expand(params).with_self_rel();
    let mut builder = Affordance::builder(&target)
        .method(route.method)
        .query_parameters(route.query_parameters.iter().cloned());
    if let Some(name) = &route.name {
        builder = builder.name(name.clone());
    }
    if let Some(input) = &route.input {
        builder = builder.input(input.clone());
    }
    if let Some(output) = &route.output {
        builder = builder.output(output.clone());
    }
    builder.build()
}
