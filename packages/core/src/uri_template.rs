//! Minimal RFC 6570 URI templates.
//!
//! Supports simple `{var}` expressions plus the `+`, `#`, `/`, `?` and `&`
//! operators, which covers every template a link builder or affordance
//! produces. Value modifiers (`{var*}`, `{var:3}`) are accepted and ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `\{([+#/?&]?)([^}]*)\}`
static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([+#/?&]?)([^}]*)\}").expect("invalid URI template regex")
});

/// Returns `true` if `href` contains at least one template expression.
pub fn is_templated(href: &str) -> bool {
    EXPRESSION_RE.is_match(href)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Fragment,
    PathSegment,
    Query,
    QueryContinuation,
}

impl Operator {
    fn parse(s: &str) -> Self {
        match s {
            "+" => Operator::Reserved,
            "#" => Operator::Fragment,
            "/" => Operator::PathSegment,
            "?" => Operator::Query,
            "&" => Operator::QueryContinuation,
            _ => Operator::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Expression {
    operator: Operator,
    names: Vec<String>,
    start: usize,
    end: usize,
}

/// A parsed URI template.
///
/// ```text
/// /employees/{id}        -> /employees/1
/// /employees{?name,role} -> /employees?name=Frodo
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    template: String,
    expressions: Vec<Expression>,
}

impl UriTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let expressions = EXPRESSION_RE
            .captures_iter(&template)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let operator = Operator::parse(caps.get(1).map_or("", |m| m.as_str()));
                let names = caps
                    .get(2)
                    .map_or("", |m| m.as_str())
                    .split(',')
                    .map(strip_modifier)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect();
                Some(Expression {
                    operator,
                    names,
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect();
        Self {
            template,
            expressions,
        }
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn is_templated(&self) -> bool {
        !self.expressions.is_empty()
    }

    /// All variable names in order of appearance.
    pub fn variable_names(&self) -> Vec<&str> {
        self.expressions
            .iter()
            .flat_map(|e| e.names.iter().map(String::as_str))
            .collect()
    }

    /// Expand the template. Missing simple variables become empty strings;
    /// missing query variables are dropped from the query string entirely.
    pub fn expand(&self, values: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut cursor = 0;
        for expr in &self.expressions {
            out.push_str(&self.template[cursor..expr.start]);
            out.push_str(&expand_expression(expr, values));
            cursor = expr.end;
        }
        out.push_str(&self.template[cursor..]);
        out
    }

    /// Expand with no values at all, i.e. strip every optional expression.
    pub fn expand_empty(&self) -> String {
        self.expand(&HashMap::new())
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl Serialize for UriTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.template)
    }
}

impl<'de> Deserialize<'de> for UriTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(UriTemplate::new)
    }
}

// --- helpers -----------------------------------------------------------------

fn strip_modifier(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_suffix('*').unwrap_or(name);
    name.split(':').next().unwrap_or(name)
}

fn expand_expression(expr: &Expression, values: &HashMap<String, String>) -> String {
    let present: Vec<(&str, &str)> = expr
        .names
        .iter()
        .filter_map(|n| values.get(n).map(|v| (n.as_str(), v.as_str())))
        .collect();

    match expr.operator {
        Operator::Simple => join_values(&present, ",", true),
        Operator::Reserved => join_values(&present, ",", false),
        Operator::Fragment if present.is_empty() => String::new(),
        Operator::Fragment => format!("#{}", join_values(&present, ",", false)),
        Operator::PathSegment => present
            .iter()
            .map(|(_, v)| format!("/{}", urlencoding::encode(v)))
            .collect(),
        Operator::Query | Operator::QueryContinuation if present.is_empty() => String::new(),
        Operator::Query | Operator::QueryContinuation => {
            let prefix = if expr.operator == Operator::Query { "?" } else { "&" };
            let pairs: Vec<String> = present
                .iter()
                .map(|(n, v)| format!("{n}={}", urlencoding::encode(v)))
                .collect();
            format!("{prefix}{}", pairs.join("&"))
        }
    }
}

fn join_values(present: &[(&str, &str)], sep: &str, encode: bool) -> String {
    present
        .iter()
        .map(|(_, v)| {
            if encode {
                urlencoding::encode(v).into_owned()
            } else {
                (*v).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(sep)
}

// --- tests -------------------------------------------------------------------
