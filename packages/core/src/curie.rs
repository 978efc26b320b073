//! Compact relations (`ns:rel`) and the providers that produce them.
//!
//! A relation that is already curied is never re-curied, and IANA relations
//! (`self`, `next`, ...) are always rendered as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::link::{Link, LinkRelation, Links};
use crate::uri_template::UriTemplate;

/// A link relation split into an optional curie prefix and a local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HalLinkRelation {
    curie: Option<String>,
    local_part: String,
}

impl HalLinkRelation {
    pub fn curied(curie: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            curie: Some(curie.into()),
            local_part: local_part.into(),
        }
    }

    pub fn uncuried(local_part: impl Into<String>) -> Self {
        Self {
            curie: None,
            local_part: local_part.into(),
        }
    }

    /// Parse `ns:rel`. Absolute URIs such as `http://example.com/rels/x`
    /// stay uncuried.
    pub fn of(relation: &LinkRelation) -> Self {
        match relation.value().split_once(':') {
            Some((curie, local)) if !curie.is_empty() && !local.starts_with("//") => {
                Self::curied(curie, local)
            }
            _ => Self::uncuried(relation.value()),
        }
    }

    pub fn is_curied(&self) -> bool {
        self.curie.is_some()
    }

    pub fn curie_prefix(&self) -> Option<&str> {
        self.curie.as_deref()
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// The rendered relation, `ns:rel` or `rel`.
    pub fn value(&self) -> String {
        match &self.curie {
            Some(curie) => format!("{curie}:{}", self.local_part),
            None => self.local_part.clone(),
        }
    }

    /// Re-prefix with `curie`, replacing any existing prefix.
    pub fn curie(&self, curie: impl Into<String>) -> Self {
        Self::curied(curie, self.local_part.clone())
    }

    /// Prefix with `curie` unless already curied or an IANA relation.
    pub fn curie_if_uncuried(&self, curie: impl Into<String>) -> Self {
        if self.is_curied() || LinkRelation::of(self.local_part.as_str()).is_iana() {
            self.clone()
        } else {
            self.curie(curie)
        }
    }

    /// Message-source keys for a relation title, most specific first.
    pub fn message_codes(&self) -> Vec<String> {
        let mut codes = Vec::with_capacity(2);
        if self.is_curied() {
            codes.push(format!("_links.{}.title", self.value()));
        }
        codes.push(format!("_links.{}.title", self.local_part));
        codes
    }

    pub fn to_link_relation(&self) -> LinkRelation {
        LinkRelation::of(self.value())
    }
}

impl fmt::Display for HalLinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}

/// One entry of a HAL `curies` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curie {
    pub href: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl Curie {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        let href = href.into();
        Self {
            templated: crate::uri_template::is_templated(&href),
            name: name.into(),
            href,
        }
    }
}

/// Namespaces relations during HAL rendering.
pub trait CurieProvider: Send + Sync {
    fn namespaced_rel_from_relation(&self, relation: &LinkRelation) -> HalLinkRelation;

    fn namespaced_rel_from(&self, link: &Link) -> HalLinkRelation {
        self.namespaced_rel_from_relation(&link.rel)
    }

    /// Curie definitions to emit alongside `links`.
    fn curie_information(&self, links: &Links) -> Vec<Curie>;
}

/// Registered curie templates plus an optional default namespace.
#[derive(Debug, Clone)]
pub struct DefaultCurieProvider {
    curies: Vec<(String, UriTemplate)>,
    default_curie: Option<String>,
}

impl DefaultCurieProvider {
    /// A single curie that also serves as the default namespace.
    pub fn new(name: impl Into<String>, template: UriTemplate) -> Self {
        let name = name.into();
        Self {
            default_curie: Some(name.clone()),
            curies: vec![(name, template)],
        }
    }

    /// Several curies. With more than one registered, uncuried relations are
    /// only prefixed when `default_curie` names one of them.
    pub fn with_curies(
        curies: impl IntoIterator<Item = (String, UriTemplate)>,
        default_curie: Option<&str>,
    ) -> Self {
        let curies: Vec<_> = curies.into_iter().collect();
        let default_curie = match default_curie {
            Some(name) => Some(name.to_string()),
            None if curies.len() == 1 => Some(curies[0].0.clone()),
            None => None,
        };
        Self {
            curies,
            default_curie,
        }
    }

    pub fn default_curie(&self) -> Option<&str> {
        self.default_curie.as_deref()
    }
}

impl CurieProvider for DefaultCurieProvider {
    fn namespaced_rel_from_relation(&self, relation: &LinkRelation) -> HalLinkRelation {
        let rel = HalLinkRelation::of(relation);
        match &self.default_curie {
            Some(curie) => rel.curie_if_uncuried(curie.as_str()),
            None => rel,
        }
    }

    fn curie_information(&self, _links: &Links) -> Vec<Curie> {
        self.curies
            .iter()
            .map(|(name, template)| Curie::new(name.as_str(), template.as_str()))
            .collect()
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::IanaLinkRelations;

    #[test]
    fn curied_relation_renders_prefix() {
        let rel = HalLinkRelation::curied("curie", "relation");
        assert!(rel.is_curied());
        assert_eq!(rel.value(), "curie:relation");
    }

    #[test]
    fn parses_curied_and_uncuried_relations() {
        let curied = HalLinkRelation::of(&LinkRelation::of("already:curied"));
        assert!(curied.is_curied());
        assert_eq!(curied.local_part(), "curied");

        let plain = HalLinkRelation::of(&LinkRelation::of("uncuried"));
        assert!(!plain.is_curied());
        assert_eq!(plain.local_part(), "uncuried");

        let uri = HalLinkRelation::of(&LinkRelation::of("http://example.com/rels/x"));
        assert!(!uri.is_curied());
    }

    #[test]
    fn curie_replaces_existing_prefix() {
        let rel = HalLinkRelation::uncuried("relation").curie("curie");
        assert!(rel.is_curied());
        assert_eq!(rel.curie("otherCurie"), HalLinkRelation::curied("otherCurie", "relation"));
    }

    #[test]
    fn curie_if_uncuried_skips_curied_and_iana() {
        let rel = HalLinkRelation::curied("curie", "relation");
        assert_eq!(rel.curie_if_uncuried("otherCurie"), rel);

        let own = HalLinkRelation::of(&LinkRelation::of(IanaLinkRelations::SELF));
        assert!(!own.curie_if_uncuried("curie").is_curied());
    }

    #[test]
    fn message_codes_most_specific_first() {
        let rel = HalLinkRelation::curied("curie", "relation");
        assert_eq!(
            rel.message_codes(),
            vec!["_links.curie:relation.title", "_links.relation.title"]
        );
        assert_eq!(
            HalLinkRelation::uncuried("relation").message_codes(),
            vec!["_links.relation.title"]
        );
    }

    #[test]
    fn default_provider_prefixes_uncuried_relations() {
        let provider =
            DefaultCurieProvider::new("foo", UriTemplate::new("http://localhost:8080/rels/{rel}"));
        let link = Link::with_rel_of("bar", "myrel");
        assert_eq!(provider.namespaced_rel_from(&link).value(), "foo:myrel");
        assert_eq!(provider.namespaced_rel_from(&Link::new("foo")).value(), "self");
    }

    #[test]
    fn curie_information_reflects_templates() {
        let provider =
            DefaultCurieProvider::new("foo", UriTemplate::new("http://localhost:8080/rels/{rel}"));
        let curies = provider.curie_information(&Links::none());
        assert_eq!(curies.len(), 1);
        assert!(curies[0].templated);
        assert_eq!(
            serde_json::to_value(&curies[0]).unwrap(),
            serde_json::json!({
                "href": "http://localhost:8080/rels/{rel}",
                "name": "foo",
                "templated": true
            })
        );

        let plain = Curie::new("foo", "bar");
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::json!({ "href": "bar", "name": "foo" })
        );
    }

    #[test]
    fn several_curies_without_default_leave_relations_alone() {
        let provider = DefaultCurieProvider::with_curies(
            vec![
                ("foo".to_string(), UriTemplate::new("bar")),
                ("bar".to_string(), UriTemplate::new("foo")),
            ],
            None,
        );
        let link = Link::with_rel_of("x", "myrel");
        assert!(!provider.namespaced_rel_from(&link).is_curied());
        assert_eq!(provider.curie_information(&Links::none()).len(), 2);
    }
}
