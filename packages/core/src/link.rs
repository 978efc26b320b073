//! Links and link relations.
//!
//! A [`Link`] is a URI plus the [`LinkRelation`] that explains why it is
//! there. Links may carry [`Affordance`]s describing the state transitions
//! available at their target; the affordances are shared (`Arc`) so copying a
//! link never duplicates them.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::affordance::Affordance;
use crate::error::{Error, Result};
use crate::uri_template::{self, UriTemplate};

/// The semantic name of a link's purpose, relative to its containing resource.
///
/// Serialises as a plain JSON string (e.g. `"self"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkRelation(String);

impl LinkRelation {
    pub fn of(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// `true` if this relation is registered with IANA, compared
    /// case-insensitively.
    pub fn is_iana(&self) -> bool {
        IanaLinkRelations::is_iana_rel(&self.0)
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkRelation {
    fn from(value: &str) -> Self {
        LinkRelation::of(value)
    }
}

impl From<String> for LinkRelation {
    fn from(value: String) -> Self {
        LinkRelation::of(value)
    }
}

impl From<&LinkRelation> for LinkRelation {
    fn from(value: &LinkRelation) -> Self {
        value.clone()
    }
}

/// Relations registered in the IANA link relation registry.
pub struct IanaLinkRelations;

impl IanaLinkRelations {
    pub const SELF: &'static str = "self";
    pub const NEXT: &'static str = "next";
    pub const PREV: &'static str = "prev";
    pub const FIRST: &'static str = "first";
    pub const LAST: &'static str = "last";
    pub const ITEM: &'static str = "item";
    pub const COLLECTION: &'static str = "collection";
    pub const EDIT: &'static str = "edit";
    pub const PROFILE: &'static str = "profile";
    pub const SEARCH: &'static str = "search";
    pub const DESCRIBEDBY: &'static str = "describedby";
    pub const RELATED: &'static str = "related";

    const ALL: &'static [&'static str] = &[
        "about", "alternate", "appendix", "archives", "author", "blocked-by", "bookmark",
        "canonical", "chapter", "cite-as", "collection", "contents", "convertedfrom",
        "copyright", "create-form", "current", "describedby", "describes", "disclosure",
        "dns-prefetch", "duplicate", "edit", "edit-form", "edit-media", "enclosure", "first",
        "glossary", "help", "hosts", "hub", "icon", "index", "item", "last", "latest-version",
        "license", "lrdd", "memento", "monitor", "monitor-group", "next", "next-archive",
        "nofollow", "noreferrer", "original", "payment", "pingback", "preconnect",
        "predecessor-version", "prefetch", "preload", "prerender", "prev", "preview",
        "previous", "prev-archive", "privacy-policy", "profile", "related", "replies",
        "search", "section", "self", "service", "start", "stylesheet", "subsection",
        "successor-version", "tag", "terms-of-service", "timegate", "timemap", "type", "up",
        "version-history", "via", "webmention", "working-copy", "working-copy-of",
    ];

    /// `true` if `rel` is an IANA-registered relation (case-insensitive).
    pub fn is_iana_rel(rel: &str) -> bool {
        Self::ALL.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// A hypermedia link.
///
/// Equality and hashing consider only `href` and `rel`; descriptive
/// attributes and affordances are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub rel: LinkRelation,
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
    #[serde(skip)]
    pub affordances: Vec<Arc<Affordance>>,
}

impl Link {
    /// Create a link with the `self` relation.
    pub fn new(href: impl Into<String>) -> Self {
        Self::with_rel_of(href, IanaLinkRelations::SELF)
    }

    pub fn with_rel_of(href: impl Into<String>, rel: impl Into<LinkRelation>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            hreflang: None,
            media: None,
            title: None,
            media_type: None,
            deprecation: None,
            profile: None,
            name: None,
            affordances: Vec::new(),
        }
    }

    pub fn rel(&self) -> &LinkRelation {
        &self.rel
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn has_rel(&self, rel: &str) -> bool {
        self.rel.value() == rel
    }

    pub fn with_rel(&self, rel: impl Into<LinkRelation>) -> Self {
        Self {
            rel: rel.into(),
            ..self.clone()
        }
    }

    pub fn with_self_rel(&self) -> Self {
        self.with_rel(IanaLinkRelations::SELF)
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_type(&self, media_type: impl Into<String>) -> Self {
        Self {
            media_type: Some(media_type.into()),
            ..self.clone()
        }
    }

    pub fn with_hreflang(&self, hreflang: impl Into<String>) -> Self {
        Self {
            hreflang: Some(hreflang.into()),
            ..self.clone()
        }
    }

    pub fn with_deprecation(&self, deprecation: impl Into<String>) -> Self {
        Self {
            deprecation: Some(deprecation.into()),
            ..self.clone()
        }
    }

    pub fn with_profile(&self, profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
            ..self.clone()
        }
    }

    /// A copy of this link carrying one more affordance.
    pub fn and_affordance(&self, affordance: Affordance) -> Self {
        let mut affordances = self.affordances.clone();
        affordances.push(Arc::new(affordance));
        Self {
            affordances,
            ..self.clone()
        }
    }

    pub fn and_affordances(&self, affordances: impl IntoIterator<Item = Affordance>) -> Self {
        let mut all = self.affordances.clone();
        all.extend(affordances.into_iter().map(Arc::new));
        Self {
            affordances: all,
            ..self.clone()
        }
    }

    /// A copy of this link with its affordances replaced.
    pub fn with_affordances(&self, affordances: Vec<Arc<Affordance>>) -> Self {
        Self {
            affordances,
            ..self.clone()
        }
    }

    pub fn affordances(&self) -> &[Arc<Affordance>] {
        &self.affordances
    }

    pub fn is_templated(&self) -> bool {
        uri_template::is_templated(&self.href)
    }

    pub fn variable_names(&self) -> Vec<String> {
        UriTemplate::new(self.href.as_str())
            .variable_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Expand the href template with the given values.
    pub fn expand(&self, values: &HashMap<String, String>) -> Self {
        Self {
            href: UriTemplate::new(self.href.as_str()).expand(values),
            ..self.clone()
        }
    }

    /// Expand the href template without values, dropping optional parts.
    pub fn expand_empty(&self) -> Self {
        self.expand(&HashMap::new())
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.href == other.href && self.rel == other.rel
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.href.hash(state);
        self.rel.hash(state);
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>;rel=\"{}\"", self.href, self.rel)
    }
}

/// An ordered collection of links. Relations need not be unique.
///
/// Equality compares the links as a multiset: formats group links by
/// relation or by href on the wire, so two collections holding the same
/// links in a different order are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl PartialEq for Links {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let mut counts: HashMap<&Link, isize> = HashMap::new();
        for link in &self.0 {
            *counts.entry(link).or_default() += 1;
        }
        for link in &other.0 {
            *counts.entry(link).or_default() -= 1;
        }
        counts.values().all(|&n| n == 0)
    }
}

impl Eq for Links {}

impl Links {
    pub const fn none() -> Self {
        Links(Vec::new())
    }

    pub fn of(links: impl IntoIterator<Item = Link>) -> Self {
        Links(links.into_iter().collect())
    }

    /// A new collection with `link` appended.
    pub fn and(&self, link: Link) -> Self {
        let mut links = self.0.clone();
        links.push(link);
        Links(links)
    }

    pub fn and_all(&self, links: impl IntoIterator<Item = Link>) -> Self {
        let mut all = self.0.clone();
        all.extend(links);
        Links(all)
    }

    /// Append links that are not already present (by href and rel).
    pub fn merge(&self, links: impl IntoIterator<Item = Link>) -> Self {
        let mut all = self.0.clone();
        for link in links {
            if !all.contains(&link) {
                all.push(link);
            }
        }
        Links(all)
    }

    pub fn without_rel(&self, rel: &str) -> Self {
        Links(self.0.iter().filter(|l| !l.has_rel(rel)).cloned().collect())
    }

    /// First link with the given relation.
    pub fn get_link(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|l| l.has_rel(rel))
    }

    pub fn get_required_link(&self, rel: &str) -> Result<&Link> {
        self.get_link(rel)
            .ok_or_else(|| Error::MissingLink(rel.to_string()))
    }

    pub fn links_with_rel(&self, rel: &str) -> Vec<&Link> {
        self.0.iter().filter(|l| l.has_rel(rel)).collect()
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.get_link(rel).is_some()
    }

    pub fn push(&mut self, link: Link) {
        self.0.push(link);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.0
    }
}

impl IntoIterator for Links {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Links(iter.into_iter().collect())
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Links(links)
    }
}

// --- tests -------------------------------------------------------------------
