//! In-memory resources: a payload plus its links, and pages of them.
//!
//! These types are format-agnostic. The media-type crate turns them into
//! HAL, HAL-FORMS, UBER or Collection+JSON documents and back.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::link::{Link, Links};

/// Pagination state of a [`CollectionModel`].
///
/// Serialises with camelCase keys: `size`, `number`, `totalElements`,
/// `totalPages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u64,
    pub number: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl PageMetadata {
    /// Derives `total_pages` as `ceil(total_elements / size)`; 0 when `size`
    /// is 0.
    pub fn new(size: u64, number: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        Self {
            size,
            number,
            total_elements,
            total_pages,
        }
    }
}

/// Anything that carries an ordered set of links.
pub trait HasLinks {
    fn links(&self) -> &Links;

    fn links_mut(&mut self) -> &mut Links;

    fn add_link(&mut self, link: Link) {
        self.links_mut().push(link);
    }

    fn get_link(&self, rel: &str) -> Option<&Link> {
        self.links().get_link(rel)
    }

    fn get_required_link(&self, rel: &str) -> Result<&Link> {
        self.links().get_required_link(rel)
    }

    fn has_link(&self, rel: &str) -> bool {
        self.links().has_link(rel)
    }
}

/// A resource consisting of links only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepresentationModel {
    pub links: Links,
}

impl RepresentationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(links: Links) -> Self {
        Self { links }
    }

    pub fn add(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn add_all(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        for link in links {
            self.links.push(link);
        }
        self
    }
}

impl HasLinks for RepresentationModel {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// A single domain payload plus its links.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityModel<T> {
    pub content: T,
    pub links: Links,
}

impl<T> EntityModel<T> {
    pub fn of(content: T) -> Self {
        Self {
            content,
            links: Links::none(),
        }
    }

    pub fn with_links(content: T, links: Links) -> Self {
        Self { content, links }
    }

    pub fn add(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn add_all(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        for link in links {
            self.links.push(link);
        }
        self
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    /// Transform the payload, keeping the links.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EntityModel<U> {
        EntityModel {
            content: f(self.content),
            links: self.links,
        }
    }
}

impl<T> HasLinks for EntityModel<T> {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// An ordered collection of entities, optionally paged.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionModel<T> {
    pub content: Vec<EntityModel<T>>,
    pub links: Links,
    pub metadata: Option<PageMetadata>,
}

impl<T> CollectionModel<T> {
    pub fn new(content: Vec<EntityModel<T>>, links: Links) -> Self {
        Self {
            content,
            links,
            metadata: None,
        }
    }

    /// Wrap bare payloads; each item starts without links.
    pub fn of(items: impl IntoIterator<Item = T>) -> Self {
        Self::new(items.into_iter().map(EntityModel::of).collect(), Links::none())
    }

    pub fn paged(content: Vec<EntityModel<T>>, metadata: PageMetadata, links: Links) -> Self {
        Self {
            content,
            links,
            metadata: Some(metadata),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Links::none())
    }

    pub fn add(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn add_all(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        for link in links {
            self.links.push(link);
        }
        self
    }

    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterate the bare payloads.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.content.iter().map(EntityModel::content)
    }

    /// Transform every payload, keeping all links and page metadata.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> CollectionModel<U> {
        CollectionModel {
            content: self.content.into_iter().map(|e| e.map(&mut f)).collect(),
            links: self.links,
            metadata: self.metadata,
        }
    }
}

impl<T> HasLinks for CollectionModel<T> {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMetadata::new(20, 0, 41).total_pages, 3);
        assert_eq!(PageMetadata::new(20, 0, 40).total_pages, 2);
        assert_eq!(PageMetadata::new(0, 0, 40).total_pages, 0);
    }

    #[test]
    fn page_metadata_serialises_camel_case() {
        let json = serde_json::to_value(PageMetadata::new(1, 0, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "size": 1, "number": 0, "totalElements": 2, "totalPages": 2 })
        );
    }

    #[test]
    fn entity_model_links() {
        let mut model = EntityModel::of("Frodo").add(Link::new("/employees/1"));
        model.add_link(Link::with_rel_of("/employees", "employees"));
        assert!(model.has_link("self"));
        assert_eq!(model.get_link("employees").unwrap().href, "/employees");
        assert!(matches!(model.get_required_link("edit"), Err(Error::MissingLink(_))));
    }

    #[test]
    fn map_keeps_links() {
        let model = EntityModel::of(2).add(Link::new("/n/2")).map(|n| n * 10);
        assert_eq!(model.content, 20);
        assert!(model.has_link("self"));
    }

    #[test]
    fn collection_of_wraps_items() {
        let collection = CollectionModel::of(vec!["a", "b"]).add(Link::new("/letters"));
        assert_eq!(collection.len(), 2);
        assert!(collection.content.iter().all(|e| e.links.is_empty()));
        assert_eq!(collection.values().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(collection.metadata.is_none());
    }

    #[test]
    fn paged_collection_carries_metadata() {
        let c = CollectionModel::paged(
            vec![EntityModel::of(1)],
            PageMetadata::new(1, 0, 3),
            Links::none(),
        );
        assert_eq!(c.metadata.unwrap().total_pages, 3);
        assert_eq!(c.map(|n| n + 1).values().copied().collect::<Vec<_>>(), vec![2]);
    }
}
