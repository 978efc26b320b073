//! Link lookup over raw HAL text.

use serde_json::Value;

use hypermedia::{Link, Links, MediaType, Result};

use super::{read_links, LINKS};

/// Finds links by relation in a HAL or HAL-FORMS document.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalLinkDiscoverer;

impl HalLinkDiscoverer {
    pub fn supports(&self, media: MediaType) -> bool {
        matches!(media, MediaType::Hal | MediaType::HalForms)
    }

    /// The first link with `rel`, or `None` when the document has no such
    /// link or no `_links` container at all.
    pub fn find_link_with_rel(&self, rel: &str, json: &str) -> Result<Option<Link>> {
        Ok(self.find_links_with_rel(rel, json)?.into_iter().next())
    }

    pub fn find_links_with_rel(&self, rel: &str, json: &str) -> Result<Links> {
        let value: Value = serde_json::from_str(json)?;
        let links = read_links(value.get(LINKS))?;
        Ok(links.iter().filter(|l| l.rel.value() == rel).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{ "_links" : {
        "self" : { "href" : "selfHref" },
        "relation" : [ { "href" : "firstHref" }, { "href" : "secondHref" } ],
        "http://www.foo.com/bar" : { "href" : "fullRelHref" }
    } }"#;

    #[test]
    fn finds_single_link() {
        let link = HalLinkDiscoverer.find_link_with_rel("self", SAMPLE).unwrap().unwrap();
        assert_eq!(link.href, "selfHref");
    }

    #[test]
    fn finds_first_of_many() {
        let d = HalLinkDiscoverer;
        let link = d.find_link_with_rel("relation", SAMPLE).unwrap().unwrap();
        assert_eq!(link.href, "firstHref");
        let all = d.find_links_with_rel("relation", SAMPLE).unwrap();
        let hrefs: Vec<_> = all.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["firstHref", "secondHref"]);
    }

    #[test]
    fn discovers_fully_qualified_rel() {
        let link = HalLinkDiscoverer
            .find_link_with_rel("http://www.foo.com/bar", SAMPLE)
            .unwrap()
            .unwrap();
        assert_eq!(link.href, "fullRelHref");
    }

    #[test]
    fn unknown_rel_or_missing_container_yields_nothing() {
        let d = HalLinkDiscoverer;
        assert!(d.find_link_with_rel("unknown", SAMPLE).unwrap().is_none());
        assert!(d.find_links_with_rel("self", "{}").unwrap().is_empty());
    }

    #[test]
    fn supports_hal_flavours_only() {
        assert!(HalLinkDiscoverer.supports(MediaType::HalForms));
        assert!(!HalLinkDiscoverer.supports(MediaType::Uber));
    }
}
