//! Hypermedia media types this workspace can render and read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A hypermedia document format.
///
/// Serialises as the short kebab-case name (e.g. `"hal-forms"`); use
/// [`MediaType::mime`] for the HTTP `Content-Type` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    /// `application/hal+json`: stateless.co/hal
    Hal,
    /// `application/prs.hal-forms+json`: HAL plus `_templates`
    HalForms,
    /// `application/vnd.amundsen-uber+json`: UBER 1.0
    Uber,
    /// `application/vnd.collection+json`: Collection+JSON 1.0
    CollectionJson,
}

impl MediaType {
    /// Every supported format.
    pub const ALL: [MediaType; 4] = [
        MediaType::Hal,
        MediaType::HalForms,
        MediaType::Uber,
        MediaType::CollectionJson,
    ];

    /// Formats that render affordances and therefore need an affordance model.
    pub const AFFORDANCE_AWARE: [MediaType; 3] =
        [MediaType::HalForms, MediaType::Uber, MediaType::CollectionJson];

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Hal => "application/hal+json",
            MediaType::HalForms => "application/prs.hal-forms+json",
            MediaType::Uber => "application/vnd.amundsen-uber+json",
            MediaType::CollectionJson => "application/vnd.collection+json",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            MediaType::Hal => "hal",
            MediaType::HalForms => "hal-forms",
            MediaType::Uber => "uber",
            MediaType::CollectionJson => "collection-json",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Parses either the short name (`"uber"`) or the MIME type, ignoring any
/// parameters such as `;charset=UTF-8`.
impl FromStr for MediaType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        MediaType::ALL
            .into_iter()
            .find(|m| m.short_name() == essence || m.mime() == essence)
            .ok_or_else(|| {
                format!(
                    "unknown media type {:?}; expected one of: \
                     hal, hal-forms, uber, collection-json",
                    s
                )
            })
    }
}
