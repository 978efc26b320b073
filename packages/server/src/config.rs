//! Service configuration, populated from environment variables.

use std::net::SocketAddr;
use std::sync::Arc;

use hypermedia::{DefaultCurieProvider, MediaType, UriTemplate};
use hypermedia_mediatype::{HalConfiguration, HypermediaCodec, RenderSingleLinks};

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid socket address (e.g. 0.0.0.0:8080), got {value:?}")]
    BindAddr { var: &'static str, value: String },

    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Runtime configuration for a hypermedia service.
///
/// All fields are populated from environment variables with sensible
/// defaults, so the demo can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `HYPERMEDIA_BIND` | `0.0.0.0:8080` | TCP socket address to listen on |
/// | `HYPERMEDIA_BASE_URI` | derived from `HYPERMEDIA_BIND` | Base URI used when a request carries no `Host` |
/// | `HYPERMEDIA_MEDIA_TYPE` | `hal-forms` | Format every response is rendered in |
/// | `HYPERMEDIA_CURIE` | (absent) | Default curie as `name=template`, e.g. `ex=/rels/{rel}` |
/// | `HYPERMEDIA_HAL_LINKS` | `single` | `single` or `array` rendering of lone HAL links |
#[derive(Debug, Clone)]
pub struct HypermediaConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Fallback base URI, without a trailing slash.
    pub base_uri: String,

    /// Format used for every response body.
    pub media_type: MediaType,

    /// `(name, template)` of the default curie, if any.
    pub curie: Option<(String, String)>,

    pub hal_links: RenderSingleLinks,
}

impl Default for HypermediaConfig {
    fn default() -> Self {
        let bind_addr = SocketAddr::from(([0, 0, 0, 0], 8080));
        Self {
            bind_addr,
            base_uri: format!("http://{bind_addr}"),
            media_type: MediaType::HalForms,
            curie: None,
            hal_links: RenderSingleLinks::AsSingle,
        }
    }
}

impl HypermediaConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match lookup("HYPERMEDIA_BIND") {
            Some(value) => value.parse::<SocketAddr>().map_err(|_| ConfigError::BindAddr {
                var: "HYPERMEDIA_BIND",
                value,
            })?,
            None => defaults.bind_addr,
        };

        let base_uri = lookup("HYPERMEDIA_BASE_URI")
            .unwrap_or_else(|| format!("http://{bind_addr}"))
            .trim_end_matches('/')
            .to_string();

        let media_type = match lookup("HYPERMEDIA_MEDIA_TYPE") {
            Some(value) => value.parse::<MediaType>().map_err(|message| ConfigError::Invalid {
                var: "HYPERMEDIA_MEDIA_TYPE",
                message,
            })?,
            None => defaults.media_type,
        };

        let curie = match lookup("HYPERMEDIA_CURIE") {
            Some(value) => Some(parse_curie(&value)?),
            None => None,
        };

        let hal_links = match lookup("HYPERMEDIA_HAL_LINKS") {
            Some(value) => value.parse::<RenderSingleLinks>().map_err(|message| ConfigError::Invalid {
                var: "HYPERMEDIA_HAL_LINKS",
                message,
            })?,
            None => defaults.hal_links,
        };

        Ok(Self {
            bind_addr,
            base_uri,
            media_type,
            curie,
            hal_links,
        })
    }

    /// Build the codec every handler renders through.
    pub fn codec(&self) -> HypermediaCodec {
        let codec = HypermediaCodec::new().with_hal_configuration(
            HalConfiguration::new().with_render_single_links(self.hal_links),
        );
        match &self.curie {
            Some((name, template)) => codec.with_curie_provider(Arc::new(
                DefaultCurieProvider::new(name.clone(), UriTemplate::new(template.clone())),
            )),
            None => codec,
        }
    }
}

fn parse_curie(value: &str) -> Result<(String, String), ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
        var: "HYPERMEDIA_CURIE",
        message: format!("{message} in {value:?}; expected name=template"),
    };
    let (name, template) = value.split_once('=').ok_or_else(|| invalid("missing '='"))?;
    let (name, template) = (name.trim(), template.trim());
    if name.is_empty() || template.is_empty() {
        return Err(invalid("empty name or template"));
    }
    if !template.contains("{rel}") {
        return Err(invalid("template lacks a {rel} variable"));
    }
    Ok((name.to_string(), template.to_string()))
}
