//! `hyperdoc`: command-line interface for hypermedia documents.
//!
//! Provides two subcommands:
//!
//! - **`convert`**: re-render a document from one format in another.
//! - **`links`**: list the links of a document, optionally by relation.
//!
//! Both read JSON from a file path, from stdin (`-`), or from an `http(s)`
//! URL, in which case the `Accept` header names the `--from` / `--format`
//! media type.

use std::fs;
use std::io::{self, Read};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hypermedia::{DefaultCurieProvider, Links, MediaType, UriTemplate};
use hypermedia_mediatype::{hal, HalConfiguration, HalLinkDiscoverer, HypermediaCodec, RenderSingleLinks};
use serde_json::Value;

/// hyperdoc: hypermedia document CLI
///
/// Convert and inspect HAL, HAL-FORMS, UBER and Collection+JSON documents.
#[derive(Parser)]
#[command(name = "hyperdoc", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-render a document in another format.
    ///
    /// Formats: hal | hal-forms | uber | collection-json (MIME types are
    /// accepted too). Affordances do not survive reading, so HAL-FORMS
    /// templates are not carried into the output.
    ///
    /// Examples:
    ///   hyperdoc convert --from hal --to uber employee.json
    ///   curl -s .../employees | hyperdoc convert --from hal --to collection-json --collection -
    Convert {
        /// Format of the input document.
        #[arg(long, value_name = "FORMAT")]
        from: MediaType,

        /// Format to render.
        #[arg(long, value_name = "FORMAT")]
        to: MediaType,

        /// Treat the input as a collection rather than a single entity.
        #[arg(long)]
        collection: bool,

        /// Treat the input as links only, ignoring any payload.
        #[arg(long, conflicts_with = "collection")]
        links_only: bool,

        /// Default curie for HAL output, as name=template (e.g. ex=/rels/{rel}).
        #[arg(long, value_name = "NAME=TEMPLATE", env = "HYPERMEDIA_CURIE")]
        curie: Option<String>,

        /// Render lone HAL links as `single` objects or one-element `array`s.
        #[arg(long, value_name = "MODE", default_value = "single")]
        hal_links: RenderSingleLinks,

        /// Print compact JSON instead of pretty-printing.
        #[arg(long)]
        compact: bool,

        /// Path to a JSON file, `-` for stdin, or an http(s) URL.
        file: String,
    },

    /// Print the links of a document, one `rel href` pair per line.
    ///
    /// With --rel, prints only links of that relation and exits 1 if there
    /// are none.
    Links {
        /// Format of the input document.
        #[arg(long, value_name = "FORMAT")]
        format: MediaType,

        /// Only print links with this relation.
        #[arg(long, value_name = "REL")]
        rel: Option<String>,

        /// Path to a JSON file, `-` for stdin, or an http(s) URL.
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            from,
            to,
            collection,
            links_only,
            curie,
            hal_links,
            compact,
            file,
        } => {
            let codec = build_codec(curie.as_deref(), hal_links).unwrap_or_else(|e| fatal(&e));
            let text = read_input(&file, from);
            let shape = if links_only {
                Shape::Links
            } else if collection {
                Shape::Collection
            } else {
                Shape::Entity
            };
            let value = convert(&codec, from, to, shape, &text)
                .unwrap_or_else(|e| fatal(&format!("conversion failed: {e}")));
            let out = if compact {
                value.to_string()
            } else {
                serde_json::to_string_pretty(&value).unwrap_or_else(|e| fatal(&e.to_string()))
            };
            println!("{out}");
        }

        Command::Links { format, rel, file } => {
            let text = read_input(&file, format);
            let links = find_links(format, rel.as_deref(), &text)
                .unwrap_or_else(|e| fatal(&format!("failed to read links: {e}")));
            if links.is_empty() {
                if let Some(rel) = rel {
                    eprintln!("no link with rel {rel:?}");
                    process::exit(1);
                }
            }
            for link in &links {
                println!("{}\t{}", link.rel, link.href);
            }
        }
    }
}

/// What to read the input document as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Links,
    Entity,
    Collection,
}

fn build_codec(curie: Option<&str>, hal_links: RenderSingleLinks) -> Result<HypermediaCodec, String> {
    let codec = HypermediaCodec::new()
        .with_hal_configuration(HalConfiguration::new().with_render_single_links(hal_links));
    let Some(curie) = curie else {
        return Ok(codec);
    };
    let (name, template) = curie
        .split_once('=')
        .filter(|(n, t)| !n.is_empty() && t.contains("{rel}"))
        .ok_or_else(|| format!("invalid curie {curie:?}; expected name=template with a {{rel}} variable"))?;
    Ok(codec.with_curie_provider(Arc::new(DefaultCurieProvider::new(
        name,
        UriTemplate::new(template),
    ))))
}

/// Payloads are carried as raw JSON, so any document shape converts.
fn convert(
    codec: &HypermediaCodec,
    from: MediaType,
    to: MediaType,
    shape: Shape,
    text: &str,
) -> hypermedia::Result<Value> {
    match shape {
        Shape::Links => {
            let model = codec.read_model(from, text)?;
            codec.write_model(to, &model)
        }
        Shape::Entity => {
            let model = codec.read_entity::<Value>(from, text)?;
            codec.write_entity(to, &model)
        }
        Shape::Collection => {
            let model = codec.read_collection::<Value>(from, text)?;
            codec.write_collection(to, &model)
        }
    }
}

/// HAL-family documents go through the link discoverer, which never needs
/// to understand the payload.
fn find_links(format: MediaType, rel: Option<&str>, text: &str) -> hypermedia::Result<Links> {
    if HalLinkDiscoverer.supports(format) {
        return match rel {
            Some(rel) => HalLinkDiscoverer.find_links_with_rel(rel, text),
            None => {
                let json: Value = serde_json::from_str(text)?;
                hal::read_links(json.get(hal::LINKS))
            }
        };
    }
    let model = HypermediaCodec::new().read_model(format, text)?;
    Ok(match rel {
        Some(rel) => model.links.iter().filter(|l| l.has_rel(rel)).cloned().collect::<Links>(),
        None => model.links,
    })
}

/// Read the full contents of a file, stdin when the path is `"-"`, or the
/// body of an `http(s)` URL.
fn read_input(path: &str, media: MediaType) -> String {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else if path.starts_with("http://") || path.starts_with("https://") {
        fetch(path, media).unwrap_or_else(|e| fatal(&format!("failed to fetch {path}: {e}")))
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path, e)))
    }
}

fn fetch(url: &str, media: MediaType) -> Result<String, reqwest::Error> {
    reqwest::blocking::Client::new()
        .get(url)
        .header(reqwest::header::ACCEPT, media.mime())
        .send()?
        .error_for_status()?
        .text()
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("hyperdoc: {}", msg);
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAL_EMPLOYEE: &str = r#"{
        "name": "Frodo",
        "role": "ring bearer",
        "_links": {
            "self": { "href": "/employees/1" },
            "employees": { "href": "/employees" }
        }
    }"#;

    #[test]
    fn converts_hal_entity_to_uber() {
        let codec = HypermediaCodec::new();
        let uber = convert(&codec, MediaType::Hal, MediaType::Uber, Shape::Entity, HAL_EMPLOYEE)
            .unwrap();
        let data = uber["uber"]["data"].as_array().unwrap();
        assert!(data.iter().any(|d| d["url"] == "/employees/1"));
    }

    #[test]
    fn converted_entity_reads_back() {
        let codec = HypermediaCodec::new();
        let cj = convert(
            &codec,
            MediaType::Hal,
            MediaType::CollectionJson,
            Shape::Entity,
            HAL_EMPLOYEE,
        )
        .unwrap();
        let back = codec
            .read_entity::<Value>(MediaType::CollectionJson, &cj.to_string())
            .unwrap();
        assert_eq!(back.content["name"], "Frodo");
    }

    #[test]
    fn links_by_rel() {
        let links = find_links(MediaType::Hal, Some("employees"), HAL_EMPLOYEE).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links.as_slice()[0].href, "/employees");

        let all = find_links(MediaType::Hal, None, HAL_EMPLOYEE).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn curie_argument_is_validated() {
        assert!(build_codec(Some("ex=/rels/{rel}"), RenderSingleLinks::AsSingle).is_ok());
        assert!(build_codec(Some("ex"), RenderSingleLinks::AsSingle).is_err());
        assert!(build_codec(Some("ex=/rels"), RenderSingleLinks::AsSingle).is_err());
    }

    #[test]
    fn curied_hal_output() {
        let codec = build_codec(Some("ex=/rels/{rel}"), RenderSingleLinks::AsSingle).unwrap();
        let hal = convert(&codec, MediaType::Hal, MediaType::Hal, Shape::Entity, HAL_EMPLOYEE)
            .unwrap();
        assert!(hal["_links"].get("ex:employees").is_some());
        assert!(hal["_links"].get("curies").is_some());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
