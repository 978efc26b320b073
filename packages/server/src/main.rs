//! `hypermedia-demo`: an employee directory rendered as hypermedia.
//!
//! # Quick start
//!
//! ```sh
//! # HAL-FORMS on the default port:
//! hypermedia-demo
//!
//! # UBER with a custom bind address:
//! HYPERMEDIA_MEDIA_TYPE=uber HYPERMEDIA_BIND=127.0.0.1:9000 hypermedia-demo
//!
//! # HAL with curied relations:
//! HYPERMEDIA_MEDIA_TYPE=hal HYPERMEDIA_CURIE='hr=/rels/{rel}' hypermedia-demo
//! ```
//!
//! # Environment variables
//!
//! See [`HypermediaConfig::from_env`] for the full list.

use std::sync::Arc;

use hypermedia_server::{build_router, EmployeeStore, HypermediaConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hypermedia_server=info,hypermedia_mediatype=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = match HypermediaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!("rendering {} ({})", config.media_type, config.media_type.mime());
    let bind_addr = config.bind_addr;
    let app = build_router(config, Arc::new(EmployeeStore::with_samples()));

    tracing::info!("listening on {bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    axum::serve(listener, app).await.expect("server error");
}
