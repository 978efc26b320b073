//! Shared helpers for the hypermedia conformance test suite.
//!
//! Provides [`spawn_server`]: a function that binds a `TcpListener` on an
//! ephemeral port, wires up the in-process demo service backed by an
//! [`EmployeeStore`], and returns both the local URL and a reference to the
//! store so tests can inspect state without going through the HTTP layer.

use std::sync::Arc;

use hypermedia::MediaType;
use hypermedia_server::{build_router, EmployeeStore, HypermediaConfig};

/// Start an ephemeral in-process service rendering `media_type` and return
/// `(base_url, store)`.
///
/// The service runs in a background `tokio` task and is bound to an
/// OS-assigned port on `127.0.0.1`. The returned `String` is the base URL,
/// e.g. `http://127.0.0.1:51234`. The store starts with the two sample
/// employees.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_server(media_type: MediaType) -> (String, Arc<EmployeeStore>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let store = Arc::new(EmployeeStore::with_samples());
    let config = HypermediaConfig {
        bind_addr: addr,
        base_uri: base_url.clone(),
        media_type,
        ..HypermediaConfig::default()
    };
    let router = build_router(config, Arc::clone(&store));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance server error");
    });

    (base_url, store)
}
