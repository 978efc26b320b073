//! Assembles the axum [`Router`] for the demo service.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    config::HypermediaConfig,
    demo::{handlers, routes, AppState, EmployeeStore},
};

/// Build the complete application router with shared state.
///
/// Paths come from the same [`Route`](crate::link_builder::Route)s the
/// assemblers link to, so links and routing cannot drift apart.
pub fn build_router(config: HypermediaConfig, store: Arc<EmployeeStore>) -> Router {
    let state = AppState::new(config, store);

    Router::new()
        .route(
            routes::employees().path(),
            get(handlers::list).post(handlers::create),
        )
        .route(routes::search().path(), get(handlers::search))
        .route(
            routes::employee().path(),
            get(handlers::get_one)
                .put(handlers::replace)
                .patch(handlers::patch)
                .delete(handlers::remove),
        )
        .route(routes::profile().path(), get(handlers::profile))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
