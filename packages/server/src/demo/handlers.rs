//! Employee handlers.
//!
//! Every handler renders through the shared codec in the configured media
//! type; there is no content negotiation.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use hypermedia::{CollectionModel, Describe, HasLinks, Links};
use hypermedia_mediatype::alps;
use serde::Deserialize;
use tracing::info;

use crate::{
    assembler::RepresentationModelAssembler,
    context::RequestContext,
    error::AppError,
    link_builder::{afford, LinkBuilder},
    response::Hypermedia,
};

use super::{routes, AppState, Employee, EmployeeForm, EmployeePatch};

/// Query parameters for `GET /employees/search`.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub name: Option<String>,
    pub role: Option<String>,
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("employee {id} not found"))
}

fn validate(form: &EmployeeForm) -> Result<(), AppError> {
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// `GET /employees`: every employee, assembled concurrently.
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Hypermedia, AppError> {
    let employees = tokio_stream::iter(state.store.list());
    let model = state.employees.to_collection_model(&ctx, employees).await?;
    Hypermedia::collection(&state.codec, state.config.media_type, &model)
}

/// `POST /employees`: create an employee and return it with `201 Created`.
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<EmployeeForm>,
) -> Result<Hypermedia, AppError> {
    validate(&form)?;
    let employee = state.store.create(form);
    info!(id = employee.id, "employee created");
    let model = state.employees.to_model(&ctx, employee).await;
    let location = model.get_required_link("self")?.href.clone();
    Ok(Hypermedia::entity(&state.codec, state.config.media_type, &model)?.created(location))
}

/// `GET /employees/search{?name,role}`.
pub async fn search(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<SearchParams>,
) -> Result<Hypermedia, AppError> {
    let found = state
        .store
        .search(params.name.as_deref(), params.role.as_deref());
    let assembler = state.employees.assembler();
    let content = found
        .into_iter()
        .map(|employee| assembler.to_model(&ctx, employee))
        .collect();

    let mut bound = Vec::new();
    if let Some(name) = params.name.as_deref() {
        bound.push(("name", name));
    }
    if let Some(role) = params.role.as_deref() {
        bound.push(("role", role));
    }
    let links = Links::of([
        LinkBuilder::link_to(&ctx, &routes::search())
            .expand_all(&bound)
            .with_self_rel(),
        LinkBuilder::link_to(&ctx, &routes::employees()).with_rel("employees"),
    ]);
    let model: CollectionModel<Employee> = CollectionModel::new(content, links);
    Hypermedia::collection(&state.codec, state.config.media_type, &model)
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// `GET /employees/{id}`.
pub async fn get_one(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<u64>,
) -> Result<Hypermedia, AppError> {
    let employee = state.store.get(id).ok_or_else(|| not_found(id))?;
    let model = state.employees.to_model(&ctx, employee).await;
    Hypermedia::entity(&state.codec, state.config.media_type, &model)
}

/// `PUT /employees/{id}`: replace every field.
pub async fn replace(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<u64>,
    Json(form): Json<EmployeeForm>,
) -> Result<Hypermedia, AppError> {
    validate(&form)?;
    let employee = state.store.replace(id, form).ok_or_else(|| not_found(id))?;
    let model = state.employees.to_model(&ctx, employee).await;
    Hypermedia::entity(&state.codec, state.config.media_type, &model)
}

/// `PATCH /employees/{id}`: update only the fields present in the body.
pub async fn patch(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<u64>,
    Json(patch): Json<EmployeePatch>,
) -> Result<Hypermedia, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let employee = state.store.patch(id, patch).ok_or_else(|| not_found(id))?;
    let model = state.employees.to_model(&ctx, employee).await;
    Hypermedia::entity(&state.codec, state.config.media_type, &model)
}

/// `DELETE /employees/{id}`: `204 No Content`.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete(id) {
        return Err(not_found(id));
    }
    info!(id, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// `GET /profile/employees`: ALPS description of the employee fields and
/// the state transitions on them. Always `application/alps+json`.
pub async fn profile(ctx: RequestContext) -> impl IntoResponse {
    let transitions = [
        afford(&ctx, &routes::create(), &[]),
        afford(&ctx, &routes::update(), &[]),
        afford(&ctx, &routes::partial_update(), &[]),
        afford(&ctx, &routes::delete(), &[]),
    ];
    let doc = alps::profile(&Employee::describe(), &transitions);
    ([(header::CONTENT_TYPE, alps::MIME)], Json(doc))
}
