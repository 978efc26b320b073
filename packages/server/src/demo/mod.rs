//! In-memory employee directory wiring every piece of the crate together.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/employees` | [`handlers::list`] |
//! | POST | `/employees` | [`handlers::create`] |
//! | GET | `/employees/search{?name,role}` | [`handlers::search`] |
//! | GET | `/employees/{id}` | [`handlers::get_one`] |
//! | PUT | `/employees/{id}` | [`handlers::replace`] |
//! | PATCH | `/employees/{id}` | [`handlers::patch`] |
//! | DELETE | `/employees/{id}` | [`handlers::remove`] |
//! | GET | `/profile/employees` | [`handlers::profile`] (ALPS) |

pub mod handlers;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRef;
use hypermedia::{
    CollectionModel, DelegatingLinkRelationProvider, Describe, EntityModel, HasLinks,
    LinkRelationProvider, PropertyMetadata, QueryParameter, TypeDescriptor,
};
use hypermedia_mediatype::HypermediaCodec;
use serde::{Deserialize, Serialize};

use crate::assembler::{
    Identifiable, IdentifiableModelAssembler, ReactiveAssembler,
    ReactiveRepresentationModelAssembler, RepresentationModelAssembler,
    SimpleRepresentationModelAssembler,
};
use crate::config::HypermediaConfig;
use crate::context::RequestContext;
use crate::link_builder::{afford, LinkBuilder, Route};

pub use store::EmployeeStore;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub role: String,
}

impl Identifiable for Employee {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

impl Describe for Employee {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Employee")
            .property(PropertyMetadata::new("name").prompt("Full name"))
            .property(PropertyMetadata::new("role").prompt("Role"))
    }
}

/// Body of `POST /employees` and `PUT /employees/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeForm {
    pub name: String,
    pub role: String,
}

/// Body of `PATCH /employees/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub mod routes {
    use super::*;

    pub fn employees() -> Route {
        Route::get("/employees").with_name("employees")
    }

    pub fn create() -> Route {
        Route::post("/employees")
            .with_name("createEmployee")
            .with_input_of::<Employee>()
            .with_output_of::<Employee>()
    }

    pub fn search() -> Route {
        Route::get("/employees/search")
            .with_name("search")
            .with_query_parameter(QueryParameter::optional("name"))
            .with_query_parameter(QueryParameter::optional("role"))
    }

    pub fn employee() -> Route {
        Route::get("/employees/{id}")
            .with_name("employee")
            .with_output_of::<Employee>()
    }

    pub fn update() -> Route {
        Route::put("/employees/{id}")
            .with_name("updateEmployee")
            .with_input_of::<Employee>()
    }

    pub fn partial_update() -> Route {
        Route::patch("/employees/{id}")
            .with_name("partiallyUpdateEmployee")
            .with_input_of::<Employee>()
    }

    pub fn delete() -> Route {
        Route::delete("/employees/{id}").with_name("deleteEmployee")
    }

    pub fn profile() -> Route {
        Route::get("/profile/employees").with_name("profile")
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Adds the item affordances (read, update, patch, delete) and the
/// collection affordances (read, create, search).
pub struct EmployeeAssembler {
    links: IdentifiableModelAssembler<Employee>,
}

impl EmployeeAssembler {
    pub fn new(relations: Arc<dyn LinkRelationProvider>) -> Self {
        Self {
            links: IdentifiableModelAssembler::new(routes::employees(), relations),
        }
    }
}

impl SimpleRepresentationModelAssembler<Employee> for EmployeeAssembler {
    fn add_links(&self, ctx: &RequestContext, model: &mut EntityModel<Employee>) {
        let id = model.content.id();
        let params = [("id", id.as_str())];
        let self_link = self.links.self_link(ctx, &model.content).and_affordances([
            afford(ctx, &routes::employee(), &params),
            afford(ctx, &routes::update(), &params),
            afford(ctx, &routes::partial_update(), &params),
            afford(ctx, &routes::delete(), &params),
        ]);
        model.add_link(self_link);
        model.add_link(self.links.collection_link(ctx));
    }

    fn add_collection_links(&self, ctx: &RequestContext, model: &mut CollectionModel<Employee>) {
        let self_link = LinkBuilder::link_to(ctx, &routes::employees())
            .with_self_rel()
            .and_affordances([
                afford(ctx, &routes::employees(), &[]),
                afford(ctx, &routes::create(), &[]),
                afford(ctx, &routes::search(), &[]),
            ]);
        model.add_link(self_link);
        model.add_link(LinkBuilder::link_to(ctx, &routes::search()).with_rel("search"));
        model.add_link(LinkBuilder::link_to(ctx, &routes::profile()).with_rel("profile"));
    }
}

#[async_trait]
impl ReactiveRepresentationModelAssembler<Employee> for EmployeeAssembler {
    async fn to_model(&self, ctx: &RequestContext, entity: Employee) -> EntityModel<Employee> {
        RepresentationModelAssembler::to_model(self, ctx, entity)
    }

    async fn add_collection_links(
        &self,
        ctx: &RequestContext,
        mut model: CollectionModel<Employee>,
    ) -> CollectionModel<Employee> {
        SimpleRepresentationModelAssembler::add_collection_links(self, ctx, &mut model);
        model
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared application state threaded through all handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EmployeeStore>,
    pub config: Arc<HypermediaConfig>,
    pub codec: Arc<HypermediaCodec>,
    pub employees: ReactiveAssembler<EmployeeAssembler>,
}

impl AppState {
    pub fn new(config: HypermediaConfig, store: Arc<EmployeeStore>) -> Self {
        let relations: Arc<dyn LinkRelationProvider> =
            Arc::new(DelegatingLinkRelationProvider::default());
        let codec = config.codec().with_relation_provider(Arc::clone(&relations));
        Self {
            store,
            config: Arc::new(config),
            codec: Arc::new(codec),
            employees: ReactiveAssembler::new(EmployeeAssembler::new(relations)),
        }
    }
}

impl FromRef<AppState> for Arc<HypermediaConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.config)
    }
}
