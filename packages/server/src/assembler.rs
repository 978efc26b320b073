//! Turning domain values into representation models.
//!
//! | Trait / type | Use |
//! |--------------|-----|
//! | [`RepresentationModelAssembler`] | The general contract: entity in, [`EntityModel`] out |
//! | [`SimpleRepresentationModelAssembler`] | Implement only the `add_links` hooks; wrapping comes for free |
//! | [`IdentifiableModelAssembler`] | Self and collection links from an id and a collection route |
//! | [`ReactiveAssembler`] | Assembles a stream of entities concurrently on tokio tasks |

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use hypermedia::{
    CollectionModel, EntityModel, HasLinks, Link, LinkRelationProvider, Links, ResourceType,
};
use tokio::task::JoinSet;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::context::RequestContext;
use crate::link_builder::{LinkBuilder, Route};

// ---------------------------------------------------------------------------
// Synchronous assemblers
// ---------------------------------------------------------------------------

pub trait RepresentationModelAssembler<T> {
    fn to_model(&self, ctx: &RequestContext, entity: T) -> EntityModel<T>;

    fn to_collection_model(
        &self,
        ctx: &RequestContext,
        entities: impl IntoIterator<Item = T>,
    ) -> CollectionModel<T>;
}

/// Assembler that only decides which links to add.
pub trait SimpleRepresentationModelAssembler<T> {
    fn add_links(&self, ctx: &RequestContext, model: &mut EntityModel<T>);

    fn add_collection_links(&self, _ctx: &RequestContext, _model: &mut CollectionModel<T>) {}
}

impl<T, A> RepresentationModelAssembler<T> for A
where
    A: SimpleRepresentationModelAssembler<T>,
{
    fn to_model(&self, ctx: &RequestContext, entity: T) -> EntityModel<T> {
        let mut model = EntityModel::of(entity);
        self.add_links(ctx, &mut model);
        model
    }

    fn to_collection_model(
        &self,
        ctx: &RequestContext,
        entities: impl IntoIterator<Item = T>,
    ) -> CollectionModel<T> {
        let content = entities
            .into_iter()
            .map(|entity| self.to_model(ctx, entity))
            .collect();
        let mut model = CollectionModel::new(content, Links::none());
        self.add_collection_links(ctx, &mut model);
        model
    }
}

/// A domain value addressable by a single path segment.
pub trait Identifiable {
    fn id(&self) -> String;
}

/// Links every item to `{collection}/{id}` and back to the collection.
///
/// The collection relation comes from the configured
/// [`LinkRelationProvider`], so `Employee` gets `employees`.
pub struct IdentifiableModelAssembler<T> {
    collection: Route,
    relations: Arc<dyn LinkRelationProvider>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Identifiable + 'static> IdentifiableModelAssembler<T> {
    pub fn new(collection: Route, relations: Arc<dyn LinkRelationProvider>) -> Self {
        Self {
            collection,
            relations,
            _marker: PhantomData,
        }
    }

    pub fn self_link(&self, ctx: &RequestContext, entity: &T) -> Link {
        LinkBuilder::link_to(ctx, &self.collection)
            .slash(entity.id())
            .with_self_rel()
    }

    pub fn collection_link(&self, ctx: &RequestContext) -> Link {
        let rel = self
            .relations
            .collection_resource_rel_for(&ResourceType::of::<T>());
        LinkBuilder::link_to(ctx, &self.collection).with_rel(rel)
    }
}

impl<T: Identifiable + 'static> SimpleRepresentationModelAssembler<T>
    for IdentifiableModelAssembler<T>
{
    fn add_links(&self, ctx: &RequestContext, model: &mut EntityModel<T>) {
        let self_link = self.self_link(ctx, model.content());
        model.add_link(self_link);
        model.add_link(self.collection_link(ctx));
    }

    fn add_collection_links(&self, ctx: &RequestContext, model: &mut CollectionModel<T>) {
        model.add_link(LinkBuilder::link_to(ctx, &self.collection).with_self_rel());
    }
}

// ---------------------------------------------------------------------------
// Stream-based assembly
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("assembler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Asynchronous counterpart of [`RepresentationModelAssembler`].
#[async_trait]
pub trait ReactiveRepresentationModelAssembler<T: Send + 'static>: Send + Sync {
    async fn to_model(&self, ctx: &RequestContext, entity: T) -> EntityModel<T>;

    async fn add_collection_links(
        &self,
        _ctx: &RequestContext,
        model: CollectionModel<T>,
    ) -> CollectionModel<T> {
        model
    }
}

/// Drives a [`ReactiveRepresentationModelAssembler`] over a stream.
///
/// Each element is assembled on its own tokio task; the resulting
/// collection keeps the order in which elements arrived from the stream.
pub struct ReactiveAssembler<A> {
    inner: Arc<A>,
}

impl<A> Clone for ReactiveAssembler<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Send + Sync + 'static> ReactiveAssembler<A> {
    pub fn new(assembler: A) -> Self {
        Self {
            inner: Arc::new(assembler),
        }
    }

    pub fn assembler(&self) -> &A {
        &self.inner
    }

    pub async fn to_model<T>(&self, ctx: &RequestContext, entity: T) -> EntityModel<T>
    where
        T: Send + 'static,
        A: ReactiveRepresentationModelAssembler<T>,
    {
        ReactiveRepresentationModelAssembler::to_model(&*self.inner, ctx, entity).await
    }

    pub async fn to_collection_model<T, S>(
        &self,
        ctx: &RequestContext,
        stream: S,
    ) -> Result<CollectionModel<T>, AssemblyError>
    where
        T: Send + 'static,
        A: ReactiveRepresentationModelAssembler<T>,
        S: Stream<Item = T> + Send,
    {
        let mut tasks = JoinSet::new();
        let mut arrived = 0usize;
        tokio::pin!(stream);
        while let Some(entity) = stream.next().await {
            let inner = Arc::clone(&self.inner);
            let ctx = ctx.clone();
            let index = arrived;
            arrived += 1;
            tasks.spawn(async move {
                let model = ReactiveRepresentationModelAssembler::to_model(&*inner, &ctx, entity).await;
                (index, model)
            });
        }

        let mut assembled = Vec::with_capacity(arrived);
        while let Some(joined) = tasks.join_next().await {
            assembled.push(joined?);
        }
        assembled.sort_by_key(|(index, _)| *index);
        debug!(items = assembled.len(), "assembled stream");

        let content = assembled.into_iter().map(|(_, model)| model).collect();
        let collection = CollectionModel::new(content, Links::none());
        Ok(
            ReactiveRepresentationModelAssembler::add_collection_links(&*self.inner, ctx, collection)
                .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypermedia::DelegatingLinkRelationProvider;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Employee {
        id: u32,
    }

    impl Identifiable for Employee {
        fn id(&self) -> String {
            self.id.to_string()
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("http://localhost")
    }

    fn identifiable() -> IdentifiableModelAssembler<Employee> {
        IdentifiableModelAssembler::new(
            Route::get("/employees"),
            Arc::new(DelegatingLinkRelationProvider::default()),
        )
    }

    #[test]
    fn identifiable_assembler_links_item_and_collection() {
        let model = identifiable().to_model(&ctx(), Employee { id: 4 });
        assert_eq!(
            model.get_link("self").map(|l| l.href.as_str()),
            Some("http://localhost/employees/4")
        );
        assert_eq!(
            model.get_link("employees").map(|l| l.href.as_str()),
            Some("http://localhost/employees")
        );
    }

    #[test]
    fn collection_model_wraps_each_item() {
        let model = identifiable()
            .to_collection_model(&ctx(), vec![Employee { id: 1 }, Employee { id: 2 }]);
        assert_eq!(model.len(), 2);
        assert!(model.has_link("self"));
        assert!(model.content.iter().all(|item| item.has_link("self")));
    }

    struct SlowAssembler;

    #[async_trait]
    impl ReactiveRepresentationModelAssembler<Employee> for SlowAssembler {
        async fn to_model(&self, ctx: &RequestContext, entity: Employee) -> EntityModel<Employee> {
            // Earlier elements finish last.
            tokio::time::sleep(Duration::from_millis(u64::from(10 - entity.id) * 5)).await;
            let href = ctx.uri_for(&format!("/employees/{}", entity.id));
            EntityModel::of(entity).add(Link::new(href))
        }

        async fn add_collection_links(
            &self,
            ctx: &RequestContext,
            model: CollectionModel<Employee>,
        ) -> CollectionModel<Employee> {
            model.add(Link::new(ctx.uri_for("/employees")))
        }
    }

    #[tokio::test]
    async fn stream_assembly_keeps_arrival_order() {
        let assembler = ReactiveAssembler::new(SlowAssembler);
        let stream = tokio_stream::iter((1..=5).map(|id| Employee { id }));
        let model = assembler.to_collection_model(&ctx(), stream).await.unwrap();
        let ids: Vec<u32> = model.values().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(model.has_link("self"));
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_collection() {
        let assembler = ReactiveAssembler::new(SlowAssembler);
        let model = assembler
            .to_collection_model(&ctx(), tokio_stream::empty::<Employee>())
            .await
            .unwrap();
        assert!(model.is_empty());
        assert!(model.has_link("self"));
    }
}
