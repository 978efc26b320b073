//! Mapping domain types to item and collection link relations.
//!
//! Providers form an ordered chain: [`DelegatingLinkRelationProvider`] asks
//! each registered provider, lowest priority value first, and the first one
//! that supports the type answers. Types nobody claims fall back to the
//! English-plural [`EvoInflectorLinkRelationProvider`].

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::link::LinkRelation;
use crate::property::{simple_type_name, uncapitalize};

/// Runtime identity of a domain type plus its unqualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub id: TypeId,
    pub name: &'static str,
}

impl ResourceType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: simple_type_name::<T>(),
        }
    }
}

/// Supplies the relations used to link to a type's items and collections.
pub trait LinkRelationProvider: Send + Sync {
    fn item_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation;

    fn collection_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation;

    fn supports(&self, _resource: &ResourceType) -> bool {
        true
    }
}

/// `employee` / `employeeList`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLinkRelationProvider;

impl LinkRelationProvider for DefaultLinkRelationProvider {
    fn item_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        LinkRelation::of(uncapitalize(resource.name))
    }

    fn collection_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        LinkRelation::of(format!("{}List", uncapitalize(resource.name)))
    }
}

/// `city` / `cities`: the collection relation is the English plural.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvoInflectorLinkRelationProvider;

impl LinkRelationProvider for EvoInflectorLinkRelationProvider {
    fn item_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        LinkRelation::of(uncapitalize(resource.name))
    }

    fn collection_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        LinkRelation::of(pluralize(&uncapitalize(resource.name)))
    }
}

/// Explicit relations registered per type.
///
/// Only registered types are supported. A registration may leave either
/// relation unset, in which case the [`DefaultLinkRelationProvider`] naming
/// applies to that half.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedLinkRelationProvider {
    relations: HashMap<TypeId, (Option<LinkRelation>, Option<LinkRelation>)>,
}

impl AnnotatedLinkRelationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ?Sized + 'static>(
        mut self,
        item: Option<&str>,
        collection: Option<&str>,
    ) -> Self {
        self.relations.insert(
            TypeId::of::<T>(),
            (item.map(LinkRelation::of), collection.map(LinkRelation::of)),
        );
        self
    }
}

impl LinkRelationProvider for AnnotatedLinkRelationProvider {
    fn item_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        match self.relations.get(&resource.id) {
            Some((Some(item), _)) => item.clone(),
            _ => DefaultLinkRelationProvider.item_resource_rel_for(resource),
        }
    }

    fn collection_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        match self.relations.get(&resource.id) {
            Some((_, Some(collection))) => collection.clone(),
            _ => DefaultLinkRelationProvider.collection_resource_rel_for(resource),
        }
    }

    fn supports(&self, resource: &ResourceType) -> bool {
        self.relations.contains_key(&resource.id)
    }
}

/// Priority-ordered chain of providers; first supporting provider wins.
#[derive(Clone)]
pub struct DelegatingLinkRelationProvider {
    providers: Vec<(i32, Arc<dyn LinkRelationProvider>)>,
    fallback: EvoInflectorLinkRelationProvider,
}

impl DelegatingLinkRelationProvider {
    /// Build the chain. Providers sharing a priority keep their given order.
    pub fn new(providers: Vec<(i32, Arc<dyn LinkRelationProvider>)>) -> Self {
        let mut providers = providers;
        providers.sort_by_key(|(priority, _)| *priority);
        Self {
            providers,
            fallback: EvoInflectorLinkRelationProvider,
        }
    }

    /// A new chain with `provider` inserted at `priority`.
    pub fn with_provider(&self, priority: i32, provider: Arc<dyn LinkRelationProvider>) -> Self {
        let mut providers = self.providers.clone();
        providers.push((priority, provider));
        Self::new(providers)
    }

    fn provider_for(&self, resource: &ResourceType) -> &dyn LinkRelationProvider {
        self.providers
            .iter()
            .map(|(_, p)| p.as_ref())
            .find(|p| p.supports(resource))
            .unwrap_or(&self.fallback)
    }
}

impl Default for DelegatingLinkRelationProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for DelegatingLinkRelationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatingLinkRelationProvider")
            .field(
                "priorities",
                &self.providers.iter().map(|(p, _)| *p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LinkRelationProvider for DelegatingLinkRelationProvider {
    fn item_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        self.provider_for(resource).item_resource_rel_for(resource)
    }

    fn collection_resource_rel_for(&self, resource: &ResourceType) -> LinkRelation {
        self.provider_for(resource)
            .collection_resource_rel_for(resource)
    }
}

// --- helpers -----------------------------------------------------------------

/// Regular English plural only.
///
/// Irregular forms are intentionally not applied: `person` becomes `persons`,
/// never `people`. Clients already key on these relation names, so switching
/// to irregular plurals would silently rename embedded relations.
fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct City;
    struct Person;
    struct Employee;

    #[test]
    fn default_provider_appends_list() {
        let t = ResourceType::of::<String>();
        let p = DefaultLinkRelationProvider;
        assert_eq!(p.item_resource_rel_for(&t), LinkRelation::of("string"));
        assert_eq!(p.collection_resource_rel_for(&t), LinkRelation::of("stringList"));
    }

    #[test]
    fn inflector_pluralises() {
        let p = EvoInflectorLinkRelationProvider;
        let rels = |t: ResourceType| {
            (
                p.item_resource_rel_for(&t).to_string(),
                p.collection_resource_rel_for(&t).to_string(),
            )
        };
        assert_eq!(rels(ResourceType::of::<City>()), ("city".into(), "cities".into()));
        assert_eq!(rels(ResourceType::of::<Person>()), ("person".into(), "persons".into()));
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("day"), "days");
    }

    #[test]
    fn annotated_provider_supports_only_registered_types() {
        let p = AnnotatedLinkRelationProvider::new().register::<Employee>(Some("staff"), None);
        let employee = ResourceType::of::<Employee>();
        assert!(p.supports(&employee));
        assert!(!p.supports(&ResourceType::of::<City>()));
        assert_eq!(p.item_resource_rel_for(&employee), LinkRelation::of("staff"));
        assert_eq!(
            p.collection_resource_rel_for(&employee),
            LinkRelation::of("employeeList")
        );
    }

    #[test]
    fn delegating_uses_first_supporting_provider_by_priority() {
        let annotated: Arc<dyn LinkRelationProvider> = Arc::new(
            AnnotatedLinkRelationProvider::new()
                .register::<Employee>(Some("employee"), Some("people")),
        );
        let default: Arc<dyn LinkRelationProvider> = Arc::new(DefaultLinkRelationProvider);
        let chain = DelegatingLinkRelationProvider::new(vec![(100, default), (10, annotated)]);

        let employee = ResourceType::of::<Employee>();
        assert_eq!(chain.collection_resource_rel_for(&employee), LinkRelation::of("people"));

        // default supports everything, so it wins over the fallback
        let city = ResourceType::of::<City>();
        assert_eq!(chain.collection_resource_rel_for(&city), LinkRelation::of("cityList"));
    }

    #[test]
    fn empty_chain_falls_back_to_inflector() {
        let chain = DelegatingLinkRelationProvider::default();
        let city = ResourceType::of::<City>();
        assert_eq!(chain.collection_resource_rel_for(&city), LinkRelation::of("cities"));
    }

    #[test]
    fn with_provider_leaves_original_untouched() {
        let chain = DelegatingLinkRelationProvider::default();
        let extended = chain.with_provider(0, Arc::new(DefaultLinkRelationProvider));
        let city = ResourceType::of::<City>();
        assert_eq!(chain.collection_resource_rel_for(&city), LinkRelation::of("cities"));
        assert_eq!(extended.collection_resource_rel_for(&city), LinkRelation::of("cityList"));
    }
}
