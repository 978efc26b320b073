//! Explicitly keyed embedded content.
//!
//! A [`CollectionModel`](crate::CollectionModel) always embeds its items
//! under the collection relation of the item type. When a document needs
//! several embedded relations, a relation chosen by the caller, or an empty
//! collection that still shows up on the wire, the content is wrapped in
//! [`EmbeddedWrapper`]s instead.
//!
//! An empty collection carries no element to derive a relation from, so it
//! must either name its element type ([`EmbeddedWrappers::empty_collection_of`])
//! or its relation ([`EmbeddedWrappers::wrap_all_with_rel`]).

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::link::LinkRelation;
use crate::relation::{LinkRelationProvider, ResourceType};

/// A single value or a collection, already converted to JSON.
#[derive(Debug, Clone, PartialEq)]
enum Wrapped {
    Single(Value),
    Collection(Vec<Value>),
}

/// One embedded entry: its value plus either an explicit relation or the
/// type to derive one from.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedWrapper {
    value: Wrapped,
    rel: Option<LinkRelation>,
    rel_target_type: Option<ResourceType>,
}

impl EmbeddedWrapper {
    /// The wrapped value; collections come back as a JSON array.
    pub fn value(&self) -> Value {
        match &self.value {
            Wrapped::Single(value) => value.clone(),
            Wrapped::Collection(values) => Value::Array(values.clone()),
        }
    }

    /// The individual values: one for a single value, every element for a
    /// collection.
    pub fn values(&self) -> Vec<Value> {
        match &self.value {
            Wrapped::Single(value) => vec![value.clone()],
            Wrapped::Collection(values) => values.clone(),
        }
    }

    pub fn is_collection_value(&self) -> bool {
        matches!(self.value, Wrapped::Collection(_))
    }

    /// The explicit relation, if one was given.
    pub fn rel(&self) -> Option<&LinkRelation> {
        self.rel.as_ref()
    }

    /// The type the relation is derived from when none was given.
    pub fn rel_target_type(&self) -> Option<ResourceType> {
        self.rel_target_type
    }

    /// The explicit relation, or the item/collection relation `provider`
    /// assigns to the target type.
    pub fn resolve_rel(&self, provider: &dyn LinkRelationProvider) -> Option<LinkRelation> {
        if let Some(rel) = &self.rel {
            return Some(rel.clone());
        }
        let target = self.rel_target_type?;
        Some(if self.is_collection_value() {
            provider.collection_resource_rel_for(&target)
        } else {
            provider.item_resource_rel_for(&target)
        })
    }
}

/// Factory for [`EmbeddedWrapper`]s.
///
/// With `prefer_collections` set, single values are wrapped as one-element
/// collections, so they render as arrays under the collection relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedWrappers {
    prefer_collections: bool,
}

impl EmbeddedWrappers {
    pub fn new(prefer_collections: bool) -> Self {
        Self { prefer_collections }
    }

    pub fn prefers_collections(&self) -> bool {
        self.prefer_collections
    }

    pub fn wrap<T: Serialize + 'static>(&self, value: &T) -> Result<EmbeddedWrapper> {
        Ok(EmbeddedWrapper {
            value: self.single(serde_json::to_value(value)?),
            rel: None,
            rel_target_type: Some(ResourceType::of::<T>()),
        })
    }

    pub fn wrap_with_rel<T: Serialize>(
        &self,
        value: &T,
        rel: impl Into<LinkRelation>,
    ) -> Result<EmbeddedWrapper> {
        Ok(EmbeddedWrapper {
            value: self.single(serde_json::to_value(value)?),
            rel: Some(rel.into()),
            rel_target_type: None,
        })
    }

    /// Wrap a collection whose relation derives from `T`.
    ///
    /// Fails with [`Error::EmptyEmbeddedCollection`] when `values` is empty;
    /// use [`empty_collection_of`](Self::empty_collection_of) or
    /// [`wrap_all_with_rel`](Self::wrap_all_with_rel) for that.
    pub fn wrap_all<T: Serialize + 'static>(&self, values: &[T]) -> Result<EmbeddedWrapper> {
        if values.is_empty() {
            return Err(Error::EmptyEmbeddedCollection);
        }
        Ok(EmbeddedWrapper {
            value: Wrapped::Collection(to_values(values)?),
            rel: None,
            rel_target_type: Some(ResourceType::of::<T>()),
        })
    }

    /// Wrap a collection, possibly empty, under an explicit relation.
    pub fn wrap_all_with_rel<T: Serialize>(
        &self,
        values: &[T],
        rel: impl Into<LinkRelation>,
    ) -> Result<EmbeddedWrapper> {
        Ok(EmbeddedWrapper {
            value: Wrapped::Collection(to_values(values)?),
            rel: Some(rel.into()),
            rel_target_type: None,
        })
    }

    /// An empty collection embedded under the collection relation of `T`.
    pub fn empty_collection_of<T: 'static>(&self) -> EmbeddedWrapper {
        EmbeddedWrapper {
            value: Wrapped::Collection(Vec::new()),
            rel: None,
            rel_target_type: Some(ResourceType::of::<T>()),
        }
    }

    fn single(&self, value: Value) -> Wrapped {
        if self.prefer_collections {
            Wrapped::Collection(vec![value])
        } else {
            Wrapped::Single(value)
        }
    }
}

fn to_values<T: Serialize>(values: &[T]) -> Result<Vec<Value>> {
    values
        .iter()
        .map(|v| serde_json::to_value(v).map_err(Error::from))
        .collect()
}
