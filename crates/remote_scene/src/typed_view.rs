//! Kind-restricted views over the registry

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use contracts::{Handle, ObjectKind};

use crate::error::{Result, SceneError};
use crate::object::ObjectRef;
use crate::registry::ObjectRegistry;

/// Typed wrapper around a [`SceneObject`](crate::SceneObject)
pub trait ObjectType: Clone + Sized {
    /// Name used in kind mismatch errors
    const LABEL: &'static str;

    fn accepts(kind: ObjectKind) -> bool;

    /// Wrap without checking; callers go through [`cast`]
    fn from_object(object: ObjectRef) -> Self;

    fn object(&self) -> &ObjectRef;

    fn handle(&self) -> Handle {
        self.object().handle()
    }

    fn kind(&self) -> ObjectKind {
        self.object().kind()
    }

    fn name(&self) -> Option<&str> {
        self.object().name()
    }
}

/// Wrap `object` as `T`, or report the kind mismatch against `requested`
pub fn cast<T: ObjectType>(object: ObjectRef, requested: &str) -> Result<T> {
    if T::accepts(object.kind()) {
        Ok(T::from_object(object))
    } else {
        Err(SceneError::InvalidKind {
            object: requested.to_string(),
            expected: T::LABEL,
            actual: object.kind(),
        })
    }
}

/// Registry view restricted to objects of type `T`
pub struct TypedView<T> {
    registry: Arc<ObjectRegistry>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ObjectType> TypedView<T> {
    pub(crate) fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self {
            registry,
            _marker: PhantomData,
        }
    }

    /// `Ok(None)` when absent, `InvalidKind` when present but of another kind
    pub fn get(&self, name: &str) -> Result<Option<T>> {
        self.registry
            .resolve(name)?
            .map(|object| cast(object, name))
            .transpose()
    }

    /// Like [`TypedView::get`], but absence is an error
    pub fn require(&self, name: &str) -> Result<T> {
        self.get(name)?.ok_or_else(|| SceneError::not_found(name))
    }

    /// Whether `name` exists and is of this view's kind
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self
            .registry
            .resolve(name)?
            .is_some_and(|object| T::accepts(object.kind())))
    }

    /// Every object of this view's kind
    pub fn get_all(&self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        for kind in ObjectKind::PRECEDENCE.into_iter().filter(|k| T::accepts(*k)) {
            all.extend(
                self.registry
                    .list_all_of_kind(kind)?
                    .into_iter()
                    .map(T::from_object),
            );
        }
        Ok(all)
    }
}

impl<T> Clone for TypedView<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ObjectType> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView").field("kind", &T::LABEL).finish()
    }
}
