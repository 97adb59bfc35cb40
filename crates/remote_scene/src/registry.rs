//! Object registry
//!
//! Resolves names and handles to shared [`SceneObject`] wrappers and classifies
//! handles into [`ObjectKind`]s. Results are cached for the lifetime of the connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Handle, ObjectKind, OpMode, ReturnCode};
use observability::{record_registry_lookup, LookupResult};
use tracing::{debug, instrument};

use crate::error::{Result, SceneError};
use crate::link::LinkOperation;
use crate::object::{ObjectRef, SceneObject};
use crate::session::Session;

#[derive(Debug, Default)]
struct RegistryCache {
    by_name: HashMap<String, ObjectRef>,
    by_handle: HashMap<Handle, ObjectRef>,
    kinds: HashMap<Handle, ObjectKind>,
}

/// Name and handle lookups for one connection
#[derive(Debug)]
pub struct ObjectRegistry {
    session: Arc<Session>,
    cache: Mutex<RegistryCache>,
}

impl ObjectRegistry {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            cache: Mutex::new(RegistryCache::default()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn cache(&self) -> MutexGuard<'_, RegistryCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `name`; `Ok(None)` when the scene has no such object
    #[instrument(name = "registry_resolve", skip(self), fields(name = %name))]
    pub fn resolve(&self, name: &str) -> Result<Option<ObjectRef>> {
        self.session.ensure_alive()?;
        let mut cache = self.cache();

        if let Some(object) = cache.by_name.get(name) {
            record_registry_lookup(LookupResult::Hit);
            return Ok(Some(object.clone()));
        }

        let reply = self
            .session
            .call(LinkOperation::ResolveHandle, OpMode::Blocking, |link| {
                link.resolve_handle(name)
            })?;
        let handle = match reply {
            Ok(handle) => handle,
            Err(code) if code == ReturnCode::REMOTE_ERROR => {
                record_registry_lookup(LookupResult::Absent);
                return Ok(None);
            }
            Err(code) => return Err(SceneError::remote(LinkOperation::ResolveHandle, code)),
        };

        record_registry_lookup(LookupResult::Miss);
        let object = self.object_for(&mut cache, handle)?;
        object.assign_name(name);
        cache.by_name.insert(name.to_string(), object.clone());
        debug!(handle, kind = %object.kind(), "object resolved");
        Ok(Some(object))
    }

    /// Resolve `name`, failing with `NotFound` when absent
    pub fn get(&self, name: &str) -> Result<ObjectRef> {
        self.resolve(name)?
            .ok_or_else(|| SceneError::not_found(name))
    }

    /// Whether `name` exists in the scene
    pub fn has(&self, name: &str) -> Result<bool> {
        Ok(self.resolve(name)?.is_some())
    }

    /// Kind of `handle`, probing kinds in precedence order on first sight
    #[instrument(name = "registry_classify", skip(self))]
    pub fn classify(&self, handle: Handle) -> Result<ObjectKind> {
        self.session.ensure_alive()?;
        let mut cache = self.cache();
        self.classify_cached(&mut cache, handle)
    }

    /// Every object of `kind` currently in the scene
    #[instrument(name = "registry_list_kind", skip(self), fields(kind = %kind))]
    pub fn list_all_of_kind(&self, kind: ObjectKind) -> Result<Vec<ObjectRef>> {
        self.session.ensure_alive()?;
        let mut cache = self.cache();
        self.list_cached(&mut cache, kind)
    }

    /// Every object of every known kind, grouped by kind in precedence order
    #[instrument(name = "registry_list_all", skip(self))]
    pub fn list_all(&self) -> Result<Vec<ObjectRef>> {
        self.session.ensure_alive()?;
        let mut cache = self.cache();
        let mut objects = Vec::new();
        for kind in ObjectKind::PRECEDENCE {
            objects.extend(self.list_cached(&mut cache, kind)?);
        }
        Ok(objects)
    }

    /// Number of wrappers created so far
    pub fn cached_objects(&self) -> usize {
        self.cache().by_handle.len()
    }

    fn object_for(&self, cache: &mut RegistryCache, handle: Handle) -> Result<ObjectRef> {
        if let Some(object) = cache.by_handle.get(&handle) {
            return Ok(object.clone());
        }
        let kind = self.classify_cached(cache, handle)?;
        let object = SceneObject::new(self.session.clone(), handle, kind);
        cache.by_handle.insert(handle, object.clone());
        Ok(object)
    }

    fn classify_cached(&self, cache: &mut RegistryCache, handle: Handle) -> Result<ObjectKind> {
        if let Some(kind) = cache.kinds.get(&handle) {
            return Ok(*kind);
        }

        for kind in ObjectKind::PRECEDENCE {
            let handles = self.list_handles(kind)?;
            for listed in &handles {
                cache.kinds.entry(*listed).or_insert(kind);
            }
            if handles.contains(&handle) {
                return Ok(kind);
            }
        }

        Err(SceneError::UnrecognizedType { handle })
    }

    fn list_cached(&self, cache: &mut RegistryCache, kind: ObjectKind) -> Result<Vec<ObjectRef>> {
        let handles = self.list_handles(kind)?;
        let mut objects = Vec::with_capacity(handles.len());
        for handle in handles {
            cache.kinds.entry(handle).or_insert(kind);
            let object = match cache.by_handle.get(&handle) {
                Some(object) => object.clone(),
                None => {
                    let object = SceneObject::new(self.session.clone(), handle, kind);
                    cache.by_handle.insert(handle, object.clone());
                    object
                }
            };
            objects.push(object);
        }
        Ok(objects)
    }

    fn list_handles(&self, kind: ObjectKind) -> Result<Vec<Handle>> {
        self.session
            .call(LinkOperation::ListHandles, OpMode::Blocking, |link| {
                link.list_handles(kind)
            })?
            .map_err(|code| SceneError::remote(LinkOperation::ListHandles, code))
    }
}
