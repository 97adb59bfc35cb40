//! Scene facade
//!
//! Entry point for object lookups: typed views per kind, the raw registry, and
//! named collections (built-in robots plus configured definitions).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::CollectionDefinition;
use tracing::info;

use crate::collection::NamedCollection;
use crate::error::{CollectionError, Result};
use crate::joint::{Joint, PrismaticJoint, RevoluteJoint, SphericalJoint};
use crate::proximity::ProximitySensor;
use crate::registry::ObjectRegistry;
use crate::robots::{epuck, EPuck};
use crate::shape::Shape;
use crate::typed_view::{ObjectType, TypedView};
use crate::vision::VisionSensor;

#[derive(Debug)]
pub struct Scene {
    registry: Arc<ObjectRegistry>,
    definitions: Mutex<BTreeMap<String, Arc<CollectionDefinition>>>,
    /// Bound primaries, by collection name
    primaries: Mutex<HashMap<String, Arc<NamedCollection>>>,
}

impl Scene {
    pub(crate) fn new(
        registry: Arc<ObjectRegistry>,
        definitions: impl IntoIterator<Item = CollectionDefinition>,
    ) -> Self {
        let definitions = definitions
            .into_iter()
            .map(|def| (def.name.clone(), Arc::new(def)))
            .collect();
        Self {
            registry,
            definitions: Mutex::new(definitions),
            primaries: Mutex::new(HashMap::new()),
        }
    }

    /// Untyped lookups
    pub fn objects(&self) -> &Arc<ObjectRegistry> {
        &self.registry
    }

    pub fn view<T: ObjectType>(&self) -> TypedView<T> {
        TypedView::new(self.registry.clone())
    }

    pub fn joints(&self) -> TypedView<Joint> {
        self.view()
    }

    pub fn prismatic_joints(&self) -> TypedView<PrismaticJoint> {
        self.view()
    }

    pub fn revolute_joints(&self) -> TypedView<RevoluteJoint> {
        self.view()
    }

    pub fn spherical_joints(&self) -> TypedView<SphericalJoint> {
        self.view()
    }

    pub fn proximity_sensors(&self) -> TypedView<ProximitySensor> {
        self.view()
    }

    pub fn vision_sensors(&self) -> TypedView<VisionSensor> {
        self.view()
    }

    pub fn shapes(&self) -> TypedView<Shape> {
        self.view()
    }

    /// Register or replace a collection definition
    ///
    /// Replacing a definition drops instances bound from the old one.
    pub fn define_collection(&self, definition: CollectionDefinition) -> Result<()> {
        config_loader::validate_collection(&definition)?;
        let name = definition.name.clone();
        let replaced = self
            .definitions()
            .insert(name.clone(), Arc::new(definition))
            .is_some();
        if replaced {
            self.primaries().remove(&name);
        }
        info!(collection = %name, replaced, "Collection defined");
        Ok(())
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.definitions().keys().cloned().collect()
    }

    pub fn collection_definition(&self, name: &str) -> Option<Arc<CollectionDefinition>> {
        self.definitions().get(name).cloned()
    }

    /// Primary instance of collection `name`
    pub fn collection(&self, name: &str) -> Result<Arc<NamedCollection>> {
        self.registry.session().ensure_alive()?;
        if let Some(primary) = self.primaries().get(name) {
            return Ok(primary.clone());
        }

        let definition = self.collection_definition(name).ok_or_else(|| {
            CollectionError::UnknownCollection {
                name: name.to_string(),
            }
        })?;
        let primary = Arc::new(NamedCollection::open(
            definition,
            self.registry.clone(),
            0,
        )?);
        Ok(self
            .primaries()
            .entry(name.to_string())
            .or_insert(primary)
            .clone())
    }

    /// The first e-puck in the scene
    pub fn epuck(&self) -> Result<EPuck> {
        EPuck::from_collection(self.collection(epuck::COLLECTION_NAME)?)
    }

    /// Every e-puck in the scene
    pub fn epucks(&self) -> Result<Vec<EPuck>> {
        self.collection(epuck::COLLECTION_NAME)?
            .iter()
            .map(|instance| EPuck::from_collection(instance?))
            .collect()
    }

    fn definitions(&self) -> MutexGuard<'_, BTreeMap<String, Arc<CollectionDefinition>>> {
        self.definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn primaries(&self) -> MutexGuard<'_, HashMap<String, Arc<NamedCollection>>> {
        self.primaries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
