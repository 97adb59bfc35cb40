//! Named collections
//!
//! A [`NamedCollection`] is one instance of a [`CollectionDefinition`] bound to the live
//! scene. Instance 0 (the primary) owns and caches its duplicates; instance `k` finds
//! every object under the name suffixed with `#{k-1}`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{instance_name, CollectionDefinition, ComponentGroup, MappingKey, MappingMiss};
use tracing::{debug, info};

use crate::error::{CollectionError, Result, SceneError};
use crate::joint::Joint;
use crate::object::ObjectRef;
use crate::proximity::ProximitySensor;
use crate::registry::ObjectRegistry;
use crate::shape::Shape;
use crate::typed_view::{cast, ObjectType};
use crate::vision::VisionSensor;

/// One instance of a collection in the scene
pub struct NamedCollection {
    definition: Arc<CollectionDefinition>,
    instance: usize,
    registry: Arc<ObjectRegistry>,
    root: ObjectRef,
    duplicates: Mutex<HashMap<usize, Arc<NamedCollection>>>,
}

impl NamedCollection {
    /// Bind instance `instance` of `definition`; fails with `RootAbsent` if its root is missing
    pub(crate) fn open(
        definition: Arc<CollectionDefinition>,
        registry: Arc<ObjectRegistry>,
        instance: usize,
    ) -> Result<Self> {
        let root_name = instance_name(&definition.root, instance);
        let root = registry.resolve(&root_name)?.ok_or_else(|| {
            CollectionError::RootAbsent {
                collection: definition.name.clone(),
                root: root_name.clone(),
            }
        })?;

        info!(
            collection = %definition.name,
            instance,
            root = %root_name,
            "Collection instance bound"
        );

        Ok(Self {
            definition,
            instance,
            registry,
            root,
            duplicates: Mutex::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &CollectionDefinition {
        &self.definition
    }

    /// 0 for the primary, `k` for the k-th duplicate
    pub fn instance_index(&self) -> usize {
        self.instance
    }

    pub fn is_primary(&self) -> bool {
        self.instance == 0
    }

    pub fn root(&self) -> &ObjectRef {
        &self.root
    }

    /// Instance `index` of this collection
    ///
    /// Duplicates are only reachable from the primary. Bound instances are cached;
    /// a missing root is probed again on every call.
    pub fn instance(self: &Arc<Self>, index: usize) -> Result<Arc<NamedCollection>> {
        self.registry.session().ensure_alive()?;
        if index == self.instance {
            return Ok(self.clone());
        }
        if !self.is_primary() {
            return Err(SceneError::invalid_argument(
                "instance",
                format!(
                    "{index} requested from duplicate {} of '{}'; address duplicates through the primary",
                    self.instance,
                    self.name()
                ),
            ));
        }

        let mut duplicates = self
            .duplicates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(duplicate) = duplicates.get(&index) {
            return Ok(duplicate.clone());
        }

        let duplicate = Arc::new(Self::open(
            self.definition.clone(),
            self.registry.clone(),
            index,
        )?);
        duplicates.insert(index, duplicate.clone());
        Ok(duplicate)
    }

    /// Instances 0, 1, 2, ... up to the first one whose root is absent
    pub fn iter(self: &Arc<Self>) -> CollectionIter {
        CollectionIter {
            primary: self.clone(),
            next: self.instance,
            done: !self.is_primary(),
        }
    }

    /// Every instance present in the scene
    pub fn instances(self: &Arc<Self>) -> Result<Vec<Arc<NamedCollection>>> {
        self.iter().collect()
    }

    /// Scene name of the object mapped at `key` in `group`, for this instance
    pub fn object_name(&self, group: ComponentGroup, key: &MappingKey) -> Result<String> {
        let declared = self
            .definition
            .mapping(group)
            .lookup(key)
            .map_err(|miss| self.mapping_error(group, key, miss))?;
        Ok(instance_name(declared, self.instance))
    }

    /// Typed object mapped at `key` in `group`
    pub fn component<T: ObjectType>(
        &self,
        group: ComponentGroup,
        key: impl Into<MappingKey>,
    ) -> Result<T> {
        let key = key.into();
        let name = self.object_name(group, &key)?;
        let object = self.registry.resolve(&name)?.ok_or_else(|| {
            CollectionError::ObjectAbsent {
                collection: self.name().to_string(),
                group,
                name: name.clone(),
            }
        })?;
        debug!(collection = %self.name(), %group, %key, "component resolved");
        cast(object, &name)
    }

    /// Every object of `group`, in mapping order
    pub fn components<T: ObjectType>(&self, group: ComponentGroup) -> Result<Vec<T>> {
        self.definition
            .mapping(group)
            .entries()
            .into_iter()
            .map(|(key, _)| self.component(group, key))
            .collect()
    }

    /// Proximity sensor at `key`, with the collection's convention applied
    pub fn proximity_sensor(&self, key: impl Into<MappingKey>) -> Result<ProximitySensor> {
        let sensor = self.component(ComponentGroup::ProximitySensors, key)?;
        Ok(self.apply_convention(sensor))
    }

    pub fn proximity_sensors(&self) -> Result<Vec<ProximitySensor>> {
        Ok(self
            .components(ComponentGroup::ProximitySensors)?
            .into_iter()
            .map(|sensor| self.apply_convention(sensor))
            .collect())
    }

    pub fn vision_sensor(&self, key: impl Into<MappingKey>) -> Result<VisionSensor> {
        self.component(ComponentGroup::VisionSensors, key)
    }

    pub fn vision_sensors(&self) -> Result<Vec<VisionSensor>> {
        self.components(ComponentGroup::VisionSensors)
    }

    pub fn joint(&self, key: impl Into<MappingKey>) -> Result<Joint> {
        self.component(ComponentGroup::Joints, key)
    }

    pub fn joints(&self) -> Result<Vec<Joint>> {
        self.components(ComponentGroup::Joints)
    }

    pub fn shape(&self, key: impl Into<MappingKey>) -> Result<Shape> {
        self.component(ComponentGroup::Shapes, key)
    }

    pub fn shapes(&self) -> Result<Vec<Shape>> {
        self.components(ComponentGroup::Shapes)
    }

    fn apply_convention(&self, sensor: ProximitySensor) -> ProximitySensor {
        if let Some(convention) = self.definition.proximity_convention {
            sensor.set_convention(convention);
        }
        sensor
    }

    fn mapping_error(&self, group: ComponentGroup, key: &MappingKey, miss: MappingMiss) -> SceneError {
        let collection = self.name().to_string();
        match (miss, key) {
            (MappingMiss::OutOfRange { len }, MappingKey::Index(index)) => {
                CollectionError::IndexOutOfRange {
                    collection,
                    group,
                    index: *index,
                    len,
                }
            }
            _ => CollectionError::NotInMapping {
                collection,
                group,
                key: key.clone(),
            },
        }
        .into()
    }
}

impl fmt::Debug for NamedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCollection")
            .field("name", &self.definition.name)
            .field("instance", &self.instance)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Iterator over the instances of a collection, from its primary
pub struct CollectionIter {
    primary: Arc<NamedCollection>,
    next: usize,
    done: bool,
}

impl Iterator for CollectionIter {
    type Item = Result<Arc<NamedCollection>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.primary.instance(self.next) {
            Ok(instance) => {
                self.next += 1;
                Some(Ok(instance))
            }
            Err(SceneError::Collection(CollectionError::RootAbsent { .. })) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
