//! Scene object wrapper
//!
//! One [`SceneObject`] exists per handle and connection. Typed views hand out clones
//! of the same [`ObjectRef`], so streaming state and overrides are shared by every
//! caller that looked the object up.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use contracts::{Handle, ObjectKind, ProximityConvention, ProximityReading, VisionFrame};

use crate::session::Session;
use crate::streaming::StreamState;

/// Shared handle to a scene object
pub type ObjectRef = Arc<SceneObject>;

/// Per-object mutable state
#[derive(Debug)]
pub(crate) enum ObjectState {
    Inert,
    Proximity(ProximityState),
    Vision(StreamState<VisionFrame>),
}

#[derive(Debug, Default)]
pub(crate) struct ProximityState {
    pub stream: StreamState<ProximityReading>,
    /// Overrides the session default when set
    pub convention: Option<ProximityConvention>,
}

impl ObjectState {
    fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::ProximitySensor => ObjectState::Proximity(ProximityState::default()),
            ObjectKind::VisionSensor => ObjectState::Vision(StreamState::default()),
            _ => ObjectState::Inert,
        }
    }
}

/// Object living in the remote scene
pub struct SceneObject {
    session: Arc<Session>,
    handle: Handle,
    kind: ObjectKind,
    name: OnceLock<String>,
    state: Mutex<ObjectState>,
}

impl SceneObject {
    pub(crate) fn new(session: Arc<Session>, handle: Handle, kind: ObjectKind) -> ObjectRef {
        Arc::new(Self {
            session,
            handle,
            kind,
            name: OnceLock::new(),
            state: Mutex::new(ObjectState::for_kind(kind)),
        })
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Name the object was first resolved by; `None` for objects only seen in listings
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Whether the object's value stream has been subscribed
    pub fn is_streaming(&self) -> bool {
        match &*self.state() {
            ObjectState::Proximity(state) => state.stream.is_streamed(),
            ObjectState::Vision(stream) => stream.is_streamed(),
            ObjectState::Inert => false,
        }
    }

    /// Identity comparison: same wrapper, not merely the same handle
    pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
        Arc::ptr_eq(a, b)
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn assign_name(&self, name: &str) {
        let _ = self.name.set(name.to_string());
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ObjectState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({name})", self.kind),
            None => write!(f, "{}(#{})", self.kind, self.handle),
        }
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_link::MockLink;

    fn session() -> Arc<Session> {
        Arc::new(Session::new(
            Box::new(MockLink::new()),
            "127.0.0.1".parse().unwrap(),
            ProximityConvention::default(),
        ))
    }

    #[test]
    fn test_state_follows_kind() {
        let session = session();
        let prox = SceneObject::new(session.clone(), 1, ObjectKind::ProximitySensor);
        let shape = SceneObject::new(session, 2, ObjectKind::Shape);
        assert!(matches!(*prox.state(), ObjectState::Proximity(_)));
        assert!(matches!(*shape.state(), ObjectState::Inert));
        assert!(!prox.is_streaming());
    }

    #[test]
    fn test_name_is_assigned_once() {
        let object = SceneObject::new(session(), 7, ObjectKind::Shape);
        assert_eq!(object.to_string(), "shape(#7)");
        object.assign_name("body");
        object.assign_name("alias");
        assert_eq!(object.name(), Some("body"));
        assert_eq!(object.to_string(), "shape(body)");
    }

    #[test]
    fn test_identity_is_pointer_based() {
        let session = session();
        let a = SceneObject::new(session.clone(), 3, ObjectKind::Shape);
        let b = SceneObject::new(session, 3, ObjectKind::Shape);
        assert!(SceneObject::same_object(&a, &a.clone()));
        assert!(!SceneObject::same_object(&a, &b));
    }
}
