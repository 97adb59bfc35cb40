//! Mock remote link
//!
//! In-process stand-in for a simulation server, with a scripted scene and failure
//! injection. Clones share the same state, so a test can keep one clone for
//! inspection after handing the other to a [`Client`](crate::Client).

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    CaptureFormat, Handle, LinkAddress, LinkResult, LinkSettings, ObjectKind, OpMode,
    ProximityReading, ReturnCode, VisionFrame,
};
use tracing::instrument;

use crate::link::{LinkOperation, RemoteLink};
use crate::simulation::SimulationPhase;

/// Type tag of a dummy, which no [`ObjectKind`] covers
const DUMMY_TAG: u32 = 4;

/// Mock link configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Answer every connect attempt with `LOCAL_ERROR`
    pub refuse_connection: bool,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    Connect { address: LinkAddress },
    ResolveHandle { name: String },
    ListHandles { kind: ObjectKind },
    SetJointTargetVelocity { handle: Handle, velocity: f64, mode: OpMode },
    ReadProximitySensor { handle: Handle, mode: OpMode },
    ReadVisionImage { handle: Handle, format: CaptureFormat, mode: OpMode },
    StartSimulation,
    PauseSimulation,
    StopSimulation,
    Ping,
    Finish,
}

impl LinkCall {
    pub fn operation(&self) -> LinkOperation {
        match self {
            LinkCall::Connect { .. } => LinkOperation::Connect,
            LinkCall::ResolveHandle { .. } => LinkOperation::ResolveHandle,
            LinkCall::ListHandles { .. } => LinkOperation::ListHandles,
            LinkCall::SetJointTargetVelocity { .. } => LinkOperation::SetJointTargetVelocity,
            LinkCall::ReadProximitySensor { .. } => LinkOperation::ReadProximitySensor,
            LinkCall::ReadVisionImage { .. } => LinkOperation::ReadVisionImage,
            LinkCall::StartSimulation => LinkOperation::StartSimulation,
            LinkCall::PauseSimulation => LinkOperation::PauseSimulation,
            LinkCall::StopSimulation => LinkOperation::StopSimulation,
            LinkCall::Ping => LinkOperation::Ping,
            LinkCall::Finish => LinkOperation::Finish,
        }
    }

    /// Op mode of calls that carry one
    pub fn mode(&self) -> Option<OpMode> {
        match self {
            LinkCall::SetJointTargetVelocity { mode, .. }
            | LinkCall::ReadProximitySensor { mode, .. }
            | LinkCall::ReadVisionImage { mode, .. } => Some(*mode),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct MockObject {
    handle: Handle,
    /// Server-side type tag
    tag: u32,
}

#[derive(Debug)]
struct MockScene {
    config: MockConfig,
    connected: bool,
    finished: bool,
    next_handle: Handle,
    objects: BTreeMap<String, MockObject>,
    proximity: HashMap<Handle, ProximityReading>,
    frames: HashMap<Handle, VisionFrame>,
    subscribed: HashSet<Handle>,
    buffered_misses: HashMap<Handle, VecDeque<ReturnCode>>,
    failures: HashMap<LinkOperation, ReturnCode>,
    mode_failures: HashMap<(LinkOperation, OpMode), ReturnCode>,
    velocities: HashMap<Handle, f64>,
    phase: SimulationPhase,
    calls: Vec<LinkCall>,
}

impl MockScene {
    fn new(config: MockConfig) -> Self {
        Self {
            config,
            connected: false,
            finished: false,
            next_handle: 1000,
            objects: BTreeMap::new(),
            proximity: HashMap::new(),
            frames: HashMap::new(),
            subscribed: HashSet::new(),
            buffered_misses: HashMap::new(),
            failures: HashMap::new(),
            mode_failures: HashMap::new(),
            velocities: HashMap::new(),
            phase: SimulationPhase::Stopped,
            calls: Vec::new(),
        }
    }

    /// Log the call and apply any injected failure for its operation
    fn begin(&mut self, call: LinkCall) -> LinkResult<()> {
        let operation = call.operation();
        let mode = call.mode();
        self.calls.push(call);
        let failure = self.failures.get(&operation).or_else(|| {
            mode.and_then(|mode| self.mode_failures.get(&(operation, mode)))
        });
        match failure {
            Some(code) => Err(*code),
            None => Ok(()),
        }
    }

    fn kind_of(&self, handle: Handle) -> Option<ObjectKind> {
        self.objects
            .values()
            .find(|object| object.handle == handle)
            .and_then(|object| ObjectKind::from_tag(object.tag))
    }

    fn require_kind(&self, handle: Handle, kind: ObjectKind) -> LinkResult<()> {
        if self.kind_of(handle) == Some(kind) {
            Ok(())
        } else {
            Err(ReturnCode::REMOTE_ERROR)
        }
    }

    /// Streaming reply semantics: the subscribe call returns nothing, buffered reads
    /// return nothing until subscribed and then drain scripted misses first.
    fn streamed<T>(&mut self, handle: Handle, mode: OpMode, value: T) -> LinkResult<T> {
        match mode {
            OpMode::Blocking | OpMode::OneShot => Ok(value),
            OpMode::Streaming => {
                self.subscribed.insert(handle);
                Err(ReturnCode::NO_VALUE)
            }
            OpMode::Buffer => {
                if !self.subscribed.contains(&handle) {
                    return Err(ReturnCode::NO_VALUE);
                }
                match self
                    .buffered_misses
                    .get_mut(&handle)
                    .and_then(VecDeque::pop_front)
                {
                    Some(code) => Err(code),
                    None => Ok(value),
                }
            }
        }
    }
}

/// Mock simulation server
#[derive(Debug, Clone)]
pub struct MockLink {
    scene: Arc<Mutex<MockScene>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            scene: Arc::new(Mutex::new(MockScene::new(config))),
        }
    }

    fn scene(&self) -> MutexGuard<'_, MockScene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an object to the scene and return its handle
    pub fn add_object(&self, name: &str, kind: ObjectKind) -> Handle {
        self.insert_object(name, kind.tag())
    }

    /// Add an object that resolves by name but is listed under no known kind
    pub fn add_unclassified_object(&self, name: &str) -> Handle {
        self.insert_object(name, DUMMY_TAG)
    }

    fn insert_object(&self, name: &str, tag: u32) -> Handle {
        let mut scene = self.scene();
        let handle = scene.next_handle;
        scene.next_handle += 1;
        scene
            .objects
            .insert(name.to_string(), MockObject { handle, tag });
        handle
    }

    /// Remove an object; its handle stops resolving
    pub fn remove_object(&self, name: &str) -> Option<Handle> {
        self.scene().objects.remove(name).map(|object| object.handle)
    }

    pub fn set_proximity(&self, handle: Handle, reading: ProximityReading) {
        self.scene().proximity.insert(handle, reading);
    }

    pub fn set_frame(&self, handle: Handle, frame: VisionFrame) {
        self.scene().frames.insert(handle, frame);
    }

    /// Answer every call to `operation` with `code` until cleared
    pub fn fail(&self, operation: LinkOperation, code: ReturnCode) {
        self.scene().failures.insert(operation, code);
    }

    /// Answer only the `mode` calls to `operation` with `code` until cleared
    pub fn fail_mode(&self, operation: LinkOperation, mode: OpMode, code: ReturnCode) {
        self.scene().mode_failures.insert((operation, mode), code);
    }

    pub fn clear_failure(&self, operation: LinkOperation) {
        let mut scene = self.scene();
        scene.failures.remove(&operation);
        scene.mode_failures.retain(|(failed, _), _| *failed != operation);
    }

    /// Make the next buffered read of `handle` answer `code`
    pub fn queue_buffered_miss(&self, handle: Handle, code: ReturnCode) {
        self.scene()
            .buffered_misses
            .entry(handle)
            .or_default()
            .push_back(code);
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.scene().calls.clone()
    }

    pub fn call_count(&self, operation: LinkOperation) -> usize {
        self.scene()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.scene().calls.clear();
    }

    /// Last target velocity set on `handle`
    pub fn joint_velocity(&self, handle: Handle) -> Option<f64> {
        self.scene().velocities.get(&handle).copied()
    }

    pub fn simulation_phase(&self) -> SimulationPhase {
        self.scene().phase
    }

    pub fn is_connected(&self) -> bool {
        self.scene().connected
    }

    pub fn is_finished(&self) -> bool {
        self.scene().finished
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteLink for MockLink {
    #[instrument(name = "mock_link_connect", skip(self, _settings), fields(address = %address))]
    fn connect(&mut self, address: &LinkAddress, _settings: &LinkSettings) -> LinkResult<()> {
        let mut scene = self.scene();
        scene.begin(LinkCall::Connect { address: *address })?;
        if scene.config.refuse_connection {
            return Err(ReturnCode::LOCAL_ERROR);
        }
        scene.connected = true;
        Ok(())
    }

    fn resolve_handle(&self, name: &str) -> LinkResult<Handle> {
        let mut scene = self.scene();
        scene.begin(LinkCall::ResolveHandle {
            name: name.to_string(),
        })?;
        scene
            .objects
            .get(name)
            .map(|object| object.handle)
            .ok_or(ReturnCode::REMOTE_ERROR)
    }

    fn list_handles(&self, kind: ObjectKind) -> LinkResult<Vec<Handle>> {
        let mut scene = self.scene();
        scene.begin(LinkCall::ListHandles { kind })?;
        Ok(scene
            .objects
            .values()
            .filter(|object| object.tag == kind.tag())
            .map(|object| object.handle)
            .collect())
    }

    fn set_joint_target_velocity(
        &self,
        handle: Handle,
        velocity: f64,
        mode: OpMode,
    ) -> LinkResult<()> {
        let mut scene = self.scene();
        scene.begin(LinkCall::SetJointTargetVelocity {
            handle,
            velocity,
            mode,
        })?;
        if !scene.kind_of(handle).is_some_and(ObjectKind::is_joint) {
            return Err(ReturnCode::REMOTE_ERROR);
        }
        scene.velocities.insert(handle, velocity);
        // One-shot commands are never acknowledged synchronously
        if mode == OpMode::OneShot {
            Err(ReturnCode::NO_VALUE)
        } else {
            Ok(())
        }
    }

    fn read_proximity_sensor(&self, handle: Handle, mode: OpMode) -> LinkResult<ProximityReading> {
        let mut scene = self.scene();
        scene.begin(LinkCall::ReadProximitySensor { handle, mode })?;
        scene.require_kind(handle, ObjectKind::ProximitySensor)?;
        let reading = scene.proximity.get(&handle).copied().unwrap_or_default();
        scene.streamed(handle, mode, reading)
    }

    fn read_vision_image(
        &self,
        handle: Handle,
        format: CaptureFormat,
        mode: OpMode,
    ) -> LinkResult<VisionFrame> {
        let mut scene = self.scene();
        scene.begin(LinkCall::ReadVisionImage {
            handle,
            format,
            mode,
        })?;
        scene.require_kind(handle, ObjectKind::VisionSensor)?;
        let frame = scene
            .frames
            .get(&handle)
            .cloned()
            .ok_or(ReturnCode::REMOTE_ERROR)?;
        scene.streamed(handle, mode, frame)
    }

    fn start_simulation(&self) -> LinkResult<()> {
        let mut scene = self.scene();
        scene.begin(LinkCall::StartSimulation)?;
        scene.phase = SimulationPhase::Running;
        Ok(())
    }

    fn pause_simulation(&self) -> LinkResult<()> {
        let mut scene = self.scene();
        scene.begin(LinkCall::PauseSimulation)?;
        scene.phase = SimulationPhase::Paused;
        Ok(())
    }

    fn stop_simulation(&self) -> LinkResult<()> {
        let mut scene = self.scene();
        scene.begin(LinkCall::StopSimulation)?;
        scene.phase = SimulationPhase::Stopped;
        // Stopping the server drops all streaming subscriptions
        scene.subscribed.clear();
        Ok(())
    }

    fn ping(&self) -> LinkResult<()> {
        self.scene().begin(LinkCall::Ping)
    }

    fn finish(&self) {
        let mut scene = self.scene();
        scene.calls.push(LinkCall::Finish);
        scene.connected = false;
        scene.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_resolve_and_list() {
        let link = MockLink::new();
        let motor = link.add_object("motor", ObjectKind::RevoluteJoint);
        link.add_object("body", ObjectKind::Shape);

        assert_eq!(link.resolve_handle("motor"), Ok(motor));
        assert_eq!(link.resolve_handle("ghost"), Err(ReturnCode::REMOTE_ERROR));
        assert_eq!(link.list_handles(ObjectKind::RevoluteJoint), Ok(vec![motor]));
        assert_eq!(link.list_handles(ObjectKind::VisionSensor), Ok(vec![]));
    }

    #[test]
    fn test_streaming_semantics() {
        let link = MockLink::new();
        let sensor = link.add_object("prox", ObjectKind::ProximitySensor);

        assert!(link.read_proximity_sensor(sensor, OpMode::Blocking).is_ok());
        assert_eq!(
            link.read_proximity_sensor(sensor, OpMode::Buffer),
            Err(ReturnCode::NO_VALUE)
        );
        assert_eq!(
            link.read_proximity_sensor(sensor, OpMode::Streaming),
            Err(ReturnCode::NO_VALUE)
        );
        link.queue_buffered_miss(sensor, ReturnCode::NO_VALUE);
        assert_eq!(
            link.read_proximity_sensor(sensor, OpMode::Buffer),
            Err(ReturnCode::NO_VALUE)
        );
        assert!(link.read_proximity_sensor(sensor, OpMode::Buffer).is_ok());
    }

    #[test]
    fn test_wrong_kind_is_remote_error() {
        let link = MockLink::new();
        let shape = link.add_object("body", ObjectKind::Shape);
        link.set_frame(
            shape,
            VisionFrame {
                resolution: (1, 1),
                pixels: Bytes::from_static(&[0, 0, 0]),
            },
        );
        assert_eq!(
            link.read_vision_image(shape, CaptureFormat::Rgb, OpMode::Blocking),
            Err(ReturnCode::REMOTE_ERROR)
        );
        assert_eq!(
            link.set_joint_target_velocity(shape, 1.0, OpMode::OneShot),
            Err(ReturnCode::REMOTE_ERROR)
        );
    }

    #[test]
    fn test_failure_injection_and_call_log() {
        let link = MockLink::new();
        link.fail(LinkOperation::StartSimulation, ReturnCode::TIMEOUT);
        assert_eq!(link.start_simulation(), Err(ReturnCode::TIMEOUT));
        assert_eq!(link.simulation_phase(), SimulationPhase::Stopped);

        link.clear_failure(LinkOperation::StartSimulation);
        assert!(link.start_simulation().is_ok());
        assert_eq!(link.simulation_phase(), SimulationPhase::Running);
        assert_eq!(link.call_count(LinkOperation::StartSimulation), 2);
    }

    #[test]
    fn test_mode_failure_only_hits_that_mode() {
        let link = MockLink::new();
        let prox = link.add_object("prox", ObjectKind::ProximitySensor);
        link.fail_mode(
            LinkOperation::ReadProximitySensor,
            OpMode::Streaming,
            ReturnCode::ILLEGAL_OPMODE,
        );

        assert!(link.read_proximity_sensor(prox, OpMode::Blocking).is_ok());
        assert_eq!(
            link.read_proximity_sensor(prox, OpMode::Streaming),
            Err(ReturnCode::ILLEGAL_OPMODE)
        );
        assert_eq!(
            link.calls().last().and_then(LinkCall::mode),
            Some(OpMode::Streaming)
        );

        link.clear_failure(LinkOperation::ReadProximitySensor);
        assert_eq!(
            link.read_proximity_sensor(prox, OpMode::Streaming),
            Err(ReturnCode::NO_VALUE)
        );
    }

    #[test]
    fn test_clones_share_state() {
        let link = MockLink::new();
        let observer = link.clone();
        let motor = link.add_object("motor", ObjectKind::PrismaticJoint);
        assert!(link
            .set_joint_target_velocity(motor, 0.5, OpMode::Blocking)
            .is_ok());
        assert_eq!(observer.joint_velocity(motor), Some(0.5));
    }
}
