//! Remote API link abstraction
//!
//! Defines the raw call surface of the simulation server, so the scene layer can run
//! against a real transport or the in-process [`MockLink`](crate::MockLink).

use std::fmt;

use contracts::{
    CaptureFormat, Handle, LinkAddress, LinkResult, LinkSettings, ObjectKind, OpMode,
    ProximityReading, VisionFrame,
};

/// Raw remote API link
///
/// Every call reports its status as a [`ReturnCode`](contracts::ReturnCode); interpreting
/// that code is left to the caller, which knows the op mode it asked for.
pub trait RemoteLink: Send + Sync {
    /// Open the connection
    fn connect(&mut self, address: &LinkAddress, settings: &LinkSettings) -> LinkResult<()>;

    /// Resolve an object name to its handle
    ///
    /// Servers answer `REMOTE_ERROR` when no object carries that name.
    fn resolve_handle(&self, name: &str) -> LinkResult<Handle>;

    /// Handles of every object of `kind`
    fn list_handles(&self, kind: ObjectKind) -> LinkResult<Vec<Handle>>;

    /// Set a joint's target velocity (m/s for prismatic joints, rad/s otherwise)
    fn set_joint_target_velocity(
        &self,
        handle: Handle,
        velocity: f64,
        mode: OpMode,
    ) -> LinkResult<()>;

    fn read_proximity_sensor(&self, handle: Handle, mode: OpMode) -> LinkResult<ProximityReading>;

    fn read_vision_image(
        &self,
        handle: Handle,
        format: CaptureFormat,
        mode: OpMode,
    ) -> LinkResult<VisionFrame>;

    fn start_simulation(&self) -> LinkResult<()>;

    fn pause_simulation(&self) -> LinkResult<()>;

    fn stop_simulation(&self) -> LinkResult<()>;

    /// Round trip to the server, flushing pending one-shot commands
    fn ping(&self) -> LinkResult<()>;

    /// Close the connection. Never fails.
    fn finish(&self);
}

/// Name of a remote operation, used in errors, logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkOperation {
    Connect,
    ResolveHandle,
    ListHandles,
    SetJointTargetVelocity,
    ReadProximitySensor,
    ReadVisionImage,
    StartSimulation,
    PauseSimulation,
    StopSimulation,
    Ping,
    Finish,
}

impl LinkOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkOperation::Connect => "connect",
            LinkOperation::ResolveHandle => "resolve_handle",
            LinkOperation::ListHandles => "list_handles",
            LinkOperation::SetJointTargetVelocity => "set_joint_target_velocity",
            LinkOperation::ReadProximitySensor => "read_proximity_sensor",
            LinkOperation::ReadVisionImage => "read_vision_image",
            LinkOperation::StartSimulation => "start_simulation",
            LinkOperation::PauseSimulation => "pause_simulation",
            LinkOperation::StopSimulation => "stop_simulation",
            LinkOperation::Ping => "ping",
            LinkOperation::Finish => "finish",
        }
    }
}

impl fmt::Display for LinkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
