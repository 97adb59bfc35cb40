//! Connection-scoped state shared by every object of one client

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{LinkAddress, LinkResult, ObjectKind, OpMode, ProximityConvention, ReturnCode};
use observability::{record_remote_call, record_sensor_read, ReadPath, SessionStats};
use tracing::{debug, warn};

use crate::error::{Result, SceneError};
use crate::link::{LinkOperation, RemoteLink};
use crate::simulation::SimulationPhase;

/// Live connection plus the state every wrapper needs to consult
pub struct Session {
    link: Box<dyn RemoteLink>,
    address: LinkAddress,
    alive: AtomicBool,
    phase: Mutex<SimulationPhase>,
    proximity_convention: ProximityConvention,
    stats: Mutex<SessionStats>,
}

impl Session {
    pub(crate) fn new(
        link: Box<dyn RemoteLink>,
        address: LinkAddress,
        proximity_convention: ProximityConvention,
    ) -> Self {
        Self {
            link,
            address,
            alive: AtomicBool::new(true),
            phase: Mutex::new(SimulationPhase::Stopped),
            proximity_convention,
            stats: Mutex::new(SessionStats::new()),
        }
    }

    pub fn address(&self) -> LinkAddress {
        self.address
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Convention applied to proximity sensors without an override
    pub fn proximity_convention(&self) -> ProximityConvention {
        self.proximity_convention
    }

    pub fn phase(&self) -> SimulationPhase {
        *self.phase_guard()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(SceneError::ConnectionClosed)
        }
    }

    /// Sensor values are only served while a simulation is running or paused
    pub(crate) fn ensure_running(&self) -> Result<()> {
        match self.phase() {
            SimulationPhase::Running | SimulationPhase::Paused => Ok(()),
            SimulationPhase::Stopped => Err(SceneError::SimulationNotRunning),
        }
    }

    pub(crate) fn phase_guard(&self) -> MutexGuard<'_, SimulationPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue one remote call and record it
    ///
    /// The outer error only reports a closed connection; the raw reply is left to
    /// the caller to interpret.
    pub(crate) fn call<T>(
        &self,
        operation: LinkOperation,
        mode: OpMode,
        f: impl FnOnce(&dyn RemoteLink) -> LinkResult<T>,
    ) -> Result<LinkResult<T>> {
        self.ensure_alive()?;
        let reply = f(self.link.as_ref());
        let code = match &reply {
            Ok(_) => ReturnCode::OK,
            Err(code) => *code,
        };
        self.record_call(operation, mode, code);
        Ok(reply)
    }

    /// Issue a call whose only outcome is its status
    pub(crate) fn execute(
        &self,
        operation: LinkOperation,
        mode: OpMode,
        f: impl FnOnce(&dyn RemoteLink) -> LinkResult<()>,
    ) -> Result<()> {
        match self.call(operation, mode, f)? {
            Ok(()) => Ok(()),
            Err(code) if code.accepted_for(mode) => Ok(()),
            Err(code) => Err(SceneError::remote(operation, code)),
        }
    }

    pub(crate) fn record_read(&self, kind: ObjectKind, path: ReadPath) {
        record_sensor_read(kind, path);
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_read(path);
    }

    fn record_call(&self, operation: LinkOperation, mode: OpMode, code: ReturnCode) {
        record_remote_call(operation.as_str(), code);
        let accepted = code.accepted_for(mode);
        if !accepted {
            debug!(operation = %operation, mode = mode.as_str(), code = %code, "remote call not accepted");
        }
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_call(operation.as_str(), accepted);
    }

    /// Flush, then close the link. Only the first call succeeds.
    pub(crate) fn shutdown(&self) -> Result<()> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return Err(SceneError::ConnectionClosed);
        }

        let flushed = self.link.ping();
        self.record_call(
            LinkOperation::Ping,
            OpMode::Blocking,
            flushed.err().unwrap_or(ReturnCode::OK),
        );
        if let Err(code) = flushed {
            warn!(address = %self.address, code = %code, "ping before close failed, pending commands may be lost");
        }

        self.link.finish();
        self.record_call(LinkOperation::Finish, OpMode::Blocking, ReturnCode::OK);
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("alive", &self.is_alive())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_link::MockLink;

    fn session(link: &MockLink) -> Session {
        Session::new(
            Box::new(link.clone()),
            "127.0.0.1".parse().unwrap(),
            ProximityConvention::Distance,
        )
    }

    #[test]
    fn test_execute_accepts_no_value_for_oneshot() {
        let link = MockLink::new();
        let motor = link.add_object("motor", ObjectKind::RevoluteJoint);
        let session = session(&link);

        let result = session.execute(LinkOperation::SetJointTargetVelocity, OpMode::OneShot, |l| {
            l.set_joint_target_velocity(motor, 1.0, OpMode::OneShot)
        });
        assert!(result.is_ok());
        assert_eq!(session.stats().failed_calls, 0);
    }

    #[test]
    fn test_execute_rejects_remote_error() {
        let link = MockLink::new();
        let session = session(&link);
        link.fail(LinkOperation::StartSimulation, ReturnCode::REMOTE_ERROR);

        let err = session
            .execute(LinkOperation::StartSimulation, OpMode::Blocking, |l| {
                l.start_simulation()
            })
            .unwrap_err();
        assert!(matches!(err, SceneError::RemoteOperationFailed { .. }));
        assert_eq!(session.stats().failed_calls, 1);
    }

    #[test]
    fn test_shutdown_is_single_use() {
        let link = MockLink::new();
        let session = session(&link);

        session.shutdown().unwrap();
        assert!(link.is_finished());
        assert!(matches!(
            session.shutdown(),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(matches!(
            session.call(LinkOperation::Ping, OpMode::Blocking, |l| l.ping()),
            Err(SceneError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_reads_require_running_or_paused() {
        let link = MockLink::new();
        let session = session(&link);
        assert!(matches!(
            session.ensure_running(),
            Err(SceneError::SimulationNotRunning)
        ));
        *session.phase_guard() = SimulationPhase::Paused;
        assert!(session.ensure_running().is_ok());
    }
}
