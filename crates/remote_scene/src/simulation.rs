//! Simulation run control

use std::sync::Arc;

use contracts::OpMode;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::link::LinkOperation;
use crate::session::Session;

/// Client-side view of the server's simulation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationPhase {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl SimulationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationPhase::Stopped => "stopped",
            SimulationPhase::Running => "running",
            SimulationPhase::Paused => "paused",
        }
    }
}

impl std::fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start, pause and stop the server's simulation
///
/// The phase is tracked locally and starts as [`SimulationPhase::Stopped`] for every
/// new connection, whatever the server was doing before.
#[derive(Debug, Clone)]
pub struct Simulation {
    session: Arc<Session>,
}

impl Simulation {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn phase(&self) -> SimulationPhase {
        self.session.phase()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SimulationPhase::Running
    }

    /// Start or unpause. No remote call when already running.
    #[instrument(name = "simulation_resume", skip(self))]
    pub fn resume(&self) -> Result<()> {
        self.session.ensure_alive()?;
        let mut phase = self.session.phase_guard();
        if *phase == SimulationPhase::Running {
            return Ok(());
        }
        self.session
            .execute(LinkOperation::StartSimulation, OpMode::Blocking, |link| {
                link.start_simulation()
            })?;
        *phase = SimulationPhase::Running;
        info!("Simulation running");
        Ok(())
    }

    /// Pause. Only acts while running.
    #[instrument(name = "simulation_pause", skip(self))]
    pub fn pause(&self) -> Result<()> {
        self.session.ensure_alive()?;
        let mut phase = self.session.phase_guard();
        if *phase != SimulationPhase::Running {
            return Ok(());
        }
        self.session
            .execute(LinkOperation::PauseSimulation, OpMode::Blocking, |link| {
                link.pause_simulation()
            })?;
        *phase = SimulationPhase::Paused;
        info!("Simulation paused");
        Ok(())
    }

    /// Stop. No remote call when already stopped.
    #[instrument(name = "simulation_stop", skip(self))]
    pub fn stop(&self) -> Result<()> {
        self.session.ensure_alive()?;
        let mut phase = self.session.phase_guard();
        if *phase == SimulationPhase::Stopped {
            return Ok(());
        }
        self.session
            .execute(LinkOperation::StopSimulation, OpMode::Blocking, |link| {
                link.stop_simulation()
            })?;
        *phase = SimulationPhase::Stopped;
        info!("Simulation stopped");
        Ok(())
    }

    /// Resume, and stop again when the returned guard is dropped
    pub fn run(&self) -> Result<SimulationGuard<'_>> {
        self.resume()?;
        Ok(SimulationGuard { simulation: self })
    }
}

/// Keeps the simulation running for the guard's lifetime
#[must_use = "the simulation stops as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SimulationGuard<'a> {
    simulation: &'a Simulation,
}

impl SimulationGuard<'_> {
    pub fn simulation(&self) -> &Simulation {
        self.simulation
    }
}

impl Drop for SimulationGuard<'_> {
    fn drop(&mut self) {
        if !self.simulation.session.is_alive() {
            return;
        }
        if let Err(e) = self.simulation.stop() {
            warn!(error = %e, "Failed to stop simulation on guard drop");
        }
    }
}
