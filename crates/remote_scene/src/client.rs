//! Remote API client
//!
//! Owns the connection. Everything handed out by [`Client::scene`] shares its session
//! and fails with `ConnectionClosed` once the client is closed.

use std::sync::Arc;

use config_loader::ConfigLoader;
use contracts::{ClientBlueprint, LinkAddress};
use observability::SessionStats;
use tracing::{info, instrument, warn};

use crate::error::{Result, SceneError};
use crate::link::RemoteLink;
use crate::registry::ObjectRegistry;
use crate::robots;
use crate::scene::Scene;
use crate::session::Session;
use crate::simulation::Simulation;

#[derive(Debug)]
pub struct Client {
    session: Arc<Session>,
    scene: Scene,
    simulation: Simulation,
}

impl Client {
    /// Connect `link` using `blueprint`
    ///
    /// The blueprint is validated first, so one built in code gets the same checks as
    /// a loaded file. The scene knows the built-in robot collections plus the
    /// blueprint's own.
    #[instrument(name = "client_connect", skip(link, blueprint), fields(address = %blueprint.link.address))]
    pub fn connect<L>(mut link: L, blueprint: &ClientBlueprint) -> Result<Self>
    where
        L: RemoteLink + 'static,
    {
        ConfigLoader::validate(blueprint)?;
        let address = blueprint.link.parsed_address()?;
        link.connect(&address, &blueprint.link.settings)
            .map_err(|code| SceneError::ConnectionFailed {
                address: address.to_string(),
                code,
            })?;

        let session = Arc::new(Session::new(
            Box::new(link),
            address,
            blueprint.sensors.proximity_convention,
        ));
        let registry = Arc::new(ObjectRegistry::new(session.clone()));
        let scene = Scene::new(
            registry,
            robots::builtin_definitions()
                .into_iter()
                .chain(blueprint.collections.iter().cloned()),
        );
        let simulation = Simulation::new(session.clone());

        info!(
            address = %address,
            collections = blueprint.collections.len(),
            "Connected to remote API server"
        );
        Ok(Self {
            session,
            scene,
            simulation,
        })
    }

    /// Connect to the default local address
    pub fn connect_default<L>(link: L) -> Result<Self>
    where
        L: RemoteLink + 'static,
    {
        Self::connect(link, &ClientBlueprint::default())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn address(&self) -> LinkAddress {
        self.session.address()
    }

    pub fn is_alive(&self) -> bool {
        self.session.is_alive()
    }

    /// Snapshot of the session's traffic
    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }

    /// Flush pending commands and close the link. A second call fails.
    #[instrument(name = "client_close", skip(self), fields(address = %self.session.address()))]
    pub fn close(&self) -> Result<()> {
        self.session.shutdown()?;
        info!("Connection closed");
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if !self.session.is_alive() {
            return;
        }
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close connection on drop");
        }
    }
}
