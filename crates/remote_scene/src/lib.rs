//! # Remote Scene
//!
//! Client for a robotics simulation server's remote API.
//!
//! Responsibilities:
//! - Connect and disconnect through a [`RemoteLink`]
//! - Control the simulation run state
//! - Resolve named objects into typed wrappers (joints, sensors, shapes)
//! - Stream sensor values, masking buffer misses right after subscription
//! - Group objects into named collections, including duplicated robots
//!
//! # Example
//!
//! ```no_run
//! use remote_scene::{Client, MockLink, ObjectKind};
//!
//! let link = MockLink::new();
//! link.add_object("ePuck_leftJoint", ObjectKind::RevoluteJoint);
//!
//! let client = Client::connect_default(link)?;
//! let motor = client.scene().joints().require("ePuck_leftJoint")?;
//! motor.set_velocity(1.5)?;
//! # Ok::<(), remote_scene::SceneError>(())
//! ```

mod client;
pub mod codec;
mod collection;
mod error;
mod joint;
mod link;
mod mock_link;
mod object;
mod proximity;
mod registry;
pub mod robots;
mod scene;
mod session;
mod shape;
mod simulation;
mod streaming;
mod typed_view;
mod vision;

pub use client::Client;
pub use codec::ImageRequest;
pub use collection::{CollectionIter, NamedCollection};
pub use contracts::{
    CaptureFormat, ClientBlueprint, CollectionDefinition, ColorMode, ComponentGroup, Handle,
    LinkAddress, LinkResult, LinkSettings, MappingKey, NameMapping, ObjectKind, OpMode,
    ProximityConvention, ProximityReading, ResampleFilter, ReturnCode, Vector3, VelocityUnit,
    VisionFrame,
};
pub use error::{CollectionError, Result, SceneError};
pub use joint::{Joint, PrismaticJoint, RevoluteJoint, SphericalJoint};
pub use link::{LinkOperation, RemoteLink};
pub use mock_link::{LinkCall, MockConfig, MockLink};
pub use object::{ObjectRef, SceneObject};
pub use proximity::{detected_distance, proximity_value, ProximitySensor};
pub use registry::ObjectRegistry;
pub use robots::{Bearing, EPuck, PairAngle, SensorPair};
pub use scene::Scene;
pub use session::Session;
pub use shape::Shape;
pub use simulation::{Simulation, SimulationGuard, SimulationPhase};
pub use typed_view::{cast, ObjectType, TypedView};
pub use vision::{PixelBuffer, VisionSensor};
