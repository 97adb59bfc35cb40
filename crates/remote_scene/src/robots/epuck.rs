//! e-puck robot
//!
//! Built-in collection for the e-puck model shipped with the simulator: eight proximity
//! sensors around the body, a camera, a light sensor and two wheel motors.

use std::sync::Arc;

use contracts::{CollectionDefinition, NameMapping, ProximityConvention};
use tracing::instrument;

use crate::collection::NamedCollection;
use crate::error::Result;
use crate::joint::Joint;
use crate::proximity::ProximitySensor;
use crate::vision::VisionSensor;

pub const COLLECTION_NAME: &str = "epuck";

/// Detection range of the e-puck proximity sensors, in meters
pub const PROXIMITY_RANGE: f64 = 0.04;

pub fn definition() -> CollectionDefinition {
    let mut definition = CollectionDefinition::new(COLLECTION_NAME, "ePuck");
    definition.proximity_sensors = NameMapping::Ordinal(
        (1..=8)
            .map(|i| format!("ePuck_proxSensor{i}"))
            .collect(),
    );
    definition.vision_sensors = NameMapping::Aliased(
        [("camera", "ePuck_camera"), ("light_sensor", "ePuck_lightSensor")]
            .into_iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect(),
    );
    definition.joints = NameMapping::Aliased(
        [("left_motor", "ePuck_leftJoint"), ("right_motor", "ePuck_rightJoint")]
            .into_iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect(),
    );
    definition.proximity_convention = Some(ProximityConvention::Normalized {
        max_distance: PROXIMITY_RANGE,
    });
    definition
}

/// Bearing of a proximity sensor, degrees clockwise from the front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bearing {
    Deg15,
    Deg45,
    Deg90,
    Deg135,
    Deg225,
    Deg270,
    Deg315,
    Deg345,
}

impl Bearing {
    pub const ALL: [Bearing; 8] = [
        Bearing::Deg15,
        Bearing::Deg45,
        Bearing::Deg90,
        Bearing::Deg135,
        Bearing::Deg225,
        Bearing::Deg270,
        Bearing::Deg315,
        Bearing::Deg345,
    ];

    /// Position of the sensor in the proximity mapping
    pub fn sensor_index(self) -> usize {
        match self {
            Bearing::Deg15 => 3,
            Bearing::Deg45 => 4,
            Bearing::Deg90 => 5,
            Bearing::Deg135 => 6,
            Bearing::Deg225 => 7,
            Bearing::Deg270 => 0,
            Bearing::Deg315 => 1,
            Bearing::Deg345 => 2,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Bearing::Deg15 => 15,
            Bearing::Deg45 => 45,
            Bearing::Deg90 => 90,
            Bearing::Deg135 => 135,
            Bearing::Deg225 => 225,
            Bearing::Deg270 => 270,
            Bearing::Deg315 => 315,
            Bearing::Deg345 => 345,
        }
    }
}

/// Angle of a symmetric left/right sensor pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairAngle {
    Deg15,
    Deg45,
    Deg90,
    Deg135,
}

impl PairAngle {
    /// (left, right) positions in the proximity mapping
    pub fn sensor_indices(self) -> (usize, usize) {
        match self {
            PairAngle::Deg15 => (2, 3),
            PairAngle::Deg45 => (1, 4),
            PairAngle::Deg90 => (0, 5),
            PairAngle::Deg135 => (7, 6),
        }
    }
}

/// Left and right sensors at the same angle
#[derive(Debug, Clone, Copy)]
pub struct SensorPair<'a> {
    pub left: &'a ProximitySensor,
    pub right: &'a ProximitySensor,
}

impl SensorPair<'_> {
    /// (left, right) values
    pub fn values(&self) -> Result<(f64, f64)> {
        Ok((self.left.get_value()?, self.right.get_value()?))
    }
}

/// One e-puck instance with its components resolved
#[derive(Debug, Clone)]
pub struct EPuck {
    collection: Arc<NamedCollection>,
    proximity_sensors: Vec<ProximitySensor>,
    camera: VisionSensor,
    light_sensor: VisionSensor,
    left_motor: Joint,
    right_motor: Joint,
}

impl EPuck {
    /// Resolve every component of `collection`
    #[instrument(name = "epuck_bind", skip(collection), fields(instance = collection.instance_index()))]
    pub fn from_collection(collection: Arc<NamedCollection>) -> Result<Self> {
        Ok(Self {
            proximity_sensors: collection.proximity_sensors()?,
            camera: collection.vision_sensor("camera")?,
            light_sensor: collection.vision_sensor("light_sensor")?,
            left_motor: collection.joint("left_motor")?,
            right_motor: collection.joint("right_motor")?,
            collection,
        })
    }

    pub fn collection(&self) -> &Arc<NamedCollection> {
        &self.collection
    }

    pub fn proximity_sensors(&self) -> &[ProximitySensor] {
        &self.proximity_sensors
    }

    pub fn proximity_sensor(&self, bearing: Bearing) -> &ProximitySensor {
        &self.proximity_sensors[bearing.sensor_index()]
    }

    pub fn proximity_pair(&self, angle: PairAngle) -> SensorPair<'_> {
        let (left, right) = angle.sensor_indices();
        SensorPair {
            left: &self.proximity_sensors[left],
            right: &self.proximity_sensors[right],
        }
    }

    pub fn camera(&self) -> &VisionSensor {
        &self.camera
    }

    pub fn light_sensor(&self) -> &VisionSensor {
        &self.light_sensor
    }

    pub fn left_motor(&self) -> &Joint {
        &self.left_motor
    }

    pub fn right_motor(&self) -> &Joint {
        &self.right_motor
    }

    /// Set both wheel velocities, in rad/s
    pub fn set_wheel_velocities(&self, left: f64, right: f64) -> Result<()> {
        self.left_motor.set_velocity(left)?;
        self.right_motor.set_velocity(right)
    }

    pub fn stop(&self) -> Result<()> {
        self.set_wheel_velocities(0.0, 0.0)
    }
}
