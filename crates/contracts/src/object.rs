//! Scene object identity
//!
//! Handles and the closed set of object kinds understood by the client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote object handle
///
/// Assigned by the server, stable for one connection, never persisted.
pub type Handle = i32;

/// Closed classification of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    PrismaticJoint,
    RevoluteJoint,
    SphericalJoint,
    ProximitySensor,
    VisionSensor,
    Shape,
}

/// Physical unit of a joint target velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityUnit {
    MetersPerSecond,
    RadiansPerSecond,
}

impl ObjectKind {
    /// Classification order used when probing the server for an unknown handle.
    pub const PRECEDENCE: [ObjectKind; 6] = [
        ObjectKind::PrismaticJoint,
        ObjectKind::RevoluteJoint,
        ObjectKind::SphericalJoint,
        ObjectKind::ProximitySensor,
        ObjectKind::VisionSensor,
        ObjectKind::Shape,
    ];

    /// Type tag the server uses when listing objects of this kind
    pub fn tag(self) -> u32 {
        match self {
            ObjectKind::Shape => 0,
            ObjectKind::ProximitySensor => 5,
            ObjectKind::VisionSensor => 9,
            ObjectKind::RevoluteJoint => 10,
            ObjectKind::PrismaticJoint => 11,
            ObjectKind::SphericalJoint => 12,
        }
    }

    /// Inverse of [`ObjectKind::tag`]
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn is_joint(self) -> bool {
        matches!(
            self,
            ObjectKind::PrismaticJoint | ObjectKind::RevoluteJoint | ObjectKind::SphericalJoint
        )
    }

    /// Unit of `set_velocity` for joints, `None` for everything else.
    pub fn velocity_unit(self) -> Option<VelocityUnit> {
        match self {
            ObjectKind::PrismaticJoint => Some(VelocityUnit::MetersPerSecond),
            ObjectKind::RevoluteJoint | ObjectKind::SphericalJoint => {
                Some(VelocityUnit::RadiansPerSecond)
            }
            _ => None,
        }
    }

    /// Stable label for logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::PrismaticJoint => "prismatic_joint",
            ObjectKind::RevoluteJoint => "revolute_joint",
            ObjectKind::SphericalJoint => "spherical_joint",
            ObjectKind::ProximitySensor => "proximity_sensor",
            ObjectKind::VisionSensor => "vision_sensor",
            ObjectKind::Shape => "shape",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
