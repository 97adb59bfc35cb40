//! Joint wrappers

use contracts::{ObjectKind, OpMode, VelocityUnit};
use tracing::instrument;

use crate::error::Result;
use crate::link::LinkOperation;
use crate::object::{ObjectRef, SceneObject};
use crate::typed_view::ObjectType;

/// Fire-and-forget target velocity command
fn set_target_velocity(object: &SceneObject, velocity: f64) -> Result<()> {
    let handle = object.handle();
    object
        .session()
        .execute(LinkOperation::SetJointTargetVelocity, OpMode::OneShot, |link| {
            link.set_joint_target_velocity(handle, velocity, OpMode::OneShot)
        })
}

/// Any joint, whatever its kind
#[derive(Debug, Clone)]
pub struct Joint {
    object: ObjectRef,
}

impl ObjectType for Joint {
    const LABEL: &'static str = "joint";

    fn accepts(kind: ObjectKind) -> bool {
        kind.is_joint()
    }

    fn from_object(object: ObjectRef) -> Self {
        Self { object }
    }

    fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl Joint {
    /// Set the target velocity, in the unit of [`Joint::velocity_unit`]
    #[instrument(name = "joint_set_velocity", skip(self), fields(handle = self.object.handle()))]
    pub fn set_velocity(&self, velocity: f64) -> Result<()> {
        set_target_velocity(&self.object, velocity)
    }

    pub fn velocity_unit(&self) -> VelocityUnit {
        self.object
            .kind()
            .velocity_unit()
            .unwrap_or(VelocityUnit::RadiansPerSecond)
    }
}

macro_rules! typed_joint {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $label:literal, $unit:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            object: ObjectRef,
        }

        impl ObjectType for $name {
            const LABEL: &'static str = $label;

            fn accepts(kind: ObjectKind) -> bool {
                kind == ObjectKind::$kind
            }

            fn from_object(object: ObjectRef) -> Self {
                Self { object }
            }

            fn object(&self) -> &ObjectRef {
                &self.object
            }
        }

        impl $name {
            pub fn set_velocity(&self, velocity: f64) -> Result<()> {
                set_target_velocity(&self.object, velocity)
            }

            pub fn velocity_unit(&self) -> VelocityUnit {
                VelocityUnit::$unit
            }
        }

        impl From<$name> for Joint {
            fn from(joint: $name) -> Self {
                Joint { object: joint.object }
            }
        }
    };
}

typed_joint!(
    /// Linear joint, velocity in m/s
    PrismaticJoint,
    PrismaticJoint,
    "prismatic_joint",
    MetersPerSecond
);
typed_joint!(
    /// Rotational joint, velocity in rad/s
    RevoluteJoint,
    RevoluteJoint,
    "revolute_joint",
    RadiansPerSecond
);
typed_joint!(SphericalJoint, SphericalJoint, "spherical_joint", RadiansPerSecond);
