//! Proximity sensor wrapper

use contracts::{Handle, LinkResult, ObjectKind, OpMode, ProximityConvention, ProximityReading};
use nalgebra::Vector3;
use tracing::instrument;

use crate::error::{Result, SceneError};
use crate::link::{LinkOperation, RemoteLink};
use crate::object::{ObjectRef, ObjectState};
use crate::streaming::StreamedRead;
use crate::typed_view::ObjectType;

pub(crate) struct ProximityRead;

impl StreamedRead for ProximityRead {
    type Reading = ProximityReading;

    const KIND: ObjectKind = ObjectKind::ProximitySensor;
    const OPERATION: LinkOperation = LinkOperation::ReadProximitySensor;

    fn read(link: &dyn RemoteLink, handle: Handle, mode: OpMode) -> LinkResult<ProximityReading> {
        link.read_proximity_sensor(handle, mode)
    }
}

/// Euclidean distance to the detected point, `None` when nothing was detected
pub fn detected_distance(reading: &ProximityReading) -> Option<f64> {
    reading.detected.then(|| {
        let point = reading.point;
        Vector3::new(point.x, point.y, point.z).norm()
    })
}

/// Caller-facing value of `reading` under `convention`
pub fn proximity_value(reading: &ProximityReading, convention: ProximityConvention) -> f64 {
    match detected_distance(reading) {
        Some(distance) => convention.from_distance(distance),
        None => convention.no_detection(),
    }
}

/// Proximity sensor
#[derive(Debug, Clone)]
pub struct ProximitySensor {
    object: ObjectRef,
}

impl ObjectType for ProximitySensor {
    const LABEL: &'static str = "proximity_sensor";

    fn accepts(kind: ObjectKind) -> bool {
        kind == ObjectKind::ProximitySensor
    }

    fn from_object(object: ObjectRef) -> Self {
        Self { object }
    }

    fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl ProximitySensor {
    /// Current value under this sensor's convention
    #[instrument(name = "proximity_get_value", skip(self), fields(handle = self.object.handle()))]
    pub fn get_value(&self) -> Result<f64> {
        let (reading, convention) = self.next_reading()?;
        Ok(proximity_value(&reading, convention))
    }

    /// Raw reply behind [`ProximitySensor::get_value`]
    pub fn read(&self) -> Result<ProximityReading> {
        self.next_reading().map(|(reading, _)| reading)
    }

    /// Effective convention: the override if any, else the session default
    pub fn convention(&self) -> ProximityConvention {
        match &*self.object.state() {
            ObjectState::Proximity(state) => state
                .convention
                .unwrap_or_else(|| self.object.session().proximity_convention()),
            _ => self.object.session().proximity_convention(),
        }
    }

    /// Override the convention for this sensor; shared by every handle to it
    pub fn set_convention(&self, convention: ProximityConvention) {
        if let ObjectState::Proximity(state) = &mut *self.object.state() {
            state.convention = Some(convention);
        }
    }

    fn next_reading(&self) -> Result<(ProximityReading, ProximityConvention)> {
        let session = self.object.session();
        match &mut *self.object.state() {
            ObjectState::Proximity(state) => {
                let reading = state
                    .stream
                    .next::<ProximityRead>(session, self.object.handle())?;
                let convention = state
                    .convention
                    .unwrap_or_else(|| session.proximity_convention());
                Ok((reading, convention))
            }
            _ => Err(SceneError::InvalidKind {
                object: self.object.to_string(),
                expected: Self::LABEL,
                actual: self.object.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3 as Point;

    #[test]
    fn test_distance_is_euclidean() {
        let reading = ProximityReading::at(Point::new(0.03, 0.04, 0.0));
        assert!((detected_distance(&reading).unwrap() - 0.05).abs() < 1e-12);
        assert_eq!(detected_distance(&ProximityReading::nothing()), None);
    }

    #[test]
    fn test_value_per_convention() {
        let near = ProximityReading::at(Point::new(0.0, 0.0, 0.01));
        let none = ProximityReading::nothing();

        assert_eq!(
            proximity_value(&none, ProximityConvention::Distance),
            f64::INFINITY
        );
        assert_eq!(
            proximity_value(&none, ProximityConvention::InverseDistance),
            0.0
        );
        assert!((proximity_value(&near, ProximityConvention::InverseDistance) - 100.0).abs() < 1e-9);

        let normalized = ProximityConvention::Normalized { max_distance: 0.04 };
        assert!((proximity_value(&near, normalized) - 0.75).abs() < 1e-12);
        assert_eq!(proximity_value(&none, normalized), 0.0);
    }

    #[test]
    fn test_detected_at_origin() {
        let touching = ProximityReading::at(Point::default());
        assert_eq!(
            proximity_value(&touching, ProximityConvention::InverseDistance),
            f64::INFINITY
        );
        assert_eq!(proximity_value(&touching, ProximityConvention::Distance), 0.0);
    }
}
