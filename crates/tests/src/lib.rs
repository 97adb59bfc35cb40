//! # Integration Tests
//!
//! End-to-end scenarios against the in-process mock server.
//!
//! Covers:
//! - Configuration to connected client
//! - Registry caching and classification
//! - Streaming sensor reads and buffer-miss masking
//! - Named collections and duplicated robots
//! - Connection lifecycle

#[cfg(test)]
mod support {
    use bytes::Bytes;
    use remote_scene::{Client, Handle, MockLink, ObjectKind, VisionFrame};

    pub fn connect(link: &MockLink) -> Client {
        Client::connect_default(link.clone()).unwrap()
    }

    pub fn frame(width: u32, height: u32, fill: u8) -> VisionFrame {
        VisionFrame {
            resolution: (width, height),
            pixels: Bytes::from(vec![fill; (width * height * 3) as usize]),
        }
    }

    /// Populate one e-puck; `suffix` is "" for the original, "#0" for the first copy, ...
    pub fn add_epuck(link: &MockLink, suffix: &str) -> Vec<Handle> {
        let mut handles = vec![link.add_object(&format!("ePuck{suffix}"), ObjectKind::Shape)];
        for i in 1..=8 {
            handles.push(link.add_object(
                &format!("ePuck_proxSensor{i}{suffix}"),
                ObjectKind::ProximitySensor,
            ));
        }
        for name in ["ePuck_camera", "ePuck_lightSensor"] {
            let handle = link.add_object(&format!("{name}{suffix}"), ObjectKind::VisionSensor);
            link.set_frame(handle, frame(4, 2, 10));
            handles.push(handle);
        }
        for name in ["ePuck_leftJoint", "ePuck_rightJoint"] {
            handles.push(link.add_object(&format!("{name}{suffix}"), ObjectKind::RevoluteJoint));
        }
        handles
    }
}

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use remote_scene::{Client, MockLink, ObjectKind, ProximityConvention, ProximityReading, Vector3};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_blueprint_drives_client() {
        let content = r#"
[link]
address = "127.0.0.1:19998"

[sensors.proximity_convention]
kind = "inverse_distance"

[[collections]]
name = "pioneer"
root = "Pioneer"
proximity_sensors = ["Pioneer_sonar1"]

[collections.joints]
left = "Pioneer_left"
"#;
        let blueprint = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();

        let link = MockLink::new();
        link.add_object("Pioneer", ObjectKind::Shape);
        let sonar = link.add_object("Pioneer_sonar1", ObjectKind::ProximitySensor);
        link.add_object("Pioneer_left", ObjectKind::RevoluteJoint);
        link.set_proximity(sonar, ProximityReading::at(Vector3::new(0.5, 0.0, 0.0)));

        let client = Client::connect(link.clone(), &blueprint).unwrap();
        assert_eq!(client.address().port, 19998);

        let pioneer = client.scene().collection("pioneer").unwrap();
        let sensor = pioneer.proximity_sensor(0).unwrap();
        assert_eq!(sensor.convention(), ProximityConvention::InverseDistance);

        client.simulation().resume().unwrap();
        assert!((sensor.get_value().unwrap() - 2.0).abs() < 1e-12);
        pioneer.joint("left").unwrap().set_velocity(1.0).unwrap();
    }
}

#[cfg(test)]
mod registry_tests {
    use remote_scene::{LinkOperation, MockLink, ObjectKind, SceneObject};

    use crate::support::connect;

    #[test]
    fn test_missing_names_are_absent_not_errors() {
        let link = MockLink::new();
        let client = connect(&link);
        let objects = client.scene().objects();

        for name in ["ghost", "ePuck", "motor#3"] {
            assert!(!objects.has(name).unwrap());
            assert!(objects.resolve(name).unwrap().is_none());
        }
    }

    #[test]
    fn test_resolve_twice_yields_same_wrapper() {
        let link = MockLink::new();
        link.add_object("M1", ObjectKind::RevoluteJoint);
        let client = connect(&link);
        let objects = client.scene().objects();

        let first = objects.resolve("M1").unwrap().unwrap();
        let second = objects.resolve("M1").unwrap().unwrap();
        assert!(SceneObject::same_object(&first, &second));
        assert_eq!(link.call_count(LinkOperation::ResolveHandle), 1);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let link = MockLink::new();
        let handles = [
            link.add_object("a", ObjectKind::SphericalJoint),
            link.add_object("b", ObjectKind::VisionSensor),
            link.add_object("c", ObjectKind::Shape),
        ];
        let client = connect(&link);
        let objects = client.scene().objects();

        for handle in handles {
            let kind = objects.classify(handle).unwrap();
            let listings = link.call_count(LinkOperation::ListHandles);
            assert_eq!(objects.classify(handle).unwrap(), kind);
            assert_eq!(link.call_count(LinkOperation::ListHandles), listings);
        }
    }

    #[test]
    fn test_listing_never_duplicates_wrappers() {
        let link = MockLink::new();
        link.add_object("a", ObjectKind::RevoluteJoint);
        link.add_object("b", ObjectKind::ProximitySensor);
        let client = connect(&link);
        let objects = client.scene().objects();

        let first = objects.list_all().unwrap();
        let second = objects.list_all().unwrap();
        assert_eq!(first.len(), 2);
        for (a, b) in first.iter().zip(&second) {
            assert!(SceneObject::same_object(a, b));
        }
        let resolved = objects.resolve("b").unwrap().unwrap();
        assert!(first.iter().any(|o| SceneObject::same_object(o, &resolved)));
    }
}

#[cfg(test)]
mod typed_view_tests {
    use remote_scene::{MockLink, ObjectKind, ObjectType, SceneError, SceneObject};

    use crate::support::connect;

    #[test]
    fn test_kind_mismatch_is_invalid_kind() {
        let link = MockLink::new();
        link.add_object("cam", ObjectKind::VisionSensor);
        let client = connect(&link);

        let err = client.scene().proximity_sensors().get("cam").unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidKind {
                expected: "proximity_sensor",
                actual: ObjectKind::VisionSensor,
                ..
            }
        ));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_matching_kind_returns_registry_wrapper() {
        let link = MockLink::new();
        link.add_object("cam", ObjectKind::VisionSensor);
        let client = connect(&link);

        let camera = client.scene().vision_sensors().get("cam").unwrap().unwrap();
        let raw = client.scene().objects().get("cam").unwrap();
        assert!(SceneObject::same_object(camera.object(), &raw));
        assert_eq!(camera.name(), Some("cam"));
    }

    #[test]
    fn test_require_fails_with_not_found() {
        let link = MockLink::new();
        let client = connect(&link);
        let err = client.scene().shapes().require("ghost").unwrap_err();
        assert!(err.is_not_found());
        assert!(client.scene().shapes().get("ghost").unwrap().is_none());
    }

    #[test]
    fn test_get_all_filters_by_kind() {
        let link = MockLink::new();
        link.add_object("l", ObjectKind::RevoluteJoint);
        link.add_object("r", ObjectKind::RevoluteJoint);
        link.add_object("s", ObjectKind::PrismaticJoint);
        link.add_object("body", ObjectKind::Shape);
        let client = connect(&link);

        assert_eq!(client.scene().revolute_joints().get_all().unwrap().len(), 2);
        assert_eq!(client.scene().joints().get_all().unwrap().len(), 3);
        assert_eq!(client.scene().shapes().get_all().unwrap().len(), 1);
        assert!(client.scene().spherical_joints().get_all().unwrap().is_empty());
    }
}

#[cfg(test)]
mod sensor_tests {
    use observability::ReadPath;
    use remote_scene::{
        ColorMode, ImageRequest, LinkCall, LinkOperation, MockLink, ObjectKind, ObjectType,
        OpMode, ProximityConvention, ProximityReading, ResampleFilter, ReturnCode, SceneError,
        Vector3,
    };

    use crate::support::{connect, frame};

    fn vision_modes(link: &MockLink) -> Vec<OpMode> {
        link.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::ReadVisionImage { mode, .. } => Some(mode),
                _ => None,
            })
            .collect()
    }

    fn proximity_modes(link: &MockLink) -> Vec<OpMode> {
        link.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::ReadProximitySensor { mode, .. } => Some(mode),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_proximity_no_detection_sentinel() {
        let link = MockLink::new();
        let handle = link.add_object("prox", ObjectKind::ProximitySensor);
        link.set_proximity(handle, ProximityReading::nothing());
        let client = connect(&link);
        client.simulation().resume().unwrap();

        let sensor = client.scene().proximity_sensors().require("prox").unwrap();
        assert_eq!(sensor.get_value().unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_proximity_reports_distance() {
        let link = MockLink::new();
        let handle = link.add_object("prox", ObjectKind::ProximitySensor);
        link.set_proximity(handle, ProximityReading::at(Vector3::new(0.3, 0.0, 0.4)));
        let client = connect(&link);
        client.simulation().resume().unwrap();

        let sensor = client.scene().proximity_sensors().require("prox").unwrap();
        assert!((sensor.get_value().unwrap() - 0.5).abs() < 1e-12);
        assert!((sensor.get_value().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_proximity_inverse_convention_edges() {
        let link = MockLink::new();
        let handle = link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let sensor = client.scene().proximity_sensors().require("prox").unwrap();
        sensor.set_convention(ProximityConvention::InverseDistance);

        link.set_proximity(handle, ProximityReading::nothing());
        assert_eq!(sensor.get_value().unwrap(), 0.0);

        link.set_proximity(handle, ProximityReading::at(Vector3::default()));
        assert_eq!(sensor.get_value().unwrap(), f64::INFINITY);

        link.set_proximity(handle, ProximityReading::at(Vector3::new(1e-6, 0.0, 0.0)));
        assert!(sensor.get_value().unwrap() > 1e5);
    }

    #[test]
    fn test_override_is_shared_between_lookups() {
        let link = MockLink::new();
        link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);

        let a = client.scene().proximity_sensors().require("prox").unwrap();
        let b = client.scene().proximity_sensors().require("prox").unwrap();
        a.set_convention(ProximityConvention::InverseDistance);
        assert_eq!(b.convention(), ProximityConvention::InverseDistance);
    }

    #[test]
    fn test_vision_call_pattern() {
        let link = MockLink::new();
        let handle = link.add_object("cam", ObjectKind::VisionSensor);
        link.set_frame(handle, frame(4, 2, 7));
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let camera = client.scene().vision_sensors().require("cam").unwrap();
        link.clear_calls();

        let pixels = camera.get_value().unwrap();
        assert_eq!(pixels.shape(), (2, 4, 3));
        assert_eq!(vision_modes(&link), vec![OpMode::Blocking, OpMode::Streaming]);

        link.clear_calls();
        camera.get_value().unwrap();
        camera.get_value().unwrap();
        assert_eq!(vision_modes(&link), vec![OpMode::Buffer, OpMode::Buffer]);
        assert!(camera.object().is_streaming());
    }

    #[test]
    fn test_first_buffered_miss_is_masked() {
        let link = MockLink::new();
        let handle = link.add_object("cam", ObjectKind::VisionSensor);
        link.set_frame(handle, frame(2, 2, 1));
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let camera = client.scene().vision_sensors().require("cam").unwrap();

        let cold = camera.get_value().unwrap();
        link.set_frame(handle, frame(2, 2, 2));
        link.queue_buffered_miss(handle, ReturnCode::NO_VALUE);

        assert_eq!(camera.get_value().unwrap(), cold);
        assert_eq!(camera.get_value().unwrap().pixel(0, 0), Some([2, 2, 2]));

        link.queue_buffered_miss(handle, ReturnCode::NO_VALUE);
        assert!(matches!(
            camera.get_value(),
            Err(SceneError::RemoteOperationFailed { .. })
        ));

        let stats = client.stats();
        assert_eq!(stats.reads_via(ReadPath::Cold), 1);
        assert_eq!(stats.reads_via(ReadPath::Masked), 1);
        assert_eq!(stats.reads_via(ReadPath::Buffered), 1);
    }

    #[test]
    fn test_hard_buffer_error_also_masked_during_warmup() {
        let link = MockLink::new();
        let handle = link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let sensor = client.scene().proximity_sensors().require("prox").unwrap();

        sensor.get_value().unwrap();
        link.queue_buffered_miss(handle, ReturnCode::REMOTE_ERROR);
        assert_eq!(sensor.get_value().unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_stopped_simulation_refuses_reads_without_calls() {
        let link = MockLink::new();
        let handle = link.add_object("cam", ObjectKind::VisionSensor);
        link.set_frame(handle, frame(1, 1, 0));
        let client = connect(&link);
        let camera = client.scene().vision_sensors().require("cam").unwrap();
        link.clear_calls();

        assert!(matches!(
            camera.get_value(),
            Err(SceneError::SimulationNotRunning)
        ));
        assert!(link.calls().is_empty());
        assert!(!camera.object().is_streaming());
    }

    #[test]
    fn test_paused_simulation_still_serves_reads() {
        let link = MockLink::new();
        link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);
        let sensor = client.scene().proximity_sensors().require("prox").unwrap();

        client.simulation().resume().unwrap();
        client.simulation().pause().unwrap();
        assert!(sensor.get_value().is_ok());
    }

    #[test]
    fn test_get_image_resizes_only_when_needed() {
        let link = MockLink::new();
        let handle = link.add_object("cam", ObjectKind::VisionSensor);
        link.set_frame(handle, frame(4, 4, 200));
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let camera = client.scene().vision_sensors().require("cam").unwrap();

        let native = camera
            .get_image_with(ColorMode::Rgb, Some((4, 4)), ResampleFilter::Lanczos)
            .unwrap();
        assert_eq!((native.width(), native.height()), (4, 4));

        let request = ImageRequest::new(ColorMode::Luma).resized(2, 2, ResampleFilter::Box);
        let small = camera.get_image(&request).unwrap();
        assert_eq!((small.width(), small.height()), (2, 2));
        assert_eq!(small.to_luma8().get_pixel(1, 1).0, [200]);
    }

    #[test]
    fn test_streaming_subscribe_failure_is_fatal() {
        let link = MockLink::new();
        link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let sensor = client.scene().proximity_sensors().require("prox").unwrap();

        link.fail_mode(
            LinkOperation::ReadProximitySensor,
            OpMode::Streaming,
            ReturnCode::TIMEOUT,
        );
        link.clear_calls();
        assert!(matches!(
            sensor.get_value(),
            Err(SceneError::RemoteOperationFailed {
                code: ReturnCode::TIMEOUT,
                ..
            })
        ));
        assert_eq!(
            proximity_modes(&link),
            vec![OpMode::Blocking, OpMode::Streaming]
        );
        assert!(!sensor.object().is_streaming());

        link.clear_failure(LinkOperation::ReadProximitySensor);
        link.clear_calls();
        assert!(sensor.get_value().is_ok());
        assert_eq!(
            proximity_modes(&link),
            vec![OpMode::Blocking, OpMode::Streaming]
        );
        assert!(sensor.object().is_streaming());
    }
}

#[cfg(test)]
mod joint_tests {
    use remote_scene::{
        LinkCall, LinkOperation, MockLink, ObjectKind, OpMode, ReturnCode, SceneError,
    };

    use crate::support::connect;

    #[test]
    fn test_revolute_set_velocity_single_oneshot_call() {
        let link = MockLink::new();
        let m1 = link.add_object("M1", ObjectKind::RevoluteJoint);
        let client = connect(&link);
        let joint = client.scene().revolute_joints().require("M1").unwrap();
        link.clear_calls();

        joint.set_velocity(3.14).unwrap();
        assert_eq!(
            link.calls(),
            vec![LinkCall::SetJointTargetVelocity {
                handle: m1,
                velocity: 3.14,
                mode: OpMode::OneShot,
            }]
        );
    }

    #[test]
    fn test_set_velocity_failure_not_retried() {
        let link = MockLink::new();
        link.add_object("slider", ObjectKind::PrismaticJoint);
        let client = connect(&link);
        let joint = client.scene().prismatic_joints().require("slider").unwrap();
        link.fail(LinkOperation::SetJointTargetVelocity, ReturnCode::REMOTE_ERROR);
        link.clear_calls();

        assert!(matches!(
            joint.set_velocity(0.2),
            Err(SceneError::RemoteOperationFailed { .. })
        ));
        assert_eq!(link.call_count(LinkOperation::SetJointTargetVelocity), 1);
    }
}

#[cfg(test)]
mod collection_tests {
    use remote_scene::{
        Bearing, CollectionDefinition, CollectionError, ComponentGroup, MockLink, NameMapping,
        ObjectKind, ObjectType, PairAngle, ProximityConvention, ProximityReading, SceneError,
        Vector3,
    };
    use std::sync::Arc;

    use crate::support::{add_epuck, connect};

    #[test]
    fn test_instance_zero_is_the_primary() {
        let link = MockLink::new();
        add_epuck(&link, "");
        let client = connect(&link);

        let epuck = client.scene().collection("epuck").unwrap();
        assert!(Arc::ptr_eq(&epuck, &epuck.instance(0).unwrap()));
        assert!(Arc::ptr_eq(
            &epuck,
            &client.scene().collection("epuck").unwrap()
        ));
    }

    #[test]
    fn test_duplicate_suffix_and_absent_root() {
        let link = MockLink::new();
        add_epuck(&link, "");
        let copy_handles = add_epuck(&link, "#0");
        let client = connect(&link);
        let epuck = client.scene().collection("epuck").unwrap();

        let copy = epuck.instance(1).unwrap();
        assert_eq!(copy.root().handle(), copy_handles[0]);
        assert_eq!(
            copy.joint("left_motor").unwrap().name(),
            Some("ePuck_leftJoint#0")
        );

        assert!(matches!(
            epuck.instance(2),
            Err(SceneError::Collection(CollectionError::RootAbsent { .. }))
        ));
    }

    #[test]
    fn test_iteration_counts_duplicates() {
        let link = MockLink::new();
        for suffix in ["", "#0", "#1"] {
            add_epuck(&link, suffix);
        }
        let client = connect(&link);

        let robots = client.scene().epucks().unwrap();
        assert_eq!(robots.len(), 3);
        assert_eq!(robots[2].collection().instance_index(), 2);
    }

    #[test]
    fn test_no_epuck_in_scene() {
        let link = MockLink::new();
        let client = connect(&link);
        assert!(client.scene().epuck().unwrap_err().is_not_found());
    }

    #[test]
    fn test_lookup_error_kinds() {
        let link = MockLink::new();
        add_epuck(&link, "");
        link.remove_object("ePuck_proxSensor8");
        let client = connect(&link);
        let epuck = client.scene().collection("epuck").unwrap();

        assert!(matches!(
            epuck.proximity_sensor(8),
            Err(SceneError::Collection(CollectionError::IndexOutOfRange { .. }))
        ));
        assert!(matches!(
            epuck.vision_sensor("thermal"),
            Err(SceneError::Collection(CollectionError::NotInMapping { .. }))
        ));
        assert!(matches!(
            epuck.proximity_sensor(7),
            Err(SceneError::Collection(CollectionError::ObjectAbsent { .. }))
        ));
        assert!(matches!(
            client.scene().collection("khepera"),
            Err(SceneError::Collection(CollectionError::UnknownCollection { .. }))
        ));
    }

    #[test]
    fn test_epuck_facade() {
        let link = MockLink::new();
        let handles = add_epuck(&link, "");
        let client = connect(&link);
        let robot = client.scene().epuck().unwrap();

        // Sensor at 15 degrees is ePuck_proxSensor4
        let front = handles[1 + Bearing::Deg15.sensor_index()];
        link.set_proximity(front, ProximityReading::at(Vector3::new(0.0, 0.01, 0.0)));

        client.simulation().resume().unwrap();
        let value = robot.proximity_sensor(Bearing::Deg15).get_value().unwrap();
        assert!((value - 0.75).abs() < 1e-9);
        assert_eq!(
            robot.proximity_pair(PairAngle::Deg15).right.handle(),
            front
        );
        assert_eq!(robot.proximity_pair(PairAngle::Deg90).left.handle(), handles[1]);

        robot.set_wheel_velocities(1.0, -1.0).unwrap();
        assert_eq!(link.joint_velocity(robot.left_motor().handle()), Some(1.0));
        assert_eq!(link.joint_velocity(robot.right_motor().handle()), Some(-1.0));
        assert_eq!(robot.camera().get_value().unwrap().shape(), (2, 4, 3));
    }

    #[test]
    fn test_define_collection_at_runtime() {
        let link = MockLink::new();
        link.add_object("Arm", ObjectKind::Shape);
        link.add_object("Arm_j1", ObjectKind::RevoluteJoint);
        link.add_object("Arm_j2", ObjectKind::PrismaticJoint);
        let client = connect(&link);

        let mut arm = CollectionDefinition::new("arm", "Arm");
        arm.joints = NameMapping::Ordinal(vec!["Arm_j1".into(), "Arm_j2".into()]);
        arm.proximity_convention = Some(ProximityConvention::Distance);
        client.scene().define_collection(arm).unwrap();

        let arm = client.scene().collection("arm").unwrap();
        let joints = arm.joints().unwrap();
        assert_eq!(joints.len(), 2);
        assert_eq!(joints[1].kind(), ObjectKind::PrismaticJoint);
        assert_eq!(
            arm.object_name(ComponentGroup::Joints, &1.into()).unwrap(),
            "Arm_j2"
        );

        let bad = CollectionDefinition::new("broken", " ");
        assert!(matches!(
            client.scene().define_collection(bad),
            Err(SceneError::Contract(_))
        ));
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use remote_scene::{LinkOperation, MockLink, ObjectKind, SceneError, SimulationPhase};

    use crate::support::{add_epuck, connect};

    #[test]
    fn test_everything_fails_after_close() {
        let link = MockLink::new();
        add_epuck(&link, "");
        add_epuck(&link, "#0");
        let client = connect(&link);
        client.simulation().resume().unwrap();
        let robot = client.scene().epuck().unwrap();
        let primary = robot.collection().clone();
        primary.instance(1).unwrap();
        let sensor = client
            .scene()
            .proximity_sensors()
            .require("ePuck_proxSensor1")
            .unwrap();

        client.close().unwrap();
        link.clear_calls();

        assert!(matches!(
            client.scene().objects().resolve("ePuck"),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(matches!(
            client.scene().collection("epuck"),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(matches!(
            primary.instance(0),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(matches!(
            primary.instance(1),
            Err(SceneError::ConnectionClosed)
        ));
        let instances: Vec<_> = primary.iter().collect();
        assert_eq!(instances.len(), 1);
        assert!(matches!(instances[0], Err(SceneError::ConnectionClosed)));
        assert!(matches!(sensor.get_value(), Err(SceneError::ConnectionClosed)));
        assert!(matches!(
            robot.left_motor().set_velocity(1.0),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(matches!(
            client.simulation().stop(),
            Err(SceneError::ConnectionClosed)
        ));
        assert!(link.calls().is_empty());
    }

    #[test]
    fn test_close_flushes_then_finishes() {
        let link = MockLink::new();
        let client = connect(&link);
        link.clear_calls();

        client.close().unwrap();
        let operations: Vec<_> = link.calls().iter().map(|c| c.operation()).collect();
        assert_eq!(operations, vec![LinkOperation::Ping, LinkOperation::Finish]);
    }

    #[test]
    fn test_run_guard_round_trip() {
        let link = MockLink::new();
        link.add_object("prox", ObjectKind::ProximitySensor);
        let client = connect(&link);
        let sensor = client.scene().proximity_sensors().require("prox").unwrap();

        {
            let _running = client.simulation().run().unwrap();
            assert_eq!(link.simulation_phase(), SimulationPhase::Running);
            assert!(sensor.get_value().is_ok());
        }
        assert_eq!(link.simulation_phase(), SimulationPhase::Stopped);
        assert!(matches!(
            sensor.get_value(),
            Err(SceneError::SimulationNotRunning)
        ));
    }
}
