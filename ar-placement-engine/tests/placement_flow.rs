//! End-to-end placement flows driven through `ArContext` with an in-memory
//! scene and a page-fed sensor.

use ar_placement_engine::engine::pose::{CameraPose, Pose};
use ar_placement_engine::engine::scene::{MemoryScene, Scene};
use ar_placement_engine::engine::sensor::{RemoteSensor, SensorFeed, SurfaceSensor};
use ar_placement_engine::tools::placement::context::ArContext;
use ar_placement_engine::tools::placement::drift::CorrectionTrigger;
use ar_placement_engine::tools::placement::mode::PrimitiveKind;
use ar_placement_engine::tools::placement::registry::{AnchorMode, PlacedObject};
use ar_placement_engine::tools::placement::resolver::PlacementInput;
use ar_placement_engine::tools::placement::session::SessionState;
use bevy::math::{Vec2, Vec3};

const DT: f32 = 1.0 / 60.0;

struct Harness {
    context: ArContext,
    scene: MemoryScene,
    sensor: RemoteSensor,
    status: Vec<String>,
    camera: Option<CameraPose>,
}

impl Harness {
    fn new() -> Self {
        Self {
            context: ArContext::default(),
            scene: MemoryScene::new(),
            sensor: RemoteSensor::default(),
            status: Vec::new(),
            camera: Some(CameraPose::new(Vec3::ZERO, 0.0, 0.0)),
        }
    }

    fn frame(&mut self) {
        self.context.begin_frame(
            &mut self.sensor,
            self.camera.as_ref(),
            DT,
            &mut self.status,
        );
    }

    fn tap(&mut self, timestamp: f64) -> Option<PlacedObject> {
        let input = PlacementInput {
            screen_position: Vec2::new(200.0, 300.0),
            timestamp,
        };
        self.context
            .request_placement(input, self.camera, &mut self.scene, &mut self.status)
    }

    fn activate_session(&mut self) {
        self.context
            .start_advanced_session(&mut self.sensor, &mut self.status);
        self.sensor.ingest(&SensorFeed::Negotiated(Ok(())));
        self.frame();
        assert_eq!(self.context.session.state(), SessionState::SensorActive);
    }

    fn last_status(&self) -> Option<&str> {
        self.status.last().map(String::as_str)
    }
}

#[test]
fn sphere_without_sensor_floats_in_front_of_camera() {
    let mut h = Harness::new();
    h.context.select_mode(PrimitiveKind::Sphere, &mut h.status);
    assert_eq!(h.last_status(), Some("Mode: Sphere"));

    h.frame();
    let object = h.tap(1.0).unwrap();

    let position = object.anchor_pose().position;
    assert!((position.x - 0.0).abs() < 1e-5);
    assert!((position.y - -0.35).abs() < 1e-5);
    assert!((position.z - -2.0).abs() < 1e-5);
    assert_eq!(object.anchor_mode(), AnchorMode::FreeFloating);
    assert_eq!(object.kind(), PrimitiveKind::Sphere);
    assert_eq!(h.last_status(), Some("Sphere placed! Objects: 1"));
    assert!(!h.context.drift.is_watching(object.id()));
}

#[test]
fn surface_hit_anchors_and_snaps_back() {
    let mut h = Harness::new();
    h.activate_session();
    assert!(h.status.iter().any(|s| s == "Advanced AR session starting"));
    assert_eq!(h.last_status(), Some("Advanced AR active! Point at a surface"));

    h.sensor.ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::new(
        1.0, 0.0, -1.0,
    )))));
    h.frame();
    assert!(h.context.session.indicator_pose().is_some());

    let object = h.tap(2.0).unwrap();
    assert_eq!(object.anchor_mode(), AnchorMode::SurfaceAnchored);
    assert_eq!(object.anchor_pose().position, Vec3::new(1.0, 0.15, -1.0));
    assert_eq!(h.last_status(), Some("Cube anchored to surface! Objects: 1"));
    // Preview ring hides right after placing.
    assert!(h.context.session.indicator_pose().is_none());

    // Creation tick: nothing evaluated yet.
    h.scene.perturb(object.handle(), Vec3::new(0.02, 0.0, 0.0));
    let report = h.context.correct_drift(&mut h.scene, &mut h.status);
    assert_eq!(report.checked, 0);

    let report = h.context.correct_drift(&mut h.scene, &mut h.status);
    assert_eq!(report.corrections.len(), 1);
    assert_eq!(report.corrections[0].trigger, CorrectionTrigger::Jitter);
    assert_eq!(
        h.scene.get_transform(object.handle()).unwrap().position,
        object.anchor_pose().position
    );

    h.scene.perturb(object.handle(), Vec3::new(0.0, 0.1, 0.0));
    let report = h.context.correct_drift(&mut h.scene, &mut h.status);
    assert_eq!(report.corrections[0].trigger, CorrectionTrigger::Drift);

    // Inside both thresholds: left alone.
    h.scene.perturb(object.handle(), Vec3::new(0.005, 0.0, 0.0));
    let report = h.context.correct_drift(&mut h.scene, &mut h.status);
    assert!(report.corrections.is_empty());
}

#[test]
fn ending_session_falls_back_even_with_stale_hit() {
    let mut h = Harness::new();
    h.activate_session();
    h.sensor.ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::new(
        3.0, 0.0, -3.0,
    )))));
    h.frame();

    h.context.end_session(&mut h.sensor, &mut h.status);
    assert_eq!(h.last_status(), Some("Advanced AR session ended"));
    assert!(!h.context.session.is_active());
    assert!(h.context.session.sensor_hit().is_none());
    assert!(h.context.session.indicator_pose().is_none());

    // Same tick, no new frame: must not reuse the old hit.
    let object = h.tap(3.0).unwrap();
    assert_eq!(object.anchor_mode(), AnchorMode::FreeFloating);
    assert!((object.anchor_pose().position.z - -2.0).abs() < 1e-5);
}

#[test]
fn failed_negotiation_keeps_fallback_placement() {
    let mut h = Harness::new();
    h.context
        .start_advanced_session(&mut h.sensor, &mut h.status);
    h.sensor
        .ingest(&SensorFeed::Negotiated(Err("hit-test unsupported".into())));
    h.frame();

    assert_eq!(h.context.session.state(), SessionState::Idle);
    assert_eq!(
        h.last_status(),
        Some("Advanced AR unavailable, using fallback placement")
    );

    let object = h.tap(1.0).unwrap();
    assert_eq!(object.anchor_mode(), AnchorMode::FreeFloating);
}

#[test]
fn no_hit_and_no_camera_places_nothing_silently() {
    let mut h = Harness::new();
    h.camera = None;
    h.frame();
    let before = h.status.len();

    assert!(h.tap(1.0).is_none());
    assert!(h.context.registry.is_empty());
    assert!(h.scene.is_empty());
    assert_eq!(h.status.len(), before);
}

#[test]
fn scene_refusal_reports_and_keeps_id_unused() {
    let mut h = Harness::new();
    h.scene.fail_creates = true;
    assert!(h.tap(1.0).is_none());
    assert_eq!(h.last_status(), Some("Object placement failed"));
    assert!(h.context.registry.is_empty());

    h.scene.fail_creates = false;
    let object = h.tap(2.0).unwrap();
    assert_eq!(object.id().raw(), 0);
}

#[test]
fn clear_empties_everything_and_ids_keep_growing() {
    let mut h = Harness::new();
    h.activate_session();
    h.sensor
        .ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::ZERO))));
    h.frame();

    let first = h.tap(1.0).unwrap();
    let second = h.tap(1.5).unwrap();
    assert_eq!(h.context.drift.watched_count(), 2);

    h.scene.fail_destroys = true;
    h.context.clear_objects(&mut h.scene, &mut h.status);
    assert!(h.context.registry.is_empty());
    assert_eq!(h.context.drift.watched_count(), 0);
    assert!(h.last_status().unwrap().starts_with("All objects removed"));

    h.scene.fail_destroys = false;
    h.context.clear_objects(&mut h.scene, &mut h.status);
    assert_eq!(h.last_status(), Some("All objects removed"));

    let third = h.tap(2.0).unwrap();
    assert!(first.id() < second.id());
    assert!(second.id() < third.id());
    assert_eq!(h.context.registry.len(), 1);
}

#[test]
fn removing_one_object_keeps_the_rest() {
    let mut h = Harness::new();
    let first = h.tap(1.0).unwrap();
    h.context.select_mode(PrimitiveKind::Cylinder, &mut h.status);
    let second = h.tap(2.0).unwrap();

    assert!(h
        .context
        .remove_object(first.id(), &mut h.scene, &mut h.status));
    assert_eq!(h.last_status(), Some("Cube removed. Objects: 1"));
    assert!(!h.scene.contains(first.handle()));
    assert_eq!(h.scene.kind_of(second.handle()), Some(PrimitiveKind::Cylinder));

    let summary = h.context.registry.summary();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.cylinder, 1);
    assert_eq!(h.context.registry.list()[0].id(), second.id());

    assert!(!h
        .context
        .remove_object(first.id(), &mut h.scene, &mut h.status));
}

#[test]
fn unknown_mode_name_is_rejected() {
    let mut h = Harness::new();
    let err = h
        .context
        .select_mode_by_name("pyramid", &mut h.status)
        .unwrap_err();
    assert!(err.to_string().contains("pyramid"));
    assert_eq!(h.context.mode.current_mode(), PrimitiveKind::Cube);
    assert!(h.status.is_empty());

    assert_eq!(
        h.context
            .select_mode_by_name("CYLINDER", &mut h.status)
            .unwrap(),
        PrimitiveKind::Cylinder
    );
}

#[test]
fn refused_snap_back_is_reported_per_object() {
    let mut h = Harness::new();
    h.activate_session();
    h.sensor
        .ingest(&SensorFeed::Hit(Some(Pose::from_translation(Vec3::ZERO))));
    h.frame();

    let object = h.tap(1.0).unwrap();
    h.context.correct_drift(&mut h.scene, &mut h.status);

    h.scene.perturb(object.handle(), Vec3::new(0.0, 0.2, 0.0));
    h.scene.fail_updates = true;
    let report = h.context.correct_drift(&mut h.scene, &mut h.status);

    assert_eq!(report.failed, vec![object.id()]);
    assert_eq!(
        h.last_status(),
        Some(format!("Could not restore {} to its anchor", object.id()).as_str())
    );
    assert!(h.context.drift.is_watching(object.id()));
}
