use bevy::prelude::*;
use constants::drift::{DRIFT_THRESHOLD, JITTER_THRESHOLD};

use super::registry::{AnchorMode, ObjectId, PlacedObject};
use crate::engine::pose::Pose;
use crate::engine::scene::{EntityHandle, Scene};

/// Distances beyond which a visual is snapped back to its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftThresholds {
    pub jitter: f32,
    pub drift: f32,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            jitter: JITTER_THRESHOLD,
            drift: DRIFT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionTrigger {
    Jitter,
    Drift,
}

impl DriftThresholds {
    /// Which threshold, if any, a displacement exceeds. The larger breach wins.
    pub fn classify(&self, displacement: f32) -> Option<CorrectionTrigger> {
        if displacement > self.drift {
            Some(CorrectionTrigger::Drift)
        } else if displacement > self.jitter {
            Some(CorrectionTrigger::Jitter)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AnchorWatch {
    id: ObjectId,
    handle: EntityHandle,
    anchor: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub id: ObjectId,
    pub trigger: CorrectionTrigger,
    pub displacement: f32,
}

#[derive(Debug, Default)]
pub struct CorrectionReport {
    pub checked: usize,
    pub corrections: Vec<Correction>,
    /// Watches dropped because their visual no longer exists.
    pub lost: Vec<ObjectId>,
    /// Displaced visuals the scene refused to move back. Still watched.
    pub failed: Vec<ObjectId>,
}

/// Per-object watch list snapping surface-anchored visuals back to their
/// anchors.
///
/// Watches added during a tick are only evaluated from the next tick on.
#[derive(Debug, Default)]
pub struct DriftCorrector {
    thresholds: DriftThresholds,
    active: Vec<AnchorWatch>,
    pending: Vec<AnchorWatch>,
}

impl DriftCorrector {
    pub fn thresholds(&self) -> &DriftThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: DriftThresholds) {
        self.thresholds = thresholds;
    }

    /// Start watching `object`. Free-floating objects are ignored.
    pub fn watch(&mut self, object: &PlacedObject) -> bool {
        if object.anchor_mode() != AnchorMode::SurfaceAnchored {
            return false;
        }
        self.pending.push(AnchorWatch {
            id: object.id(),
            handle: object.handle(),
            anchor: *object.anchor_pose(),
        });
        true
    }

    pub fn unwatch(&mut self, id: ObjectId) {
        self.active.retain(|w| w.id != id);
        self.pending.retain(|w| w.id != id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }

    pub fn is_watching(&self, id: ObjectId) -> bool {
        self.active.iter().chain(&self.pending).any(|w| w.id == id)
    }

    pub fn watched_count(&self) -> usize {
        self.active.len() + self.pending.len()
    }

    /// Check every active watch once, hard-resetting any visual that strayed
    /// past a threshold. No easing.
    pub fn tick(&mut self, scene: &mut dyn Scene) -> CorrectionReport {
        let mut report = CorrectionReport::default();

        for watch in &self.active {
            let live = match scene.get_transform(watch.handle) {
                Ok(live) => live,
                Err(err) => {
                    debug!("Dropping drift watch for {}: {}", watch.id, err);
                    report.lost.push(watch.id);
                    continue;
                }
            };
            report.checked += 1;

            let displacement = live.distance(&watch.anchor);
            let Some(trigger) = self.thresholds.classify(displacement) else {
                continue;
            };

            match scene.set_transform(watch.handle, &watch.anchor) {
                Ok(()) => {
                    debug!(
                        "Snapped {} back to anchor ({:?}, displaced {:.4})",
                        watch.id, trigger, displacement
                    );
                    report.corrections.push(Correction {
                        id: watch.id,
                        trigger,
                        displacement,
                    });
                }
                Err(err) => {
                    warn!("Failed to correct {}: {}", watch.id, err);
                    report.failed.push(watch.id);
                }
            }
        }

        if !report.lost.is_empty() {
            self.active.retain(|w| !report.lost.contains(&w.id));
        }
        self.active.append(&mut self.pending);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pose::ResolvedPose;
    use crate::engine::scene::MemoryScene;
    use crate::tools::placement::mode::PrimitiveKind;
    use crate::tools::placement::registry::{AnchorRegistry, VerticalOffsets};

    fn zero_offsets() -> VerticalOffsets {
        VerticalOffsets {
            cube: 0.0,
            sphere: 0.0,
            cylinder: 0.0,
        }
    }

    /// Surface-anchored cube at the origin, already promoted to active.
    fn anchored_at_origin() -> (MemoryScene, DriftCorrector, PlacedObject) {
        let mut scene = MemoryScene::new();
        let mut registry = AnchorRegistry::with_offsets(zero_offsets());
        let object = registry
            .create(
                PrimitiveKind::Cube,
                &ResolvedPose::precise(Pose::IDENTITY),
                0.0,
                &mut scene,
            )
            .unwrap();
        let mut drift = DriftCorrector::default();
        drift.watch(&object);
        drift.tick(&mut scene);
        (scene, drift, object)
    }

    #[test]
    fn displacement_past_jitter_snaps_back_exactly() {
        let (mut scene, mut drift, object) = anchored_at_origin();
        scene.perturb(object.handle(), Vec3::new(0.0, 0.02, 0.0));

        let report = drift.tick(&mut scene);

        assert_eq!(scene.get_transform(object.handle()).unwrap().position, Vec3::ZERO);
        assert_eq!(report.corrections.len(), 1);
        assert_eq!(report.corrections[0].trigger, CorrectionTrigger::Jitter);
    }

    #[test]
    fn displacement_below_both_thresholds_is_left_alone() {
        let (mut scene, mut drift, object) = anchored_at_origin();
        scene.perturb(object.handle(), Vec3::new(0.0, 0.005, 0.0));

        let report = drift.tick(&mut scene);

        assert_eq!(
            scene.get_transform(object.handle()).unwrap().position,
            Vec3::new(0.0, 0.005, 0.0)
        );
        assert!(report.corrections.is_empty());
        assert_eq!(report.checked, 1);
    }

    #[test]
    fn large_escape_is_tagged_as_drift() {
        let (mut scene, mut drift, object) = anchored_at_origin();
        scene.perturb(object.handle(), Vec3::new(0.3, 0.0, -0.4));

        let report = drift.tick(&mut scene);

        assert_eq!(report.corrections[0].trigger, CorrectionTrigger::Drift);
        assert_eq!(scene.get_transform(object.handle()).unwrap(), Pose::IDENTITY);
    }

    #[test]
    fn new_watch_is_not_checked_in_its_creation_tick() {
        let mut scene = MemoryScene::new();
        let mut registry = AnchorRegistry::with_offsets(zero_offsets());
        let object = registry
            .create(
                PrimitiveKind::Sphere,
                &ResolvedPose::precise(Pose::IDENTITY),
                0.0,
                &mut scene,
            )
            .unwrap();
        let mut drift = DriftCorrector::default();
        drift.watch(&object);
        scene.perturb(object.handle(), Vec3::Y);

        let first = drift.tick(&mut scene);
        assert_eq!(first.checked, 0);

        let second = drift.tick(&mut scene);
        assert_eq!(second.checked, 1);
        assert_eq!(scene.get_transform(object.handle()).unwrap(), Pose::IDENTITY);
    }

    #[test]
    fn free_floating_objects_are_not_watched() {
        let mut scene = MemoryScene::new();
        let mut registry = AnchorRegistry::default();
        let object = registry
            .create(
                PrimitiveKind::Cube,
                &ResolvedPose::estimated(Pose::IDENTITY),
                0.0,
                &mut scene,
            )
            .unwrap();
        let mut drift = DriftCorrector::default();

        assert!(!drift.watch(&object));
        assert_eq!(drift.watched_count(), 0);
    }

    #[test]
    fn watch_is_dropped_when_visual_disappears() {
        let (mut scene, mut drift, object) = anchored_at_origin();
        scene.forget(object.handle());

        let report = drift.tick(&mut scene);

        assert_eq!(report.lost, vec![object.id()]);
        assert!(!drift.is_watching(object.id()));
    }

    #[test]
    fn refused_reset_is_reported_and_retried() {
        let (mut scene, mut drift, object) = anchored_at_origin();
        scene.perturb(object.handle(), Vec3::new(0.0, 0.1, 0.0));
        scene.fail_updates = true;

        let report = drift.tick(&mut scene);
        assert!(report.corrections.is_empty());
        assert_eq!(report.failed, vec![object.id()]);
        assert!(drift.is_watching(object.id()));

        scene.fail_updates = false;
        let report = drift.tick(&mut scene);
        assert_eq!(report.corrections.len(), 1);
        assert!(report.failed.is_empty());
        assert_eq!(scene.get_transform(object.handle()).unwrap(), Pose::IDENTITY);
    }

    #[test]
    fn classify_boundaries_are_exclusive() {
        let thresholds = DriftThresholds::default();
        assert_eq!(thresholds.classify(0.01), None);
        assert_eq!(thresholds.classify(0.05), Some(CorrectionTrigger::Jitter));
        assert_eq!(thresholds.classify(0.0500001), Some(CorrectionTrigger::Drift));
    }
}
