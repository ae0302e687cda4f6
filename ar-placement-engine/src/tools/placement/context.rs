use bevy::prelude::*;
use constants::render_settings::INDICATOR_COOLDOWN_SECS;

use super::drift::{CorrectionReport, DriftCorrector, DriftThresholds};
use super::mode::{PlacementModeController, PrimitiveKind};
use super::registry::{AnchorMode, AnchorRegistry, ObjectId, PlacedObject};
use super::resolver::{PlacementInput, PlacementResolver};
use super::session::{NegotiationProgress, SessionLifecycle};
use super::status::StatusSink;
use crate::engine::assets::placement_config::PlacementConfig;
use crate::engine::pose::CameraPose;
use crate::engine::scene::Scene;
use crate::engine::sensor::SurfaceSensor;
use crate::error::{PlacementError, PlacementResult};

/// Application context: the single owner of all placement state.
///
/// Boundary layers (Bevy systems, RPC handlers, tests) call into it in tick
/// order: [`begin_frame`](Self::begin_frame), then any number of
/// [`request_placement`](Self::request_placement) /
/// [`clear_objects`](Self::clear_objects), then
/// [`correct_drift`](Self::correct_drift).
///
/// Every failure is turned into a status report here; nothing escapes.
#[derive(Resource, Debug)]
pub struct ArContext {
    pub registry: AnchorRegistry,
    pub session: SessionLifecycle,
    pub mode: PlacementModeController,
    pub drift: DriftCorrector,
    pub resolver: PlacementResolver,
    indicator_cooldown: f32,
}

impl Default for ArContext {
    fn default() -> Self {
        Self {
            registry: AnchorRegistry::default(),
            session: SessionLifecycle::default(),
            mode: PlacementModeController::default(),
            drift: DriftCorrector::default(),
            resolver: PlacementResolver::default(),
            indicator_cooldown: INDICATOR_COOLDOWN_SECS,
        }
    }
}

impl ArContext {
    /// Apply tuning values. Existing objects keep the anchors they were
    /// created with.
    pub fn configure(&mut self, config: &PlacementConfig) {
        self.resolver = PlacementResolver {
            standoff_distance: config.standoff_distance,
            eye_height_bias: config.eye_height_bias,
        };
        self.registry.set_offsets(config.vertical_offsets);
        self.drift.set_thresholds(DriftThresholds {
            jitter: config.jitter_threshold,
            drift: config.drift_threshold,
        });
        self.indicator_cooldown = config.indicator_cooldown_secs;
    }

    pub fn select_mode(&mut self, kind: PrimitiveKind, status: &mut dyn StatusSink) {
        self.mode.set_mode(kind, status);
    }

    pub fn select_mode_by_name(
        &mut self,
        name: &str,
        status: &mut dyn StatusSink,
    ) -> PlacementResult<PrimitiveKind> {
        self.mode.set_mode_by_name(name, status).inspect_err(|err| {
            warn!("{}", err);
        })
    }

    /// Start of tick: advance any negotiation, then poll the sensor.
    pub fn begin_frame(
        &mut self,
        sensor: &mut dyn SurfaceSensor,
        viewer: Option<&CameraPose>,
        dt: f32,
        status: &mut dyn StatusSink,
    ) {
        match self.session.poll_negotiation(sensor) {
            Ok(NegotiationProgress::Activated) => {
                status.report("Advanced AR active! Point at a surface");
            }
            Ok(NegotiationProgress::Waiting) => {}
            Err(err) => {
                warn!("{}", err);
                status.report("Advanced AR unavailable, using fallback placement");
            }
        }
        self.session.poll_sensor(sensor, viewer, dt);
    }

    /// Resolve and place one object of the armed kind.
    ///
    /// Returns `None` when nothing was placed; either there was nothing to
    /// resolve against (silently ignored) or the scene refused the entity
    /// (reported).
    pub fn request_placement(
        &mut self,
        input: PlacementInput,
        camera: Option<CameraPose>,
        scene: &mut dyn Scene,
        status: &mut dyn StatusSink,
    ) -> Option<PlacedObject> {
        let request = self.session.build_request(input, camera);
        let Some(resolved) = self.resolver.resolve(&request) else {
            debug!("Ignoring placement request: {}", PlacementError::UnresolvablePlacement);
            return None;
        };

        let kind = self.mode.current_mode();
        match self.registry.create(kind, &resolved, input.timestamp, scene) {
            Ok(object) => {
                self.drift.watch(&object);
                let message = match object.anchor_mode() {
                    AnchorMode::SurfaceAnchored => format!(
                        "{} anchored to surface! Objects: {}",
                        kind.display_name(),
                        self.registry.len()
                    ),
                    AnchorMode::FreeFloating => format!(
                        "{} placed! Objects: {}",
                        kind.display_name(),
                        self.registry.len()
                    ),
                };
                status.report(&message);
                self.session.suppress_indicator(self.indicator_cooldown);
                Some(object)
            }
            Err(err) => {
                error!("Object placement failed: {}", err);
                status.report("Object placement failed");
                None
            }
        }
    }

    pub fn remove_object(
        &mut self,
        id: ObjectId,
        scene: &mut dyn Scene,
        status: &mut dyn StatusSink,
    ) -> bool {
        match self.registry.remove(id, scene) {
            Ok(Some(object)) => {
                self.drift.unwatch(object.id());
                status.report(&format!(
                    "{} removed. Objects: {}",
                    object.kind().display_name(),
                    self.registry.len()
                ));
                true
            }
            Ok(None) => false,
            Err(err) => {
                error!("Failed to remove {}: {}", id, err);
                status.report("Object removal failed");
                false
            }
        }
    }

    pub fn clear_objects(&mut self, scene: &mut dyn Scene, status: &mut dyn StatusSink) {
        self.drift.clear();
        let outcome = self.registry.clear(scene);
        info!(
            "Cleared {} objects ({} destroy failures)",
            outcome.removed,
            outcome.failures.len()
        );
        if outcome.failures.is_empty() {
            status.report("All objects removed");
        } else {
            status.report(&format!(
                "All objects removed ({} visuals could not be destroyed)",
                outcome.failures.len()
            ));
        }
    }

    pub fn start_advanced_session(
        &mut self,
        sensor: &mut dyn SurfaceSensor,
        status: &mut dyn StatusSink,
    ) {
        match self.session.start(sensor) {
            Ok(()) => status.report("Advanced AR session starting"),
            Err(err) => warn!("{}", err),
        }
    }

    pub fn end_session(&mut self, sensor: &mut dyn SurfaceSensor, status: &mut dyn StatusSink) {
        match self.session.end(sensor) {
            Ok(()) => status.report("Advanced AR session ended"),
            Err(err) => warn!("{}", err),
        }
    }

    /// End of tick: snap drifting visuals from earlier ticks back.
    pub fn correct_drift(
        &mut self,
        scene: &mut dyn Scene,
        status: &mut dyn StatusSink,
    ) -> CorrectionReport {
        let report = self.drift.tick(scene);
        for id in &report.failed {
            status.report(&format!("Could not restore {} to its anchor", id));
        }
        report
    }
}
