use bevy::prelude::*;

use super::resolver::{PlacementInput, PlacementRequest, ResolutionStrategy};
use crate::engine::pose::{CameraPose, Pose};
use crate::engine::sensor::{NegotiationStatus, SurfaceSensor};
use crate::error::{PlacementError, PlacementResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    NegotiatingSensor,
    SensorActive,
}

/// Whether precise hit-testing can be used. Only the session writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorAvailability {
    Unavailable,
    Available,
}

/// Outcome of polling an in-flight negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationProgress {
    /// Not negotiating, or the platform has not answered yet.
    Waiting,
    Activated,
}

/// Moves between fallback estimation and precise hit-testing and owns the
/// sensor-derived state the resolver reads.
#[derive(Debug)]
pub struct SessionLifecycle {
    state: SessionState,
    availability: SensorAvailability,
    last_hit: Option<Pose>,
    indicator_cooldown: f32,
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            availability: SensorAvailability::Unavailable,
            last_hit: None,
            indicator_cooldown: 0.0,
        }
    }
}

impl SessionLifecycle {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn availability(&self) -> SensorAvailability {
        self.availability
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::SensorActive
    }

    fn reject(&self, event: &'static str) -> PlacementError {
        PlacementError::InvalidSessionTransition {
            from: self.state,
            event,
        }
    }

    /// Idle -> NegotiatingSensor.
    pub fn start(&mut self, sensor: &mut dyn SurfaceSensor) -> PlacementResult<()> {
        if self.state != SessionState::Idle {
            return Err(self.reject("start"));
        }
        self.state = SessionState::NegotiatingSensor;
        sensor.begin_negotiation();
        info!("Session: Idle -> NegotiatingSensor");
        Ok(())
    }

    /// NegotiatingSensor -> SensorActive.
    pub fn negotiation_succeeded(&mut self) -> PlacementResult<()> {
        if self.state != SessionState::NegotiatingSensor {
            return Err(self.reject("negotiation succeeded"));
        }
        self.state = SessionState::SensorActive;
        self.availability = SensorAvailability::Available;
        info!("Session: NegotiatingSensor -> SensorActive");
        Ok(())
    }

    /// NegotiatingSensor -> Idle. Availability stays Unavailable.
    pub fn negotiation_failed(&mut self) -> PlacementResult<()> {
        if self.state != SessionState::NegotiatingSensor {
            return Err(self.reject("negotiation failed"));
        }
        self.state = SessionState::Idle;
        info!("Session: NegotiatingSensor -> Idle");
        Ok(())
    }

    /// Drive an in-flight negotiation from the sensor's current status.
    ///
    /// A failure returns `SensorNegotiationFailure` after moving back to Idle.
    pub fn poll_negotiation(
        &mut self,
        sensor: &mut dyn SurfaceSensor,
    ) -> PlacementResult<NegotiationProgress> {
        if self.state != SessionState::NegotiatingSensor {
            return Ok(NegotiationProgress::Waiting);
        }
        match sensor.negotiation_status() {
            NegotiationStatus::Pending => Ok(NegotiationProgress::Waiting),
            NegotiationStatus::Ready => {
                self.negotiation_succeeded()?;
                Ok(NegotiationProgress::Activated)
            }
            NegotiationStatus::Failed(reason) => {
                self.negotiation_failed()?;
                Err(PlacementError::SensorNegotiationFailure(reason))
            }
        }
    }

    /// SensorActive -> Idle. Clears every piece of sensor-derived state before
    /// returning, so the next request resolves against the camera.
    pub fn end(&mut self, sensor: &mut dyn SurfaceSensor) -> PlacementResult<()> {
        if self.state != SessionState::SensorActive {
            return Err(self.reject("end"));
        }
        self.state = SessionState::Idle;
        self.availability = SensorAvailability::Unavailable;
        self.last_hit = None;
        self.indicator_cooldown = 0.0;
        sensor.shutdown();
        info!("Session: SensorActive -> Idle");
        Ok(())
    }

    /// Per-tick sensor poll. Only queries the sensor while SensorActive.
    pub fn poll_sensor(
        &mut self,
        sensor: &mut dyn SurfaceSensor,
        viewer: Option<&CameraPose>,
        dt: f32,
    ) {
        self.indicator_cooldown = (self.indicator_cooldown - dt).max(0.0);
        if self.state != SessionState::SensorActive {
            return;
        }
        self.last_hit = sensor.poll_hit(viewer);
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        match self.availability {
            SensorAvailability::Available => ResolutionStrategy::SurfaceHit,
            SensorAvailability::Unavailable => ResolutionStrategy::CameraProjection,
        }
    }

    /// Latest hit, only while the sensor is available.
    pub fn sensor_hit(&self) -> Option<Pose> {
        match self.availability {
            SensorAvailability::Available => self.last_hit,
            SensorAvailability::Unavailable => None,
        }
    }

    pub fn build_request(
        &self,
        input: PlacementInput,
        camera: Option<CameraPose>,
    ) -> PlacementRequest {
        PlacementRequest {
            input,
            strategy: self.strategy(),
            sensor_hit: self.sensor_hit(),
            camera,
        }
    }

    /// Hide the preview ring for `secs` after a placement.
    pub fn suppress_indicator(&mut self, secs: f32) {
        self.indicator_cooldown = secs.max(0.0);
    }

    /// Where the preview ring should be drawn, if anywhere.
    pub fn indicator_pose(&self) -> Option<Pose> {
        if self.indicator_cooldown > 0.0 {
            return None;
        }
        self.sensor_hit()
    }
}
