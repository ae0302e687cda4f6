//! Surface Sensor capability.
//!
//! A sensor negotiates once per advanced session and then answers at most one
//! hit query per tick with its best guess, or nothing. Negotiation is
//! asynchronous on real hardware, so the session polls
//! [`SurfaceSensor::negotiation_status`] each tick instead of blocking.

/// Ray-vs-ground-plane sensor for desktop builds without XR hardware.
pub mod ground_plane;

/// Sensor fed hit results by the hosting page (WebXR hit-test).
pub mod remote;

use bevy::prelude::*;
use serde::Deserialize;

use crate::engine::pose::{CameraPose, Pose};

pub use ground_plane::GroundPlaneSensor;
pub use remote::RemoteSensor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationStatus {
    /// No negotiation requested, or still waiting on the platform.
    Pending,
    Ready,
    Failed(String),
}

/// Data pushed into a sensor from outside the tick loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorFeed {
    Negotiated(Result<(), String>),
    Hit(Option<Pose>),
}

pub trait SurfaceSensor: Send + Sync + 'static {
    /// Request reference frames and a hit-test handle from the platform.
    fn begin_negotiation(&mut self);

    fn negotiation_status(&mut self) -> NegotiationStatus;

    /// Best hit for this tick, if any. Called at most once per tick.
    fn poll_hit(&mut self, viewer: Option<&CameraPose>) -> Option<Pose>;

    fn ingest(&mut self, _feed: &SensorFeed) {}

    /// Release platform handles after the session ends.
    fn shutdown(&mut self) {}
}

/// Which sensor implementation to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Remote on wasm32, ground plane elsewhere.
    #[default]
    Auto,
    GroundPlane,
    Remote,
}

impl SensorKind {
    pub fn build(self) -> Box<dyn SurfaceSensor> {
        match self {
            Self::GroundPlane => Box::new(GroundPlaneSensor::default()),
            Self::Remote => Box::new(RemoteSensor::default()),
            Self::Auto => {
                if cfg!(target_arch = "wasm32") {
                    Box::new(RemoteSensor::default())
                } else {
                    Box::new(GroundPlaneSensor::default())
                }
            }
        }
    }
}

/// The installed sensor.
#[derive(Resource)]
pub struct ActiveSensor(pub Box<dyn SurfaceSensor>);

impl Default for ActiveSensor {
    fn default() -> Self {
        Self(SensorKind::Auto.build())
    }
}

/// Sensor data arriving from the page, applied before polling.
#[derive(Event, Debug, Clone)]
pub struct SensorFeedEvent(pub SensorFeed);

pub fn forward_sensor_feed(
    mut events: EventReader<SensorFeedEvent>,
    mut sensor: ResMut<ActiveSensor>,
) {
    for event in events.read() {
        sensor.0.ingest(&event.0);
    }
}
