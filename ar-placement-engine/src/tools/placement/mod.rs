//! Surface hit-testing and object anchoring pipeline.
//!
//! ## Architecture
//!
//! All state lives in one [`ArContext`](context::ArContext) resource:
//!
//! ```text
//! ArContext
//!   ├─> SessionLifecycle        Idle / NegotiatingSensor / SensorActive
//!   ├─> PlacementModeController armed primitive kind
//!   ├─> PlacementResolver       sensor hit, else camera projection
//!   ├─> AnchorRegistry          ordered PlacedObjects, monotonic ids
//!   └─> DriftCorrector          watch list of surface-anchored objects
//! ```
//!
//! ## Tick Order
//!
//! Systems run in four chained sets so that, within one frame, sensor polling
//! happens before resolution, resolution before registry mutation, and
//! registry mutation before drift correction:
//!
//! - `PlacementSet::Sense`: session events, sensor feed, sensor poll
//! - `PlacementSet::Resolve`: shortcuts and pointer input, then every queued
//!   `PlacementCommand` (mode, place, clear, remove) in arrival order
//! - `PlacementSet::Correct`: drift correction for objects from earlier ticks
//! - `PlacementSet::Present`: preview ring and status publishing
//!
//! Nothing runs until the placement config is applied (`AppState::Running`).
//!
//! ## Anchoring
//!
//! Objects resolved from a surface hit are `SurfaceAnchored` and get a drift
//! watch. Every tick the live visual transform is compared against the
//! recorded anchor; past either the jitter (0.01) or drift (0.05) threshold
//! the visual is hard-reset to the anchor. Camera-estimated objects are
//! `FreeFloating` and never corrected.

/// Application context owning every placement component.
pub mod context;

/// Live-vs-anchor comparison and snap-back.
pub mod drift;

/// Armed primitive kind and mode-switch status.
pub mod mode;

/// Object identity, anchor poses and visual lifetimes.
pub mod registry;

/// Request-to-pose resolution.
pub mod resolver;

/// Advanced session state machine and sensor-derived state.
pub mod session;

/// Status sink trait and the queued log published to the page.
pub mod status;

/// Bevy systems driving the context each frame.
pub mod systems;

use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use crate::engine::scene::indicator::{spawn_placement_indicator, update_placement_indicator};
use crate::engine::sensor::{ActiveSensor, SensorFeedEvent, forward_sensor_feed};

use context::ArContext;
use status::StatusLog;
use systems::{
    ObjectPlacedEvent, ObjectsClearedEvent, PlacementCommandEvent, SessionEvent,
    apply_drift_correction, apply_placement_commands, collect_pointer_input,
    handle_placement_shortcuts, handle_session_events, poll_surface_sensor,
    publish_status_messages,
};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementSet {
    Sense,
    Resolve,
    Correct,
    Present,
}

// Registers the placement context, events, and per-tick systems.
pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArContext>()
            .init_resource::<StatusLog>()
            .init_resource::<ActiveSensor>()
            .add_event::<PlacementCommandEvent>()
            .add_event::<SessionEvent>()
            .add_event::<SensorFeedEvent>()
            .add_event::<ObjectPlacedEvent>()
            .add_event::<ObjectsClearedEvent>()
            .configure_sets(
                Update,
                (
                    PlacementSet::Sense,
                    PlacementSet::Resolve,
                    PlacementSet::Correct,
                    PlacementSet::Present,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(Startup, spawn_placement_indicator)
            .add_systems(
                Update,
                (handle_session_events, forward_sensor_feed, poll_surface_sensor)
                    .chain()
                    .in_set(PlacementSet::Sense),
            )
            .add_systems(
                Update,
                (
                    handle_placement_shortcuts, // Native shortcuts or no-op for WASM
                    collect_pointer_input,
                    apply_placement_commands,
                )
                    .chain()
                    .in_set(PlacementSet::Resolve),
            )
            .add_systems(Update, apply_drift_correction.in_set(PlacementSet::Correct))
            .add_systems(
                Update,
                (update_placement_indicator, publish_status_messages).in_set(PlacementSet::Present),
            );
    }
}
