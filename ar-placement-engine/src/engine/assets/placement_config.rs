use bevy::prelude::*;
use constants::drift::{DRIFT_THRESHOLD, JITTER_THRESHOLD};
use constants::placement::{FALLBACK_EYE_HEIGHT_BIAS, FALLBACK_STANDOFF_DISTANCE, PRIMITIVE_SIZE};
use constants::render_settings::INDICATOR_COOLDOWN_SECS;
use serde::Deserialize;

use crate::engine::sensor::SensorKind;
use crate::tools::placement::registry::VerticalOffsets;

/// Runtime tuning for the placement pipeline.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize, Asset, TypePath)]
#[serde(default)]
pub struct PlacementConfig {
    pub standoff_distance: f32,
    pub eye_height_bias: f32,
    pub jitter_threshold: f32,
    pub drift_threshold: f32,
    pub vertical_offsets: VerticalOffsets,
    pub primitive_size: f32,
    pub indicator_cooldown_secs: f32,
    pub sensor: SensorKind,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            standoff_distance: FALLBACK_STANDOFF_DISTANCE,
            eye_height_bias: FALLBACK_EYE_HEIGHT_BIAS,
            jitter_threshold: JITTER_THRESHOLD,
            drift_threshold: DRIFT_THRESHOLD,
            vertical_offsets: VerticalOffsets::default(),
            primitive_size: PRIMITIVE_SIZE,
            indicator_cooldown_secs: INDICATOR_COOLDOWN_SECS,
            sensor: SensorKind::Auto,
        }
    }
}
