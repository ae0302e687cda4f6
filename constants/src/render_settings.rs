use bevy::prelude::*;

// Placement preview ring
pub const INDICATOR_OUTER_RADIUS: f32 = 0.15;
pub const INDICATOR_INNER_RADIUS: f32 = 0.1;
pub const INDICATOR_COLOUR: Color = Color::srgba(0.31, 0.76, 0.97, 0.7);

/// Seconds the preview ring stays hidden after a successful placement.
pub const INDICATOR_COOLDOWN_SECS: f32 = 1.0;

pub const CUBE_COLOUR: Color = Color::srgb(0.3, 0.69, 0.31);
pub const SPHERE_COLOUR: Color = Color::srgb(0.13, 0.59, 0.95);
pub const CYLINDER_COLOUR: Color = Color::srgb(1.0, 0.6, 0.0);

pub const STATUS_FONT_SIZE: f32 = 16.0;
