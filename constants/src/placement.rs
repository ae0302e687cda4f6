/// Distance in front of the camera used when no surface hit is available.
pub const FALLBACK_STANDOFF_DISTANCE: f32 = 2.0;

/// Downward bias applied to the fallback point to approximate eye-to-ground offset.
pub const FALLBACK_EYE_HEIGHT_BIAS: f32 = 0.5;

/// Vertical offsets lifting each primitive so its base, not its centre,
/// rests on the resolved surface point.
pub const CUBE_VERTICAL_OFFSET: f32 = 0.15;
pub const SPHERE_VERTICAL_OFFSET: f32 = 0.15;
pub const CYLINDER_VERTICAL_OFFSET: f32 = 0.18;

/// Edge length of the default primitive.
pub const PRIMITIVE_SIZE: f32 = 0.3;

/// Sphere radius and cylinder proportions relative to `PRIMITIVE_SIZE`.
pub const SPHERE_RADIUS_FACTOR: f32 = 0.5;
pub const CYLINDER_RADIUS_FACTOR: f32 = 0.4;
pub const CYLINDER_HEIGHT_FACTOR: f32 = 1.2;
