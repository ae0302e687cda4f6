/// Tight short-horizon threshold suppressing small continuous noise.
pub const JITTER_THRESHOLD: f32 = 0.01;

/// Looser threshold catching larger positional escape.
pub const DRIFT_THRESHOLD: f32 = 0.05;
