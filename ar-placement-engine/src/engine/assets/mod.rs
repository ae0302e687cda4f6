/// Placement tuning loaded from JSON.
///
/// Every field falls back to the `constants` crate default when absent.
pub mod placement_config;
