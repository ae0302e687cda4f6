//! Asset loading that gates the transition into `AppState::Running`.

/// Loads `placement_config.json` and applies it to the placement context.
pub mod config_loader;
