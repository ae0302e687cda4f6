//! Default tuning values shared by the placement engine.
//!
//! Every value here can be overridden at runtime through
//! `assets/placement_config.json`; these are the fallbacks used when a field
//! is missing or the config fails to load.

pub mod drift;
pub mod path;
pub mod placement;
pub mod render_settings;
