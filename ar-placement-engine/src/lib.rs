//! Surface hit-testing and object anchoring for a browser AR placement demo.
//!
//! The crate is split the same way the engine runs:
//!
//! - [`engine`] carries the plumbing every tool shares: pose math, the Scene
//!   and Surface Sensor capabilities, camera tracking, config loading and app
//!   setup.
//! - [`tools::placement`] is the placement pipeline itself: resolving where a
//!   request lands, recording anchored objects, and snapping them back when
//!   their visuals drift.
//! - [`rpc`] bridges the hosting web page over JSON-RPC 2.0 (postMessage).
//!
//! ## Tick Order
//!
//! ```text
//! SurfaceSensor::poll_hit
//!   └─> PlacementResolver::resolve
//!       └─> AnchorRegistry::create
//!           └─> DriftCorrector::tick (objects from earlier ticks only)
//! ```

pub mod engine;
pub mod error;
pub mod rpc;
pub mod tools;

pub use engine::core::app_setup::create_app;
pub use error::{PlacementError, PlacementResult};
