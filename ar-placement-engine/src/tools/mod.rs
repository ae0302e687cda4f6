//! Interactive tools driven by pointer, keyboard and page input.
//!
//! ## Placement Tool
//!
//! The only tool: tap or click to drop the armed primitive into the scene.
//!
//! ### Input Flow
//!
//! ```text
//! Mouse/Touch/RPC "place"
//!   └─> PlacementCommand::Place
//!       └─> apply_placement_commands()
//!           ├─> SessionLifecycle::build_request()  (strategy + sensor hit)
//!           ├─> PlacementResolver::resolve()
//!           ├─> AnchorRegistry::create()           (scene entity + id)
//!           ├─> DriftCorrector::watch()            (surface hits only)
//!           └─> status + object_placed notification
//! ```
//!
//! ### Controls
//!
//! | Action            | Native          | WASM (RPC)                 |
//! |-------------------|-----------------|----------------------------|
//! | Arm cube          | `1`             | `set_mode {"mode":"cube"}` |
//! | Arm sphere        | `2`             | `set_mode {"mode":"sphere"}` |
//! | Arm cylinder      | `3`             | `set_mode {"mode":"cylinder"}` |
//! | Place             | left click      | tap, or `place {x, y}`     |
//! | Clear all         | `C`             | `clear_objects`            |
//! | Start session     | `X`             | `start_advanced_session`   |
//! | End session       | `Z`             | `session_ended`            |
//!
//! In WASM builds all keyboard shortcuts are disabled; the page owns the UI.

/// Surface anchoring pipeline: resolver, registry, drift, modes, session.
pub mod placement;
