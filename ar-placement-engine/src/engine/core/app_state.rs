use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting on the placement config. Placement input is dropped.
    #[default]
    Loading,
    Running,
}
