use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::PLACEMENT_CONFIG_PATH;

use crate::engine::assets::placement_config::PlacementConfig;
use crate::engine::core::app_state::AppState;
use crate::engine::scene::PrimitiveAssets;
use crate::engine::sensor::ActiveSensor;
use crate::tools::placement::context::ArContext;
use crate::tools::placement::status::{StatusLog, StatusSink};

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<PlacementConfig>>,
}

// Start the loading process
pub fn start_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    info!("Loading placement config from: {}", PLACEMENT_CONFIG_PATH);
    loader.handle = Some(asset_server.load(PLACEMENT_CONFIG_PATH));
}

/// Apply the config once loaded (or defaults if loading failed) and move to
/// Running.
pub fn apply_loaded_config(
    loader: Res<ConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<PlacementConfig>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut context: ResMut<ArContext>,
    mut status: ResMut<StatusLog>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    let config = if let Some(config) = configs.get(handle) {
        info!("✓ Placement config loaded");
        config.clone()
    } else if matches!(asset_server.get_load_state(handle), Some(LoadState::Failed(_))) {
        warn!("Placement config failed to load, using defaults");
        PlacementConfig::default()
    } else {
        return;
    };

    context.configure(&config);
    commands.insert_resource(PrimitiveAssets::build(
        config.primitive_size,
        &mut meshes,
        &mut materials,
    ));
    commands.insert_resource(ActiveSensor(config.sensor.build()));
    commands.insert_resource(config);

    status.report("AR ready! Point the camera at a surface");
    let armed = context.mode.current_mode();
    context.select_mode(armed, &mut *status);

    info!("→ Transitioning to Running state");
    next_state.set(AppState::Running);
}
