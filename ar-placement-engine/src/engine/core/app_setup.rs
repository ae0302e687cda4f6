use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::assets::placement_config::PlacementConfig;
use crate::engine::camera::viewer_camera::{
    LookController, ViewerPose, camera_controller, spawn_viewer_camera, track_viewer_pose,
};
use crate::engine::core::app_state::AppState;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{ConfigLoader, apply_loaded_config, start_loading};
use crate::engine::scene::bevy_scene::setup_primitive_assets;
use crate::engine::scene::status_overlay::spawn_status_overlay;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::placement::PlacementPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers PlacementConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<PlacementConfig>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(PlacementPlugin);

    app.init_resource::<ConfigLoader>()
        .init_resource::<ViewerPose>()
        .init_resource::<LookController>();

    app.add_systems(
        Startup,
        (
            setup_primitive_assets,
            spawn_viewer_camera,
            spawn_status_overlay,
            start_loading,
        ),
    )
    .add_systems(
        Update,
        apply_loaded_config.run_if(in_state(AppState::Loading)),
    )
    .add_systems(
        Update,
        (camera_controller, track_viewer_pose)
            .chain()
            .before(crate::tools::placement::PlacementSet::Sense),
    );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
