use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::assets::resource_manifest::ResourceManifest;
use crate::engine::channel::event_channel::EventChannel;
use crate::engine::core::app_state::{
    AppState, SceneInteraction, enable_scene_interaction, subscribe_scene_handoff,
    transition_to_running,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::resource_loader::ResourceLoaderPlugin;
use crate::engine::presentation::overlay::LoadingScreenPlugin;
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    // One channel shared by the loader, the loading screen and the RPC bridge.
    let channel = EventChannel::new();
    let handoff = subscribe_scene_handoff(&channel);

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .insert_resource(channel)
        .insert_resource(handoff)
        .init_resource::<SceneInteraction>()
        // Registers ResourceManifest as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ResourceManifest>::new(&["json"]))
        .add_plugins(ResourceLoaderPlugin::default())
        .add_plugins(LoadingScreenPlugin::default())
        .add_plugins(WebRpcPlugin);

    app.add_systems(Startup, setup)
        .add_systems(
            Update,
            transition_to_running.run_if(in_state(AppState::AssetsLoaded)),
        )
        .add_systems(
            Update,
            enable_scene_interaction.run_if(in_state(AppState::Running)),
        );

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-2.5, 4.5, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
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
