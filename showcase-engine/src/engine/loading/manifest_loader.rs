use crate::engine::assets::resource_manifest::ResourceManifest;
use crate::engine::channel::event_channel::EventChannel;
use crate::engine::channel::payloads::LoadFailed;
use crate::engine::loading::error::LoadError;
use crate::engine::loading::resource_loader::{LoaderStatus, RequestedHandle, ResourceLoader};
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::{MANIFEST_FILE_NAME, RELATIVE_MANIFEST_PATH};

/// Where the resource manifest comes from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// JSON asset path relative to the asset root.
    Asset(String),
    /// Manifest built in code.
    Inline(ResourceManifest),
}

impl ManifestSource {
    pub fn default_path() -> String {
        format!("{}/{}", RELATIVE_MANIFEST_PATH, MANIFEST_FILE_NAME)
    }

    /// Name reported in `loadFailed` when the manifest itself cannot load.
    fn label(&self) -> String {
        match self {
            Self::Asset(path) => path.clone(),
            Self::Inline(_) => "manifest".to_string(),
        }
    }
}

#[derive(Resource)]
pub struct ManifestLoader {
    source: ManifestSource,
    handle: Option<Handle<ResourceManifest>>,
    consumed: bool,
}

impl ManifestLoader {
    pub fn new(source: ManifestSource) -> Self {
        Self {
            source,
            handle: None,
            consumed: false,
        }
    }
}

// Start the loading process
pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    if let ManifestSource::Asset(path) = &manifest_loader.source {
        info!("Loading resource manifest from: {}", path);
        let handle = asset_server.load(path.clone());
        manifest_loader.handle = Some(handle);
    }
}

/// Hand the manifest to the resource loader once it is available.
pub fn load_manifest_system(
    mut manifest_loader: ResMut<ManifestLoader>,
    mut loader: ResMut<ResourceLoader>,
    channel: Res<EventChannel>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<ResourceManifest>>,
) {
    if manifest_loader.consumed || loader.status() != LoaderStatus::Idle {
        return;
    }

    let manifest = match manifest_loader.source.clone() {
        ManifestSource::Inline(manifest) => manifest,
        ManifestSource::Asset(path) => {
            let Some(handle) = manifest_loader.handle.clone() else {
                return;
            };
            if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle.id()) {
                manifest_loader.consumed = true;
                loader.fail();
                report_manifest_failure(&channel, path, error.to_string());
                return;
            }
            let Some(manifest) = manifests.get(&handle) else {
                return;
            };
            manifest.clone()
        }
    };

    manifest_loader.consumed = true;
    info!("✓ Resource manifest loaded ({} entries)", manifest.len());

    let result = loader.begin(manifest, |descriptor| {
        RequestedHandle::request(&asset_server, descriptor)
    });
    if let Err(error) = result {
        let label = manifest_loader.source.label();
        report_manifest_failure(&channel, label, error.to_string());
    }
}

fn report_manifest_failure(channel: &EventChannel, source_name: String, reason: String) {
    let error = LoadError::ResourceFailed {
        name: source_name.clone(),
        reason: reason.clone(),
    };
    error!("Resource manifest unusable: {}", error);

    if let Err(e) = channel.publish_event(&LoadFailed { source_name, reason }) {
        error!("Failed to publish load failure: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::loaded_resources::LoadedResources;
    use crate::engine::core::app_state::AppState;
    use crate::engine::loading::resource_loader::ResourceLoaderPlugin;
    use bevy::state::app::StatesPlugin;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn loader_app(manifest: serde_json::Value) -> (App, Arc<Mutex<Vec<LoadFailed>>>) {
        let manifest: ResourceManifest = serde_json::from_value(manifest).unwrap();
        let channel = EventChannel::new();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        channel.subscribe_event::<LoadFailed, _>(move |failed| sink.lock().unwrap().push(failed));

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), StatesPlugin))
            .init_asset::<ResourceManifest>()
            .init_state::<AppState>()
            .insert_resource(channel)
            .add_plugins(ResourceLoaderPlugin::from_manifest(manifest));
        (app, failures)
    }

    #[test]
    fn empty_manifest_fails_the_session_once() {
        let (mut app, failures) = loader_app(json!({ "sources": [] }));
        app.update();
        app.update();

        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].source_name, "manifest");
        assert_eq!(failures[0].reason, LoadError::EmptyManifest.to_string());
        assert_eq!(app.world().resource::<ResourceLoader>().status(), LoaderStatus::Failed);
        assert!(app.world().resource::<ManifestLoader>().consumed);
        assert_eq!(*app.world().resource::<State<AppState>>().get(), AppState::Loading);
    }

    #[test]
    fn duplicate_names_fail_the_session() {
        let (mut app, failures) = loader_app(json!({
            "sources": [
                { "name": "monitor", "type": "texture", "path": "textures/monitor.png" },
                { "name": "monitor", "type": "texture", "path": "textures/monitor_2.png" }
            ]
        }));
        app.update();

        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].reason,
            LoadError::DuplicateName("monitor".to_string()).to_string()
        );
        assert_eq!(app.world().resource::<ResourceLoader>().status(), LoaderStatus::Failed);
        assert!(app.world().get_resource::<LoadedResources>().is_none());
    }
}
