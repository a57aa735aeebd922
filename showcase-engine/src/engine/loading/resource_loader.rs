use crate::engine::assets::loaded_resources::LoadedResources;
use crate::engine::assets::resource_manifest::{ResourceDescriptor, ResourceKind, ResourceManifest};
use crate::engine::channel::event_channel::EventChannel;
use crate::engine::channel::payloads::LoadFailed;
use crate::engine::core::app_state::AppState;
use crate::engine::loading::error::LoadError;
use crate::engine::loading::manifest_loader::{ManifestLoader, ManifestSource, load_manifest_system, start_loading};
use crate::engine::loading::progress::LoadSession;
use bevy::asset::{DependencyLoadState, LoadState, RecursiveDependencyLoadState, UntypedAssetId};
use bevy::gltf::Gltf;
use bevy::prelude::*;

/// Typed handle issued for a manifest entry.
#[derive(Debug, Clone)]
pub enum RequestedHandle {
    Model(Handle<Gltf>),
    Image(Handle<Image>),
}

impl RequestedHandle {
    /// Ask the asset server for `descriptor` using the loader for its kind.
    pub fn request(asset_server: &AssetServer, descriptor: &ResourceDescriptor) -> Self {
        let path = descriptor.path.clone();
        match descriptor.kind {
            ResourceKind::GltfModel => Self::Model(asset_server.load(path)),
            ResourceKind::Texture | ResourceKind::CubeTexture => Self::Image(asset_server.load(path)),
        }
    }

    pub fn id(&self) -> UntypedAssetId {
        match self {
            Self::Model(handle) => handle.id().untyped(),
            Self::Image(handle) => handle.id().untyped(),
        }
    }
}

/// Observed state of one requested resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Pending,
    Loaded,
    Failed(String),
}

impl ResourceStatus {
    /// Collapse the asset server's load states. A resource only counts as
    /// loaded once all of its dependencies are loaded too.
    pub fn from_load_states(
        states: Option<(LoadState, DependencyLoadState, RecursiveDependencyLoadState)>,
    ) -> Self {
        match states {
            Some((LoadState::Failed(error), _, _)) => Self::Failed(error.to_string()),
            Some((_, _, RecursiveDependencyLoadState::Failed(error))) => Self::Failed(error.to_string()),
            Some((LoadState::Loaded, _, RecursiveDependencyLoadState::Loaded)) => Self::Loaded,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderStatus {
    /// No manifest yet.
    #[default]
    Idle,
    Loading,
    Complete,
    Failed,
}

/// Owns the manifest and the load session for the showcase resources.
#[derive(Resource, Default)]
pub struct ResourceLoader {
    manifest: Option<ResourceManifest>,
    requested: Vec<RequestedHandle>,
    session: Option<LoadSession>,
    status: LoaderStatus,
}

impl ResourceLoader {
    pub fn status(&self) -> LoaderStatus {
        self.status
    }

    pub fn session(&self) -> Option<&LoadSession> {
        self.session.as_ref()
    }

    /// Start a session for `manifest`, issuing one request per entry.
    ///
    /// The manifest is fixed for the rest of the session; calling this again
    /// once a session has started is ignored.
    pub fn begin(
        &mut self,
        manifest: ResourceManifest,
        mut request: impl FnMut(&ResourceDescriptor) -> RequestedHandle,
    ) -> Result<(), LoadError> {
        if self.status != LoaderStatus::Idle {
            warn!("Ignoring manifest, a load session is already {:?}", self.status);
            return Ok(());
        }

        let session = match LoadSession::new(&manifest) {
            Ok(session) => session,
            Err(error) => {
                self.status = LoaderStatus::Failed;
                return Err(error);
            }
        };

        info!("Loading {} showcase resources", manifest.len());
        self.requested = manifest.iter().map(|descriptor| request(descriptor)).collect();
        self.session = Some(session);
        self.manifest = Some(manifest);
        self.status = LoaderStatus::Loading;
        Ok(())
    }

    /// Mark the loader failed before a session could start.
    pub fn fail(&mut self) {
        self.status = LoaderStatus::Failed;
    }

    /// Observe every pending resource once and publish a [`LoadEvent`] per
    /// newly completed one.
    ///
    /// A failed resource ends the session: a `loadFailed` event is published
    /// and the error is returned.
    ///
    /// [`LoadEvent`]: crate::engine::channel::payloads::LoadEvent
    pub fn advance(
        &mut self,
        channel: &EventChannel,
        mut status_of: impl FnMut(usize, &RequestedHandle) -> ResourceStatus,
    ) -> Result<LoaderStatus, LoadError> {
        let Self {
            requested,
            session,
            status,
            ..
        } = self;

        if *status != LoaderStatus::Loading {
            return Ok(*status);
        }
        let Some(session) = session.as_mut() else {
            return Ok(*status);
        };

        for (index, handle) in requested.iter().enumerate() {
            if !session.is_pending(index) {
                continue;
            }

            match status_of(index, handle) {
                ResourceStatus::Pending => {}
                ResourceStatus::Loaded => {
                    let Some(event) = session.record_loaded(index)? else {
                        continue;
                    };
                    debug!(
                        "Loaded '{}' ({}/{})",
                        event.source_name, event.loaded, event.to_load
                    );
                    if let Err(e) = channel.publish_event(&event) {
                        error!("Failed to publish load event: {}", e);
                    }
                }
                ResourceStatus::Failed(reason) => {
                    let error = session.record_failed(index, reason);
                    *status = LoaderStatus::Failed;
                    error!("Load session failed: {}", error);

                    if let LoadError::ResourceFailed { name, reason } = &error {
                        let failed = LoadFailed {
                            source_name: name.clone(),
                            reason: reason.clone(),
                        };
                        if let Err(e) = channel.publish_event(&failed) {
                            error!("Failed to publish load failure: {}", e);
                        }
                    }
                    return Err(error);
                }
            }
        }

        if session.is_complete() {
            *status = LoaderStatus::Complete;
            info!("All {} showcase resources loaded", session.to_load());
        }
        Ok(*status)
    }

    /// Handles of the finished session, available once loading completes.
    pub fn loaded_resources(&self) -> Option<LoadedResources> {
        if self.status != LoaderStatus::Complete {
            return None;
        }
        let manifest = self.manifest.as_ref()?;

        let mut resources = LoadedResources::default();
        for (descriptor, handle) in manifest.iter().zip(&self.requested) {
            resources.insert(descriptor, handle);
        }
        Some(resources)
    }
}

/// Poll requested resources and publish completions on the main schedule.
pub fn poll_resource_loads(
    mut loader: ResMut<ResourceLoader>,
    channel: Res<EventChannel>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loader.status() != LoaderStatus::Loading {
        return;
    }

    settle_session(&mut loader, &channel, &mut commands, &mut next_state, |_, handle| {
        ResourceStatus::from_load_states(asset_server.get_load_states(handle.id()))
    });
}

/// Advance the session and, once it completes, insert [`LoadedResources`] and
/// leave `AppState::Loading`.
fn settle_session(
    loader: &mut ResourceLoader,
    channel: &EventChannel,
    commands: &mut Commands,
    next_state: &mut NextState<AppState>,
    status_of: impl FnMut(usize, &RequestedHandle) -> ResourceStatus,
) {
    // Failures were already logged and published by `advance`.
    if let Ok(LoaderStatus::Complete) = loader.advance(channel, status_of) {
        if let Some(resources) = loader.loaded_resources() {
            commands.insert_resource(resources);
        }
        info!("→ Transitioning to AssetsLoaded state");
        next_state.set(AppState::AssetsLoaded);
    }
}

/// Loads the resource manifest and every resource it names.
pub struct ResourceLoaderPlugin {
    source: ManifestSource,
}

impl ResourceLoaderPlugin {
    /// Load the manifest JSON at `path` (relative to the asset root).
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            source: ManifestSource::Asset(path.into()),
        }
    }

    /// Use a manifest built in code.
    pub fn from_manifest(manifest: ResourceManifest) -> Self {
        Self {
            source: ManifestSource::Inline(manifest),
        }
    }
}

impl Default for ResourceLoaderPlugin {
    fn default() -> Self {
        Self::from_path(ManifestSource::default_path())
    }
}

impl Plugin for ResourceLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResourceLoader>()
            .insert_resource(ManifestLoader::new(self.source.clone()))
            .add_systems(Startup, start_loading)
            .add_systems(
                Update,
                (load_manifest_system, poll_resource_loads)
                    .chain()
                    .run_if(in_state(AppState::Loading)),
            );
    }
}
