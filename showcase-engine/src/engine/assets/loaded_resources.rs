use crate::engine::assets::resource_manifest::{ResourceDescriptor, ResourceKind};
use crate::engine::loading::resource_loader::RequestedHandle;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use std::collections::HashMap;

/// Finished resources grouped by kind and keyed by manifest name.
///
/// Inserted once the load session completes. Scene assembly looks models and
/// their baked textures up here, e.g. `gltf_model("computerSetupModel")`.
#[derive(Resource, Debug, Default, Clone)]
pub struct LoadedResources {
    gltf_models: HashMap<String, Handle<Gltf>>,
    textures: HashMap<String, Handle<Image>>,
    cube_textures: HashMap<String, Handle<Image>>,
}

impl LoadedResources {
    pub(crate) fn insert(&mut self, descriptor: &ResourceDescriptor, handle: &RequestedHandle) {
        let name = descriptor.name.clone();
        match (descriptor.kind, handle) {
            (ResourceKind::GltfModel, RequestedHandle::Model(handle)) => {
                self.gltf_models.insert(name, handle.clone());
            }
            (ResourceKind::Texture, RequestedHandle::Image(handle)) => {
                self.textures.insert(name, handle.clone());
            }
            (ResourceKind::CubeTexture, RequestedHandle::Image(handle)) => {
                self.cube_textures.insert(name, handle.clone());
            }
            (kind, _) => warn!("Handle for '{}' does not match kind {}", name, kind.as_str()),
        }
    }

    pub fn gltf_model(&self, name: &str) -> Option<&Handle<Gltf>> {
        self.gltf_models.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&Handle<Image>> {
        self.textures.get(name)
    }

    pub fn cube_texture(&self, name: &str) -> Option<&Handle<Image>> {
        self.cube_textures.get(name)
    }
}
