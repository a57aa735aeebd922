use crate::engine::loading::error::LoadError;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Loader family a resource is fetched and parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// glTF / GLB scene.
    GltfModel,
    /// Baked 2D texture.
    Texture,
    /// Environment cube map stored as a single KTX2 or DDS file.
    CubeTexture,
}

impl ResourceKind {
    /// Identifier used by the manifest and the frontend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GltfModel => "gltfModel",
            Self::Texture => "texture",
            Self::CubeTexture => "cubeTexture",
        }
    }
}

/// Single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Path relative to the Bevy asset root.
    pub path: String,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
        }
    }
}

/// Ordered set of resources a load session fetches. Mirrors the JSON file:
///
/// ```json
/// { "sources": [ { "name": "computerSetupModel", "type": "gltfModel", "path": "models/computer.glb" } ] }
/// ```
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceManifest {
    sources: Vec<ResourceDescriptor>,
}

impl ResourceManifest {
    /// Build a manifest in code, rejecting empty lists and duplicate names.
    pub fn new(sources: Vec<ResourceDescriptor>) -> Result<Self, LoadError> {
        let manifest = Self { sources };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the invariants a deserialised manifest must satisfy before loading.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.sources.is_empty() {
            return Err(LoadError::EmptyManifest);
        }

        let mut seen = HashSet::with_capacity(self.sources.len());
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(LoadError::DuplicateName(source.name.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResourceDescriptor> {
        self.sources.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.sources.iter()
    }
}
