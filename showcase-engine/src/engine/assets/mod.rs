//! Resource manifest and loaded handle registry for the showcase scene.
//!
//! The manifest names every model and texture the scene needs; the registry
//! exposes the finished handles to scene assembly once loading completes.

/// Handles of completed resources grouped by kind and keyed by name.
pub mod loaded_resources;

/// Ordered resource descriptors loaded from JSON or built in code.
pub mod resource_manifest;
