//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration and the hand-off from
//! the loading screen to the interactive scene.

/// Application setup and plugin configuration for the Bevy engine.
pub mod app_setup;

/// Application states from resource loading to the running scene.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
