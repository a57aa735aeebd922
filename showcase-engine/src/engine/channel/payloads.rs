use crate::engine::channel::event_channel::ChannelEvent;
use constants::events::{CAPABILITY_CHECK, LOAD_FAILED, LOADED_SOURCE, LOADING_SCREEN_DONE};
use serde::{Deserialize, Serialize};

/// Capability check outcome, published once when the loading screen mounts.
///
/// The host page renders its own notice from this when the engine cannot draw
/// one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityCheck {
    pub unsupported_browser: bool,
    pub missing_gpu_capability: bool,
    pub narrow_viewport: bool,
}

impl ChannelEvent for CapabilityCheck {
    const NAME: &'static str = CAPABILITY_CHECK;
}

/// Cumulative progress snapshot published once per completed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadEvent {
    pub source_name: String,
    pub progress: f32,
    pub loaded: u32,
    pub to_load: u32,
}

impl LoadEvent {
    /// Consumers treat `progress >= 1.0` as the completion signal.
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Progress as a whole percentage, rounded to nearest.
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

impl ChannelEvent for LoadEvent {
    const NAME: &'static str = LOADED_SOURCE;
}

/// Published when a resource fetch fails and the session is abandoned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadFailed {
    pub source_name: String,
    pub reason: String,
}

impl ChannelEvent for LoadFailed {
    const NAME: &'static str = LOAD_FAILED;
}

/// Published once when the loading screen hands control to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingScreenDone {}

impl ChannelEvent for LoadingScreenDone {
    const NAME: &'static str = LOADING_SCREEN_DONE;
}
