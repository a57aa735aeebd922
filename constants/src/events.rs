/// Published once at mount with the capability check outcome.
pub const CAPABILITY_CHECK: &str = "capabilityCheck";

/// Published once per completed resource with the cumulative progress snapshot.
pub const LOADED_SOURCE: &str = "loadedSource";

/// Published once when the user dismisses the loading screen.
pub const LOADING_SCREEN_DONE: &str = "loadingScreenDone";

/// Published when a resource fetch fails and the load session is abandoned.
pub const LOAD_FAILED: &str = "loadFailed";
